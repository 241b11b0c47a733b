#[cfg(test)]
pub(crate) mod example_graphs;

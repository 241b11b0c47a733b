use crate::errors::Result;
use crate::graph::GraphStore;

/// Creates an example skeleton in segment 1 with the following structure
/// (edge weights in brackets):
///
/// ```plain
/// 0 --[1]-- 1 --[1]-- 2 --[1]-- 3
///           |
///          [2.5]
///           |
///           4 --[1]-- 5
/// ```
pub(crate) fn create_branching_skeleton() -> Result<GraphStore> {
    let mut graph = GraphStore::with_capacity(6);
    for n in 0..6 {
        graph.add_node(n, 1, None)?;
    }
    graph.add_edge(0, 1, 1.0)?;
    graph.add_edge(1, 2, 1.0)?;
    graph.add_edge(2, 3, 1.0)?;
    graph.add_edge(1, 4, 2.5)?;
    graph.add_edge(4, 5, 1.0)?;
    Ok(graph)
}

/// Creates two straight skeletons with sparse node IDs and positions.
///
/// ```plain
/// segment 7:  100 --[3]-- 101 --[4]-- 102
/// segment 9:  200 --[5]-- 201
/// ```
pub(crate) fn create_sparse_skeletons() -> Result<GraphStore> {
    let mut graph = GraphStore::new();
    graph.add_node(100, 7, Some([0.0, 0.0, 0.0]))?;
    graph.add_node(101, 7, Some([0.0, 0.0, 3.0]))?;
    graph.add_node(102, 7, Some([0.0, 4.0, 3.0]))?;
    graph.add_node(200, 9, Some([10.0, 0.0, 0.0]))?;
    graph.add_node(201, 9, Some([10.0, 3.0, 4.0]))?;
    graph.add_edge_from_positions(100, 101)?;
    graph.add_edge_from_positions(101, 102)?;
    graph.add_edge_from_positions(200, 201)?;
    Ok(graph)
}

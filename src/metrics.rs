//! Topological measures over a `TimepointGraph`.
//!
//! Definitions match the usual network-science conventions: normalized
//! betweenness, Wasserman-Faust closeness for disconnected graphs, and
//! degree assortativity as the Pearson correlation of edge-end degrees.

use crate::graph::TimepointGraph;
use petgraph::algo::{connected_components, dijkstra};
use petgraph::graph::NodeIndex;
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, VecDeque};

pub fn density(nodes: usize, edges: usize) -> f64 {
    if nodes <= 1 {
        return 0.0;
    }
    2.0 * edges as f64 / (nodes as f64 * (nodes as f64 - 1.0))
}

pub fn average_degree(nodes: usize, edges: usize) -> f64 {
    if nodes == 0 {
        return 0.0;
    }
    2.0 * edges as f64 / nodes as f64
}

fn adjacent(adj: &[Vec<usize>], u: usize, v: usize) -> bool {
    adj[u].binary_search(&v).is_ok()
}

/// Triangles through each node.
pub fn triangles(adj: &[Vec<usize>]) -> Vec<usize> {
    adj.iter()
        .map(|neighbours| {
            let mut count = 0;
            for (i, &a) in neighbours.iter().enumerate() {
                for &b in &neighbours[i + 1..] {
                    if adjacent(adj, a, b) {
                        count += 1;
                    }
                }
            }
            count
        })
        .collect()
}

pub fn clustering(adj: &[Vec<usize>]) -> Vec<f64> {
    triangles(adj)
        .into_iter()
        .zip(adj)
        .map(|(t, neighbours)| {
            let d = neighbours.len();
            if d < 2 {
                0.0
            } else {
                2.0 * t as f64 / (d * (d - 1)) as f64
            }
        })
        .collect()
}

pub fn average_clustering(adj: &[Vec<usize>]) -> f64 {
    if adj.is_empty() {
        return 0.0;
    }
    clustering(adj).iter().sum::<f64>() / adj.len() as f64
}

pub fn transitivity(adj: &[Vec<usize>]) -> f64 {
    let closed: usize = triangles(adj).iter().map(|t| 2 * t).sum();
    let triads: usize = adj
        .iter()
        .map(|n| n.len() * n.len().saturating_sub(1))
        .sum();
    if closed == 0 || triads == 0 {
        0.0
    } else {
        closed as f64 / triads as f64
    }
}

/// Undefined for fewer than two edges or two nodes, or when every edge end
/// has the same degree.
pub fn degree_assortativity(graph: &TimepointGraph) -> Option<f64> {
    if graph.edge_count() < 2 || graph.node_count() < 2 {
        return None;
    }
    let degrees = graph.degrees();
    let mut xs = Vec::with_capacity(2 * graph.edge_count());
    let mut ys = Vec::with_capacity(2 * graph.edge_count());
    for (u, v, _) in graph.edge_list() {
        xs.push(degrees[u] as f64);
        ys.push(degrees[v] as f64);
        xs.push(degrees[v] as f64);
        ys.push(degrees[u] as f64);
    }
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;
    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(&ys) {
        cov += (x - mean_x) * (y - mean_y);
        var_x += (x - mean_x).powi(2);
        var_y += (y - mean_y).powi(2);
    }
    if var_x <= f64::EPSILON || var_y <= f64::EPSILON {
        return None;
    }
    let r = cov / (var_x.sqrt() * var_y.sqrt());
    r.is_finite().then_some(r)
}

pub fn degree_centrality(adj: &[Vec<usize>]) -> Vec<f64> {
    let n = adj.len();
    if n <= 1 {
        return vec![0.0; n];
    }
    adj.iter()
        .map(|neighbours| neighbours.len() as f64 / (n - 1) as f64)
        .collect()
}

/// Hop distances from `source`; `None` for unreachable nodes.
pub fn bfs_distances(graph: &TimepointGraph, source: usize) -> Vec<Option<usize>> {
    let mut dist = vec![None; graph.node_count()];
    for (node, d) in dijkstra(graph.inner(), NodeIndex::new(source), None, |_| 1usize) {
        dist[node.index()] = Some(d);
    }
    dist
}

/// Brandes' algorithm, normalized by `(n-1)(n-2)` over ordered pairs.
pub fn betweenness_centrality(adj: &[Vec<usize>]) -> Vec<f64> {
    let n = adj.len();
    let mut centrality = vec![0.0; n];
    for s in 0..n {
        let mut stack = Vec::with_capacity(n);
        let mut preds: Vec<Vec<usize>> = vec![vec![]; n];
        let mut sigma = vec![0.0f64; n];
        let mut dist: Vec<i64> = vec![-1; n];
        sigma[s] = 1.0;
        dist[s] = 0;
        let mut queue = VecDeque::from([s]);
        while let Some(v) = queue.pop_front() {
            stack.push(v);
            for &w in &adj[v] {
                if dist[w] < 0 {
                    dist[w] = dist[v] + 1;
                    queue.push_back(w);
                }
                if dist[w] == dist[v] + 1 {
                    sigma[w] += sigma[v];
                    preds[w].push(v);
                }
            }
        }
        let mut delta = vec![0.0f64; n];
        while let Some(w) = stack.pop() {
            for &v in &preds[w] {
                delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
            }
            if w != s {
                centrality[w] += delta[w];
            }
        }
    }
    if n > 2 {
        let scale = 1.0 / ((n - 1) * (n - 2)) as f64;
        for c in &mut centrality {
            *c *= scale;
        }
    }
    centrality
}

/// Closeness scaled by the reachable fraction of the graph.
pub fn closeness_centrality(graph: &TimepointGraph) -> Vec<f64> {
    let n = graph.node_count();
    (0..n)
        .map(|u| {
            let reached: Vec<usize> = bfs_distances(graph, u).into_iter().flatten().collect();
            let total: usize = reached.iter().sum();
            if total == 0 || n <= 1 {
                return 0.0;
            }
            let r = (reached.len() - 1) as f64;
            (r / total as f64) * (r / (n - 1) as f64)
        })
        .collect()
}

pub fn component_count(graph: &TimepointGraph) -> usize {
    connected_components(graph.inner())
}

/// Connected components as node lists, ordered by their smallest node.
pub fn components(graph: &TimepointGraph) -> Vec<Vec<usize>> {
    let mut sets = UnionFind::<usize>::new(graph.node_count());
    for edge in graph.inner().edge_references() {
        sets.union(edge.source().index(), edge.target().index());
    }
    let mut slot: HashMap<usize, usize> = HashMap::new();
    let mut out: Vec<Vec<usize>> = vec![];
    for (node, root) in sets.into_labeling().into_iter().enumerate() {
        let i = *slot.entry(root).or_insert_with(|| {
            out.push(vec![]);
            out.len() - 1
        });
        out[i].push(node);
    }
    out
}

/// First component of maximum size.
pub fn largest_component(graph: &TimepointGraph) -> Vec<usize> {
    let mut best: Vec<usize> = vec![];
    for component in components(graph) {
        if component.len() > best.len() {
            best = component;
        }
    }
    best
}

/// Diameter and average shortest-path length of a connected node set.
/// `None` when the set has fewer than two nodes or is not connected.
pub fn path_lengths(graph: &TimepointGraph, component: &[usize]) -> Option<(usize, f64)> {
    let k = component.len();
    if k < 2 {
        return None;
    }
    let mut diameter = 0;
    let mut total = 0usize;
    for &u in component {
        let dist = bfs_distances(graph, u);
        for &v in component {
            let d = dist[v]?;
            diameter = diameter.max(d);
            total += d;
        }
    }
    Some((diameter, total as f64 / (k * (k - 1)) as f64))
}

/// Index of the first maximum; `None` for an empty slice.
pub fn argmax_first(values: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some(b) if v <= values[b] => {}
            _ => best = Some(i),
        }
    }
    best
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tgeconet_protocol::AgeBracket;

    fn graph(n: usize, edges: &[(usize, usize)]) -> TimepointGraph {
        let names: Vec<String> = (0..n).map(|i| format!("G{i}")).collect();
        let mut g = TimepointGraph::new(AgeBracket::Twenties, &names);
        for &(u, v) in edges {
            g.add_edge(u, v, 0.01);
        }
        g
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_density_and_degree() {
        assert_eq!(density(1, 0), 0.0);
        assert!(close(density(4, 3), 0.5));
        assert!(close(average_degree(4, 3), 1.5));
        assert_eq!(average_degree(0, 0), 0.0);
    }

    #[test]
    fn test_clustering_on_triangle_with_tail() {
        // 0-1-2 triangle, 3 hangs off 2
        let g = graph(4, &[(0, 1), (1, 2), (0, 2), (2, 3)]);
        let adj = g.adjacency();
        let c = clustering(&adj);
        assert!(close(c[0], 1.0));
        assert!(close(c[1], 1.0));
        assert!(close(c[2], 1.0 / 3.0));
        assert!(close(c[3], 0.0));
        assert!(close(average_clustering(&adj), (2.0 + 1.0 / 3.0) / 4.0));
        // 3 closed triads out of 5 connected triples
        assert!(close(transitivity(&adj), 0.6));
    }

    #[test]
    fn test_betweenness_on_path() {
        let g = graph(3, &[(0, 1), (1, 2)]);
        let b = betweenness_centrality(&g.adjacency());
        assert!(close(b[0], 0.0));
        assert!(close(b[1], 1.0));
        assert!(close(b[2], 0.0));
    }

    #[test]
    fn test_betweenness_on_star() {
        let g = graph(4, &[(0, 1), (0, 2), (0, 3)]);
        let b = betweenness_centrality(&g.adjacency());
        assert!(close(b[0], 1.0));
        assert!(close(b[1], 0.0));
    }

    #[test]
    fn test_closeness_handles_disconnected_nodes() {
        let g = graph(4, &[(0, 1), (1, 2)]);
        let c = closeness_centrality(&g);
        // node 1 reaches 2 of 3 others at total distance 2
        assert!(close(c[1], (2.0 / 2.0) * (2.0 / 3.0)));
        assert!(close(c[0], (2.0 / 3.0) * (2.0 / 3.0)));
        assert_eq!(c[3], 0.0);
    }

    #[test]
    fn test_components_and_path_lengths() {
        let g = graph(6, &[(0, 1), (4, 5), (3, 4)]);
        assert_eq!(component_count(&g), 3);
        assert_eq!(components(&g), vec![vec![0, 1], vec![2], vec![3, 4, 5]]);
        let largest = largest_component(&g);
        assert_eq!(largest, vec![3, 4, 5]);
        let (diameter, avg) = path_lengths(&g, &largest).unwrap();
        assert_eq!(diameter, 2);
        assert!(close(avg, 8.0 / 6.0));
        assert_eq!(path_lengths(&g, &[2]), None);
        assert_eq!(path_lengths(&g, &[0, 3]), None);
    }

    #[test]
    fn test_first_largest_component_wins_ties() {
        let g = graph(5, &[(3, 4), (0, 1)]);
        assert_eq!(largest_component(&g), vec![0, 1]);
        assert_eq!(bfs_distances(&g, 3), vec![None, None, None, Some(0), Some(1)]);
    }

    #[test]
    fn test_assortativity() {
        assert_eq!(degree_assortativity(&graph(3, &[(0, 1)])), None);
        // regular graph: zero variance
        assert_eq!(degree_assortativity(&graph(3, &[(0, 1), (1, 2), (0, 2)])), None);
        // star graphs are perfectly disassortative
        let r = degree_assortativity(&graph(4, &[(0, 1), (0, 2), (0, 3)])).unwrap();
        assert!(close(r, -1.0));
    }

    #[test]
    fn test_argmax_first_prefers_earliest() {
        assert_eq!(argmax_first(&[]), None);
        assert_eq!(argmax_first(&[1.0, 3.0, 3.0, 2.0]), Some(1));
    }
}

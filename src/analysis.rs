//! Read-only statistics over a completed temporal network.

use crate::graph::TimepointGraph;
use crate::metrics;
use crate::network::TemporalNetwork;
use tgeconet_protocol::{
    AdjacencyMatrix, HighDegreeGene, NO_EDGE, TimepointDeltas, TimepointStatistics,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct NetworkAnalyzer;

struct Centrality {
    average: f64,
    top: Option<String>,
}

impl Centrality {
    fn none() -> Self {
        Self {
            average: 0.0,
            top: None,
        }
    }

    fn of(graph: &TimepointGraph, values: &[f64]) -> Self {
        Self {
            average: metrics::mean(values),
            top: metrics::argmax_first(values).map(|i| graph.label(i).to_string()),
        }
    }
}

impl NetworkAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// One record per timepoint, in network order. Deltas refer to the
    /// previous record and are zero for the first.
    pub fn analyze(&self, network: &TemporalNetwork) -> Vec<TimepointStatistics> {
        let mut out: Vec<TimepointStatistics> = Vec::with_capacity(network.len());
        for (i, graph) in network.iter().enumerate() {
            let mut stats = Self::timepoint_statistics(i + 1, graph);
            if let Some(prev) = out.last() {
                stats.deltas = Self::deltas(prev, &stats);
            }
            out.push(stats);
        }
        out
    }

    pub fn timepoint_statistics(timepoint: usize, graph: &TimepointGraph) -> TimepointStatistics {
        let n = graph.node_count();
        let m = graph.edge_count();
        let adj = graph.adjacency();

        let (degree, betweenness, closeness) = if n <= 1 || m == 0 {
            (Centrality::none(), Centrality::none(), Centrality::none())
        } else {
            (
                Centrality::of(graph, &metrics::degree_centrality(&adj)),
                Centrality::of(graph, &metrics::betweenness_centrality(&adj)),
                Centrality::of(graph, &metrics::closeness_centrality(graph)),
            )
        };

        let largest = metrics::largest_component(graph);
        let paths = if largest.len() > 1 {
            metrics::path_lengths(graph, &largest)
        } else {
            None
        };

        TimepointStatistics {
            timepoint,
            age_bracket: graph.age_bracket(),
            nodes: n,
            edges: m,
            density: metrics::density(n, m),
            avg_degree: metrics::average_degree(n, m),
            avg_clustering: metrics::average_clustering(&adj),
            connected_components: metrics::component_count(graph),
            transitivity: metrics::transitivity(&adj),
            degree_assortativity: metrics::degree_assortativity(graph),
            avg_degree_centrality: degree.average,
            top_degree_node: degree.top,
            avg_betweenness: betweenness.average,
            top_betweenness_node: betweenness.top,
            avg_closeness: closeness.average,
            top_closeness_node: closeness.top,
            largest_component_size: largest.len(),
            diameter: paths.map(|(d, _)| d),
            avg_shortest_path_length: paths.map(|(_, avg)| avg),
            deltas: TimepointDeltas::default(),
        }
    }

    fn deltas(prev: &TimepointStatistics, cur: &TimepointStatistics) -> TimepointDeltas {
        TimepointDeltas {
            edges: cur.edges as i64 - prev.edges as i64,
            density: cur.density - prev.density,
            avg_degree: cur.avg_degree - prev.avg_degree,
            avg_clustering: cur.avg_clustering - prev.avg_clustering,
            avg_degree_centrality: cur.avg_degree_centrality - prev.avg_degree_centrality,
            avg_betweenness: cur.avg_betweenness - prev.avg_betweenness,
            avg_closeness: cur.avg_closeness - prev.avg_closeness,
        }
    }

    /// Top `top_n` genes by degree for each timepoint. Ties keep gene order.
    pub fn high_degree_genes(
        &self,
        network: &TemporalNetwork,
        top_n: usize,
    ) -> Vec<Vec<HighDegreeGene>> {
        network
            .iter()
            .map(|graph| Self::top_degree(graph, top_n))
            .collect()
    }

    pub fn top_degree(graph: &TimepointGraph, top_n: usize) -> Vec<HighDegreeGene> {
        let mut ranked: Vec<(usize, usize)> = graph.degrees().into_iter().enumerate().collect();
        // stable sort: equal degrees stay in node order
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
            .into_iter()
            .take(top_n)
            .map(|(i, degree)| HighDegreeGene {
                gene: graph.label(i).to_string(),
                degree,
            })
            .collect()
    }

    pub fn adjacency_matrices(&self, network: &TemporalNetwork) -> Vec<AdjacencyMatrix> {
        network.iter().map(Self::adjacency_matrix).collect()
    }

    /// P-value where an edge exists, `NO_EDGE` elsewhere (diagonal included).
    pub fn adjacency_matrix(graph: &TimepointGraph) -> AdjacencyMatrix {
        let n = graph.node_count();
        let mut values = vec![vec![NO_EDGE; n]; n];
        for (u, v, pvalue) in graph.edge_list() {
            values[u][v] = pvalue;
            values[v][u] = pvalue;
        }
        AdjacencyMatrix {
            age_bracket: graph.age_bracket(),
            genes: graph.labels().into_iter().map(str::to_string).collect(),
            values,
        }
    }
}

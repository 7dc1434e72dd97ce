use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use tgeconet_protocol::{AgeBracket, EdgeRecord};

/// Undirected co-expression graph of one age bracket. Node indices follow
/// the configured gene order; edge weights are rounded p-values.
#[derive(Debug, Clone)]
pub struct TimepointGraph {
    age_bracket: AgeBracket,
    graph: UnGraph<String, f64>,
}

impl TimepointGraph {
    pub fn new(age_bracket: AgeBracket, genes: &[String]) -> Self {
        let mut graph = UnGraph::with_capacity(genes.len(), 0);
        for gene in genes {
            graph.add_node(gene.clone());
        }
        Self { age_bracket, graph }
    }

    pub fn age_bracket(&self) -> AgeBracket {
        self.age_bracket
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn label(&self, node: usize) -> &str {
        &self.graph[NodeIndex::new(node)]
    }

    pub fn labels(&self) -> Vec<&str> {
        self.graph.node_weights().map(String::as_str).collect()
    }

    pub fn index_of(&self, gene: &str) -> Option<usize> {
        self.graph
            .node_indices()
            .find(|&i| self.graph[i] == gene)
            .map(NodeIndex::index)
    }

    /// Adds `u -- v`. Self-loops, unknown nodes and already present edges
    /// are refused.
    pub fn add_edge(&mut self, u: usize, v: usize, pvalue: f64) -> bool {
        let n = self.node_count();
        if u == v || u >= n || v >= n {
            return false;
        }
        let (a, b) = (NodeIndex::new(u), NodeIndex::new(v));
        if self.graph.find_edge(a, b).is_some() {
            return false;
        }
        self.graph.add_edge(a, b, pvalue);
        true
    }

    pub fn edge_weight(&self, u: usize, v: usize) -> Option<f64> {
        let n = self.node_count();
        if u >= n || v >= n {
            return None;
        }
        self.graph
            .find_edge(NodeIndex::new(u), NodeIndex::new(v))
            .map(|e| self.graph[e])
    }

    pub fn degree(&self, node: usize) -> usize {
        self.graph.neighbors(NodeIndex::new(node)).count()
    }

    pub fn degrees(&self) -> Vec<usize> {
        (0..self.node_count()).map(|i| self.degree(i)).collect()
    }

    /// Sorted neighbour lists, indexed by node.
    pub fn adjacency(&self) -> Vec<Vec<usize>> {
        let mut adj = vec![vec![]; self.node_count()];
        for edge in self.graph.edge_references() {
            let (u, v) = (edge.source().index(), edge.target().index());
            adj[u].push(v);
            adj[v].push(u);
        }
        for neighbours in &mut adj {
            neighbours.sort_unstable();
        }
        adj
    }

    /// Edges as `(u, v, pvalue)` in insertion order.
    pub fn edge_list(&self) -> Vec<(usize, usize, f64)> {
        self.graph
            .edge_references()
            .map(|e| (e.source().index(), e.target().index(), *e.weight()))
            .collect()
    }

    pub fn edges(&self) -> Vec<EdgeRecord> {
        self.edge_list()
            .into_iter()
            .map(|(u, v, pvalue)| EdgeRecord {
                source: self.label(u).to_string(),
                target: self.label(v).to_string(),
                pvalue,
            })
            .collect()
    }

    pub fn inner(&self) -> &UnGraph<String, f64> {
        &self.graph
    }
}

impl PartialEq for TimepointGraph {
    fn eq(&self, other: &Self) -> bool {
        self.age_bracket == other.age_bracket
            && self.labels() == other.labels()
            && self.edge_list() == other.edge_list()
    }
}

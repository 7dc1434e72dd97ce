//! Machine-readable contracts shared between the tGeCoNet engine and its
//! consumers (CLI JSON output, exporters, downstream tooling).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Cell value of an adjacency matrix for gene pairs without an edge.
/// P-values live in `[0, 1)`, so a negative number cannot collide.
pub const NO_EDGE: f64 = -1.0;

/// Population age range used as the temporal axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgeBracket {
    #[serde(rename = "20-29")]
    Twenties,
    #[serde(rename = "30-39")]
    Thirties,
    #[serde(rename = "40-49")]
    Forties,
    #[serde(rename = "50-59")]
    Fifties,
    #[serde(rename = "60-69")]
    Sixties,
    #[serde(rename = "70-79")]
    Seventies,
}

impl AgeBracket {
    /// All brackets in timepoint order.
    pub const ALL: [AgeBracket; 6] = [
        Self::Twenties,
        Self::Thirties,
        Self::Forties,
        Self::Fifties,
        Self::Sixties,
        Self::Seventies,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Twenties => "20-29",
            Self::Thirties => "30-39",
            Self::Forties => "40-49",
            Self::Fifties => "50-59",
            Self::Sixties => "60-69",
            Self::Seventies => "70-79",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        let norm = text.trim();
        Self::ALL.into_iter().find(|b| b.label() == norm)
    }
}

impl fmt::Display for AgeBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Sample values of one expression row. The provider usually sends a flat
/// list, but some responses wrap it as a list of lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SampleValues {
    Flat(Vec<f64>),
    Nested(Vec<Vec<f64>>),
}

impl Default for SampleValues {
    fn default() -> Self {
        Self::Flat(vec![])
    }
}

impl SampleValues {
    /// Values in order, nested lists concatenated.
    pub fn to_vec(&self) -> Vec<f64> {
        match self {
            Self::Flat(values) => values.clone(),
            Self::Nested(rows) => rows.iter().flatten().copied().collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Flat(values) => values.len(),
            Self::Nested(rows) => rows.iter().map(Vec::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<f64>> for SampleValues {
    fn from(values: Vec<f64>) -> Self {
        Self::Flat(values)
    }
}

/// One row of the GTEx `geneExpression` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionRecord {
    #[serde(rename = "gencodeId")]
    pub gene_id: String,
    #[serde(rename = "geneSymbol", default, skip_serializing_if = "Option::is_none")]
    pub gene_symbol: Option<String>,
    #[serde(rename = "tissueSiteDetailId")]
    pub tissue_id: String,
    pub unit: String,
    #[serde(rename = "subsetGroup", default, skip_serializing_if = "Option::is_none")]
    pub age_bracket: Option<String>,
    #[serde(rename = "data", default)]
    pub sample_values: SampleValues,
}

/// One significant co-expression edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub source: String,
    pub target: String,
    pub pvalue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighDegreeGene {
    pub gene: String,
    pub degree: usize,
}

/// Square matrix over the full gene set of one timepoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjacencyMatrix {
    pub age_bracket: AgeBracket,
    pub genes: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl AdjacencyMatrix {
    pub fn get(&self, row: &str, col: &str) -> Option<f64> {
        let i = self.genes.iter().position(|g| g == row)?;
        let j = self.genes.iter().position(|g| g == col)?;
        Some(self.values[i][j])
    }
}

/// Change of selected statistics versus the previous timepoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TimepointDeltas {
    pub edges: i64,
    pub density: f64,
    pub avg_degree: f64,
    pub avg_clustering: f64,
    pub avg_degree_centrality: f64,
    pub avg_betweenness: f64,
    pub avg_closeness: f64,
}

/// Topological snapshot of one timepoint graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimepointStatistics {
    pub timepoint: usize,
    pub age_bracket: AgeBracket,
    pub nodes: usize,
    pub edges: usize,
    pub density: f64,
    pub avg_degree: f64,
    pub avg_clustering: f64,
    pub connected_components: usize,
    pub transitivity: f64,
    pub degree_assortativity: Option<f64>,
    pub avg_degree_centrality: f64,
    pub top_degree_node: Option<String>,
    pub avg_betweenness: f64,
    pub top_betweenness_node: Option<String>,
    pub avg_closeness: f64,
    pub top_closeness_node: Option<String>,
    pub largest_component_size: usize,
    pub diameter: Option<usize>,
    pub avg_shortest_path_length: Option<f64>,
    pub deltas: TimepointDeltas,
}

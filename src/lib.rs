//! Temporal gene co-expression networks.
//!
//! Genes of interest are resolved against gene metadata, their expression is
//! retrieved per tissue and age bracket, and every bracket yields one
//! undirected graph whose edges carry the Pearson p-value of significantly
//! correlated gene pairs. [`NetworkAnalyzer`] summarises the resulting
//! [`TemporalNetwork`].

pub mod about;
pub mod aggregate;
pub mod analysis;
pub mod builder;
pub mod config;
pub mod correlation;
pub mod error;
pub mod export;
pub mod expression;
pub mod fetch;
pub mod genes;
pub mod graph;
pub mod metadata;
pub mod metrics;
pub mod network;

pub use analysis::NetworkAnalyzer;
pub use config::{NetworkConfig, Parallelism};
pub use error::{PairSkip, Result, TgeconetError};
pub use expression::ExpressionTable;
pub use fetch::{ExpressionFetcher, GtexClient, JsonFileFetcher};
pub use graph::TimepointGraph;
pub use metadata::{GeneMetadata, IdScheme, MetadataResolver, PassthroughResolver};
pub use network::{TemporalNetwork, Tgeconet};
pub use tgeconet_protocol;

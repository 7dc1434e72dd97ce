use crate::builder::TimepointGraphBuilder;
use crate::config::NetworkConfig;
use crate::error::{Result, TgeconetError};
use crate::expression::ExpressionTable;
use crate::fetch::ExpressionFetcher;
use crate::genes::GeneSet;
use crate::graph::TimepointGraph;
use crate::metadata::MetadataResolver;
use rayon::prelude::*;
use tgeconet_protocol::AgeBracket;
use tracing::info;

/// Timepoint graphs in age-bracket order.
#[derive(Debug, Clone, PartialEq)]
pub struct TemporalNetwork {
    timepoints: Vec<TimepointGraph>,
}

impl TemporalNetwork {
    pub fn new(timepoints: Vec<TimepointGraph>) -> Self {
        Self { timepoints }
    }

    pub fn timepoints(&self) -> &[TimepointGraph] {
        &self.timepoints
    }

    pub fn len(&self) -> usize {
        self.timepoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timepoints.is_empty()
    }

    pub fn get(&self, bracket: AgeBracket) -> Option<&TimepointGraph> {
        self.timepoints.iter().find(|g| g.age_bracket() == bracket)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimepointGraph> {
        self.timepoints.iter()
    }

    pub fn total_edges(&self) -> usize {
        self.timepoints.iter().map(TimepointGraph::edge_count).sum()
    }
}

/// Constructs temporal co-expression networks for one configuration.
#[derive(Debug, Clone)]
pub struct Tgeconet {
    config: NetworkConfig,
    genes: GeneSet,
}

impl Tgeconet {
    /// Validates the configuration and resolves the genes of interest once.
    pub fn new(config: NetworkConfig, resolver: &dyn MetadataResolver) -> Result<Self> {
        config.validate()?;
        info!("loading metadata");
        let genes = GeneSet::resolve(&config.genes_of_interest, config.id_type, resolver)?;
        info!(
            requested = config.genes_of_interest.len(),
            resolved = genes.len(),
            "metadata ok"
        );
        Ok(Self { config, genes })
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn genes(&self) -> &GeneSet {
        &self.genes
    }

    pub fn retrieve(&self, fetcher: &dyn ExpressionFetcher) -> Result<ExpressionTable> {
        let table = fetcher.fetch(
            &self.genes.gene_ids(),
            &self.config.tissues_of_interest,
            self.config.effective_limit(),
        )?;
        if table.is_empty() {
            return Err(TgeconetError::DataRetrieval(
                "No gene expression data was returned for the requested genes and tissues"
                    .to_string(),
            ));
        }
        info!(rows = table.len(), "gene expression data ok");
        Ok(table)
    }

    pub fn construct_temporal_network(
        &self,
        fetcher: &dyn ExpressionFetcher,
    ) -> Result<TemporalNetwork> {
        let table = self.retrieve(fetcher)?;
        self.construct_from_table(&table)
    }

    /// One graph per configured age bracket, built on the configured worker
    /// pool. The result is independent of the parallelism setting.
    pub fn construct_from_table(&self, table: &ExpressionTable) -> Result<TemporalNetwork> {
        if self.genes.is_empty() {
            return Err(TgeconetError::Configuration(
                "Genes of interest are mandatory; the list cannot be empty".to_string(),
            ));
        }
        if table.is_empty() {
            return Err(TgeconetError::DataRetrieval(
                "Expression table is empty".to_string(),
            ));
        }
        match self.config.threads {
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| {
                        TgeconetError::Configuration(format!("Could not start worker pool: {e}"))
                    })?;
                Ok(pool.install(|| self.build_all(table)))
            }
            None => Ok(self.build_all(table)),
        }
    }

    fn build_all(&self, table: &ExpressionTable) -> TemporalNetwork {
        let builder = TimepointGraphBuilder::new(
            table,
            &self.genes,
            &self.config.tissues_of_interest,
            &self.config.unit,
            self.config.threshold,
        );
        let brackets = self.config.ordered_age_brackets();
        let parallelism = self.config.parallelism;
        let build_one = |(i, bracket): (usize, &AgeBracket)| {
            info!(timepoint = i + 1, bracket = %bracket, "building time point");
            let graph = builder.build(*bracket, parallelism.pairs());
            info!(
                timepoint = i + 1,
                edges = graph.edge_count(),
                "time point ok"
            );
            graph
        };
        let timepoints: Vec<TimepointGraph> = if parallelism.brackets() {
            brackets.par_iter().enumerate().map(build_one).collect()
        } else {
            brackets.iter().enumerate().map(build_one).collect()
        };
        info!(timepoints = timepoints.len(), "temporal network built");
        TemporalNetwork::new(timepoints)
    }
}

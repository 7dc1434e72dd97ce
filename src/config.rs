use crate::error::{Result, TgeconetError};
use crate::metadata::IdScheme;
use serde::{Deserialize, Serialize};
use std::fs;
use tgeconet_protocol::AgeBracket;

pub const DEFAULT_THRESHOLD: f64 = 0.05;
pub const DEFAULT_UNIT: &str = "TPM";
pub const DEFAULT_DATASET_ID: &str = "gtex_v10";
/// Largest page size the GTEx API accepts.
pub const MAX_LIMIT: usize = 100_000;

/// Which units of work run on the worker pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parallelism {
    Sequential,
    Pairs,
    Brackets,
    #[default]
    BracketsAndPairs,
}

impl Parallelism {
    pub fn pairs(self) -> bool {
        matches!(self, Self::Pairs | Self::BracketsAndPairs)
    }

    pub fn brackets(self) -> bool {
        matches!(self, Self::Brackets | Self::BracketsAndPairs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub genes_of_interest: Vec<String>,
    pub tissues_of_interest: Vec<String>,
    pub threshold: f64,
    pub unit: String,
    pub dataset_id: String,
    pub limit: usize,
    pub id_type: IdScheme,
    pub age_brackets: Vec<AgeBracket>,
    pub parallelism: Parallelism,
    pub threads: Option<usize>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            genes_of_interest: vec![],
            tissues_of_interest: vec![],
            threshold: DEFAULT_THRESHOLD,
            unit: DEFAULT_UNIT.to_string(),
            dataset_id: DEFAULT_DATASET_ID.to_string(),
            limit: MAX_LIMIT,
            id_type: IdScheme::default(),
            age_brackets: AgeBracket::ALL.to_vec(),
            parallelism: Parallelism::default(),
            threads: None,
        }
    }
}

impl NetworkConfig {
    pub fn new(genes_of_interest: Vec<String>, tissues_of_interest: Vec<String>) -> Self {
        Self {
            genes_of_interest,
            tissues_of_interest,
            ..Self::default()
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| TgeconetError::Configuration(format!("Invalid configuration: {e}")))
    }

    pub fn from_json_file(path: &str) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            TgeconetError::Configuration(format!("Could not read configuration '{path}': {e}"))
        })?;
        serde_json::from_str(&text).map_err(|e| {
            TgeconetError::Configuration(format!("Could not parse configuration '{path}': {e}"))
        })
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_id_type(mut self, id_type: IdScheme) -> Self {
        self.id_type = id_type;
        self
    }

    pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    pub fn with_age_brackets(mut self, age_brackets: Vec<AgeBracket>) -> Self {
        self.age_brackets = age_brackets;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.genes_of_interest.is_empty() {
            return Err(TgeconetError::Configuration(
                "Genes of interest are mandatory; the list cannot be empty".to_string(),
            ));
        }
        if !(self.threshold > 0.0 && self.threshold <= 1.0) {
            return Err(TgeconetError::Configuration(format!(
                "Significance threshold must be in (0, 1], got {}",
                self.threshold
            )));
        }
        if self.age_brackets.is_empty() {
            return Err(TgeconetError::Configuration(
                "At least one age bracket is required".to_string(),
            ));
        }
        if self.threads == Some(0) {
            return Err(TgeconetError::Configuration(
                "Worker pool size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Configured brackets in timepoint order, without duplicates.
    pub fn ordered_age_brackets(&self) -> Vec<AgeBracket> {
        let mut brackets = self.age_brackets.clone();
        brackets.sort_unstable();
        brackets.dedup();
        brackets
    }

    pub fn effective_limit(&self) -> usize {
        self.limit.clamp(1, MAX_LIMIT)
    }
}

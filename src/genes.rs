use crate::error::{Result, TgeconetError};
use crate::metadata::{IdScheme, MetadataResolver};
use itertools::Itertools;
use std::collections::HashSet;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gene {
    /// Identifier as supplied by the caller; used as node label.
    pub label: String,
    /// Identifier understood by the expression source.
    pub gene_id: String,
}

/// Ordered, non-empty set of resolved genes of interest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneSet {
    genes: Vec<Gene>,
}

impl GeneSet {
    /// Resolves `ids` once. Duplicates collapse to their first occurrence and
    /// unresolvable identifiers are dropped with a warning; nothing resolved
    /// at all is a lookup error.
    pub fn resolve(
        ids: &[String],
        scheme: IdScheme,
        resolver: &dyn MetadataResolver,
    ) -> Result<Self> {
        if ids.is_empty() {
            return Err(TgeconetError::Configuration(
                "Genes of interest are mandatory; the list cannot be empty".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        let unique: Vec<String> = ids
            .iter()
            .filter(|id| {
                let fresh = seen.insert(id.as_str());
                if !fresh {
                    warn!(gene = %id, "duplicate gene of interest ignored");
                }
                fresh
            })
            .cloned()
            .collect();

        let mapping = resolver.resolve(&unique, scheme)?;
        let mut genes = Vec::with_capacity(unique.len());
        for label in unique {
            match mapping.get(&label) {
                Some(gene_id) => genes.push(Gene {
                    gene_id: gene_id.clone(),
                    label,
                }),
                None => warn!(gene = %label, scheme = %scheme, "unresolved gene dropped"),
            }
        }
        if genes.is_empty() {
            return Err(TgeconetError::Lookup(format!(
                "None of the {} genes of interest could be resolved as {scheme}",
                ids.len()
            )));
        }
        Ok(Self { genes })
    }

    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    pub fn labels(&self) -> Vec<String> {
        self.genes.iter().map(|g| g.label.clone()).collect()
    }

    pub fn gene_ids(&self) -> Vec<String> {
        self.genes.iter().map(|g| g.gene_id.clone()).collect()
    }

    /// All unordered pairs as index tuples, in gene order.
    pub fn pairs(&self) -> Vec<(usize, usize)> {
        (0..self.genes.len())
            .array_combinations::<2>()
            .map(|[u, v]| (u, v))
            .collect()
    }
}

//! Per-timepoint graph construction: aggregate, test, threshold.

use crate::aggregate::aggregate_samples;
use crate::correlation::{CorrelationError, pearson};
use crate::error::PairSkip;
use crate::expression::ExpressionTable;
use crate::genes::GeneSet;
use crate::graph::TimepointGraph;
use rayon::prelude::*;
use std::collections::HashSet;
use tgeconet_protocol::AgeBracket;
use tracing::debug;

/// Result of testing one gene pair in one age bracket.
#[derive(Debug, Clone, PartialEq)]
pub enum PairOutcome {
    Edge { pvalue: f64 },
    NotSignificant { pvalue: f64 },
    Skipped(PairSkip),
}

impl PairOutcome {
    pub fn edge_weight(&self) -> Option<f64> {
        match self {
            Self::Edge { pvalue } => Some(*pvalue),
            _ => None,
        }
    }
}

/// Strict comparison: a p-value equal to the threshold is not significant.
pub fn is_significant(pvalue: f64, threshold: f64) -> bool {
    pvalue < threshold
}

pub fn decide(u: &[f64], v: &[f64], threshold: f64) -> PairOutcome {
    match pearson(u, v) {
        Ok(c) if is_significant(c.pvalue, threshold) => PairOutcome::Edge { pvalue: c.pvalue },
        Ok(c) => PairOutcome::NotSignificant { pvalue: c.pvalue },
        Err(CorrelationError::Input(left, right)) => {
            PairOutcome::Skipped(PairSkip::LengthMismatch { left, right })
        }
        Err(CorrelationError::Degenerate) => PairOutcome::Skipped(PairSkip::NumericalDegeneracy),
    }
}

/// Builds timepoint graphs from a read-only expression table.
#[derive(Debug, Clone)]
pub struct TimepointGraphBuilder<'a> {
    table: &'a ExpressionTable,
    genes: &'a GeneSet,
    tissues: HashSet<String>,
    unit: String,
    threshold: f64,
}

impl<'a> TimepointGraphBuilder<'a> {
    pub fn new(
        table: &'a ExpressionTable,
        genes: &'a GeneSet,
        tissues: &[String],
        unit: &str,
        threshold: f64,
    ) -> Self {
        Self {
            table,
            genes,
            tissues: tissues.iter().cloned().collect(),
            unit: unit.to_string(),
            threshold,
        }
    }

    /// Aggregated expression vector of gene `idx` in `bracket`.
    pub fn aggregated(&self, idx: usize, bracket: AgeBracket) -> Result<Vec<f64>, PairSkip> {
        let gene = &self.genes.genes()[idx];
        let rows = self
            .table
            .select(&gene.gene_id, &self.tissues, &self.unit, bracket);
        aggregate_samples(&gene.label, &rows)
    }

    pub fn evaluate_pair(&self, u: usize, v: usize, bracket: AgeBracket) -> PairOutcome {
        let u_values = match self.aggregated(u, bracket) {
            Ok(values) => values,
            Err(skip) => return PairOutcome::Skipped(skip),
        };
        let v_values = match self.aggregated(v, bracket) {
            Ok(values) => values,
            Err(skip) => return PairOutcome::Skipped(skip),
        };
        decide(&u_values, &v_values, self.threshold)
    }

    /// Graph for one bracket. Every pair is decided independently, so the
    /// edge set does not depend on `parallel_pairs`.
    pub fn build(&self, bracket: AgeBracket, parallel_pairs: bool) -> TimepointGraph {
        let mut graph = TimepointGraph::new(bracket, &self.genes.labels());

        let aggregated: Vec<Result<Vec<f64>, PairSkip>> = (0..self.genes.len())
            .map(|i| self.aggregated(i, bracket))
            .collect();
        let evaluate = |&(u, v): &(usize, usize)| -> PairOutcome {
            match (&aggregated[u], &aggregated[v]) {
                (Ok(a), Ok(b)) => decide(a, b, self.threshold),
                (Err(skip), _) | (_, Err(skip)) => PairOutcome::Skipped(skip.clone()),
            }
        };

        let pairs = self.genes.pairs();
        let outcomes: Vec<PairOutcome> = if parallel_pairs {
            pairs.par_iter().map(evaluate).collect()
        } else {
            pairs.iter().map(evaluate).collect()
        };

        for (&(u, v), outcome) in pairs.iter().zip(&outcomes) {
            if let Some(pvalue) = outcome.edge_weight() {
                graph.add_edge(u, v, pvalue);
            } else if let PairOutcome::Skipped(reason) = outcome {
                debug!(
                    bracket = %bracket,
                    u = graph.label(u),
                    v = graph.label(v),
                    %reason,
                    "pair skipped"
                );
            }
        }
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::tests::row;
    use crate::metadata::{IdScheme, PassthroughResolver};

    fn gene_set(names: &[&str]) -> GeneSet {
        let ids: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        GeneSet::resolve(&ids, IdScheme::GeneCode, &PassthroughResolver).unwrap()
    }

    fn tissues() -> Vec<String> {
        vec!["Brain_Cortex".to_string()]
    }

    #[test]
    fn test_correlated_pair_gets_edge_and_sparse_gene_stays_isolated() {
        let table = ExpressionTable::new(vec![
            row("A", "Brain_Cortex", "20-29", &[1.0, 3.0, 2.0, 5.0, 4.0]),
            row("B", "Brain_Cortex", "20-29", &[1.0, 3.0, 2.0, 5.0, 4.0]),
            row("C", "Brain_Cortex", "20-29", &[7.0]),
        ]);
        let genes = gene_set(&["A", "B", "C"]);
        let builder = TimepointGraphBuilder::new(&table, &genes, &tissues(), "TPM", 0.05);
        let g = builder.build(AgeBracket::Twenties, false);
        assert_eq!(g.labels(), vec!["A", "B", "C"]);
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.edge_weight(0, 1), Some(0.0));
        assert_eq!(g.degree(2), 0);
        assert!(matches!(
            builder.evaluate_pair(0, 2, AgeBracket::Twenties),
            PairOutcome::Skipped(PairSkip::InsufficientSampleSize { len: 1, .. })
        ));
    }

    #[test]
    fn test_only_significant_outcomes_carry_edge_weight() {
        assert_eq!(PairOutcome::Edge { pvalue: 0.01 }.edge_weight(), Some(0.01));
        assert_eq!(PairOutcome::NotSignificant { pvalue: 0.2 }.edge_weight(), None);
        assert_eq!(
            PairOutcome::Skipped(PairSkip::NumericalDegeneracy).edge_weight(),
            None
        );
    }

    #[test]
    fn test_missing_bracket_yields_empty_graph_with_all_nodes() {
        let table = ExpressionTable::new(vec![
            row("A", "Brain_Cortex", "20-29", &[1.0, 2.0, 3.0]),
            row("B", "Brain_Cortex", "20-29", &[1.0, 2.0, 3.0]),
        ]);
        let genes = gene_set(&["A", "B"]);
        let builder = TimepointGraphBuilder::new(&table, &genes, &tissues(), "TPM", 0.05);
        let g = builder.build(AgeBracket::Sixties, true);
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 0);
        assert!(matches!(
            builder.evaluate_pair(0, 1, AgeBracket::Sixties),
            PairOutcome::Skipped(PairSkip::MissingData { .. })
        ));
    }

    #[test]
    fn test_threshold_boundary_is_strict() {
        // r = 0.8 over five samples gives p = 0.10409
        let table = ExpressionTable::new(vec![
            row("A", "Brain_Cortex", "20-29", &[1.0, 2.0, 3.0, 4.0, 5.0]),
            row("B", "Brain_Cortex", "20-29", &[2.0, 1.0, 4.0, 3.0, 5.0]),
        ]);
        let genes = gene_set(&["A", "B"]);
        let p = TimepointGraphBuilder::new(&table, &genes, &tissues(), "TPM", 1.0)
            .evaluate_pair(0, 1, AgeBracket::Twenties);
        let p = match p {
            PairOutcome::Edge { pvalue } => pvalue,
            other => panic!("unexpected outcome {other:?}"),
        };
        assert_eq!(p, 0.10409);

        let at = TimepointGraphBuilder::new(&table, &genes, &tissues(), "TPM", p);
        assert_eq!(at.build(AgeBracket::Twenties, false).edge_count(), 0);
        assert_eq!(
            at.evaluate_pair(0, 1, AgeBracket::Twenties),
            PairOutcome::NotSignificant { pvalue: p }
        );

        let above = TimepointGraphBuilder::new(&table, &genes, &tissues(), "TPM", p + 0.00001);
        assert_eq!(above.build(AgeBracket::Twenties, false).edge_count(), 1);
    }

    #[test]
    fn test_multi_tissue_rows_are_reduced_to_medians() {
        let tissues = vec!["T1".to_string(), "T2".to_string(), "T3".to_string()];
        let table = ExpressionTable::new(vec![
            row("A", "T1", "30-39", &[1.0, 1.0, 1.0]),
            row("A", "T2", "30-39", &[2.0, 2.0, 2.0]),
            row("A", "T3", "30-39", &[3.0, 3.0, 3.0]),
            row("B", "T1", "30-39", &[10.0, 10.0]),
            row("B", "T2", "30-39", &[20.0, 20.0, 20.0, 20.0]),
            row("B", "T3", "30-39", &[30.0]),
        ]);
        let genes = gene_set(&["A", "B"]);
        let builder = TimepointGraphBuilder::new(&table, &genes, &tissues, "TPM", 0.05);
        assert_eq!(
            builder.aggregated(1, AgeBracket::Thirties).unwrap(),
            vec![10.0, 20.0, 30.0]
        );
        assert_eq!(
            builder.evaluate_pair(0, 1, AgeBracket::Thirties),
            PairOutcome::Edge { pvalue: 0.0 }
        );
    }

    #[test]
    fn test_zero_variance_and_length_mismatch_are_skipped() {
        let table = ExpressionTable::new(vec![
            row("A", "Brain_Cortex", "20-29", &[2.0, 2.0, 2.0, 2.0]),
            row("B", "Brain_Cortex", "20-29", &[1.0, 2.0, 3.0, 4.0]),
            row("C", "Brain_Cortex", "20-29", &[1.0, 2.0, 3.0]),
        ]);
        let genes = gene_set(&["A", "B", "C"]);
        let builder = TimepointGraphBuilder::new(&table, &genes, &tissues(), "TPM", 0.05);
        assert_eq!(
            builder.evaluate_pair(0, 1, AgeBracket::Twenties),
            PairOutcome::Skipped(PairSkip::NumericalDegeneracy)
        );
        assert_eq!(
            builder.evaluate_pair(1, 2, AgeBracket::Twenties),
            PairOutcome::Skipped(PairSkip::LengthMismatch { left: 4, right: 3 })
        );
        assert_eq!(builder.build(AgeBracket::Twenties, true).edge_count(), 0);
    }

    #[test]
    fn test_parallel_pairs_match_sequential() {
        let mut rows = vec![];
        for g in 0..12 {
            let values: Vec<f64> = (0..8)
                .map(|s| {
                    let trend = if g % 3 == 0 { s as f64 } else { 0.0 };
                    ((g * 7 + s * s * 3) % 11) as f64 + trend
                })
                .collect();
            rows.push(row(&format!("G{g}"), "Brain_Cortex", "50-59", &values));
        }
        let table = ExpressionTable::new(rows);
        let names: Vec<String> = (0..12).map(|g| format!("G{g}")).collect();
        let genes = GeneSet::resolve(&names, IdScheme::GeneCode, &PassthroughResolver).unwrap();
        let builder = TimepointGraphBuilder::new(&table, &genes, &tissues(), "TPM", 0.2);
        let sequential = builder.build(AgeBracket::Fifties, false);
        let parallel = builder.build(AgeBracket::Fifties, true);
        assert_eq!(sequential, parallel);
        assert_eq!(sequential, builder.build(AgeBracket::Fifties, false));
    }
}

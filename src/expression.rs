//! Immutable, indexed view over the expression rows fetched for one run.

use crate::error::{Result, TgeconetError};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use tgeconet_protocol::{AgeBracket, ExpressionRecord};

#[derive(Debug, Deserialize)]
struct GeneExpressionResponse {
    data: Option<Vec<ExpressionRecord>>,
}

#[derive(Debug, Clone, Default)]
pub struct ExpressionTable {
    records: Vec<ExpressionRecord>,
    by_gene_bracket: HashMap<(String, AgeBracket), Vec<usize>>,
}

impl ExpressionTable {
    pub fn new(records: Vec<ExpressionRecord>) -> Self {
        let mut by_gene_bracket: HashMap<(String, AgeBracket), Vec<usize>> = HashMap::new();
        for (idx, row) in records.iter().enumerate() {
            let Some(bracket) = row.age_bracket.as_deref().and_then(AgeBracket::parse) else {
                continue;
            };
            by_gene_bracket
                .entry((row.gene_id.clone(), bracket))
                .or_default()
                .push(idx);
        }
        Self {
            records,
            by_gene_bracket,
        }
    }

    /// Parses a GTEx `geneExpression` response body.
    pub fn from_gtex_json(text: &str) -> Result<Self> {
        let response: GeneExpressionResponse = serde_json::from_str(text).map_err(|e| {
            TgeconetError::DataRetrieval(format!("Malformed expression response: {e}"))
        })?;
        let records = response.data.ok_or_else(|| {
            TgeconetError::DataRetrieval("Expression response has no 'data' field".to_string())
        })?;
        Ok(Self::new(records))
    }

    pub fn from_gtex_json_file(path: &str) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            TgeconetError::DataRetrieval(format!("Could not read expression file '{path}': {e}"))
        })?;
        Self::from_gtex_json(&text)
    }

    pub fn records(&self) -> &[ExpressionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows for `gene_id` in `bracket` whose tissue is in `tissues` and whose
    /// unit matches, in table order. An empty tissue set keeps every tissue,
    /// as in `restricted_to`.
    pub fn select(
        &self,
        gene_id: &str,
        tissues: &HashSet<String>,
        unit: &str,
        bracket: AgeBracket,
    ) -> Vec<&ExpressionRecord> {
        let Some(indices) = self.by_gene_bracket.get(&(gene_id.to_string(), bracket)) else {
            return vec![];
        };
        indices
            .iter()
            .map(|&i| &self.records[i])
            .filter(|row| row.unit == unit)
            .filter(|row| tissues.is_empty() || tissues.contains(&row.tissue_id))
            .collect()
    }

    /// Subset of rows for the given genes and tissues. An empty tissue list
    /// keeps every tissue.
    pub fn restricted_to(&self, gene_ids: &[String], tissues: &[String]) -> Self {
        let genes: HashSet<&str> = gene_ids.iter().map(String::as_str).collect();
        let tissues: HashSet<&str> = tissues.iter().map(String::as_str).collect();
        let records = self
            .records
            .iter()
            .filter(|row| genes.contains(row.gene_id.as_str()))
            .filter(|row| tissues.is_empty() || tissues.contains(row.tissue_id.as_str()))
            .cloned()
            .collect();
        Self::new(records)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn row(gene: &str, tissue: &str, bracket: &str, values: &[f64]) -> ExpressionRecord {
        ExpressionRecord {
            gene_id: gene.to_string(),
            gene_symbol: None,
            tissue_id: tissue.to_string(),
            unit: "TPM".to_string(),
            age_bracket: Some(bracket.to_string()),
            sample_values: values.to_vec().into(),
        }
    }

    fn tissues(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_select_filters_by_gene_bracket_tissue_and_unit() {
        let mut other_unit = row("G1", "Brain_Cortex", "20-29", &[1.0]);
        other_unit.unit = "RPKM".to_string();
        let table = ExpressionTable::new(vec![
            row("G1", "Brain_Cortex", "20-29", &[1.0, 2.0, 3.0]),
            row("G1", "Liver", "20-29", &[4.0]),
            row("G1", "Brain_Cortex", "30-39", &[5.0]),
            row("G2", "Brain_Cortex", "20-29", &[6.0]),
            other_unit,
            row("G1", "Brain_Amygdala", "20-29", &[7.0]),
        ]);
        let rows = table.select(
            "G1",
            &tissues(&["Brain_Cortex", "Brain_Amygdala"]),
            "TPM",
            AgeBracket::Twenties,
        );
        let firsts: Vec<f64> = rows.iter().map(|r| r.sample_values.to_vec()[0]).collect();
        assert_eq!(firsts, vec![1.0, 7.0]);
        assert!(
            table
                .select("G3", &tissues(&["Brain_Cortex"]), "TPM", AgeBracket::Twenties)
                .is_empty()
        );
    }

    #[test]
    fn test_empty_tissue_set_selects_every_tissue() {
        let table = ExpressionTable::new(vec![
            row("G1", "Liver", "20-29", &[1.0]),
            row("G1", "Lung", "20-29", &[2.0]),
            row("G2", "Lung", "20-29", &[3.0]),
        ]);
        let rows = table.select("G1", &HashSet::new(), "TPM", AgeBracket::Twenties);
        assert_eq!(rows.len(), 2);
        assert_eq!(
            table.restricted_to(&["G1".to_string()], &[]).len(),
            rows.len()
        );
    }

    #[test]
    fn test_rows_without_age_bracket_are_never_selected() {
        let mut unbracketed = row("G1", "Brain_Cortex", "20-29", &[1.0]);
        unbracketed.age_bracket = None;
        let table = ExpressionTable::new(vec![unbracketed]);
        assert_eq!(table.len(), 1);
        assert!(
            table
                .select("G1", &tissues(&["Brain_Cortex"]), "TPM", AgeBracket::Twenties)
                .is_empty()
        );
    }

    #[test]
    fn test_from_gtex_json() {
        let text = r#"{"data": [
            {"data": [1, 2, 3], "gencodeId": "ENSG1", "tissueSiteDetailId": "Liver",
             "unit": "TPM", "subsetGroup": "40-49", "datasetId": "gtex_v10"}
        ], "paging_info": {"numberOfPages": 1}}"#;
        let table = ExpressionTable::from_gtex_json(text).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(
            table
                .select("ENSG1", &tissues(&["Liver"]), "TPM", AgeBracket::Forties)
                .len(),
            1
        );
    }

    #[test]
    fn test_malformed_response_is_data_retrieval_error() {
        let err = ExpressionTable::from_gtex_json(r#"{"message": "oops"}"#).unwrap_err();
        assert!(matches!(err, TgeconetError::DataRetrieval(_)));
        let err = ExpressionTable::from_gtex_json("not json").unwrap_err();
        assert!(matches!(err, TgeconetError::DataRetrieval(_)));
    }

    #[test]
    fn test_restricted_to() {
        let table = ExpressionTable::new(vec![
            row("G1", "Liver", "20-29", &[1.0]),
            row("G2", "Liver", "20-29", &[1.0]),
            row("G1", "Lung", "20-29", &[1.0]),
        ]);
        let sub = table.restricted_to(&["G1".to_string()], &["Liver".to_string()]);
        assert_eq!(sub.len(), 1);
        let all_tissues = table.restricted_to(&["G1".to_string()], &[]);
        assert_eq!(all_tissues.len(), 2);
    }
}

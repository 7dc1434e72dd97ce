//! Expression data sources.

use crate::error::{Result, TgeconetError};
use crate::expression::ExpressionTable;
use reqwest::blocking::Client;
use tracing::info;

pub const GTEX_GENE_EXPRESSION_URL: &str = "https://gtexportal.org/api/v2/expression/geneExpression";

pub trait ExpressionFetcher {
    fn fetch(&self, gene_ids: &[String], tissues: &[String], limit: usize)
    -> Result<ExpressionTable>;
}

/// Client for the GTEx portal `geneExpression` endpoint, age-bracket subset.
#[derive(Debug, Clone)]
pub struct GtexClient {
    url: String,
    dataset_id: String,
    client: Client,
}

impl GtexClient {
    pub fn new(dataset_id: &str) -> Result<Self> {
        let client = Client::builder().build().map_err(|e| {
            TgeconetError::DataRetrieval(format!("Could not create HTTP client: {e}"))
        })?;
        Ok(Self {
            url: GTEX_GENE_EXPRESSION_URL.to_string(),
            dataset_id: dataset_id.to_string(),
            client,
        })
    }

    fn query(
        &self,
        gene_ids: &[String],
        tissues: &[String],
        limit: usize,
    ) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("itemsPerPage", limit.to_string()),
            ("datasetId", self.dataset_id.clone()),
        ];
        params.extend(gene_ids.iter().map(|id| ("gencodeId", id.clone())));
        params.extend(tissues.iter().map(|t| ("tissueSiteDetailId", t.clone())));
        params.push(("attributeSubset", "ageBracket".to_string()));
        params.push(("format", "json".to_string()));
        params
    }
}

impl ExpressionFetcher for GtexClient {
    fn fetch(
        &self,
        gene_ids: &[String],
        tissues: &[String],
        limit: usize,
    ) -> Result<ExpressionTable> {
        info!(
            genes = gene_ids.len(),
            tissues = tissues.len(),
            dataset = %self.dataset_id,
            "retrieving gene expression data"
        );
        let response = self
            .client
            .get(&self.url)
            .query(&self.query(gene_ids, tissues, limit))
            .send()
            .map_err(|e| {
                TgeconetError::DataRetrieval(format!("Could not fetch '{}': {e}", self.url))
            })?;
        if !response.status().is_success() {
            return Err(TgeconetError::DataRetrieval(format!(
                "Could not fetch '{}': HTTP {}",
                self.url,
                response.status()
            )));
        }
        let text = response.text().map_err(|e| {
            TgeconetError::DataRetrieval(format!(
                "Could not read response from '{}': {e}",
                self.url
            ))
        })?;
        ExpressionTable::from_gtex_json(&text)
    }
}

/// Previously saved `geneExpression` response.
#[derive(Debug, Clone)]
pub struct JsonFileFetcher {
    path: String,
}

impl JsonFileFetcher {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
        }
    }
}

impl ExpressionFetcher for JsonFileFetcher {
    fn fetch(
        &self,
        gene_ids: &[String],
        tissues: &[String],
        _limit: usize,
    ) -> Result<ExpressionTable> {
        let table = ExpressionTable::from_gtex_json_file(&self.path)?;
        Ok(table.restricted_to(gene_ids, tissues))
    }
}

impl ExpressionFetcher for ExpressionTable {
    fn fetch(
        &self,
        gene_ids: &[String],
        tissues: &[String],
        _limit: usize,
    ) -> Result<ExpressionTable> {
        Ok(self.restricted_to(gene_ids, tissues))
    }
}

//! Mapping from caller-facing gene identifiers to GENCODE ids used by the
//! expression source.

use crate::error::{Result, TgeconetError};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io::Read;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum IdScheme {
    #[default]
    GeneSymbol,
    GeneCode,
}

impl IdScheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GeneSymbol => "gene_symbol",
            Self::GeneCode => "gene_code",
        }
    }
}

impl FromStr for IdScheme {
    type Err = TgeconetError;

    fn from_str(text: &str) -> Result<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "gene_symbol" => Ok(Self::GeneSymbol),
            "gene_code" => Ok(Self::GeneCode),
            other => Err(TgeconetError::Configuration(format!(
                "Unsupported identifier scheme '{other}', expected 'gene_symbol' or 'gene_code'"
            ))),
        }
    }
}

impl TryFrom<String> for IdScheme {
    type Error = TgeconetError;

    fn try_from(text: String) -> Result<Self> {
        text.parse()
    }
}

impl From<IdScheme> for String {
    fn from(scheme: IdScheme) -> Self {
        scheme.as_str().to_string()
    }
}

impl fmt::Display for IdScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait MetadataResolver {
    /// Canonical id for every identifier that could be resolved. Identifiers
    /// missing from the returned map are unresolvable.
    fn resolve(&self, ids: &[String], scheme: IdScheme) -> Result<HashMap<String, String>>;
}

/// Maps every identifier onto itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughResolver;

impl MetadataResolver for PassthroughResolver {
    fn resolve(&self, ids: &[String], _scheme: IdScheme) -> Result<HashMap<String, String>> {
        Ok(ids.iter().map(|id| (id.clone(), id.clone())).collect())
    }
}

#[derive(Debug, Deserialize)]
struct MetadataRow {
    gene_symbol: String,
    ensembl_id: String,
}

/// Gene symbol / Ensembl id table, usually read from `metadata.csv`.
#[derive(Debug, Clone, Default)]
pub struct GeneMetadata {
    symbol_to_id: HashMap<String, String>,
    known_ids: HashSet<String>,
}

impl GeneMetadata {
    pub fn from_pairs<I, S, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        let mut ret = Self::default();
        for (symbol, id) in pairs {
            ret.insert(symbol.into(), id.into());
        }
        ret
    }

    /// Reads a space separated table with a `gene_symbol ensembl_id` header.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b' ')
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);
        let mut ret = Self::default();
        for row in rdr.deserialize() {
            let row: MetadataRow = row?;
            ret.insert(row.gene_symbol, row.ensembl_id);
        }
        Ok(ret)
    }

    pub fn from_csv_file(path: &str) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| {
            TgeconetError::Configuration(format!("Could not read metadata file '{path}': {e}"))
        })?;
        Self::from_reader(file)
    }

    fn insert(&mut self, symbol: String, id: String) {
        if symbol.is_empty() || id.is_empty() {
            return;
        }
        self.known_ids.insert(id.clone());
        self.symbol_to_id.entry(symbol).or_insert(id);
    }

    pub fn len(&self) -> usize {
        self.symbol_to_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbol_to_id.is_empty()
    }
}

impl MetadataResolver for GeneMetadata {
    fn resolve(&self, ids: &[String], scheme: IdScheme) -> Result<HashMap<String, String>> {
        let resolved = match scheme {
            IdScheme::GeneSymbol => ids
                .iter()
                .filter_map(|id| self.symbol_to_id.get(id).map(|c| (id.clone(), c.clone())))
                .collect(),
            IdScheme::GeneCode if self.known_ids.is_empty() => {
                PassthroughResolver.resolve(ids, scheme)?
            }
            IdScheme::GeneCode => ids
                .iter()
                .filter(|id| self.known_ids.contains(*id))
                .map(|id| (id.clone(), id.clone()))
                .collect(),
        };
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const METADATA: &str = "\
gene_symbol ensembl_id
PSMD14 ENSG00000115233.12
PEBP1 ENSG00000089220.5
ITPKB ENSG00000143772.11
";

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_id_scheme_parsing() {
        assert_eq!("gene_code".parse::<IdScheme>().unwrap(), IdScheme::GeneCode);
        assert_eq!(" Gene_Symbol ".parse::<IdScheme>().unwrap(), IdScheme::GeneSymbol);
        let err = "uniprot".parse::<IdScheme>().unwrap_err();
        assert!(matches!(err, TgeconetError::Configuration(_)));
    }

    #[test]
    fn test_symbols_resolve_through_metadata_file() {
        let metadata = GeneMetadata::from_reader(METADATA.as_bytes()).unwrap();
        assert_eq!(metadata.len(), 3);
        let map = metadata
            .resolve(&ids(&["PEBP1", "NOPE", "PSMD14"]), IdScheme::GeneSymbol)
            .unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["PEBP1"], "ENSG00000089220.5");
        assert!(!map.contains_key("NOPE"));
    }

    #[test]
    fn test_gene_codes_must_be_known() {
        let metadata = GeneMetadata::from_reader(METADATA.as_bytes()).unwrap();
        let map = metadata
            .resolve(
                &ids(&["ENSG00000143772.11", "ENSG00000000000.1"]),
                IdScheme::GeneCode,
            )
            .unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map["ENSG00000143772.11"], "ENSG00000143772.11");
    }

    #[test]
    fn test_gene_codes_pass_through_without_metadata() {
        let map = GeneMetadata::default()
            .resolve(&ids(&["ENSG1", "ENSG2"]), IdScheme::GeneCode)
            .unwrap();
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_first_symbol_mapping_wins() {
        let metadata = GeneMetadata::from_pairs([("A", "ENSG1"), ("A", "ENSG2")]);
        let map = metadata.resolve(&ids(&["A"]), IdScheme::GeneSymbol).unwrap();
        assert_eq!(map["A"], "ENSG1");
    }
}

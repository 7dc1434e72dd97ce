use crate::error::PairSkip;
use tgeconet_protocol::ExpressionRecord;

/// Minimum number of aggregated values a gene needs to enter a correlation test.
pub const MIN_SAMPLE_SIZE: usize = 3;

pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Reduces the rows selected for one gene to a single expression vector.
///
/// A single row is used as is. Several rows (one per matched tissue) are
/// reduced to their medians, with empty rows counting as 0.
pub fn aggregate_samples(gene: &str, rows: &[&ExpressionRecord]) -> Result<Vec<f64>, PairSkip> {
    let values = match rows {
        [] => {
            return Err(PairSkip::MissingData {
                gene: gene.to_string(),
            });
        }
        [single] => single.sample_values.to_vec(),
        _ => rows
            .iter()
            .map(|row| median(&row.sample_values.to_vec()).unwrap_or(0.0))
            .collect(),
    };
    if values.len() < MIN_SAMPLE_SIZE {
        return Err(PairSkip::InsufficientSampleSize {
            gene: gene.to_string(),
            len: values.len(),
        });
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::tests::row;

    #[test]
    fn test_median() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }

    #[test]
    fn test_single_row_is_used_verbatim() {
        let r = row("G", "Liver", "20-29", &[5.0, 1.0, 3.0, 2.0]);
        assert_eq!(aggregate_samples("G", &[&r]).unwrap(), vec![5.0, 1.0, 3.0, 2.0]);
    }

    #[test]
    fn test_multiple_rows_reduce_to_medians() {
        let a = row("G", "T1", "20-29", &[1.0, 2.0, 9.0]);
        let b = row("G", "T2", "20-29", &[]);
        let c = row("G", "T3", "20-29", &[4.0, 6.0]);
        assert_eq!(aggregate_samples("G", &[&a, &b, &c]).unwrap(), vec![2.0, 0.0, 5.0]);
    }

    #[test]
    fn test_no_rows_is_missing_data() {
        assert_eq!(
            aggregate_samples("G", &[]).unwrap_err(),
            PairSkip::MissingData {
                gene: "G".to_string()
            }
        );
    }

    #[test]
    fn test_short_vectors_are_insufficient() {
        let a = row("G", "T1", "20-29", &[1.0, 2.0]);
        assert_eq!(
            aggregate_samples("G", &[&a]).unwrap_err(),
            PairSkip::InsufficientSampleSize {
                gene: "G".to_string(),
                len: 2
            }
        );
        let b = row("G", "T2", "20-29", &[1.0, 2.0, 3.0]);
        assert!(matches!(
            aggregate_samples("G", &[&a, &b]),
            Err(PairSkip::InsufficientSampleSize { len: 2, .. })
        ));
    }
}

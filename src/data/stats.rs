use std::collections::BTreeMap;

use statrs::statistics::Statistics;

use super::DataError;
use super::model::VideoDataset;

// ---------------------------------------------------------------------------
// Group-wise means
// ---------------------------------------------------------------------------

/// Mean of `value_column` per distinct value of `group_by`, sorted ascending
/// by mean (ties by group name). Only groups that occur in the table appear.
pub fn group_mean(
    dataset: &VideoDataset,
    group_by: &str,
    value_column: &str,
) -> Result<Vec<(String, f64)>, DataError> {
    let groups = dataset.column(group_by)?;
    let values = dataset.numeric_column(value_column)?;

    let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for (group, value) in groups.iter().zip(values) {
        let entry = sums.entry(group.to_string()).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }

    let mut means: Vec<(String, f64)> = sums
        .into_iter()
        .map(|(group, (sum, n))| (group, sum / n as f64))
        .collect();
    means.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    Ok(means)
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Pairwise Pearson correlation between numeric columns.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major, `columns.len()` × `columns.len()`. NaN where a column has
    /// zero variance.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row][col]
    }
}

pub fn correlation_matrix(
    dataset: &VideoDataset,
    columns: &[String],
) -> Result<CorrelationMatrix, DataError> {
    let data: Vec<Vec<f64>> = columns
        .iter()
        .map(|c| dataset.numeric_column(c))
        .collect::<Result<_, _>>()?;

    let n = columns.len();
    let mut values = vec![vec![f64::NAN; n]; n];
    for i in 0..n {
        for j in i..n {
            let r = if i == j {
                if data[i].as_slice().variance() > 0.0 { 1.0 } else { f64::NAN }
            } else {
                pearson(&data[i], &data[j])
            };
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Ok(CorrelationMatrix {
        columns: columns.to_vec(),
        values,
    })
}

fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let (mx, my) = (xs.mean(), ys.mean());
    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let (dx, dy) = (x - mx, y - my);
        cov += dx * dy;
        vx += dx * dx;
        vy += dy * dy;
    }
    if vx > 0.0 && vy > 0.0 {
        (cov / (vx.sqrt() * vy.sqrt())).clamp(-1.0, 1.0)
    } else {
        f64::NAN
    }
}

// ---------------------------------------------------------------------------
// Descriptive summary
// ---------------------------------------------------------------------------

/// `DataFrame.describe()`-style summary of one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1); NaN for a single row.
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

pub fn describe(dataset: &VideoDataset, column: &str) -> Result<NumericSummary, DataError> {
    let xs = dataset.numeric_column(column)?;
    Ok(NumericSummary {
        column: column.to_string(),
        count: xs.len(),
        mean: xs.as_slice().mean(),
        std: xs.as_slice().std_dev(),
        min: xs.iter().copied().fold(f64::INFINITY, f64::min),
        max: xs.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::data::model::tests::{dataset, record};

    #[test]
    fn group_mean_sorts_ascending() {
        let ds = dataset(vec![
            record("Gaming", 5.0),
            record("Music", 30.0),
            record("News", 20.0),
            record("Gaming", 15.0),
        ]);
        let means = group_mean(&ds, "category", "ad_revenue_usd").unwrap();
        assert_eq!(
            means,
            vec![
                ("Gaming".to_string(), 10.0),
                ("News".to_string(), 20.0),
                ("Music".to_string(), 30.0),
            ]
        );
    }

    #[test]
    fn group_mean_covers_exactly_the_observed_groups() {
        let ds = dataset(vec![
            record("B", 1.0),
            record("A", 1.0),
            record("C", 7.0),
            record("B", 3.0),
        ]);
        let means = group_mean(&ds, "category", "ad_revenue_usd").unwrap();
        let mut groups: Vec<String> = means.iter().map(|(g, _)| g.clone()).collect();
        groups.sort();
        let mut expected = ds.category_options("category").unwrap();
        expected.sort();
        assert_eq!(groups, expected);
        assert!(means.windows(2).all(|w| w[0].1 <= w[1].1));
    }

    #[test]
    fn group_mean_rejects_text_values() {
        let ds = dataset(vec![record("A", 1.0)]);
        assert!(matches!(
            group_mean(&ds, "category", "device"),
            Err(DataError::NotNumeric(_))
        ));
        assert!(matches!(
            group_mean(&ds, "genre", "ad_revenue_usd"),
            Err(DataError::UnknownColumn(_))
        ));
    }

    #[test]
    fn correlation_is_symmetric_with_unit_diagonal() {
        let mut rows = Vec::new();
        for (i, rev) in [1.0, 4.0, 2.0, 8.0].iter().enumerate() {
            let mut r = record("A", *rev);
            r.views = (i as u64 + 1) * 100;
            r.likes = [3, 1, 4, 1][i];
            rows.push(r);
        }
        let ds = dataset(rows);
        let cols: Vec<String> = ["views", "likes", "ad_revenue_usd"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let m = correlation_matrix(&ds, &cols).unwrap();

        for i in 0..cols.len() {
            assert_eq!(m.get(i, i), 1.0);
            for j in 0..cols.len() {
                assert_eq!(m.get(i, j).to_bits(), m.get(j, i).to_bits());
                assert!(m.get(i, j).abs() <= 1.0);
            }
        }
    }

    #[test]
    fn perfectly_linear_columns_correlate_to_one() {
        let rows = (1..=5)
            .map(|i| {
                let mut r = record("A", i as f64 * 2.5);
                r.views = i * 10;
                r
            })
            .collect();
        let ds = dataset(rows);
        let cols = vec!["views".to_string(), "ad_revenue_usd".to_string()];
        let m = correlation_matrix(&ds, &cols).unwrap();
        assert_relative_eq!(m.get(0, 1), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn zero_variance_column_yields_nan() {
        let ds = dataset(vec![record("A", 1.0), record("B", 2.0)]);
        // every fixture row has the same `views`
        let cols = vec!["views".to_string(), "ad_revenue_usd".to_string()];
        let m = correlation_matrix(&ds, &cols).unwrap();
        assert!(m.get(0, 0).is_nan());
        assert!(m.get(0, 1).is_nan());
        assert!(m.get(1, 0).is_nan());
        assert_eq!(m.get(1, 1), 1.0);
    }

    #[test]
    fn describe_matches_hand_computed_values() {
        let ds = dataset(vec![record("A", 2.0), record("A", 4.0), record("A", 9.0)]);
        let s = describe(&ds, "ad_revenue_usd").unwrap();
        assert_eq!(s.count, 3);
        assert_relative_eq!(s.mean, 5.0);
        assert_relative_eq!(s.std, 13.0_f64.sqrt(), epsilon = 1e-12);
        assert_eq!(s.min, 2.0);
        assert_eq!(s.max, 9.0);
    }
}

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use super::DataError;

/// Label column the pipeline predicts.
pub const TARGET_COLUMN: &str = "ad_revenue_usd";

/// Columns every dataset must carry, in the order the pipeline consumes them
/// (label last).
pub const REQUIRED_COLUMNS: [&str; 10] = [
    "views",
    "likes",
    "comments",
    "watch_time_minutes",
    "video_length_minutes",
    "subscribers",
    "category",
    "device",
    "country",
    TARGET_COLUMN,
];

/// Label columns; their cells are kept as text, never parsed as numbers.
pub const CATEGORICAL_COLUMNS: [&str; 3] = ["category", "device", "country"];

// ---------------------------------------------------------------------------
// CellValue – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring the common Pandas dtypes.
/// Used as a set / map key downstream, so `CellValue` must be `Ord` and `Hash`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => discriminant(self).cmp(&discriminant(other)),
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v:.4}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Try to interpret the value as an `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, CellValue::Integer(_) | CellValue::Float(_))
    }

    /// Infer the type of a raw text cell: integer, then float, then bool,
    /// falling back to string. Empty text is `Null`.
    pub fn infer(s: &str) -> CellValue {
        let s = s.trim();
        if s.is_empty() {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
        if s == "true" || s == "false" {
            return CellValue::Bool(s == "true");
        }
        CellValue::String(s.to_string())
    }

    /// A raw text cell taken verbatim (trimmed). Empty text is `Null`.
    pub fn text(s: &str) -> CellValue {
        match s.trim() {
            "" => CellValue::Null,
            s => CellValue::String(s.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// VideoRecord – one row of the dataset
// ---------------------------------------------------------------------------

/// A single video (one row of the source table).
#[derive(Debug, Clone, PartialEq)]
pub struct VideoRecord {
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub watch_time_minutes: f64,
    pub video_length_minutes: f64,
    pub subscribers: u64,
    pub category: String,
    pub device: String,
    pub country: String,
    /// The label.
    pub ad_revenue_usd: f64,
    /// Any further columns of the file (`video_id`, `date`, ...).
    pub extra: BTreeMap<String, CellValue>,
}

impl VideoRecord {
    /// Build a record from a row of named cells, checking types and the
    /// non-negativity invariant of every numeric field.
    pub fn from_cells(mut cells: BTreeMap<String, CellValue>) -> Result<Self, String> {
        let mut take = |col: &str| {
            cells
                .remove(col)
                .ok_or_else(|| format!("missing column '{col}'"))
        };

        let views = count(take("views")?, "views")?;
        let likes = count(take("likes")?, "likes")?;
        let comments = count(take("comments")?, "comments")?;
        let watch_time_minutes = amount(take("watch_time_minutes")?, "watch_time_minutes")?;
        let video_length_minutes = amount(take("video_length_minutes")?, "video_length_minutes")?;
        let subscribers = count(take("subscribers")?, "subscribers")?;
        let category = label(take("category")?, "category")?;
        let device = label(take("device")?, "device")?;
        let country = label(take("country")?, "country")?;
        let ad_revenue_usd = amount(take(TARGET_COLUMN)?, TARGET_COLUMN)?;

        Ok(VideoRecord {
            views,
            likes,
            comments,
            watch_time_minutes,
            video_length_minutes,
            subscribers,
            category,
            device,
            country,
            ad_revenue_usd,
            extra: cells,
        })
    }

    /// Look up a cell by column name, schema columns included.
    pub fn value(&self, column: &str) -> Option<CellValue> {
        let v = match column {
            "views" => CellValue::Integer(self.views as i64),
            "likes" => CellValue::Integer(self.likes as i64),
            "comments" => CellValue::Integer(self.comments as i64),
            "watch_time_minutes" => CellValue::Float(self.watch_time_minutes),
            "video_length_minutes" => CellValue::Float(self.video_length_minutes),
            "subscribers" => CellValue::Integer(self.subscribers as i64),
            "category" => CellValue::String(self.category.clone()),
            "device" => CellValue::String(self.device.clone()),
            "country" => CellValue::String(self.country.clone()),
            TARGET_COLUMN => CellValue::Float(self.ad_revenue_usd),
            other => return self.extra.get(other).cloned(),
        };
        Some(v)
    }
}

fn count(v: CellValue, col: &str) -> Result<u64, String> {
    match v {
        CellValue::Integer(i) if i >= 0 => Ok(i as u64),
        // Pandas writes integer columns holding NaN as floats ("12.0").
        // Counts stay within i64 so every column reads back as `Integer`.
        CellValue::Float(f) if f >= 0.0 && f.fract() == 0.0 && f < i64::MAX as f64 => {
            Ok(f as u64)
        }
        CellValue::Integer(i) => Err(format!("'{col}' must be >= 0, got {i}")),
        CellValue::Float(f) if f >= i64::MAX as f64 => {
            Err(format!("'{col}' is out of range, got {f}"))
        }
        other => Err(format!("'{col}' must be a non-negative integer, got '{other}'")),
    }
}

fn amount(v: CellValue, col: &str) -> Result<f64, String> {
    match v.as_f64() {
        Some(f) if f.is_finite() && f >= 0.0 => Ok(f),
        Some(f) => Err(format!("'{col}' must be a finite value >= 0, got {f}")),
        None => Err(format!("'{col}' must be numeric, got '{v}'")),
    }
}

fn label(v: CellValue, col: &str) -> Result<String, String> {
    match v {
        CellValue::Null => Err(format!("'{col}' is empty")),
        CellValue::String(s) => Ok(s),
        // Non-text labels (JSON or Parquet numbers) use their shortest form.
        CellValue::Float(f) => Ok(f.to_string()),
        other => Ok(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// VideoDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed column indices.
#[derive(Debug, Clone)]
pub struct VideoDataset {
    /// All videos (rows).
    pub records: Vec<VideoRecord>,
    /// Column names in file order.
    pub column_names: Vec<String>,
    /// For each column the distinct values in first-appearance order.
    unique_values: BTreeMap<String, Vec<CellValue>>,
    /// Columns whose every cell is numeric, in file order.
    numeric_columns: Vec<String>,
}

impl VideoDataset {
    /// Build column indices from the loaded records. `column_names` is the
    /// header order of the source file.
    pub fn from_records(records: Vec<VideoRecord>, column_names: Vec<String>) -> Self {
        let mut unique_values = BTreeMap::new();
        let mut numeric_columns = Vec::new();

        for col in &column_names {
            let mut seen: HashSet<CellValue> = HashSet::new();
            let mut ordered = Vec::new();
            let mut all_numeric = !records.is_empty();

            for rec in &records {
                let val = rec.value(col).unwrap_or(CellValue::Null);
                all_numeric &= val.is_numeric();
                if seen.insert(val.clone()) {
                    ordered.push(val);
                }
            }

            if all_numeric {
                numeric_columns.push(col.clone());
            }
            unique_values.insert(col.clone(), ordered);
        }

        VideoDataset {
            records,
            column_names,
            unique_values,
            numeric_columns,
        }
    }

    /// Number of videos.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.unique_values.contains_key(column)
    }

    /// Distinct values of a column in first-appearance order.
    pub fn column_unique_values(&self, column: &str) -> Result<&[CellValue], DataError> {
        self.unique_values
            .get(column)
            .map(Vec::as_slice)
            .ok_or_else(|| DataError::UnknownColumn(column.to_string()))
    }

    /// Distinct values of a categorical column rendered as text, for selectors.
    pub fn category_options(&self, column: &str) -> Result<Vec<String>, DataError> {
        Ok(self
            .column_unique_values(column)?
            .iter()
            .map(ToString::to_string)
            .collect())
    }

    /// All values of a column, one per row.
    pub fn column(&self, column: &str) -> Result<Vec<CellValue>, DataError> {
        if !self.has_column(column) {
            return Err(DataError::UnknownColumn(column.to_string()));
        }
        Ok(self
            .records
            .iter()
            .map(|r| r.value(column).unwrap_or(CellValue::Null))
            .collect())
    }

    /// All values of a numeric column as `f64`.
    pub fn numeric_column(&self, column: &str) -> Result<Vec<f64>, DataError> {
        if !self.has_column(column) {
            return Err(DataError::UnknownColumn(column.to_string()));
        }
        if !self.numeric_columns.iter().any(|c| c == column) {
            return Err(DataError::NotNumeric(column.to_string()));
        }
        Ok(self
            .records
            .iter()
            .filter_map(|r| r.value(column).and_then(|v| v.as_f64()))
            .collect())
    }

    /// Columns whose every cell is numeric, in file order.
    pub fn numeric_columns(&self) -> &[String] {
        &self.numeric_columns
    }

    /// The first `n` rows rendered as text, in column order.
    pub fn head(&self, n: usize) -> Vec<Vec<String>> {
        self.records
            .iter()
            .take(n)
            .map(|r| {
                self.column_names
                    .iter()
                    .map(|c| match r.value(c) {
                        Some(CellValue::Float(f)) => format!("{f:.2}"),
                        Some(v) => v.to_string(),
                        None => String::new(),
                    })
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn record(category: &str, revenue: f64) -> VideoRecord {
        VideoRecord {
            views: 1000,
            likes: 50,
            comments: 5,
            watch_time_minutes: 120.0,
            video_length_minutes: 10.0,
            subscribers: 500,
            category: category.to_string(),
            device: "Mobile".to_string(),
            country: "US".to_string(),
            ad_revenue_usd: revenue,
            extra: BTreeMap::new(),
        }
    }

    pub(crate) fn dataset(records: Vec<VideoRecord>) -> VideoDataset {
        let columns = REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect();
        VideoDataset::from_records(records, columns)
    }

    fn cells(pairs: &[(&str, &str)]) -> BTreeMap<String, CellValue> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), CellValue::infer(v)))
            .collect()
    }

    fn full_row() -> Vec<(&'static str, &'static str)> {
        vec![
            ("video_id", "vid_001"),
            ("views", "1000"),
            ("likes", "50"),
            ("comments", "5"),
            ("watch_time_minutes", "120.5"),
            ("video_length_minutes", "10"),
            ("subscribers", "500"),
            ("category", "Gaming"),
            ("device", "Mobile"),
            ("country", "US"),
            ("ad_revenue_usd", "12.5"),
        ]
    }

    #[test]
    fn record_keeps_extra_columns() {
        let rec = VideoRecord::from_cells(cells(&full_row())).unwrap();
        assert_eq!(rec.views, 1000);
        assert_eq!(rec.watch_time_minutes, 120.5);
        assert_eq!(rec.video_length_minutes, 10.0);
        assert_eq!(rec.value("video_id"), Some(CellValue::String("vid_001".into())));
        assert!(!rec.extra.contains_key("views"));
    }

    #[test]
    fn negative_count_is_rejected() {
        let mut row = full_row();
        row[2] = ("likes", "-3");
        let err = VideoRecord::from_cells(cells(&row)).unwrap_err();
        assert!(err.contains("likes"), "{err}");
    }

    #[test]
    fn float_encoded_count_is_accepted() {
        let mut row = full_row();
        row[3] = ("comments", "7.0");
        let rec = VideoRecord::from_cells(cells(&row)).unwrap();
        assert_eq!(rec.comments, 7);
    }

    #[test]
    fn count_beyond_i64_is_rejected() {
        let mut row = full_row();
        row[1] = ("views", "1e19");
        let err = VideoRecord::from_cells(cells(&row)).unwrap_err();
        assert!(err.contains("views"), "{err}");

        row[1] = ("views", "1e18");
        let rec = VideoRecord::from_cells(cells(&row)).unwrap();
        assert_eq!(rec.value("views"), Some(CellValue::Integer(1_000_000_000_000_000_000)));
    }

    #[test]
    fn numeric_label_keeps_its_short_form() {
        let mut row = cells(&full_row());
        row.insert("category".into(), CellValue::Float(1.5));
        row.insert("country".into(), CellValue::Integer(44));
        let rec = VideoRecord::from_cells(row).unwrap();
        assert_eq!(rec.category, "1.5");
        assert_eq!(rec.country, "44");
    }

    #[test]
    fn empty_label_is_rejected() {
        let mut row = full_row();
        row[8] = ("device", "");
        assert!(VideoRecord::from_cells(cells(&row)).is_err());
    }

    #[test]
    fn unique_values_follow_first_appearance() {
        let ds = dataset(vec![
            record("Music", 1.0),
            record("Gaming", 2.0),
            record("Music", 3.0),
        ]);
        assert_eq!(ds.category_options("category").unwrap(), vec!["Music", "Gaming"]);
    }

    #[test]
    fn unknown_column_is_reported() {
        let ds = dataset(vec![record("Music", 1.0)]);
        let err = ds.column_unique_values("genre").unwrap_err();
        assert!(matches!(err, DataError::UnknownColumn(c) if c == "genre"));
    }

    #[test]
    fn numeric_columns_exclude_text() {
        let ds = dataset(vec![record("Music", 1.0)]);
        assert!(ds.numeric_columns().contains(&"views".to_string()));
        assert!(!ds.numeric_columns().contains(&"category".to_string()));
        assert!(matches!(
            ds.numeric_column("device"),
            Err(DataError::NotNumeric(_))
        ));
    }

    #[test]
    fn cell_ordering_groups_by_type() {
        let mut vals = vec![
            CellValue::String("a".into()),
            CellValue::Integer(3),
            CellValue::Null,
            CellValue::Integer(1),
        ];
        vals.sort();
        assert_eq!(
            vals,
            vec![
                CellValue::Null,
                CellValue::Integer(1),
                CellValue::Integer(3),
                CellValue::String("a".into()),
            ]
        );
    }
}

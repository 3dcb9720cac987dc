//! Writes a synthetic video dataset (`sample_videos.csv`, `sample_videos.parquet`)
//! and a linear pipeline artifact (`sample_model.json`) that reproduces the
//! revenue formula the data was drawn from.

use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

use revenue_lens::predictor::artifact::{
    FORMAT_VERSION, FeatureSpec, PipelineArtifact, RegressorSpec, UnknownCategory,
};

const ROWS: usize = 2_000;

const CATEGORIES: [(&str, f64); 6] = [
    ("Education", 6.0),
    ("Entertainment", 3.0),
    ("Gaming", 2.0),
    ("Lifestyle", 2.5),
    ("Music", 1.0),
    ("Tech", 7.0),
];
const DEVICES: [(&str, f64); 4] = [("Desktop", 2.0), ("Mobile", 0.0), ("TV", 3.0), ("Tablet", 1.0)];
const COUNTRIES: [(&str, f64); 6] = [
    ("AU", 3.0),
    ("CA", 3.5),
    ("DE", 3.0),
    ("IN", 0.5),
    ("UK", 4.0),
    ("US", 5.0),
];

/// Raw-unit slopes for the six numeric features, in schema order.
const SLOPES: [f64; 6] = [0.002, 0.01, 0.02, 0.0015, 0.05, 0.00001];
const INTERCEPT: f64 = 0.5;

/// Seeded xoshiro256** stream, so repeated runs write identical files.
struct Sampler {
    s: [u64; 4],
}

impl Sampler {
    /// Expand `seed` into the four state words with splitmix64.
    fn seeded(seed: u64) -> Self {
        let mut z = seed;
        let s = std::array::from_fn(|_| {
            z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
            let mut x = z;
            x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
            x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
            x ^ (x >> 31)
        });
        Sampler { s }
    }

    fn bits(&mut self) -> u64 {
        let [a, b, c, d] = self.s;
        let out = b.wrapping_mul(5).rotate_left(7).wrapping_mul(9);
        let c = c ^ a;
        let d = d ^ b;
        self.s = [a ^ d, b ^ c, c ^ (b << 17), d.rotate_left(45)];
        out
    }

    /// Uniform in `[0, 1)`.
    fn unit(&mut self) -> f64 {
        (self.bits() >> 11) as f64 * f64::EPSILON / 2.0
    }

    fn between(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.unit()
    }

    fn choose<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.bits() % items.len() as u64) as usize]
    }

    /// Zero-mean normal noise (Marsaglia polar method).
    fn noise(&mut self, std_dev: f64) -> f64 {
        loop {
            let u = self.between(-1.0, 1.0);
            let v = self.between(-1.0, 1.0);
            let r = u * u + v * v;
            if r > 0.0 && r < 1.0 {
                return std_dev * u * (-2.0 * r.ln() / r).sqrt();
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct Row {
    video_id: String,
    date: String,
    views: i64,
    likes: i64,
    comments: i64,
    watch_time_minutes: f64,
    video_length_minutes: f64,
    subscribers: i64,
    category: String,
    device: String,
    country: String,
    ad_revenue_usd: f64,
}

impl Row {
    fn numeric(&self) -> [f64; 6] {
        [
            self.views as f64,
            self.likes as f64,
            self.comments as f64,
            self.watch_time_minutes,
            self.video_length_minutes,
            self.subscribers as f64,
        ]
    }
}

fn generate(rng: &mut Sampler) -> Vec<Row> {
    (0..ROWS)
        .map(|i| {
            let views = rng.between(500.0, 20_000.0).round();
            let likes = (views * rng.between(0.01, 0.1)).round();
            let comments = (likes * rng.between(0.05, 0.2)).round();
            let video_length_minutes = (rng.between(2.0, 30.0) * 100.0).round() / 100.0;
            let watch_time_minutes =
                (views * video_length_minutes * rng.between(0.02, 0.06) * 100.0).round() / 100.0;
            let subscribers = rng.between(100.0, 500_000.0).round();

            let &(category, cat_effect) = rng.choose(&CATEGORIES);
            let &(device, dev_effect) = rng.choose(&DEVICES);
            let &(country, country_effect) = rng.choose(&COUNTRIES);

            let mut row = Row {
                video_id: format!("vid_{i:05}"),
                date: format!("2024-{:02}-{:02}", i % 12 + 1, i % 28 + 1),
                views: views as i64,
                likes: likes as i64,
                comments: comments as i64,
                watch_time_minutes,
                video_length_minutes,
                subscribers: subscribers as i64,
                category: category.to_string(),
                device: device.to_string(),
                country: country.to_string(),
                ad_revenue_usd: 0.0,
            };

            let linear: f64 = row
                .numeric()
                .iter()
                .zip(SLOPES)
                .map(|(x, w)| x * w)
                .sum();
            let revenue = INTERCEPT + linear + cat_effect + dev_effect + country_effect
                + rng.noise(1.5);
            row.ad_revenue_usd = (revenue.max(0.0) * 1000.0).round() / 1000.0;
            row
        })
        .collect()
}

/// Standard-scaler parameters per numeric column, and the linear artifact
/// whose scaled coefficients reproduce `SLOPES`.
fn artifact(rows: &[Row]) -> PipelineArtifact {
    const NAMES: [&str; 6] = [
        "views",
        "likes",
        "comments",
        "watch_time_minutes",
        "video_length_minutes",
        "subscribers",
    ];

    let n = rows.len() as f64;
    let mut features = Vec::new();
    let mut coefficients = Vec::new();
    let mut intercept = INTERCEPT;

    for (k, name) in NAMES.iter().enumerate() {
        let mean = rows.iter().map(|r| r.numeric()[k]).sum::<f64>() / n;
        let var = rows.iter().map(|r| (r.numeric()[k] - mean).powi(2)).sum::<f64>() / n;
        let scale = if var > 0.0 { var.sqrt() } else { 1.0 };

        features.push(FeatureSpec::Numeric {
            name: name.to_string(),
            mean,
            scale,
        });
        coefficients.push(SLOPES[k] * scale);
        intercept += SLOPES[k] * mean;
    }

    let mut one_hot = |name: &str, levels: &[(&str, f64)]| {
        features.push(FeatureSpec::Categorical {
            name: name.to_string(),
            categories: levels.iter().map(|(l, _)| l.to_string()).collect(),
            handle_unknown: UnknownCategory::Ignore,
        });
        coefficients.extend(levels.iter().map(|(_, effect)| *effect));
    };
    one_hot("category", &CATEGORIES);
    one_hot("device", &DEVICES);
    one_hot("country", &COUNTRIES);

    PipelineArtifact {
        format_version: FORMAT_VERSION,
        name: Some("sample pipeline".to_string()),
        features,
        regressor: RegressorSpec::Linear {
            coefficients,
            intercept,
        },
    }
}

fn write_csv(rows: &[Row], path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    for row in rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_parquet(rows: &[Row], path: &str) -> Result<()> {
    let text = |f: fn(&Row) -> &str| -> ArrayRef {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let int = |f: fn(&Row) -> i64| -> ArrayRef {
        Arc::new(Int64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let float = |f: fn(&Row) -> f64| -> ArrayRef {
        Arc::new(Float64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new("video_id", DataType::Utf8, false),
        Field::new("date", DataType::Utf8, false),
        Field::new("views", DataType::Int64, false),
        Field::new("likes", DataType::Int64, false),
        Field::new("comments", DataType::Int64, false),
        Field::new("watch_time_minutes", DataType::Float64, false),
        Field::new("video_length_minutes", DataType::Float64, false),
        Field::new("subscribers", DataType::Int64, false),
        Field::new("category", DataType::Utf8, false),
        Field::new("device", DataType::Utf8, false),
        Field::new("country", DataType::Utf8, false),
        Field::new("ad_revenue_usd", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            text(|r| r.video_id.as_str()),
            text(|r| r.date.as_str()),
            int(|r| r.views),
            int(|r| r.likes),
            int(|r| r.comments),
            float(|r| r.watch_time_minutes),
            float(|r| r.video_length_minutes),
            int(|r| r.subscribers),
            text(|r| r.category.as_str()),
            text(|r| r.device.as_str()),
            text(|r| r.country.as_str()),
            float(|r| r.ad_revenue_usd),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = Sampler::seeded(42);
    let rows = generate(&mut rng);

    write_csv(&rows, "sample_videos.csv")?;
    write_parquet(&rows, "sample_videos.parquet")?;

    let model_path = "sample_model.json";
    let json = serde_json::to_string_pretty(&artifact(&rows)).context("serializing artifact")?;
    std::fs::write(model_path, json).context("writing artifact")?;

    println!(
        "Wrote {} videos to sample_videos.csv / sample_videos.parquet and a linear pipeline to {model_path}",
        rows.len()
    );
    println!("Run with: REVENUE_LENS_DATASET=sample_videos.csv REVENUE_LENS_MODEL={model_path} cargo run");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use approx::assert_relative_eq;
    use revenue_lens::predictor::{FittedPipeline, PredictionRequest, RevenueModel};

    use super::*;

    fn effect(levels: &[(&str, f64)], name: &str) -> f64 {
        levels.iter().find(|(l, _)| *l == name).map(|(_, e)| *e).unwrap()
    }

    #[test]
    fn same_seed_writes_the_same_rows() {
        let a = generate(&mut Sampler::seeded(7));
        let b = generate(&mut Sampler::seeded(7));
        assert_eq!(
            serde_json::to_string(&a[..20]).unwrap(),
            serde_json::to_string(&b[..20]).unwrap()
        );
        assert!(a.iter().all(|r| r.ad_revenue_usd >= 0.0));
    }

    #[test]
    fn unit_draws_stay_in_range() {
        let mut rng = Sampler::seeded(1);
        for _ in 0..10_000 {
            let u = rng.unit();
            assert!((0.0..1.0).contains(&u));
        }
    }

    #[test]
    fn artifact_reproduces_the_noise_free_formula() {
        let rows = generate(&mut Sampler::seeded(42));
        let model =
            FittedPipeline::from_artifact(artifact(&rows), Path::new("sample_model.json")).unwrap();

        for row in &rows[..25] {
            let expected = INTERCEPT
                + row.numeric().iter().zip(SLOPES).map(|(x, w)| x * w).sum::<f64>()
                + effect(&CATEGORIES, &row.category)
                + effect(&DEVICES, &row.device)
                + effect(&COUNTRIES, &row.country);
            let request = PredictionRequest {
                views: row.views as u64,
                likes: row.likes as u64,
                comments: row.comments as u64,
                watch_time_minutes: row.watch_time_minutes,
                video_length_minutes: row.video_length_minutes,
                subscribers: row.subscribers as u64,
                category: row.category.clone(),
                device: row.device.clone(),
                country: row.country.clone(),
            };
            let predicted = model.predict(&request.to_feature_row()).unwrap();
            assert_relative_eq!(predicted, expected, epsilon = 1e-6);
        }
    }
}

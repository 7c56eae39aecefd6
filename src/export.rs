use crate::series::{InterestPoint, InterestSeries};
use anyhow::Context;
use chrono::NaiveDate;
use std::path::Path;
use tracing::info;

/// Write a series as delimited text: a `date` column followed by one column
/// per keyword. An existing file at `path` is overwritten.
pub fn write_csv(series: &InterestSeries, path: &Path) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    let mut header = vec!["date".to_string()];
    header.extend(series.keywords.iter().cloned());
    writer.write_record(&header)?;

    for point in &series.points {
        let mut record = vec![point.date.format("%Y-%m-%d").to_string()];
        record.extend(point.values.iter().map(|v| v.to_string()));
        writer.write_record(&record)?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = series.len(), "exported series");
    Ok(())
}

/// Read a series back from the format `write_csv` produces.
pub fn read_csv(path: &Path) -> anyhow::Result<InterestSeries> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let headers = reader.headers()?.clone();
    let mut columns = headers.iter();
    match columns.next() {
        Some("date") => {}
        other => anyhow::bail!("expected leading 'date' column, found {:?}", other),
    }
    let keywords: Vec<String> = columns.map(|c| c.to_string()).collect();

    let mut points = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let mut fields = record.iter();
        let date_field = fields
            .next()
            .ok_or_else(|| anyhow::anyhow!("row {row}: empty record"))?;
        let date = NaiveDate::parse_from_str(date_field, "%Y-%m-%d")
            .with_context(|| format!("row {row}: bad date '{date_field}'"))?;
        let values = fields
            .map(|f| {
                f.parse::<f64>()
                    .with_context(|| format!("row {row}: bad value '{f}'"))
            })
            .collect::<anyhow::Result<Vec<f64>>>()?;
        if values.len() != keywords.len() {
            anyhow::bail!(
                "row {row}: expected {} values, got {}",
                keywords.len(),
                values.len()
            );
        }
        points.push(InterestPoint { date, values });
    }

    Ok(InterestSeries::new(keywords, points))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_series() -> InterestSeries {
        let d = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
        InterestSeries::new(
            vec!["A".to_string(), "B".to_string()],
            vec![
                InterestPoint {
                    date: d("2020-01-01"),
                    values: vec![10.0, 4.5],
                },
                InterestPoint {
                    date: d("2020-01-02"),
                    values: vec![20.25, 0.0],
                },
                InterestPoint {
                    date: d("2020-01-03"),
                    values: vec![33.333333333333336, 100.0],
                },
            ],
        )
    }

    #[test]
    fn round_trip_preserves_dates_and_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trends.csv");

        let series = sample_series();
        write_csv(&series, &path).unwrap();
        let restored = read_csv(&path).unwrap();

        assert_eq!(restored.keywords, series.keywords);
        assert_eq!(restored.len(), series.len());
        for (a, b) in series.points.iter().zip(&restored.points) {
            assert_eq!(a.date, b.date);
            for (x, y) in a.values.iter().zip(&b.values) {
                assert!((x - y).abs() < 1e-9, "{x} vs {y}");
            }
        }
    }

    #[test]
    fn export_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trends.csv");
        std::fs::write(&path, "stale contents").unwrap();

        write_csv(&sample_series(), &path).unwrap();
        let restored = read_csv(&path).unwrap();
        assert_eq!(restored.len(), 3);
    }

    #[test]
    fn read_rejects_foreign_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.csv");
        std::fs::write(&path, "time,A\n2020-01-01,1\n").unwrap();
        assert!(read_csv(&path).is_err());
    }
}

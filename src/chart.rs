use crate::config::{ChartOptions, QueryConfig};
use crate::series::{InterestSeries, RatioSeries};
use anyhow::anyhow;
use chrono::NaiveDate;
use plotters::prelude::*;
use tracing::info;

// Palette lifted from the dark analysis theme: slate background, one
// high-contrast line color per keyword.
const BACKGROUND: RGBColor = RGBColor(25, 35, 45);
const LINE_COLORS: [RGBColor; 6] = [
    RGBColor(0, 255, 255),
    RGBColor(255, 105, 180),
    RGBColor(0, 255, 153),
    RGBColor(255, 255, 153),
    RGBColor(178, 223, 138),
    RGBColor(50, 170, 21),
];
const RATIO_COLOR: RGBColor = RGBColor(255, 160, 122);

/// Render one interest line per keyword to a PNG artifact.
pub fn render_trends(
    series: &InterestSeries,
    config: &QueryConfig,
    options: &ChartOptions,
) -> anyhow::Result<()> {
    if series.is_empty() {
        return Err(anyhow!("cannot render an empty series"));
    }
    let caption = trends_caption(series, config);
    let lines: Vec<(String, Vec<(NaiveDate, f64)>)> = series
        .keywords
        .iter()
        .enumerate()
        .map(|(idx, keyword)| {
            (
                keyword.clone(),
                series
                    .points
                    .iter()
                    .map(|p| (p.date, p.values[idx]))
                    .collect(),
            )
        })
        .collect();

    draw_lines(&lines, &LINE_COLORS, &caption, "Interest over time", options)
        .map_err(|e| anyhow!("failed to render trends chart: {e}"))?;
    info!(path = %options.path.display(), "wrote trends chart");
    Ok(())
}

/// Render the two-keyword interest ratio to a PNG artifact. Non-finite
/// samples (zero denominators upstream) are skipped when drawing.
pub fn render_ratio(ratio: &RatioSeries, options: &ChartOptions) -> anyhow::Result<()> {
    if ratio.points.is_empty() {
        return Err(anyhow!("cannot render an empty ratio series"));
    }
    let label = format!("{} / {}", ratio.numerator, ratio.denominator);
    let caption = format!("Interest ratio: {label}");
    let lines = vec![(label, ratio.points.clone())];

    draw_lines(&lines, &[RATIO_COLOR], &caption, "Interest ratio", options)
        .map_err(|e| anyhow!("failed to render ratio chart: {e}"))?;
    info!(path = %options.path.display(), "wrote ratio chart");
    Ok(())
}

fn trends_caption(series: &InterestSeries, config: &QueryConfig) -> String {
    let start = series.points.first().map(|p| p.date).unwrap_or_default();
    let end = series.points.last().map(|p| p.date).unwrap_or_default();
    let geo = if config.geo.is_empty() {
        "worldwide".to_string()
    } else {
        config.geo.clone()
    };
    format!(
        "Keyword interest {start} to {end} ({geo}, {})",
        config.source_label()
    )
}

fn draw_lines(
    lines: &[(String, Vec<(NaiveDate, f64)>)],
    palette: &[RGBColor],
    caption: &str,
    y_desc: &str,
    options: &ChartOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(&options.path, (options.width, options.height))
        .into_drawing_area();
    root.fill(&BACKGROUND)?;

    let (mut min_date, mut max_date) = (NaiveDate::MAX, NaiveDate::MIN);
    let (mut min_value, mut max_value) = (f64::INFINITY, f64::NEG_INFINITY);
    for (_, points) in lines {
        for &(date, value) in points {
            min_date = min_date.min(date);
            max_date = max_date.max(date);
            if value.is_finite() {
                min_value = min_value.min(value);
                max_value = max_value.max(value);
            }
        }
    }
    if !min_value.is_finite() {
        return Err("no finite values to plot".into());
    }
    let y_padding = if (max_value - min_value).abs() > 1e-6 {
        (max_value - min_value) * 0.1
    } else {
        1.0
    };
    let y_start = (min_value - y_padding).min(0.0);
    let y_end = max_value + y_padding;

    let text = ("sans-serif", 18).into_font().color(&WHITE);
    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 24).into_font().color(&WHITE))
        .margin(20)
        .x_label_area_size(45)
        .y_label_area_size(55)
        .build_cartesian_2d(min_date..max_date, y_start..y_end)?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc(y_desc)
        .label_style(text.clone())
        .axis_desc_style(text)
        .x_label_formatter(&|d: &NaiveDate| d.format("%Y-%m").to_string())
        .light_line_style(WHITE.mix(0.1))
        .bold_line_style(WHITE.mix(0.2))
        .draw()?;

    for (idx, (label, points)) in lines.iter().enumerate() {
        let color = palette[idx % palette.len()];
        let finite: Vec<(NaiveDate, f64)> = points
            .iter()
            .copied()
            .filter(|(_, v)| v.is_finite())
            .collect();
        chart
            .draw_series(LineSeries::new(finite, color.stroke_width(2)))?
            .label(label.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 24, y)], color));
    }

    chart
        .configure_series_labels()
        .background_style(BACKGROUND.mix(0.85))
        .border_style(WHITE.mix(0.4))
        .label_font(("sans-serif", 16).into_font().color(&WHITE))
        .draw()?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::InterestPoint;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample_series() -> InterestSeries {
        InterestSeries::new(
            vec!["A".to_string(), "B".to_string()],
            (0..30)
                .map(|i| InterestPoint {
                    date: d("2020-01-01") + chrono::Duration::days(i),
                    values: vec![i as f64, 30.0 - i as f64],
                })
                .collect(),
        )
    }

    #[test]
    fn renders_trends_chart_to_png() {
        let dir = tempfile::tempdir().unwrap();
        let options = ChartOptions::new(dir.path().join("trends.png")).with_size(640, 480);
        let config = QueryConfig {
            keywords: vec!["A".to_string(), "B".to_string()],
            geo: String::new(),
            youtube: false,
        };
        render_trends(&sample_series(), &config, &options).unwrap();
        assert!(options.path.exists());
        assert!(std::fs::metadata(&options.path).unwrap().len() > 0);
    }

    #[test]
    fn renders_ratio_chart_skipping_non_finite_samples() {
        let dir = tempfile::tempdir().unwrap();
        let options = ChartOptions::new(dir.path().join("ratio.png")).with_size(640, 480);
        let mut series = sample_series();
        // Zero denominator on one date produces an infinite ratio sample.
        series.points[5].values[1] = 0.0;
        let ratio = series.ratio().unwrap();
        render_ratio(&ratio, &options).unwrap();
        assert!(options.path.exists());
    }

    #[test]
    fn empty_series_is_a_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let options = ChartOptions::new(dir.path().join("empty.png"));
        let config = QueryConfig {
            keywords: vec![],
            geo: String::new(),
            youtube: false,
        };
        let empty = InterestSeries::new(vec![], vec![]);
        assert!(render_trends(&empty, &config, &options).is_err());
    }
}

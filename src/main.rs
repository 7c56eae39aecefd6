use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use trendstitch::{
    chart, export, ChartOptions, InterestSeries, QueryConfig, Timeframe, TrendsClient,
};

/// Compare keyword popularity over a long date range with daily resolution:
/// the range is split at its midpoint, each half is fetched separately, and
/// the halves are rescaled onto a common scale at the shared boundary date.
#[derive(Parser)]
#[command(name = "trendstitch")]
#[command(about = "Fetch, stitch and chart Google Trends interest series")]
struct Cli {
    /// Keywords to compare (repeat the flag or separate with commas)
    #[arg(short, long, value_delimiter = ',', default_values_t = [
        "(PyTorch+PyTorch regression+PyTorch deep learning)".to_string(),
        "(TensorFlow+TensorFlow regression+TensorFlow deep learning)".to_string(),
    ])]
    keywords: Vec<String>,

    /// Range start date (YYYY-MM-DD)
    #[arg(long, default_value = "2015-01-01")]
    start: String,

    /// Range end date (YYYY-MM-DD)
    #[arg(long, default_value = "2023-08-30")]
    end: String,

    /// ISO country code filter (empty = worldwide)
    #[arg(short, long, default_value = "")]
    geo: String,

    /// Query YouTube search trends instead of general web search
    #[arg(long, default_value_t = false)]
    youtube: bool,

    /// CSV output path (overwritten if present)
    #[arg(long, default_value = "trends_data.csv")]
    csv: PathBuf,

    /// Trends chart output path
    #[arg(long, default_value = "trends.png")]
    chart: PathBuf,

    /// Ratio chart output path
    #[arg(long, default_value = "ratio.png")]
    ratio_chart: PathBuf,

    /// Skip chart rendering, export CSV only
    #[arg(long, default_value_t = false)]
    no_charts: bool,

    /// Chart width in pixels
    #[arg(long, default_value_t = 1200)]
    width: u32,

    /// Chart height in pixels
    #[arg(long, default_value_t = 720)]
    height: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("trendstitch=info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = QueryConfig {
        keywords: cli.keywords,
        geo: cli.geo,
        youtube: cli.youtube,
    };
    let timeframe = Timeframe::parse(&cli.start, &cli.end)?;

    tracing::info!(
        keywords = ?config.keywords,
        %timeframe,
        geo = %config.geo,
        source = config.source_label(),
        "starting trends run"
    );

    let (first_half, second_half) = timeframe.split();
    let mut client = TrendsClient::new(true)?;

    // Two sequential fetches; one boundary date is shared by construction.
    let first = client
        .interest_over_time(&config, &first_half)
        .await
        .with_context(|| format!("fetching first half {first_half}"))?;
    let second = client
        .interest_over_time(&config, &second_half)
        .await
        .with_context(|| format!("fetching second half {second_half}"))?;

    let stitched = InterestSeries::stitch(&first, &second)?;
    tracing::info!(points = stitched.len(), "stitched half-series");

    if !cli.no_charts {
        let trend_options = ChartOptions::new(&cli.chart).with_size(cli.width, cli.height);
        chart::render_trends(&stitched, &config, &trend_options)?;

        // The ratio view is defined for exactly two keywords.
        match stitched.ratio() {
            Ok(ratio) => {
                let ratio_options =
                    ChartOptions::new(&cli.ratio_chart).with_size(cli.width, cli.height);
                chart::render_ratio(&ratio, &ratio_options)?;
            }
            Err(e) => tracing::warn!("skipping ratio chart: {e}"),
        }
    }

    export::write_csv(&stitched, &cli.csv)?;

    tracing::info!("run completed");
    Ok(())
}

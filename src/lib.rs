//! # trendstitch
//!
//! Fetch keyword-popularity series from the Google Trends API, stitch two
//! half-window queries into one continuous series, render comparison and
//! ratio charts, and export the result to CSV.
//!
//! The provider normalizes each query window to its own 0-100 scale, so a
//! long range fetched in one piece loses daily resolution while two
//! sub-range queries land on incompatible scales. The crate's core is the
//! stitch in [`series::InterestSeries::stitch`]: re-anchor the first half
//! onto the second half's scale via the value ratio at the shared boundary
//! date, then concatenate.

pub mod chart;
pub mod client;
pub mod config;
pub mod export;
pub mod series;
pub mod timeframe;

pub use client::{ClientError, TrendsClient};
pub use config::{ChartOptions, QueryConfig};
pub use series::{InterestPoint, InterestSeries, RatioSeries, SeriesError};
pub use timeframe::{Timeframe, TimeframeError};

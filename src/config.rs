use serde::{Deserialize, Serialize};

/// One trends query: what to ask the provider for. Passed explicitly into
/// every call instead of living in ambient globals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Comparison terms, 2-6 typical. Order is preserved end to end;
    /// uniqueness is not enforced.
    pub keywords: Vec<String>,
    /// ISO country code filter; empty string means worldwide.
    pub geo: String,
    /// Query YouTube search trends instead of general web search.
    pub youtube: bool,
}

impl QueryConfig {
    /// Provider category code: 29 for the YouTube source, 0 for web search.
    pub fn category(&self) -> u32 {
        if self.youtube {
            29
        } else {
            0
        }
    }

    /// Human-readable source label for chart titles.
    pub fn source_label(&self) -> &'static str {
        if self.youtube {
            "YouTube Trends"
        } else {
            "Web Search Trends"
        }
    }
}

/// Output geometry and destination for a rendered chart.
#[derive(Debug, Clone)]
pub struct ChartOptions {
    pub path: std::path::PathBuf,
    pub width: u32,
    pub height: u32,
}

impl ChartOptions {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self {
            path: path.into(),
            width: 1200,
            height: 720,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

use crate::config::QueryConfig;
use crate::series::{InterestPoint, InterestSeries};
use crate::timeframe::Timeframe;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const BASE_URL: &str = "https://trends.google.com";
const HL: &str = "en-US";
const TZ: &str = "360";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("response is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("unexpected provider response: {0}")]
    InvalidResponse(String),
    #[error("no timeseries widget in explore response")]
    MissingWidget,
    #[error("provider returned no timeline data")]
    NoData,
}

/// Thin client for the trends provider's two-step widget protocol: an
/// explore call hands back a per-widget token, which unlocks the actual
/// timeline download. Failures propagate immediately; the caller decides
/// whether a run survives them (it does not).
pub struct TrendsClient {
    client: Client,
    base_url: String,
    user_agents: Vec<String>,
    random_agent: bool,
    bootstrapped: bool,
}

impl TrendsClient {
    pub fn new(random_agent: bool) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .cookie_store(true)
            .build()?;

        let user_agents = vec![
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:120.0) Gecko/20100101 Firefox/120.0".to_string(),
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.3 Safari/605.1.15".to_string(),
        ];

        Ok(Self {
            client,
            base_url: BASE_URL.to_string(),
            user_agents,
            random_agent,
            bootstrapped: false,
        })
    }

    fn user_agent(&self) -> String {
        if self.random_agent {
            use rand::seq::SliceRandom;
            self.user_agents
                .choose(&mut rand::thread_rng())
                .unwrap_or(&self.user_agents[0])
                .clone()
        } else {
            self.user_agents[0].clone()
        }
    }

    /// First contact with the provider sets the consent cookie the API
    /// endpoints require; the cookie store carries it for the rest of the
    /// run.
    async fn bootstrap(&mut self) -> Result<(), ClientError> {
        if self.bootstrapped {
            return Ok(());
        }
        debug!("bootstrapping provider session cookie");
        self.client
            .get(format!("{}/?geo=US", self.base_url))
            .header("User-Agent", self.user_agent())
            .send()
            .await?
            .error_for_status()?;
        self.bootstrapped = true;
        Ok(())
    }

    /// Interest-over-time for one query window. The provider normalizes
    /// values to the window's own 0-100 scale, which is exactly why callers
    /// split long ranges and stitch the halves afterwards.
    pub async fn interest_over_time(
        &mut self,
        config: &QueryConfig,
        timeframe: &Timeframe,
    ) -> Result<InterestSeries, ClientError> {
        self.bootstrap().await?;

        let (token, widget_request) = self.explore(config, timeframe).await?;
        let timeline = self.widget_data(&token, &widget_request).await?;
        let series = parse_timeline(&config.keywords, &timeline)?;

        debug!(
            %timeframe,
            points = series.len(),
            "fetched interest over time"
        );
        Ok(series)
    }

    /// Explore call: registers the comparison and returns the timeseries
    /// widget's token plus the request body the widget endpoint expects.
    async fn explore(
        &self,
        config: &QueryConfig,
        timeframe: &Timeframe,
    ) -> Result<(String, Value), ClientError> {
        let comparison: Vec<Value> = config
            .keywords
            .iter()
            .map(|keyword| {
                serde_json::json!({
                    "keyword": keyword,
                    "geo": config.geo,
                    "time": timeframe.to_string(),
                })
            })
            .collect();
        let req = serde_json::json!({
            "comparisonItem": comparison,
            "category": config.category(),
            "property": "",
        });

        let body = self
            .api_request(
                &format!("{}/trends/api/explore", self.base_url),
                &[("hl", HL), ("tz", TZ), ("req", &req.to_string())],
            )
            .await?;
        let parsed: Value = serde_json::from_str(strip_xssi_prefix(&body))?;

        let widgets = parsed
            .get("widgets")
            .and_then(|w| w.as_array())
            .ok_or_else(|| ClientError::InvalidResponse("missing widgets array".to_string()))?;
        let timeseries = widgets
            .iter()
            .find(|w| w.get("id").and_then(|id| id.as_str()) == Some("TIMESERIES"))
            .ok_or(ClientError::MissingWidget)?;

        let token = timeseries
            .get("token")
            .and_then(|t| t.as_str())
            .ok_or_else(|| ClientError::InvalidResponse("widget has no token".to_string()))?
            .to_string();
        let request = timeseries
            .get("request")
            .cloned()
            .ok_or_else(|| ClientError::InvalidResponse("widget has no request".to_string()))?;
        Ok((token, request))
    }

    /// Widget-data call: downloads the multiline timeline for a token
    /// obtained from `explore`.
    async fn widget_data(&self, token: &str, widget_request: &Value) -> Result<Value, ClientError> {
        let body = self
            .api_request(
                &format!("{}/trends/api/widgetdata/multiline", self.base_url),
                &[
                    ("hl", HL),
                    ("tz", TZ),
                    ("req", &widget_request.to_string()),
                    ("token", token),
                ],
            )
            .await?;
        Ok(serde_json::from_str(strip_xssi_prefix(&body))?)
    }

    async fn api_request(&self, url: &str, params: &[(&str, &str)]) -> Result<String, ClientError> {
        let response = self
            .client
            .get(url)
            .query(params)
            .header("Accept", "application/json, text/plain, */*")
            .header("Accept-Language", "en-US,en;q=0.9")
            .header("User-Agent", self.user_agent())
            .header("Referer", format!("{}/trends/explore", self.base_url))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }
}

/// Provider API responses start with an anti-XSSI prefix (`)]}'` plus an
/// optional comma and newline) that must go before the JSON parser sees the
/// body.
fn strip_xssi_prefix(body: &str) -> &str {
    match body.find(|c| c == '{' || c == '[') {
        Some(idx) => &body[idx..],
        None => body,
    }
}

/// Decode `default.timelineData` into a date-ordered series, one value per
/// keyword and day.
fn parse_timeline(keywords: &[String], timeline: &Value) -> Result<InterestSeries, ClientError> {
    let entries = timeline
        .get("default")
        .and_then(|d| d.get("timelineData"))
        .and_then(|t| t.as_array())
        .ok_or(ClientError::NoData)?;
    if entries.is_empty() {
        return Err(ClientError::NoData);
    }

    let mut points = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let timestamp = entry
            .get("time")
            .and_then(|t| t.as_str())
            .ok_or_else(|| ClientError::InvalidResponse(format!("missing time at index {i}")))?
            .parse::<i64>()
            .map_err(|_| ClientError::InvalidResponse(format!("non-numeric time at index {i}")))?;
        let date = DateTime::<Utc>::from_timestamp(timestamp, 0)
            .map(|dt| dt.date_naive())
            .ok_or_else(|| {
                ClientError::InvalidResponse(format!("timestamp {timestamp} out of range at index {i}"))
            })?;

        let raw_values = entry
            .get("value")
            .and_then(|v| v.as_array())
            .ok_or_else(|| ClientError::InvalidResponse(format!("missing values at index {i}")))?;
        if raw_values.len() != keywords.len() {
            return Err(ClientError::InvalidResponse(format!(
                "expected {} values at index {i}, got {}",
                keywords.len(),
                raw_values.len()
            )));
        }
        let values: Vec<f64> = raw_values
            .iter()
            .map(|v| v.as_f64().unwrap_or(0.0))
            .collect();

        points.push(InterestPoint { date, values });
    }

    points.sort_by_key(|p| p.date);
    Ok(InterestSeries::new(keywords.to_vec(), points))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        assert!(TrendsClient::new(true).is_ok());
    }

    #[test]
    fn strips_xssi_prefix_variants() {
        assert_eq!(strip_xssi_prefix(")]}'\n{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_xssi_prefix(")]}',\n{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_xssi_prefix("{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn parses_timeline_entries() {
        let keywords = vec!["A".to_string(), "B".to_string()];
        // 1577836800 = 2020-01-01, 1577923200 = 2020-01-02
        let timeline: Value = serde_json::from_str(
            r#"{"default":{"timelineData":[
                {"time":"1577923200","value":[3,4]},
                {"time":"1577836800","value":[1,2]}
            ]}}"#,
        )
        .unwrap();
        let series = parse_timeline(&keywords, &timeline).unwrap();
        assert_eq!(series.len(), 2);
        // Sorted into date order regardless of response order.
        assert_eq!(series.points[0].date.to_string(), "2020-01-01");
        assert_eq!(series.points[0].values, vec![1.0, 2.0]);
        assert_eq!(series.points[1].values, vec![3.0, 4.0]);
    }

    #[test]
    fn timeline_value_count_must_match_keywords() {
        let keywords = vec!["A".to_string(), "B".to_string()];
        let timeline: Value = serde_json::from_str(
            r#"{"default":{"timelineData":[{"time":"1577836800","value":[1]}]}}"#,
        )
        .unwrap();
        assert!(matches!(
            parse_timeline(&keywords, &timeline),
            Err(ClientError::InvalidResponse(_))
        ));
    }

    #[test]
    fn empty_timeline_is_no_data() {
        let keywords = vec!["A".to_string()];
        let timeline: Value =
            serde_json::from_str(r#"{"default":{"timelineData":[]}}"#).unwrap();
        assert!(matches!(
            parse_timeline(&keywords, &timeline),
            Err(ClientError::NoData)
        ));
    }
}

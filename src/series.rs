use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeriesError {
    #[error("cannot stitch: halves query different keywords ({first:?} vs {second:?})")]
    KeywordMismatch {
        first: Vec<String>,
        second: Vec<String>,
    },
    #[error("cannot stitch an empty half-series")]
    EmptyHalf,
    #[error("boundary dates do not align: first half ends {first_end}, second half starts {second_start}")]
    BoundaryMismatch {
        first_end: NaiveDate,
        second_start: NaiveDate,
    },
    #[error("stitched dates are not strictly increasing around {date}")]
    UnorderedDates { date: NaiveDate },
    #[error("interest ratio requires exactly two keywords, got {0}")]
    RatioNeedsTwoKeywords(usize),
}

/// Interest values for all keywords on one calendar date. Values are
/// positionally aligned with the owning series' keyword list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterestPoint {
    pub date: NaiveDate,
    pub values: Vec<f64>,
}

/// A date-ordered interest series for a fixed keyword set. Provider values
/// are 0-100 per query window; rescaling during stitching can push the
/// first half outside that range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterestSeries {
    pub keywords: Vec<String>,
    pub points: Vec<InterestPoint>,
}

impl InterestSeries {
    pub fn new(keywords: Vec<String>, points: Vec<InterestPoint>) -> Self {
        Self { keywords, points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// All values for one keyword in date order.
    pub fn column(&self, keyword: &str) -> Option<Vec<f64>> {
        let idx = self.keywords.iter().position(|k| k == keyword)?;
        Some(self.points.iter().map(|p| p.values[idx]).collect())
    }

    /// Stitch two half-window series into one continuous series.
    ///
    /// The provider normalizes each query window to its own 0-100 scale, so
    /// the halves are not directly comparable. Per keyword, the first half
    /// is multiplied by `boundary_new / boundary_old` so its value at the
    /// shared boundary date matches the second half's; a zero denominator
    /// falls back to a scale of 1. The correction is a continuity
    /// heuristic, not a recovery of the true underlying values.
    ///
    /// The halves must list identical keywords and their adjacent samples
    /// must name the same calendar date; either violation is an error
    /// rather than silent positional indexing. The boundary date appears
    /// exactly once in the output: the rescaled first-half sample equals
    /// the second half's by construction, so the first half's copy is
    /// dropped.
    pub fn stitch(first: &InterestSeries, second: &InterestSeries) -> Result<Self, SeriesError> {
        if first.keywords != second.keywords {
            return Err(SeriesError::KeywordMismatch {
                first: first.keywords.clone(),
                second: second.keywords.clone(),
            });
        }
        let boundary_old = first.points.last().ok_or(SeriesError::EmptyHalf)?;
        let boundary_new = second.points.first().ok_or(SeriesError::EmptyHalf)?;
        if boundary_old.date != boundary_new.date {
            return Err(SeriesError::BoundaryMismatch {
                first_end: boundary_old.date,
                second_start: boundary_new.date,
            });
        }

        let scales: Vec<f64> = boundary_old
            .values
            .iter()
            .zip(&boundary_new.values)
            .map(|(&old, &new)| if old != 0.0 { new / old } else { 1.0 })
            .collect();

        let mut points: Vec<InterestPoint> = first.points[..first.points.len() - 1]
            .iter()
            .map(|p| InterestPoint {
                date: p.date,
                values: p
                    .values
                    .iter()
                    .zip(&scales)
                    .map(|(v, s)| v * s)
                    .collect(),
            })
            .collect();
        points.extend(second.points.iter().cloned());

        for pair in points.windows(2) {
            if pair[0].date >= pair[1].date {
                return Err(SeriesError::UnorderedDates { date: pair[1].date });
            }
        }

        Ok(Self {
            keywords: first.keywords.clone(),
            points,
        })
    }

    /// Element-wise ratio of the first keyword's interest over the second's.
    ///
    /// Restricted to exactly two keywords; the intent with more columns is
    /// ambiguous, so the caller must narrow the query first. A zero
    /// denominator is deliberately not guarded and yields a non-finite
    /// value for that date.
    pub fn ratio(&self) -> Result<RatioSeries, SeriesError> {
        if self.keywords.len() != 2 {
            return Err(SeriesError::RatioNeedsTwoKeywords(self.keywords.len()));
        }
        Ok(RatioSeries {
            numerator: self.keywords[0].clone(),
            denominator: self.keywords[1].clone(),
            points: self
                .points
                .iter()
                .map(|p| (p.date, p.values[0] / p.values[1]))
                .collect(),
        })
    }
}

/// Per-date ratio of two keywords' interest values.
#[derive(Debug, Clone, PartialEq)]
pub struct RatioSeries {
    pub numerator: String,
    pub denominator: String,
    pub points: Vec<(NaiveDate, f64)>,
}

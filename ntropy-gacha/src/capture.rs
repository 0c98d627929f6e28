//! Captured currency readings and their history statistics.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::numbers::usize_to_f64;

#[derive(Debug, Error, PartialEq)]
pub enum CaptureError {
    #[error("capture value must be a finite number of pulls (got {0})")]
    NonFiniteValue(f64),
}

/// One reading of a game's pull stash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capture {
    pub id: u64,
    pub game_id: u32,
    pub value: f64,
    /// Local time, `%Y-%m-%d %H:%M:%S`; sorts chronologically as text.
    pub timestamp: String,
    #[serde(default)]
    pub notes: String,
}

/// Pulls on hand from converted pulls plus premium currency.
///
/// A zero ratio means the game has no convertible currency.
#[must_use]
pub fn combine_currency(converted: f64, integer: f64, ratio: u32) -> f64 {
    if ratio == 0 {
        return converted;
    }
    converted + integer / f64::from(ratio)
}

/// Reject readings that cannot be stored as a JSON number.
///
/// # Errors
///
/// Returns an error for NaN or infinite values.
pub fn check_value(value: f64) -> Result<f64, CaptureError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CaptureError::NonFiniteValue(value))
    }
}

/// Id for the next capture appended to `captures`.
#[must_use]
pub fn next_capture_id(captures: &[Capture]) -> u64 {
    captures.iter().map(|c| c.id).max().unwrap_or(0) + 1
}

/// Captures for `game_id` (or every game), newest first, optionally truncated.
#[must_use]
pub fn history(captures: &[Capture], game_id: Option<u32>, limit: Option<usize>) -> Vec<Capture> {
    let mut selected: Vec<Capture> = captures
        .iter()
        .filter(|c| game_id.is_none_or(|id| c.game_id == id))
        .cloned()
        .collect();
    selected.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
    if let Some(limit) = limit.filter(|&l| l > 0) {
        selected.truncate(limit);
    }
    selected
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct CaptureStats {
    pub total: f64,
    pub count: usize,
    pub average: f64,
    pub min: f64,
    pub max: f64,
}

impl CaptureStats {
    #[must_use]
    pub fn from_captures(captures: &[Capture]) -> Self {
        if captures.is_empty() {
            return Self::default();
        }
        let total: f64 = captures.iter().map(|c| c.value).sum();
        let min = captures
            .iter()
            .map(|c| c.value)
            .fold(f64::INFINITY, f64::min);
        let max = captures
            .iter()
            .map(|c| c.value)
            .fold(f64::NEG_INFINITY, f64::max);
        Self {
            total,
            count: captures.len(),
            average: total / usize_to_f64(captures.len()),
            min,
            max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture(id: u64, game_id: u32, value: f64, timestamp: &str) -> Capture {
        Capture {
            id,
            game_id,
            value,
            timestamp: timestamp.to_string(),
            notes: String::new(),
        }
    }

    fn sample() -> Vec<Capture> {
        vec![
            capture(1, 1, 40.0, "2025-01-01 10:00:00"),
            capture(2, 2, 12.5, "2025-01-02 10:00:00"),
            capture(3, 1, 55.0, "2025-01-03 09:30:00"),
        ]
    }

    #[test]
    fn currency_combines_with_ratio() {
        assert!((combine_currency(10.0, 320.0, 160) - 12.0).abs() < f64::EPSILON);
        assert!((combine_currency(10.0, 320.0, 0) - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn non_finite_values_are_rejected() {
        assert_eq!(check_value(12.5), Ok(12.5));
        assert!(matches!(
            check_value(f64::NAN),
            Err(CaptureError::NonFiniteValue(v)) if v.is_nan()
        ));
        assert_eq!(
            check_value(f64::INFINITY),
            Err(CaptureError::NonFiniteValue(f64::INFINITY))
        );
        assert!(check_value(combine_currency(1.0, f64::NEG_INFINITY, 160)).is_err());
    }

    #[test]
    fn ids_continue_after_max() {
        assert_eq!(next_capture_id(&[]), 1);
        assert_eq!(next_capture_id(&sample()), 4);
    }

    #[test]
    fn history_filters_and_orders_newest_first() {
        let captures = sample();
        let ids: Vec<u64> = history(&captures, Some(1), None).iter().map(|c| c.id).collect();
        assert_eq!(ids, [3, 1]);
        let latest = history(&captures, None, Some(1));
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].id, 3);
    }

    #[test]
    fn stats_summarize_values() {
        let captures = history(&sample(), Some(1), None);
        let stats = CaptureStats::from_captures(&captures);
        assert_eq!(stats.count, 2);
        assert!((stats.total - 95.0).abs() < f64::EPSILON);
        assert!((stats.average - 47.5).abs() < f64::EPSILON);
        assert!((stats.min - 40.0).abs() < f64::EPSILON);
        assert!((stats.max - 55.0).abs() < f64::EPSILON);
        assert_eq!(CaptureStats::from_captures(&[]), CaptureStats::default());
    }
}

//! Brightness arithmetic for light intents.
//!
//! The hub takes brightness as a 0-255 level; voice commands speak in
//! percent.

use thiserror::Error;

pub const MIN_LEVEL: u8 = 10;
pub const MAX_LEVEL: u8 = 255;
/// Step used when a brighten/dim command names no amount.
pub const DEFAULT_STEP_PERCENT: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PercentError {
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("{0} is outside 0-100")]
    OutOfRange(f64),
}

/// Parses a percentage slot; an absent slot yields `default`.
pub fn parse_percent(raw: Option<&str>, default: f64) -> Result<f64, PercentError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    let cleaned = raw.trim().trim_end_matches('%').trim();
    let value: f64 = cleaned
        .parse()
        .map_err(|_| PercentError::NotANumber(raw.to_string()))?;
    if !value.is_finite() {
        return Err(PercentError::NotANumber(raw.to_string()));
    }
    if !(0.0..=100.0).contains(&value) {
        return Err(PercentError::OutOfRange(value));
    }
    Ok(value)
}

/// `round(pct / 100 * 255)`.
pub fn percent_to_level(percent: f64) -> u8 {
    (percent / 100.0 * 255.0).round().clamp(0.0, 255.0) as u8
}

pub fn level_to_percent(level: u8) -> u8 {
    (f64::from(level) / 255.0 * 100.0).round() as u8
}

/// Dims by `delta`, resetting to [`MIN_LEVEL`] instead of going below it.
pub fn decrease(current: u8, delta: u8) -> u8 {
    if current < delta {
        MIN_LEVEL
    } else {
        (current - delta).max(MIN_LEVEL)
    }
}

/// Brightens by `delta`.
///
/// Jumps straight to [`MAX_LEVEL`] whenever the current level exceeds the
/// delta itself, not only when the sum would overflow.
pub fn increase(current: u8, delta: u8) -> u8 {
    if current > delta {
        MAX_LEVEL
    } else {
        (u16::from(current) + u16::from(delta)).min(u16::from(MAX_LEVEL)) as u8
    }
}

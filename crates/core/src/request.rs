//! Job request defaults and clamping.
//!
//! User-supplied values are never rejected; each one is defaulted when
//! missing and clamped into its allowed range before the engine sees it.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

use crate::job::{RenderMode, RenderParams};

// ---------------------------------------------------------------------------
// Defaults and limits
// ---------------------------------------------------------------------------

pub const DEFAULT_WIDTH: i64 = 640;
pub const MIN_WIDTH: i64 = 160;
pub const MAX_WIDTH: i64 = 1600;

pub const DEFAULT_HEIGHT: i64 = 360;
pub const MIN_HEIGHT: i64 = 100;
pub const MAX_HEIGHT: i64 = 1000;

pub const DEFAULT_MAX_ITER: i64 = 500;
pub const MIN_MAX_ITER: i64 = 50;
pub const MAX_MAX_ITER: i64 = 2000;

pub const DEFAULT_SAMPLES: i64 = 2;
pub const MIN_SAMPLES: i64 = 1;
pub const MAX_SAMPLES: i64 = 12;

pub const DEFAULT_CHUNK_SIZE: i64 = 16;
pub const MIN_CHUNK_SIZE: i64 = 4;
pub const MAX_CHUNK_SIZE: i64 = 128;

pub const DEFAULT_MODE: &str = "multicore";

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Raw job creation request as received from a client.
///
/// Each field is read on its own. Integers, floats (truncated) and numeric
/// strings are accepted; a value of any other type leaves that field unset
/// without affecting the rest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RenderRequest {
    #[serde(default, deserialize_with = "lenient_int")]
    pub width: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub height: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub max_iter: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub samples: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub chunk_size: Option<i64>,
    #[serde(default, deserialize_with = "lenient_mode")]
    pub mode: Option<String>,
}

impl RenderRequest {
    /// Apply defaults and clamps, and derive the worker count.
    pub fn resolve(&self, host_cores: usize) -> RenderParams {
        let mode = RenderMode::parse(self.mode.as_deref().unwrap_or(DEFAULT_MODE));
        RenderParams {
            mode,
            width: clamp_field(self.width, DEFAULT_WIDTH, MIN_WIDTH, MAX_WIDTH),
            height: clamp_field(self.height, DEFAULT_HEIGHT, MIN_HEIGHT, MAX_HEIGHT),
            max_iter: clamp_field(self.max_iter, DEFAULT_MAX_ITER, MIN_MAX_ITER, MAX_MAX_ITER),
            samples: clamp_field(self.samples, DEFAULT_SAMPLES, MIN_SAMPLES, MAX_SAMPLES),
            chunk_size: clamp_field(
                self.chunk_size,
                DEFAULT_CHUNK_SIZE,
                MIN_CHUNK_SIZE,
                MAX_CHUNK_SIZE,
            ),
            workers: mode.worker_count(host_cores),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseValue {
    Int(i64),
    Float(f64),
    Text(String),
    Other(#[allow(dead_code)] IgnoredAny),
}

fn lenient_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(match LooseValue::deserialize(deserializer)? {
        LooseValue::Int(n) => Some(n),
        LooseValue::Float(f) if f.is_finite() => Some(f as i64),
        LooseValue::Text(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_mode<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match LooseValue::deserialize(deserializer)? {
        LooseValue::Text(s) => Some(s),
        _ => None,
    })
}

fn clamp_field(value: Option<i64>, default: i64, min: i64, max: i64) -> u32 {
    // Bounds are small positive constants, so the clamped value fits in u32.
    value.unwrap_or(default).clamp(min, max) as u32
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_request_uses_defaults() {
        let params = RenderRequest::default().resolve(8);
        assert_eq!(params.width, 640);
        assert_eq!(params.height, 360);
        assert_eq!(params.max_iter, 500);
        assert_eq!(params.samples, 2);
        assert_eq!(params.chunk_size, 16);
        assert_eq!(params.mode, RenderMode::Multicore);
        assert_eq!(params.workers, 8);
    }

    #[test]
    fn values_are_clamped_into_range() {
        let request = RenderRequest {
            width: Some(10),
            height: Some(5000),
            max_iter: Some(-3),
            samples: Some(99),
            chunk_size: Some(1),
            mode: None,
        };
        let params = request.resolve(4);
        assert_eq!(params.width, 160);
        assert_eq!(params.height, 1000);
        assert_eq!(params.max_iter, 50);
        assert_eq!(params.samples, 12);
        assert_eq!(params.chunk_size, 4);
    }

    #[test]
    fn single_mode_forces_one_worker_regardless_of_cores() {
        let request = RenderRequest {
            mode: Some("single".into()),
            ..Default::default()
        };
        assert_eq!(request.resolve(32).workers, 1);
    }

    #[test]
    fn deserializes_partial_json() {
        let request: RenderRequest =
            serde_json::from_str(r#"{"width": 800, "mode": "single"}"#).unwrap();
        assert_eq!(request.width, Some(800));
        assert_eq!(request.mode.as_deref(), Some("single"));
        assert!(request.height.is_none());
    }

    #[test]
    fn float_and_string_numbers_are_truncated_per_field() {
        let request: RenderRequest = serde_json::from_str(
            r#"{"width": 800.0, "height": "240", "samples": 3.9, "mode": "single"}"#,
        )
        .unwrap();
        assert_eq!(request.width, Some(800));
        assert_eq!(request.height, Some(240));
        assert_eq!(request.samples, Some(3));

        let params = request.resolve(8);
        assert_eq!(params.mode, RenderMode::Single);
        assert_eq!(params.workers, 1);
        assert_eq!(params.width, 800);
    }

    #[test]
    fn unusable_field_falls_back_only_for_itself() {
        let request: RenderRequest = serde_json::from_str(
            r#"{"width": [1], "height": "tall", "max_iter": null, "chunk_size": 32, "mode": 7}"#,
        )
        .unwrap();
        assert!(request.width.is_none());
        assert!(request.height.is_none());
        assert!(request.max_iter.is_none());
        assert!(request.mode.is_none());
        assert_eq!(request.chunk_size, Some(32));
    }
}

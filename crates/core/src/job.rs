//! Render job model and lifecycle state machine.
//!
//! A [`Job`] starts `Running` and moves exactly once to `Done` or `Failed`.
//! Progress only ever increases while the job runs.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::kernel::KernelParams;
use crate::types::{JobId, Pixel, Timestamp};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// How many workers a job gets: one, or one per host core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    Single,
    Multicore,
}

impl RenderMode {
    /// Parse a user-supplied mode. Anything other than `single` is multicore.
    pub fn parse(value: &str) -> Self {
        if value == "single" {
            Self::Single
        } else {
            Self::Multicore
        }
    }

    /// Worker count for this mode on a host with `host_cores` cores.
    pub fn worker_count(self, host_cores: usize) -> usize {
        match self {
            Self::Single => 1,
            Self::Multicore => host_cores.max(1),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Multicore => "multicore",
        }
    }
}

/// Job execution status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Running,
    Done,
    Failed,
}

impl JobStatus {
    /// `Done` and `Failed` accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    /// Inverse of [`JobStatus::as_str`], used when reading persisted rows.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "running" => Ok(Self::Running),
            "done" => Ok(Self::Done),
            "failed" => Ok(Self::Failed),
            other => Err(CoreError::Validation(format!("Unknown job status: {other}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Fully resolved parameters for a render job.
///
/// Values are assumed already clamped (see [`crate::request`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderParams {
    pub mode: RenderMode,
    pub width: u32,
    pub height: u32,
    pub max_iter: u32,
    pub samples: u32,
    pub chunk_size: u32,
    pub workers: usize,
}

impl RenderParams {
    /// The subset of parameters shipped to render workers.
    pub fn kernel_params(&self) -> KernelParams {
        KernelParams {
            width: self.width,
            height: self.height,
            max_iter: self.max_iter,
            samples: self.samples,
        }
    }

    /// Total number of pixels in the output buffer.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// The externally visible job metadata (everything except the pixel buffer).
///
/// This is also the payload handed to the persistence gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub id: JobId,
    pub status: JobStatus,
    pub progress: f64,
    pub created_at: Timestamp,
    pub mode: RenderMode,
    pub width: u32,
    pub height: u32,
    pub max_iter: u32,
    pub samples: u32,
    pub workers: usize,
    pub chunk_size: u32,
    pub duration_ms: Option<f64>,
    pub pixels_per_second: Option<f64>,
}

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

/// In-memory record for one render job.
#[derive(Debug, Clone)]
pub struct Job {
    id: JobId,
    params: RenderParams,
    created_at: Timestamp,
    updated_at: Timestamp,
    status: JobStatus,
    progress: f64,
    duration_ms: Option<f64>,
    pixels_per_second: Option<f64>,
    result: Option<Vec<Pixel>>,
}

impl Job {
    /// Create a running job with zero progress and no result.
    pub fn new(id: JobId, params: RenderParams, now: Timestamp) -> Self {
        Self {
            id,
            params,
            created_at: now,
            updated_at: now,
            status: JobStatus::Running,
            progress: 0.0,
            duration_ms: None,
            pixels_per_second: None,
            result: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn params(&self) -> &RenderParams {
        &self.params
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// The pixel buffer; present only once the job is `Done`.
    pub fn result(&self) -> Option<&[Pixel]> {
        self.result.as_deref()
    }

    /// Raise progress to `progress` if the job is running.
    ///
    /// Lower values and updates after a terminal transition are ignored,
    /// which keeps observed progress non-decreasing. Returns whether the
    /// stored value changed.
    pub fn record_progress(&mut self, progress: f64, now: Timestamp) -> bool {
        if self.status.is_terminal() || progress <= self.progress {
            return false;
        }
        self.progress = progress.min(1.0);
        self.updated_at = now;
        true
    }

    /// Transition `Running -> Done`, attaching the rendered buffer.
    pub fn complete(
        &mut self,
        result: Vec<Pixel>,
        elapsed: Duration,
        now: Timestamp,
    ) -> Result<(), CoreError> {
        self.ensure_running("complete")?;
        let expected = self.params.pixel_count();
        if result.len() != expected || expected == 0 {
            return Err(CoreError::Validation(format!(
                "Result buffer has {} pixels, expected {expected}",
                result.len()
            )));
        }

        self.status = JobStatus::Done;
        self.progress = 1.0;
        self.duration_ms = Some(round2(elapsed.as_secs_f64() * 1000.0));
        self.pixels_per_second = Some(round2(pixels_per_second(expected, elapsed)));
        self.result = Some(result);
        self.updated_at = now;
        Ok(())
    }

    /// Transition `Running -> Failed`.
    ///
    /// Progress is forced to 1.0 and no result is kept.
    pub fn fail(&mut self, elapsed: Duration, now: Timestamp) -> Result<(), CoreError> {
        self.ensure_running("fail")?;
        self.status = JobStatus::Failed;
        self.progress = 1.0;
        self.duration_ms = Some(round2(elapsed.as_secs_f64() * 1000.0));
        self.result = None;
        self.updated_at = now;
        Ok(())
    }

    pub fn snapshot(&self) -> JobSnapshot {
        JobSnapshot {
            id: self.id.clone(),
            status: self.status,
            progress: self.progress,
            created_at: self.created_at,
            mode: self.params.mode,
            width: self.params.width,
            height: self.params.height,
            max_iter: self.params.max_iter,
            samples: self.params.samples,
            workers: self.params.workers,
            chunk_size: self.params.chunk_size,
            duration_ms: self.duration_ms,
            pixels_per_second: self.pixels_per_second,
        }
    }

    fn ensure_running(&self, action: &str) -> Result<(), CoreError> {
        if self.status.is_terminal() {
            return Err(CoreError::Conflict(format!(
                "Cannot {action} job {} in terminal status {}",
                self.id,
                self.status.as_str()
            )));
        }
        Ok(())
    }
}

/// Pixel throughput; 0.0 when no measurable time elapsed.
pub fn pixels_per_second(pixels: usize, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        pixels as f64 / secs
    } else {
        0.0
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

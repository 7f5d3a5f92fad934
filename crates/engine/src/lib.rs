//! `fractal-engine`: the render job execution engine.
//!
//! A submitted job is split into row bands ([`fractal_core::partition`]),
//! rendered in parallel on a per-job worker pool ([`dispatcher`]), stitched
//! into one buffer as bands complete ([`aggregator`]), and tracked in the
//! shared [`registry`] until the [`supervisor`] moves it to a terminal state.

pub mod aggregator;
pub mod dispatcher;
pub mod error;
pub mod progress;
pub mod registry;
pub mod service;
pub mod supervisor;

pub use error::{EngineError, EngineResult};
pub use registry::{JobRegistry, JobView};
pub use service::{RenderEngine, SubmittedJob};

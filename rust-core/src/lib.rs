//! Soundwave - Ultrasonic Doppler Gesture Detection
//!
//! Plays an inaudible carrier tone, listens to its reflection off a moving
//! hand and classifies the Doppler spread into push/pull gestures.

// Suppress PyO3 non-local impl warnings (harmless macro-generated code)
#![cfg_attr(feature = "python", allow(non_local_definitions))]

pub mod config;
pub mod error;
pub mod gesture;
pub mod pipeline;
pub mod spectrum;

#[cfg(feature = "device")]
pub mod audio;

#[cfg(feature = "python")]
pub mod python_bindings;

pub use config::{load_config, DetectorConfig, ToneConfig};
pub use error::{AudioError, ConfigError, PipelineError};
pub use gesture::{BandEdge, BandwidthEstimate, GestureState, IndicatorStyle};
pub use pipeline::{AnalysisPipeline, AudioFrame, FrameSource, GestureFrame, LatestResult, ResultSink};
pub use spectrum::{PowerSpectrum, SpectralFrame};

#[cfg(feature = "device")]
pub use audio::GestureProcessor;

//! Error types for configuration, audio devices and the analysis pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Invalid detector configuration, rejected before any frame is processed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Sample rate must be positive")]
    ZeroSampleRate,

    #[error("Frame size must be even and at least 4 (got {0})")]
    InvalidFrameSize(usize),

    #[error("Window size must be at least 2 (got {0})")]
    WindowTooShort(usize),

    #[error("Carrier {carrier_hz} Hz is outside (0, {nyquist_hz}) Hz")]
    CarrierOutOfRange { carrier_hz: f64, nyquist_hz: f64 },

    #[error("Noise ring [{inner}, {outer}) is empty")]
    EmptyNoiseRing { inner: usize, outer: usize },

    #[error("{what} reaches {reach} bins from carrier bin {carrier_bin}, outside [0, {num_bins})")]
    OutsideSpectrum {
        what: &'static str,
        carrier_bin: usize,
        reach: usize,
        num_bins: usize,
    },

    #[error("Band search window must be at least 1 bin")]
    EmptySearchWindow,

    #[error("Band threshold fraction must be finite and positive (got {0})")]
    InvalidThresholdFraction(f64),

    #[error("Power floor must be finite (got {0})")]
    InvalidPowerFloor(f64),

    #[error("Tone amplitude must be in (0, 1] (got {0})")]
    InvalidToneAmplitude(f64),

    #[error("Failed to read config {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("Failed to parse config {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Audio device failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AudioError {
    #[error("No audio {0} device found")]
    NoDevice(&'static str),

    #[error("Failed to get device name: {0}")]
    DeviceName(String),

    #[error("Failed to query device configs: {0}")]
    DeviceConfig(String),

    #[error("Device does not support {0} Hz in i16 or f32")]
    UnsupportedSampleRate(u32),

    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to build stream: {0}")]
    BuildStream(String),

    #[error("Failed to play stream: {0}")]
    PlayStream(String),

    #[error("Audio stream failed: {0}")]
    StreamFailed(String),
}

/// Errors raised while turning frames into gesture states
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Expected a frame of {expected} samples, got {actual}")]
    FrameLength { expected: usize, actual: usize },

    #[error("Expected a spectrum of {expected} bins, got {actual}")]
    SpectrumLength { expected: usize, actual: usize },

    #[error("FFT processing failed: {0}")]
    Fft(String),

    #[error("Frame source failed: {0}")]
    Source(#[from] AudioError),

    #[error("Analysis worker panicked")]
    WorkerPanicked,
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

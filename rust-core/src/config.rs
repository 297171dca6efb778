//! Detector configuration
//!
//! Every constant the analysis depends on lives here so it can be tuned per
//! device and overridden from a TOML file. `validate` is the single place
//! where invalid settings are rejected; nothing downstream re-checks them.

use crate::error::ConfigError;
use crate::gesture::bandwidth::carrier_bin;
use serde::Deserialize;
use std::path::Path;

/// Configuration for the full gesture detector
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DetectorConfig {
    /// Capture sample rate in Hz
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Samples per analysis frame (N); the spectrum has N/2 bins
    #[serde(default = "default_frame_size")]
    pub frame_size: usize,

    /// Frequency of the emitted ultrasonic tone in Hz
    #[serde(default = "default_carrier_hz")]
    pub carrier_hz: f64,

    /// First bin offset (inclusive) of the noise-floor ring
    #[serde(default = "default_noise_ring_inner")]
    pub noise_ring_inner: usize,

    /// Last bin offset (exclusive) of the noise-floor ring
    #[serde(default = "default_noise_ring_outer")]
    pub noise_ring_outer: usize,

    /// How many bins either side of the carrier are scanned for the band edge
    #[serde(default = "default_band_search_bins")]
    pub band_search_bins: usize,

    /// Fraction of the peak (above floor) below which a bin ends the band
    #[serde(default = "default_band_threshold_fraction")]
    pub band_threshold_fraction: f64,

    /// Half-bandwidth in bins that must be exceeded to report a gesture
    #[serde(default = "default_hysteresis_bins")]
    pub hysteresis_bins: usize,

    /// Lowest power reported for a bin, in dB; silent bins saturate here
    #[serde(default = "default_power_floor_db")]
    pub power_floor_db: f64,

    /// Capture ring buffer capacity, in frames
    #[serde(default = "default_ring_buffer_frames")]
    pub ring_buffer_frames: usize,

    #[serde(default)]
    pub tone: ToneConfig,
}

/// Reference tone playback settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ToneConfig {
    #[serde(default = "default_tone_enabled")]
    pub enabled: bool,

    /// Tone frequency; defaults to the carrier frequency
    #[serde(default)]
    pub frequency_hz: Option<f64>,

    /// Peak amplitude relative to full scale
    #[serde(default = "default_tone_amplitude")]
    pub amplitude: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            frame_size: default_frame_size(),
            carrier_hz: default_carrier_hz(),
            noise_ring_inner: default_noise_ring_inner(),
            noise_ring_outer: default_noise_ring_outer(),
            band_search_bins: default_band_search_bins(),
            band_threshold_fraction: default_band_threshold_fraction(),
            hysteresis_bins: default_hysteresis_bins(),
            power_floor_db: default_power_floor_db(),
            ring_buffer_frames: default_ring_buffer_frames(),
            tone: ToneConfig::default(),
        }
    }
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self {
            enabled: default_tone_enabled(),
            frequency_hz: None,
            amplitude: default_tone_amplitude(),
        }
    }
}

fn default_sample_rate() -> u32 { 44100 }
fn default_frame_size() -> usize { 2048 }
fn default_carrier_hz() -> f64 { 18000.0 }
fn default_noise_ring_inner() -> usize { 20 }
fn default_noise_ring_outer() -> usize { 70 }
fn default_band_search_bins() -> usize { 40 }
fn default_band_threshold_fraction() -> f64 { 0.3 }
fn default_hysteresis_bins() -> usize { 4 }
fn default_power_floor_db() -> f64 { -100.0 }
fn default_ring_buffer_frames() -> usize { 8 }
fn default_tone_enabled() -> bool { true }
fn default_tone_amplitude() -> f64 { 0.5 }

impl DetectorConfig {
    /// Check every invariant the pipeline relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        validate_frame_size(self.frame_size)?;

        let nyquist_hz = self.sample_rate as f64 / 2.0;
        if !(self.carrier_hz > 0.0 && self.carrier_hz < nyquist_hz) {
            return Err(ConfigError::CarrierOutOfRange {
                carrier_hz: self.carrier_hz,
                nyquist_hz,
            });
        }

        if self.noise_ring_inner >= self.noise_ring_outer {
            return Err(ConfigError::EmptyNoiseRing {
                inner: self.noise_ring_inner,
                outer: self.noise_ring_outer,
            });
        }
        if self.band_search_bins == 0 {
            return Err(ConfigError::EmptySearchWindow);
        }
        self.check_reach("noise ring", self.noise_ring_outer - 1)?;
        self.check_reach("band search", self.band_search_bins - 1)?;

        if !(self.band_threshold_fraction.is_finite() && self.band_threshold_fraction > 0.0) {
            return Err(ConfigError::InvalidThresholdFraction(self.band_threshold_fraction));
        }
        if !self.power_floor_db.is_finite() {
            return Err(ConfigError::InvalidPowerFloor(self.power_floor_db));
        }
        if !(self.tone.amplitude > 0.0 && self.tone.amplitude <= 1.0) {
            return Err(ConfigError::InvalidToneAmplitude(self.tone.amplitude));
        }

        Ok(())
    }

    fn check_reach(&self, what: &'static str, reach: usize) -> Result<(), ConfigError> {
        let carrier_bin = self.carrier_bin();
        let num_bins = self.num_bins();
        if reach > carrier_bin || carrier_bin + reach >= num_bins {
            return Err(ConfigError::OutsideSpectrum {
                what,
                carrier_bin,
                reach,
                num_bins,
            });
        }
        Ok(())
    }

    /// FFT bin nearest the carrier frequency
    pub fn carrier_bin(&self) -> usize {
        carrier_bin(self.carrier_hz, self.sample_rate, self.frame_size)
    }

    /// Number of bins in the power spectrum (N/2)
    pub fn num_bins(&self) -> usize {
        self.frame_size / 2
    }

    /// Width of one bin in Hz
    pub fn bin_hz(&self) -> f64 {
        self.sample_rate as f64 / self.frame_size as f64
    }

    /// Frequency actually emitted by the tone generator
    pub fn tone_frequency_hz(&self) -> f64 {
        self.tone.frequency_hz.unwrap_or(self.carrier_hz)
    }
}

/// Frame sizes must be even and at least 4
pub fn validate_frame_size(frame_size: usize) -> Result<(), ConfigError> {
    if frame_size < 4 || frame_size % 2 != 0 {
        return Err(ConfigError::InvalidFrameSize(frame_size));
    }
    Ok(())
}

/// Load and validate a TOML configuration file
pub fn load_config(path: &Path) -> Result<DetectorConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let config: DetectorConfig = toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    config.validate()?;
    log::info!("Loaded config from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = DetectorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.carrier_bin(), 836);
        assert_eq!(config.num_bins(), 1024);
        assert!((config.bin_hz() - 21.533).abs() < 1e-3);
        assert_eq!(config.tone_frequency_hz(), 18000.0);
    }

    #[test]
    fn test_rejects_zero_sample_rate() {
        let config = DetectorConfig { sample_rate: 0, ..Default::default() };
        assert_eq!(config.validate(), Err(ConfigError::ZeroSampleRate));
    }

    #[test]
    fn test_rejects_bad_frame_sizes() {
        for frame_size in [0, 1, 2, 3, 2047] {
            let config = DetectorConfig { frame_size, ..Default::default() };
            assert_eq!(config.validate(), Err(ConfigError::InvalidFrameSize(frame_size)));
        }
    }

    #[test]
    fn test_rejects_carrier_above_nyquist() {
        let config = DetectorConfig { carrier_hz: 23000.0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::CarrierOutOfRange { .. })));

        let config = DetectorConfig { carrier_hz: f64::NAN, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::CarrierOutOfRange { .. })));
    }

    #[test]
    fn test_rejects_ring_outside_spectrum() {
        // 21 kHz sits at bin 975; 975 + 69 runs past bin 1023
        let config = DetectorConfig { carrier_hz: 21000.0, ..Default::default() };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutsideSpectrum { what: "noise ring", .. })
        ));

        let config = DetectorConfig { frame_size: 256, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::OutsideSpectrum { .. })));
    }

    #[test]
    fn test_rejects_inverted_ring_and_thresholds() {
        let config = DetectorConfig {
            noise_ring_inner: 70,
            noise_ring_outer: 20,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyNoiseRing { .. })));

        let config = DetectorConfig { band_search_bins: 0, ..Default::default() };
        assert_eq!(config.validate(), Err(ConfigError::EmptySearchWindow));

        let config = DetectorConfig { band_threshold_fraction: 0.0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidThresholdFraction(_))));

        let config = DetectorConfig { power_floor_db: f64::NEG_INFINITY, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidPowerFloor(_))));
    }

    #[test]
    fn test_load_partial_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "band_threshold_fraction = 0.25\nhysteresis_bins = 6\n\n[tone]\nenabled = false\n"
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.band_threshold_fraction, 0.25);
        assert_eq!(config.hysteresis_bins, 6);
        assert!(!config.tone.enabled);
        assert_eq!(config.tone.amplitude, 0.5);
        assert_eq!(config.frame_size, 2048);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "frame_size = 3").unwrap();
        assert_eq!(load_config(file.path()), Err(ConfigError::InvalidFrameSize(3)));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "frame_size = \"big\"").unwrap();
        assert!(matches!(load_config(file.path()), Err(ConfigError::Parse { .. })));

        assert!(matches!(
            load_config(Path::new("/nonexistent/soundwave.toml")),
            Err(ConfigError::Read { .. })
        ));
    }
}

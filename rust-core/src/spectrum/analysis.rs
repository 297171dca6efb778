//! Per-frame power spectrum
//!
//! Combines the Hamming window with the FFT engine to turn one PCM frame
//! into N/2 power values in decibels.

use super::fft::FftEngine;
use super::window::WindowFunction;
use crate::config::validate_frame_size;
use crate::error::{PipelineError, PipelineResult};

/// Power per FFT bin in dB, index i at frequency `i * sample_rate / N`
#[derive(Debug, Clone, PartialEq)]
pub struct PowerSpectrum {
    power_db: Vec<f64>,
    bin_hz: f64,
}

impl PowerSpectrum {
    /// Wrap precomputed power values
    ///
    /// # Arguments
    /// * `power_db` - One value per bin, ascending frequency
    /// * `sample_rate` - Sample rate the frame was captured at
    /// * `frame_size` - Frame length N the bins were computed from
    pub fn from_power_db(power_db: Vec<f64>, sample_rate: u32, frame_size: usize) -> Self {
        Self {
            power_db,
            bin_hz: sample_rate as f64 / frame_size as f64,
        }
    }

    pub fn power_db(&self) -> &[f64] {
        &self.power_db
    }

    pub fn len(&self) -> usize {
        self.power_db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.power_db.is_empty()
    }

    /// Bin width in Hz
    pub fn bin_hz(&self) -> f64 {
        self.bin_hz
    }

    /// Centre frequency of a bin in Hz
    pub fn frequency_hz(&self, bin: usize) -> f64 {
        bin as f64 * self.bin_hz
    }

    /// `(frequency_khz, power_db)` pairs for plotting
    pub fn plot_points(&self) -> Vec<(f64, f64)> {
        self.power_db
            .iter()
            .enumerate()
            .map(|(i, &p)| (self.frequency_hz(i) / 1000.0, p))
            .collect()
    }

    /// Plot points inside `[min_khz, max_khz]`
    pub fn view(&self, min_khz: f64, max_khz: f64) -> Vec<(f64, f64)> {
        self.plot_points()
            .into_iter()
            .filter(|&(khz, _)| khz >= min_khz && khz <= max_khz)
            .collect()
    }
}

impl std::ops::Index<usize> for PowerSpectrum {
    type Output = f64;

    fn index(&self, bin: usize) -> &f64 {
        &self.power_db[bin]
    }
}

/// Windowed FFT power estimate for fixed-size PCM frames
pub struct SpectralFrame {
    frame_size: usize,
    sample_rate: u32,
    power_floor_db: f64,
    window: WindowFunction,
    fft_engine: FftEngine,
}

impl SpectralFrame {
    /// Create an analyzer for frames of `frame_size` samples
    ///
    /// `power_floor_db` is the value reported for bins whose magnitude is
    /// zero (or otherwise below the floor), so the output is always finite.
    pub fn new(frame_size: usize, sample_rate: u32, power_floor_db: f64) -> PipelineResult<Self> {
        validate_frame_size(frame_size)?;

        let mut window = WindowFunction::new();
        window.coefficients(frame_size)?;

        Ok(Self {
            frame_size,
            sample_rate,
            power_floor_db,
            window,
            fft_engine: FftEngine::new(frame_size),
        })
    }

    /// Compute the power spectrum of one frame
    ///
    /// power[i] = max(10*log10(|X_i|), floor), with |X_0| taken over the
    /// packed (DC, Nyquist) pair
    pub fn compute(&mut self, frame: &[i16]) -> PipelineResult<PowerSpectrum> {
        if frame.len() != self.frame_size {
            return Err(PipelineError::FrameLength {
                expected: self.frame_size,
                actual: frame.len(),
            });
        }

        let mut windowed = self.window.apply(frame)?;
        let packed = self.fft_engine.forward_packed(&mut windowed)?;

        let power_db = packed
            .chunks_exact(2)
            .map(|pair| {
                let magnitude = (pair[0] * pair[0] + pair[1] * pair[1]).sqrt();
                // f64::max discards NaN, and -inf from log10(0) loses to the floor
                (10.0 * magnitude.log10()).max(self.power_floor_db)
            })
            .collect();

        Ok(PowerSpectrum::from_power_db(power_db, self.sample_rate, self.frame_size))
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    pub fn num_bins(&self) -> usize {
        self.fft_engine.num_bins()
    }

    /// How many times the window table has been built
    pub fn window_builds(&self) -> usize {
        self.window.builds()
    }
}

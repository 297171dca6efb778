//! Doppler half-bandwidth around the carrier
//!
//! A hand moving towards the microphone spreads power above the carrier,
//! moving away spreads it below. The estimator measures how far each skirt
//! extends before dropping under a fraction of the peak height.

use crate::config::DetectorConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::spectrum::PowerSpectrum;
use std::ops::Range;

/// FFT bin nearest `carrier_hz`: round(carrier / sample_rate * N)
pub fn carrier_bin(carrier_hz: f64, sample_rate: u32, frame_size: usize) -> usize {
    (carrier_hz / sample_rate as f64 * frame_size as f64).round() as usize
}

/// Where a band scan ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandEdge {
    /// First offset whose power fell below the threshold
    Crossed(usize),
    /// No offset in the search window fell below the threshold
    NotFound,
}

impl BandEdge {
    /// Half-bandwidth in bins as the classifier sees it; a miss counts as 0
    pub fn bins(self) -> usize {
        match self {
            BandEdge::Crossed(i) => i,
            BandEdge::NotFound => 0,
        }
    }
}

/// Noise floor, peak height and skirt widths for one spectrum
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandwidthEstimate {
    pub noise_floor: f64,
    /// Carrier power above the noise floor
    pub peak: f64,
    pub left: BandEdge,
    pub right: BandEdge,
}

impl BandwidthEstimate {
    pub fn left_band(&self) -> usize {
        self.left.bins()
    }

    pub fn right_band(&self) -> usize {
        self.right.bins()
    }

    /// Whether the carrier stands above the noise floor at all
    pub fn tone_present(&self) -> bool {
        self.peak > 0.0
    }
}

/// Measures the carrier's Doppler skirt in a power spectrum
#[derive(Debug, Clone)]
pub struct BandwidthEstimator {
    carrier_bin: usize,
    num_bins: usize,
    noise_ring: Range<usize>,
    search_bins: usize,
    threshold_fraction: f64,
}

impl BandwidthEstimator {
    /// Build from a configuration; fails if the ring or search window
    /// would read outside the spectrum
    pub fn new(config: &DetectorConfig) -> PipelineResult<Self> {
        config.validate()?;

        Ok(Self {
            carrier_bin: config.carrier_bin(),
            num_bins: config.num_bins(),
            noise_ring: config.noise_ring_inner..config.noise_ring_outer,
            search_bins: config.band_search_bins,
            threshold_fraction: config.band_threshold_fraction,
        })
    }

    pub fn carrier_bin(&self) -> usize {
        self.carrier_bin
    }

    /// Mean power over the ring `carrier ± [inner, outer)`
    pub fn noise_floor(&self, power: &[f64]) -> f64 {
        let c = self.carrier_bin;
        let sum: f64 = self
            .noise_ring
            .clone()
            .map(|i| power[c - i] + power[c + i])
            .sum();
        sum / (2 * self.noise_ring.len()) as f64
    }

    /// Estimate noise floor, peak and both half-bandwidths
    pub fn estimate(&self, spectrum: &PowerSpectrum) -> PipelineResult<BandwidthEstimate> {
        if spectrum.len() != self.num_bins {
            return Err(PipelineError::SpectrumLength {
                expected: self.num_bins,
                actual: spectrum.len(),
            });
        }

        let power = spectrum.power_db();
        let c = self.carrier_bin;
        let noise_floor = self.noise_floor(power);
        let peak = power[c] - noise_floor;
        let threshold = self.threshold_fraction * peak;

        let scan = |bin_at: &dyn Fn(usize) -> usize| {
            (0..self.search_bins)
                .find(|&i| power[bin_at(i)] - noise_floor < threshold)
                .map_or(BandEdge::NotFound, BandEdge::Crossed)
        };
        let right = scan(&|i| c + i);
        let left = scan(&|i| c - i);

        Ok(BandwidthEstimate {
            noise_floor,
            peak,
            left,
            right,
        })
    }
}

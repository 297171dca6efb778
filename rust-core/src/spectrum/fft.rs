//! FFT engine using realfft for real-valued signals
//!
//! Produces the packed in-place layout of a real forward transform:
//! `[Re(X0), Re(X_{N/2}), Re(X1), Im(X1), ..., Re(X_{N/2-1}), Im(X_{N/2-1})]`

use crate::error::{PipelineError, PipelineResult};
use num_complex::Complex;
use realfft::{RealFftPlanner, RealToComplex};
use std::sync::Arc;

/// FFT engine for real-valued signals
pub struct FftEngine {
    /// FFT size (number of samples)
    fft_size: usize,

    /// Real FFT processor
    r2c: Arc<dyn RealToComplex<f64>>,

    /// Reusable output buffer (complex spectrum, N/2 + 1 bins)
    output_buffer: Vec<Complex<f64>>,
}

impl FftEngine {
    /// Create new FFT engine
    ///
    /// # Arguments
    /// * `fft_size` - FFT size (number of samples, even)
    pub fn new(fft_size: usize) -> Self {
        let mut planner = RealFftPlanner::<f64>::new();
        let r2c = planner.plan_fft_forward(fft_size);
        let output_buffer = r2c.make_output_vec();

        Self {
            fft_size,
            r2c,
            output_buffer,
        }
    }

    /// Forward transform into the packed layout
    ///
    /// # Arguments
    /// * `signal` - Exactly `fft_size` samples; used as scratch and left undefined
    ///
    /// # Returns
    /// `fft_size` values: N/2 interleaved (re, im) pairs, with the Nyquist
    /// real part stored in the imaginary slot of bin 0
    pub fn forward_packed(&mut self, signal: &mut [f64]) -> PipelineResult<Vec<f64>> {
        if signal.len() != self.fft_size {
            return Err(PipelineError::FrameLength {
                expected: self.fft_size,
                actual: signal.len(),
            });
        }

        self.r2c
            .process(signal, &mut self.output_buffer)
            .map_err(|e| PipelineError::Fft(e.to_string()))?;

        let half = self.fft_size / 2;
        let mut packed = Vec::with_capacity(self.fft_size);
        packed.push(self.output_buffer[0].re);
        packed.push(self.output_buffer[half].re);
        for c in &self.output_buffer[1..half] {
            packed.push(c.re);
            packed.push(c.im);
        }

        Ok(packed)
    }

    /// Get FFT size
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Number of packed (re, im) pairs, N/2
    pub fn num_bins(&self) -> usize {
        self.fft_size / 2
    }
}

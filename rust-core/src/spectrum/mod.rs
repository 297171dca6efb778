//! Spectral analysis with FFT

pub mod fft;
pub mod window;
pub mod analysis;

pub use fft::FftEngine;
pub use window::{apply_window, hamming, WindowFunction};
pub use analysis::{PowerSpectrum, SpectralFrame};

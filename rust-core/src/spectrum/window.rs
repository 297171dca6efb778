//! Hamming window for spectral analysis
//!
//! Applies the window to time-domain PCM frames before the FFT to reduce
//! spectral leakage around the carrier.

use crate::error::ConfigError;
use std::f64::consts::PI;
use std::sync::Arc;

/// Generate Hamming window coefficients
///
/// w[n] = 0.54 - 0.46*cos(2πn/(M-1)) for n = 0..M-1
///
/// # Arguments
/// * `length` - Number of samples (M), at least 2
pub fn hamming(length: usize) -> Result<Vec<f64>, ConfigError> {
    if length < 2 {
        return Err(ConfigError::WindowTooShort(length));
    }

    let m = length as f64;
    Ok((0..length)
        .map(|n| 0.54 - 0.46 * (2.0 * PI * n as f64 / (m - 1.0)).cos())
        .collect())
}

/// Memoized Hamming window keyed by size
///
/// The table is rebuilt only when a different size is requested. Callers get
/// a shared immutable buffer, so repeated requests for the same size return
/// the very same allocation.
#[derive(Debug, Default)]
pub struct WindowFunction {
    cached: Option<Arc<[f64]>>,
    builds: usize,
}

impl WindowFunction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Coefficients for a window of `size` samples
    pub fn coefficients(&mut self, size: usize) -> Result<Arc<[f64]>, ConfigError> {
        if let Some(table) = &self.cached {
            if table.len() == size {
                return Ok(Arc::clone(table));
            }
        }

        let table: Arc<[f64]> = hamming(size)?.into();
        self.builds += 1;
        log::debug!("Built Hamming window of {} samples", size);
        self.cached = Some(Arc::clone(&table));
        Ok(table)
    }

    /// Window a PCM frame: filtered[i] = sample[i] * w[i]
    pub fn apply(&mut self, frame: &[i16]) -> Result<Vec<f64>, ConfigError> {
        let window = self.coefficients(frame.len())?;
        Ok(apply_window(frame, &window))
    }

    /// Number of times a table has been computed
    pub fn builds(&self) -> usize {
        self.builds
    }
}

/// Multiply each sample by its window coefficient
pub fn apply_window(frame: &[i16], window: &[f64]) -> Vec<f64> {
    frame
        .iter()
        .zip(window.iter())
        .map(|(&s, &w)| s as f64 * w)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hamming_endpoints_and_center() {
        let window = hamming(161).unwrap();

        assert_eq!(window.len(), 161);
        assert!((window[0] - 0.08).abs() < 1e-12);
        assert!((window[160] - 0.08).abs() < 1e-12);
        assert!((window[80] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_short_windows() {
        assert_eq!(hamming(0), Err(ConfigError::WindowTooShort(0)));
        assert_eq!(hamming(1), Err(ConfigError::WindowTooShort(1)));

        let mut window = WindowFunction::new();
        assert!(window.coefficients(1).is_err());
        assert_eq!(window.builds(), 0);
    }

    #[test]
    fn test_smallest_window() {
        let window = hamming(2).unwrap();
        assert!((window[0] - 0.08).abs() < 1e-12);
        assert!((window[1] - 0.08).abs() < 1e-12);
    }

    #[test]
    fn test_cache_reuses_table() {
        let mut window = WindowFunction::new();

        let first = window.coefficients(2048).unwrap();
        let second = window.coefficients(2048).unwrap();

        assert_eq!(window.builds(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(&first[..], &second[..]);
    }

    #[test]
    fn test_cache_rebuilds_on_size_change() {
        let mut window = WindowFunction::new();

        window.coefficients(2048).unwrap();
        let small = window.coefficients(512).unwrap();
        assert_eq!(small.len(), 512);
        assert_eq!(window.builds(), 2);

        window.coefficients(2048).unwrap();
        assert_eq!(window.builds(), 3);
    }

    #[test]
    fn test_apply_window() {
        let mut window = WindowFunction::new();
        let frame = vec![1000i16; 101];
        let windowed = window.apply(&frame).unwrap();

        assert_eq!(windowed.len(), 101);
        assert!((windowed[50] - 1000.0).abs() < 1e-9);
        assert!((windowed[0] - 80.0).abs() < 1e-9);
        assert!((windowed[100] - 80.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn prop_window_is_symmetric(size in 2usize..4096) {
            let window = hamming(size).unwrap();
            prop_assert_eq!(window.len(), size);
            prop_assert!((window[0] - 0.08).abs() < 1e-9);
            prop_assert!((window[size - 1] - 0.08).abs() < 1e-9);
            for i in 0..size {
                prop_assert!((window[i] - window[size - 1 - i]).abs() < 1e-9);
            }
        }
    }
}

//! Python bindings for the threaded gesture processor

use pyo3::prelude::*;
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use crate::audio::GestureProcessor;
use crate::config::{load_config, DetectorConfig};
use super::frame_dict;
use std::path::PathBuf;

/// Capture, tone playback and analysis running on a Rust thread
///
/// Python only polls results (no per-sample boundary crossing)
#[pyclass(name = "GestureProcessor", unsendable)]
pub struct PyGestureProcessor {
    processor: GestureProcessor,
}

#[pymethods]
impl PyGestureProcessor {
    /// Create new gesture processor
    ///
    /// Args:
    ///     config_path: Optional TOML file overriding the defaults
    #[new]
    #[pyo3(signature = (config_path=None))]
    fn new(config_path: Option<PathBuf>) -> PyResult<Self> {
        let config = match config_path {
            Some(path) => load_config(&path).map_err(|e| PyValueError::new_err(e.to_string()))?,
            None => DetectorConfig::default(),
        };

        let processor = GestureProcessor::new(config)
            .map_err(|e| PyValueError::new_err(e.to_string()))?;

        Ok(Self { processor })
    }

    /// Start tone, capture and analysis
    ///
    /// Returns:
    ///     Input device name
    fn start(&mut self) -> PyResult<String> {
        self.processor
            .start()
            .map_err(|e| PyRuntimeError::new_err(e.to_string()))
    }

    /// Stop processing
    ///
    /// Returns:
    ///     Tuple of (frames, pushes, pulls) for the run
    fn stop(&mut self) -> PyResult<(u64, u64, u64)> {
        self.processor
            .stop()
            .map(|s| (s.frames, s.pushes, s.pulls))
            .map_err(|e| PyRuntimeError::new_err(e.to_string()))
    }

    /// Check if the analysis thread is running
    fn is_running(&self) -> bool {
        self.processor.is_running()
    }

    /// Get latest result
    ///
    /// Returns:
    ///     Dictionary with keys 'frequencies_khz', 'power_db', 'state',
    ///     'push_colors', 'pull_colors', 'sequence', or None if no new data
    fn get_results(&self, py: Python<'_>) -> PyResult<Option<PyObject>> {
        match self.processor.latest() {
            Some(frame) => {
                let dict = frame_dict(py, &frame.spectrum, frame.state)?;
                dict.set_item("sequence", frame.sequence)?;
                Ok(Some(dict.into()))
            }
            None => Ok(None),
        }
    }

    /// List available audio input devices
    #[staticmethod]
    fn list_devices() -> PyResult<Vec<String>> {
        GestureProcessor::list_devices()
            .map_err(|e| PyRuntimeError::new_err(e.to_string()))
    }
}

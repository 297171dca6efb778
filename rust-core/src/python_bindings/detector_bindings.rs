//! Python bindings for frame-at-a-time gesture detection

use pyo3::prelude::*;
use pyo3::exceptions::PyValueError;
use pyo3::types::PyDict;
use numpy::PyReadonlyArray1;
use crate::config::DetectorConfig;
use crate::pipeline::{AnalysisPipeline, AudioFrame};
use super::frame_dict;

/// Gesture detector fed with PCM frames from Python
#[pyclass(name = "GestureDetector")]
pub struct PyGestureDetector {
    pipeline: AnalysisPipeline,
}

#[pymethods]
impl PyGestureDetector {
    /// Create a new gesture detector
    ///
    /// Args:
    ///     sample_rate: Sample rate of the frames in Hz
    ///     frame_size: Samples per frame (even, at least 4)
    ///     carrier_hz: Frequency of the reference tone
    #[new]
    #[pyo3(signature = (sample_rate=44100, frame_size=2048, carrier_hz=18000.0))]
    fn new(sample_rate: u32, frame_size: usize, carrier_hz: f64) -> PyResult<Self> {
        let config = DetectorConfig {
            sample_rate,
            frame_size,
            carrier_hz,
            ..Default::default()
        };

        let pipeline = AnalysisPipeline::new(config)
            .map_err(|e| PyValueError::new_err(e.to_string()))?;

        Ok(Self { pipeline })
    }

    /// Analyze one frame
    ///
    /// Args:
    ///     samples: int16 numpy array of exactly frame_size samples
    ///
    /// Returns:
    ///     Dictionary with keys 'frequencies_khz', 'power_db', 'state',
    ///     'push_colors', 'pull_colors', 'left_band', 'right_band',
    ///     'noise_floor', 'peak'
    fn process<'py>(
        &mut self,
        py: Python<'py>,
        samples: PyReadonlyArray1<i16>,
    ) -> PyResult<&'py PyDict> {
        let frame = AudioFrame::new(samples.as_slice()?.to_vec());
        let analysis = self
            .pipeline
            .process(&frame)
            .map_err(|e| PyValueError::new_err(e.to_string()))?;

        let dict = frame_dict(py, &analysis.spectrum, analysis.state)?;
        dict.set_item("left_band", analysis.estimate.left_band())?;
        dict.set_item("right_band", analysis.estimate.right_band())?;
        dict.set_item("noise_floor", analysis.estimate.noise_floor)?;
        dict.set_item("peak", analysis.estimate.peak)?;

        Ok(dict)
    }

    /// Gesture of the last processed frame ('none', 'push' or 'pull')
    fn state(&self) -> &'static str {
        self.pipeline.state().as_str()
    }

    /// Forget the previous gesture
    fn reset(&mut self) {
        self.pipeline.reset();
    }

    /// FFT bin of the carrier tone
    fn carrier_bin(&self) -> usize {
        self.pipeline.config().carrier_bin()
    }
}

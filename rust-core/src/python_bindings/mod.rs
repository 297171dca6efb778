//! PyO3 bindings for Python integration

use pyo3::prelude::*;
use pyo3::types::PyDict;
use numpy::PyArray1;
use crate::gesture::{GestureState, IndicatorStyle};
use crate::spectrum::PowerSpectrum;

mod detector_bindings;
mod processor_bindings;

/// Python module definition
#[pymodule]
fn soundwave(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<detector_bindings::PyGestureDetector>()?;
    m.add_class::<processor_bindings::PyGestureProcessor>()?;

    Ok(())
}

/// Spectrum, state and label colours as a Python dict
fn frame_dict<'py>(
    py: Python<'py>,
    spectrum: &PowerSpectrum,
    state: GestureState,
) -> PyResult<&'py PyDict> {
    let dict = PyDict::new(py);
    let (frequencies, power): (Vec<f64>, Vec<f64>) = spectrum.plot_points().into_iter().unzip();
    let style = IndicatorStyle::for_state(state);

    dict.set_item("frequencies_khz", PyArray1::from_vec(py, frequencies))?;
    dict.set_item("power_db", PyArray1::from_vec(py, power))?;
    dict.set_item("state", state.as_str())?;
    dict.set_item("push_colors", (style.push.text.as_str(), style.push.background.as_str()))?;
    dict.set_item("pull_colors", (style.pull.text.as_str(), style.pull.background.as_str()))?;

    Ok(dict)
}

//! Doppler skirt estimation and gesture classification

pub mod bandwidth;
pub mod classifier;
pub mod display;

pub use bandwidth::{carrier_bin, BandEdge, BandwidthEstimate, BandwidthEstimator};
pub use classifier::{next_state, GestureClassifier, GestureState};
pub use display::{Color, IndicatorStyle, LabelStyle};

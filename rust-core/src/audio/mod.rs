//! Microphone capture and tone playback with cpal

pub mod input;
pub mod output;
pub mod buffer;
pub mod source;
pub mod tone;
pub mod processor;

pub use input::{AudioDeviceInfo, AudioInput, StreamHealth};
pub use output::ToneOutput;
pub use buffer::SampleRingBuffer;
pub use source::RingFrameSource;
pub use tone::ToneGenerator;
pub use processor::GestureProcessor;

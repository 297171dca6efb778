//! Sine oscillator for the ultrasonic reference tone

use std::f64::consts::TAU;

/// Phase-accumulating sine generator
#[derive(Debug, Clone)]
pub struct ToneGenerator {
    phase: f64,
    phase_step: f64,
    amplitude: f32,
}

impl ToneGenerator {
    /// # Arguments
    /// * `frequency_hz` - Tone frequency
    /// * `sample_rate` - Output sample rate in Hz
    /// * `amplitude` - Peak amplitude relative to full scale
    pub fn new(frequency_hz: f64, sample_rate: u32, amplitude: f32) -> Self {
        Self {
            phase: 0.0,
            phase_step: TAU * frequency_hz / sample_rate as f64,
            amplitude,
        }
    }

    /// Next mono sample
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let sample = self.amplitude * self.phase.sin() as f32;
        self.phase = (self.phase + self.phase_step) % TAU;
        sample
    }

    /// Fill an interleaved buffer, writing the same sample to every channel
    pub fn fill(&mut self, buffer: &mut [f32], channels: usize) {
        for frame in buffer.chunks_mut(channels.max(1)) {
            let sample = self.next_sample();
            frame.fill(sample);
        }
    }
}

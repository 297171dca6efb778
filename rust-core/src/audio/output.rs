//! Reference tone playback using cpal
//!
//! Plays the carrier tone on the speaker so hand reflections can be picked
//! up by the microphone

use super::input::AudioDeviceInfo;
use super::tone::ToneGenerator;
use crate::error::AudioError;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, Stream, StreamConfig};

/// Tone output stream
pub struct ToneOutput {
    stream: Stream,
    device_info: AudioDeviceInfo,
}

impl ToneOutput {
    /// Play a tone on the default output device
    ///
    /// # Arguments
    /// * `frequency_hz` - Tone frequency
    /// * `amplitude` - Peak amplitude relative to full scale
    pub fn from_default_device(frequency_hz: f64, amplitude: f32) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoDevice("output"))?;

        Self::from_device(device, frequency_hz, amplitude)
    }

    /// Play a tone on a specific device, at the device's own sample rate
    pub fn from_device(device: Device, frequency_hz: f64, amplitude: f32) -> Result<Self, AudioError> {
        let name = device
            .name()
            .map_err(|e| AudioError::DeviceName(e.to_string()))?;

        let config = device
            .default_output_config()
            .map_err(|e| AudioError::DeviceConfig(e.to_string()))?;

        let sample_rate = config.sample_rate().0;
        if frequency_hz >= sample_rate as f64 / 2.0 {
            return Err(AudioError::UnsupportedSampleRate(sample_rate));
        }
        if config.sample_format() != SampleFormat::F32 {
            return Err(AudioError::UnsupportedFormat(format!("{:?}", config.sample_format())));
        }

        let channels = config.channels();
        let device_info = AudioDeviceInfo {
            name,
            sample_rate,
            channels,
        };

        let stream_config: StreamConfig = config.into();
        let mut generator = ToneGenerator::new(frequency_hz, sample_rate, amplitude);
        let step = channels as usize;

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    generator.fill(data, step);
                },
                move |err| {
                    log::error!("Audio output error: {}", err);
                },
                None,
            )
            .map_err(|e| AudioError::BuildStream(e.to_string()))?;

        log::info!(
            "Playing {:.0} Hz tone on '{}' at {} Hz",
            frequency_hz,
            device_info.name,
            sample_rate
        );

        Ok(Self {
            stream,
            device_info,
        })
    }

    /// Start playing the tone
    pub fn start(&self) -> Result<(), AudioError> {
        self.stream
            .play()
            .map_err(|e| AudioError::PlayStream(e.to_string()))
    }

    /// Pause playback
    pub fn pause(&self) -> Result<(), AudioError> {
        self.stream
            .pause()
            .map_err(|e| AudioError::PlayStream(e.to_string()))
    }

    /// Get device information
    pub fn device_info(&self) -> &AudioDeviceInfo {
        &self.device_info
    }
}

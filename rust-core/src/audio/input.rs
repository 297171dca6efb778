//! Audio input capture using cpal
//!
//! Captures mono PCM at the detector's sample rate from the microphone

use super::buffer::SampleProducer;
use crate::error::AudioError;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, SampleRate, Stream, StreamConfig, SupportedStreamConfig};
use std::sync::{Arc, Mutex};

/// Audio device information
#[derive(Debug, Clone)]
pub struct AudioDeviceInfo {
    pub name: String,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Last error reported by a stream's error callback
///
/// Shared between the cpal callback and whoever reads frames, so a lost
/// device surfaces as an error instead of an endless wait.
#[derive(Debug, Clone, Default)]
pub struct StreamHealth {
    failure: Arc<Mutex<Option<String>>>,
}

impl StreamHealth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&self, message: String) {
        if let Ok(mut failure) = self.failure.lock() {
            if failure.is_none() {
                *failure = Some(message);
            }
        }
    }

    /// First failure seen, if any
    pub fn failure(&self) -> Option<String> {
        self.failure.lock().ok().and_then(|failure| failure.clone())
    }

    pub fn check(&self) -> Result<(), AudioError> {
        match self.failure() {
            Some(message) => Err(AudioError::StreamFailed(message)),
            None => Ok(()),
        }
    }
}

/// Audio input stream
pub struct AudioInput {
    stream: Stream,
    device_info: AudioDeviceInfo,
    health: StreamHealth,
}

impl AudioInput {
    /// Create audio input from default device
    ///
    /// # Arguments
    /// * `sample_rate` - Required capture rate in Hz
    /// * `producer` - Ring buffer producer for captured audio
    pub fn from_default_device(sample_rate: u32, producer: SampleProducer) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(AudioError::NoDevice("input"))?;

        Self::from_device(device, sample_rate, producer)
    }

    /// Create audio input from specific device
    pub fn from_device(device: Device, sample_rate: u32, producer: SampleProducer) -> Result<Self, AudioError> {
        let name = device
            .name()
            .map_err(|e| AudioError::DeviceName(e.to_string()))?;

        let config = select_input_config(&device, sample_rate)?;
        let channels = config.channels();
        let sample_format = config.sample_format();

        let device_info = AudioDeviceInfo {
            name,
            sample_rate,
            channels,
        };

        let stream_config: StreamConfig = config.into();
        let health = StreamHealth::new();

        // Wrap producer in Arc<Mutex> for thread-safe access
        let producer = Arc::new(Mutex::new(producer));
        let producer_clone = Arc::clone(&producer);
        let step = channels as usize;

        let error_health = health.clone();
        let err_fn = move |err: cpal::StreamError| {
            log::error!("Audio input error: {}", err);
            error_health.report(err.to_string());
        };

        // Multi-channel input is reduced to its first channel
        let stream = match sample_format {
            SampleFormat::I16 => device.build_input_stream(
                &stream_config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut prod) = producer_clone.lock() {
                        if step == 1 {
                            prod.write(data);
                        } else {
                            prod.write_iter(data.iter().step_by(step).copied());
                        }
                    }
                },
                err_fn,
                None,
            ),
            SampleFormat::F32 => device.build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut prod) = producer_clone.lock() {
                        prod.write_iter(data.iter().step_by(step).map(|&s| f32_to_i16(s)));
                    }
                },
                err_fn,
                None,
            ),
            other => return Err(AudioError::UnsupportedFormat(format!("{:?}", other))),
        }
        .map_err(|e| AudioError::BuildStream(e.to_string()))?;

        log::info!(
            "Opened input '{}' at {} Hz, {} channel(s), {:?}",
            device_info.name,
            sample_rate,
            channels,
            sample_format
        );

        Ok(Self {
            stream,
            device_info,
            health,
        })
    }

    /// Start capturing audio
    pub fn start(&self) -> Result<(), AudioError> {
        self.stream
            .play()
            .map_err(|e| AudioError::PlayStream(e.to_string()))
    }

    /// Pause audio capture
    pub fn pause(&self) -> Result<(), AudioError> {
        self.stream
            .pause()
            .map_err(|e| AudioError::PlayStream(e.to_string()))
    }

    /// Get device information
    pub fn device_info(&self) -> &AudioDeviceInfo {
        &self.device_info
    }

    /// Failure flag fed by the stream's error callback
    pub fn health(&self) -> StreamHealth {
        self.health.clone()
    }
}

/// Pick an i16 or f32 input config that runs at `sample_rate`, preferring
/// mono and i16
fn select_input_config(device: &Device, sample_rate: u32) -> Result<SupportedStreamConfig, AudioError> {
    let ranges: Vec<_> = device
        .supported_input_configs()
        .map_err(|e| AudioError::DeviceConfig(e.to_string()))?
        .filter(|c| matches!(c.sample_format(), SampleFormat::I16 | SampleFormat::F32))
        .filter(|c| c.min_sample_rate().0 <= sample_rate && c.max_sample_rate().0 >= sample_rate)
        .collect();

    ranges
        .iter()
        .min_by_key(|c| (c.channels() != 1, c.sample_format() != SampleFormat::I16, c.channels()))
        .map(|c| c.clone().with_sample_rate(SampleRate(sample_rate)))
        .ok_or(AudioError::UnsupportedSampleRate(sample_rate))
}

/// Convert a float sample in [-1, 1] to i16, saturating out-of-range input
pub fn f32_to_i16(sample: f32) -> i16 {
    (sample * i16::MAX as f32).round() as i16
}

/// List available audio input devices
pub fn list_input_devices() -> Result<Vec<AudioDeviceInfo>, AudioError> {
    let host = cpal::default_host();
    let mut devices = Vec::new();

    let device_iter = host
        .input_devices()
        .map_err(|e| AudioError::DeviceName(e.to_string()))?;

    for device in device_iter {
        if let Ok(name) = device.name() {
            if let Ok(config) = device.default_input_config() {
                devices.push(AudioDeviceInfo {
                    name,
                    sample_rate: config.sample_rate().0,
                    channels: config.channels(),
                });
            }
        }
    }

    Ok(devices)
}

//! Gesture processor - capture, tone and analysis on a Rust thread
//!
//! Keeps the whole hot loop in Rust; the display side only polls the latest
//! result.

use super::buffer::SampleRingBuffer;
use super::input::{list_input_devices, AudioInput};
use super::output::ToneOutput;
use super::source::RingFrameSource;
use crate::config::DetectorConfig;
use crate::error::{AudioError, PipelineError, PipelineResult};
use crate::pipeline::{AnalysisPipeline, GestureFrame, LatestResult, RunSummary};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Microphone → analysis worker → latest-result mailbox
pub struct GestureProcessor {
    config: DetectorConfig,

    /// Newest result published by the worker
    results: LatestResult,

    /// Audio input stream
    audio_input: Option<AudioInput>,

    /// Reference tone stream
    tone_output: Option<ToneOutput>,

    /// Analysis thread handle
    worker: Option<JoinHandle<PipelineResult<RunSummary>>>,

    /// Raised to ask the worker to finish its current frame and exit
    stop: Arc<AtomicBool>,
}

impl GestureProcessor {
    /// Create a processor; the configuration is validated here
    pub fn new(config: DetectorConfig) -> PipelineResult<Self> {
        config.validate()?;

        Ok(Self {
            config,
            results: LatestResult::new(),
            audio_input: None,
            tone_output: None,
            worker: None,
            stop: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Start the tone, capture and the analysis worker
    ///
    /// # Returns
    /// Name of the input device
    pub fn start(&mut self) -> PipelineResult<String> {
        if self.worker.is_some() {
            // Outcome of the previous run is already logged by stop()
            let _ = self.stop();
        }

        // Pipeline first so a bad config never opens a device
        let mut pipeline = AnalysisPipeline::new(self.config.clone())?;

        let capacity = self.config.frame_size * self.config.ring_buffer_frames.max(2);
        let (producer, consumer) = SampleRingBuffer::new(capacity).split();

        let input = AudioInput::from_default_device(self.config.sample_rate, producer)?;
        let device_name = input.device_info().name.clone();

        if self.config.tone.enabled {
            let tone = ToneOutput::from_default_device(
                self.config.tone_frequency_hz(),
                self.config.tone.amplitude as f32,
            )?;
            tone.start()?;
            self.tone_output = Some(tone);
        }

        input.start()?;

        self.stop.store(false, Ordering::SeqCst);
        let stop = Arc::clone(&self.stop);
        let mut source = RingFrameSource::new(consumer, self.config.frame_size, Arc::clone(&stop), input.health());
        let mut sink = self.results.clone();

        let handle = std::thread::Builder::new()
            .name("soundwave-analysis".into())
            .spawn(move || pipeline.run(&mut source, &mut sink, &stop))
            .map_err(|e| AudioError::StreamFailed(format!("failed to spawn analysis thread: {}", e)))?;

        self.audio_input = Some(input);
        self.worker = Some(handle);
        log::info!("Gesture detection started on '{}'", device_name);

        Ok(device_name)
    }

    /// Stop the worker after its current frame, then close the streams
    ///
    /// # Returns
    /// The worker's run summary, or the error that ended the run
    pub fn stop(&mut self) -> PipelineResult<RunSummary> {
        self.stop.store(true, Ordering::SeqCst);

        let outcome = match self.worker.take() {
            Some(handle) => handle.join().unwrap_or(Err(PipelineError::WorkerPanicked)),
            None => Ok(RunSummary::default()),
        };

        if let Some(input) = self.audio_input.take() {
            let _ = input.pause();
        }
        if let Some(tone) = self.tone_output.take() {
            let _ = tone.pause();
        }

        match &outcome {
            Ok(summary) => log::info!("Gesture detection stopped after {} frames", summary.frames),
            Err(e) => log::error!("Gesture detection ended with error: {}", e),
        }
        outcome
    }

    /// Whether the worker thread is alive
    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Get the latest result (None if nothing new since the last call)
    pub fn latest(&self) -> Option<GestureFrame> {
        self.results.take()
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// List available audio input devices
    pub fn list_devices() -> Result<Vec<String>, AudioError> {
        list_input_devices().map(|devices| devices.into_iter().map(|d| d.name).collect())
    }
}

impl Drop for GestureProcessor {
    fn drop(&mut self) {
        if self.worker.is_some() {
            let _ = self.stop();
        }
    }
}

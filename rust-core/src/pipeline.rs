//! Frame-by-frame gesture analysis
//!
//! One iteration: acquire frame → window + FFT → power spectrum →
//! Doppler bandwidth → classify → emit. The only state carried between
//! iterations is the classifier's previous gesture and the window cache.

use crate::config::DetectorConfig;
use crate::error::{AudioError, PipelineError, PipelineResult};
use crate::gesture::{BandwidthEstimate, BandwidthEstimator, GestureClassifier, GestureState};
use crate::spectrum::{PowerSpectrum, SpectralFrame};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// One block of mono signed 16-bit PCM
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFrame {
    samples: Vec<i16>,
}

impl AudioFrame {
    pub fn new(samples: Vec<i16>) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl From<Vec<i16>> for AudioFrame {
    fn from(samples: Vec<i16>) -> Self {
        Self::new(samples)
    }
}

/// Supplier of fixed-size frames
pub trait FrameSource {
    /// Block until the next full frame is available
    ///
    /// `Ok(None)` means the source is exhausted or was asked to stop while
    /// waiting. Errors are fatal for the run.
    fn next_frame(&mut self) -> Result<Option<AudioFrame>, AudioError>;
}

/// Consumer of per-frame results
///
/// Emission is fire-and-forget: sinks must not block the analysis loop.
pub trait ResultSink {
    fn emit(&mut self, spectrum: &PowerSpectrum, state: GestureState);
}

impl<F> ResultSink for F
where
    F: FnMut(&PowerSpectrum, GestureState),
{
    fn emit(&mut self, spectrum: &PowerSpectrum, state: GestureState) {
        self(spectrum, state)
    }
}

/// Result of one pipeline iteration
#[derive(Debug, Clone)]
pub struct FrameAnalysis {
    pub spectrum: PowerSpectrum,
    pub estimate: BandwidthEstimate,
    pub state: GestureState,
}

/// Latest emitted result, as handed to a display thread
#[derive(Debug, Clone)]
pub struct GestureFrame {
    /// Frame counter since the run started
    pub sequence: u64,
    pub spectrum: PowerSpectrum,
    pub state: GestureState,
}

/// Single-slot mailbox: each emit replaces the previous value
#[derive(Debug, Clone, Default)]
pub struct LatestResult {
    slot: Arc<Mutex<Option<GestureFrame>>>,
    sequence: u64,
}

impl LatestResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the newest result, leaving the slot empty
    pub fn take(&self) -> Option<GestureFrame> {
        if let Ok(mut guard) = self.slot.lock() {
            guard.take()
        } else {
            None
        }
    }

    /// Whether a result is waiting
    pub fn has_result(&self) -> bool {
        self.slot.lock().map(|guard| guard.is_some()).unwrap_or(false)
    }
}

impl ResultSink for LatestResult {
    fn emit(&mut self, spectrum: &PowerSpectrum, state: GestureState) {
        self.sequence += 1;
        if let Ok(mut guard) = self.slot.lock() {
            *guard = Some(GestureFrame {
                sequence: self.sequence,
                spectrum: spectrum.clone(),
                state,
            });
        }
    }
}

/// Counters for a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    /// Frames that entered `Push` from another state
    pub pushes: u64,
    /// Frames that entered `Pull` from another state
    pub pulls: u64,
}

/// Window → FFT → bandwidth → classify, one frame at a time
pub struct AnalysisPipeline {
    config: DetectorConfig,
    spectral: SpectralFrame,
    estimator: BandwidthEstimator,
    classifier: GestureClassifier,
}

impl AnalysisPipeline {
    /// Build a pipeline; invalid configuration is rejected here
    pub fn new(config: DetectorConfig) -> PipelineResult<Self> {
        config.validate()?;

        let spectral = SpectralFrame::new(config.frame_size, config.sample_rate, config.power_floor_db)?;
        let estimator = BandwidthEstimator::new(&config)?;
        let classifier = GestureClassifier::new(config.hysteresis_bins);

        Ok(Self {
            config,
            spectral,
            estimator,
            classifier,
        })
    }

    /// Run one full iteration on a frame
    pub fn process(&mut self, frame: &AudioFrame) -> PipelineResult<FrameAnalysis> {
        let spectrum = self.spectral.compute(frame.samples())?;
        let estimate = self.estimator.estimate(&spectrum)?;
        let state = self.classifier.classify(&estimate);

        Ok(FrameAnalysis {
            spectrum,
            estimate,
            state,
        })
    }

    /// Process frames until the source ends, fails, or `stop` is raised
    ///
    /// `stop` is checked between frames only, so a frame that was acquired
    /// is always classified and emitted. A source error ends the run and is
    /// returned to the caller.
    pub fn run<S, K>(&mut self, source: &mut S, sink: &mut K, stop: &AtomicBool) -> PipelineResult<RunSummary>
    where
        S: FrameSource + ?Sized,
        K: ResultSink + ?Sized,
    {
        let mut summary = RunSummary::default();
        let mut tone_present = true;

        while !stop.load(Ordering::SeqCst) {
            let frame = match source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(e) => {
                    log::error!("Frame source failed after {} frames: {}", summary.frames, e);
                    return Err(PipelineError::Source(e));
                }
            };

            let previous = self.classifier.state();
            let analysis = self.process(&frame)?;
            summary.frames += 1;

            if analysis.estimate.tone_present() != tone_present {
                tone_present = analysis.estimate.tone_present();
                if tone_present {
                    log::info!("Carrier tone detected again");
                } else {
                    log::warn!(
                        "Carrier not above noise floor (peak {:.1} dB); is the tone playing?",
                        analysis.estimate.peak
                    );
                }
            }

            if analysis.state != previous {
                match analysis.state {
                    GestureState::Push => summary.pushes += 1,
                    GestureState::Pull => summary.pulls += 1,
                    GestureState::None => {}
                }
                log::info!(
                    "Gesture {} -> {} (left {}, right {})",
                    previous,
                    analysis.state,
                    analysis.estimate.left_band(),
                    analysis.estimate.right_band()
                );
            }

            sink.emit(&analysis.spectrum, analysis.state);
        }

        log::debug!(
            "Analysis run finished: {} frames, {} pushes, {} pulls",
            summary.frames,
            summary.pushes,
            summary.pulls
        );
        Ok(summary)
    }

    /// Gesture reported for the last processed frame
    pub fn state(&self) -> GestureState {
        self.classifier.state()
    }

    /// Forget the previous gesture
    pub fn reset(&mut self) {
        self.classifier.reset();
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn window_builds(&self) -> usize {
        self.spectral.window_builds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::bandwidth::tests::skirt_spectrum;
    use std::collections::VecDeque;
    use std::f64::consts::PI;

    const CARRIER_AMPLITUDE: f64 = 8000.0;
    const SHIFT_AMPLITUDE: f64 = 3000.0;

    /// Carrier tone plus, for `shift_sign` != 0, nine reflections spread
    /// 20..180 Hz above (+1) or below (-1) the carrier
    fn doppler_frame(shift_sign: i32) -> AudioFrame {
        let config = DetectorConfig::default();
        let sr = config.sample_rate as f64;
        let samples = (0..config.frame_size)
            .map(|n| {
                let t = n as f64 / sr;
                let mut v = CARRIER_AMPLITUDE * (2.0 * PI * config.carrier_hz * t).sin();
                if shift_sign != 0 {
                    for k in 1..10 {
                        let f = config.carrier_hz + (shift_sign * k * 20) as f64;
                        v += SHIFT_AMPLITUDE * (2.0 * PI * f * t + k as f64).sin();
                    }
                }
                v.round() as i16
            })
            .collect();
        AudioFrame::new(samples)
    }

    struct ScriptedSource {
        frames: VecDeque<Result<Option<AudioFrame>, AudioError>>,
        calls: usize,
    }

    impl ScriptedSource {
        fn new(frames: Vec<Result<Option<AudioFrame>, AudioError>>) -> Self {
            Self {
                frames: frames.into(),
                calls: 0,
            }
        }
    }

    impl FrameSource for ScriptedSource {
        fn next_frame(&mut self) -> Result<Option<AudioFrame>, AudioError> {
            self.calls += 1;
            self.frames.pop_front().unwrap_or(Ok(None))
        }
    }

    fn classify_spectrum(
        estimator: &BandwidthEstimator,
        classifier: &mut GestureClassifier,
        spectrum: &PowerSpectrum,
    ) -> GestureState {
        let estimate = estimator.estimate(spectrum).unwrap();
        classifier.classify(&estimate)
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = DetectorConfig { frame_size: 1, ..Default::default() };
        assert!(matches!(AnalysisPipeline::new(config), Err(PipelineError::Config(_))));

        let config = DetectorConfig { sample_rate: 0, ..Default::default() };
        assert!(AnalysisPipeline::new(config).is_err());
    }

    #[test]
    fn test_synthetic_scenarios() {
        let config = DetectorConfig::default();
        let estimator = BandwidthEstimator::new(&config).unwrap();
        let mut classifier = GestureClassifier::new(config.hysteresis_bins);

        // Narrow peak
        let narrow = skirt_spectrum(1, 1);
        let estimate = estimator.estimate(&narrow).unwrap();
        assert!(estimate.left_band() <= 4 && estimate.right_band() <= 4);
        assert_eq!(classifier.classify(&estimate), GestureState::None);

        // Doppler upshift
        let up = skirt_spectrum(1, 7);
        assert_eq!(classify_spectrum(&estimator, &mut classifier, &up), GestureState::Push);

        // Reversal goes through None first
        let down = skirt_spectrum(7, 1);
        assert_eq!(classify_spectrum(&estimator, &mut classifier, &down), GestureState::None);
        assert_eq!(classify_spectrum(&estimator, &mut classifier, &down), GestureState::Pull);
    }

    #[test]
    fn test_pure_carrier_is_neutral() {
        let mut pipeline = AnalysisPipeline::new(DetectorConfig::default()).unwrap();
        let analysis = pipeline.process(&doppler_frame(0)).unwrap();

        assert_eq!(analysis.spectrum.len(), 1024);
        assert!(analysis.estimate.tone_present());
        assert!(analysis.estimate.left_band() <= 4);
        assert!(analysis.estimate.right_band() <= 4);
        assert_eq!(analysis.state, GestureState::None);
    }

    #[test]
    fn test_audio_gesture_sequence() {
        let mut pipeline = AnalysisPipeline::new(DetectorConfig::default()).unwrap();

        let up = pipeline.process(&doppler_frame(1)).unwrap();
        assert!(up.estimate.right_band() > 4);
        assert_eq!(up.state, GestureState::Push);

        let down = pipeline.process(&doppler_frame(-1)).unwrap();
        assert!(down.estimate.left_band() > 4);
        assert_eq!(down.state, GestureState::None);

        assert_eq!(pipeline.process(&doppler_frame(-1)).unwrap().state, GestureState::Pull);
        assert_eq!(pipeline.process(&doppler_frame(0)).unwrap().state, GestureState::None);
        assert_eq!(pipeline.window_builds(), 1);
    }

    #[test]
    fn test_silent_frames_do_not_produce_nan() {
        let mut pipeline = AnalysisPipeline::new(DetectorConfig::default()).unwrap();
        let analysis = pipeline.process(&AudioFrame::new(vec![0; 2048])).unwrap();

        assert!(analysis.spectrum.power_db().iter().all(|&p| p == -100.0));
        assert_eq!(analysis.estimate.noise_floor, -100.0);
        assert_eq!(analysis.estimate.peak, 0.0);
        assert!(!analysis.estimate.tone_present());
        assert_eq!(analysis.state, GestureState::None);
    }

    #[test]
    fn test_rejects_wrong_frame_length() {
        let mut pipeline = AnalysisPipeline::new(DetectorConfig::default()).unwrap();
        let result = pipeline.process(&AudioFrame::new(vec![0; 1000]));
        assert!(matches!(
            result,
            Err(PipelineError::FrameLength { expected: 2048, actual: 1000 })
        ));
        assert_eq!(pipeline.state(), GestureState::None);
    }

    #[test]
    fn test_run_emits_in_order() {
        let mut pipeline = AnalysisPipeline::new(DetectorConfig::default()).unwrap();
        let mut source = ScriptedSource::new(vec![
            Ok(Some(doppler_frame(0))),
            Ok(Some(doppler_frame(1))),
            Ok(Some(doppler_frame(-1))),
            Ok(Some(doppler_frame(-1))),
            Ok(Some(doppler_frame(0))),
        ]);
        let mut states = Vec::new();
        let mut sink = |spectrum: &PowerSpectrum, state: GestureState| {
            assert_eq!(spectrum.len(), 1024);
            states.push(state);
        };
        let stop = AtomicBool::new(false);

        let summary = pipeline.run(&mut source, &mut sink, &stop).unwrap();

        assert_eq!(
            states,
            vec![
                GestureState::None,
                GestureState::Push,
                GestureState::None,
                GestureState::Pull,
                GestureState::None,
            ]
        );
        assert_eq!(summary, RunSummary { frames: 5, pushes: 1, pulls: 1 });
    }

    #[test]
    fn test_run_stops_on_source_error() {
        let mut pipeline = AnalysisPipeline::new(DetectorConfig::default()).unwrap();
        let mut source = ScriptedSource::new(vec![
            Ok(Some(doppler_frame(1))),
            Err(AudioError::StreamFailed("device unplugged".into())),
            Ok(Some(doppler_frame(0))),
        ]);
        let mut emitted = 0;
        let mut sink = |_: &PowerSpectrum, _: GestureState| emitted += 1;
        let stop = AtomicBool::new(false);

        let result = pipeline.run(&mut source, &mut sink, &stop);

        assert!(matches!(
            result,
            Err(PipelineError::Source(AudioError::StreamFailed(_)))
        ));
        assert_eq!(emitted, 1);
        assert_eq!(source.calls, 2);
        assert_eq!(pipeline.state(), GestureState::Push);
    }

    #[test]
    fn test_stop_checked_between_frames() {
        let mut pipeline = AnalysisPipeline::new(DetectorConfig::default()).unwrap();
        let mut source = ScriptedSource::new((0..5).map(|_| Ok(Some(doppler_frame(1)))).collect());
        let stop = AtomicBool::new(false);
        let mut emitted = 0;
        let mut sink = |_: &PowerSpectrum, _: GestureState| {
            emitted += 1;
            if emitted == 2 {
                stop.store(true, Ordering::SeqCst);
            }
        };

        let summary = pipeline.run(&mut source, &mut sink, &stop).unwrap();

        assert_eq!(summary.frames, 2);
        assert_eq!(source.calls, 2);
        assert_eq!(pipeline.state(), GestureState::Push);
    }

    #[test]
    fn test_stop_before_start() {
        let mut pipeline = AnalysisPipeline::new(DetectorConfig::default()).unwrap();
        let mut source = ScriptedSource::new(vec![Ok(Some(doppler_frame(0)))]);
        let mut sink = LatestResult::new();
        let stop = AtomicBool::new(true);

        let summary = pipeline.run(&mut source, &mut sink, &stop).unwrap();
        assert_eq!(summary.frames, 0);
        assert_eq!(source.calls, 0);
        assert!(!sink.has_result());
    }

    #[test]
    fn test_latest_result_keeps_newest() {
        let mut pipeline = AnalysisPipeline::new(DetectorConfig::default()).unwrap();
        let mut source = ScriptedSource::new(vec![
            Ok(Some(doppler_frame(0))),
            Ok(Some(doppler_frame(1))),
        ]);
        let latest = LatestResult::new();
        let mut sink = latest.clone();
        let stop = AtomicBool::new(false);

        pipeline.run(&mut source, &mut sink, &stop).unwrap();

        let frame = latest.take().unwrap();
        assert_eq!(frame.sequence, 2);
        assert_eq!(frame.state, GestureState::Push);
        assert!(latest.take().is_none());
    }

    #[test]
    fn test_reset_clears_state() {
        let mut pipeline = AnalysisPipeline::new(DetectorConfig::default()).unwrap();
        pipeline.process(&doppler_frame(1)).unwrap();
        pipeline.reset();
        assert_eq!(pipeline.state(), GestureState::None);
        assert_eq!(pipeline.process(&doppler_frame(-1)).unwrap().state, GestureState::Pull);
    }
}

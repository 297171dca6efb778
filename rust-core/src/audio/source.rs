//! Frame source backed by the capture ring buffer

use super::buffer::SampleConsumer;
use super::input::StreamHealth;
use crate::error::AudioError;
use crate::pipeline::{AudioFrame, FrameSource};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Sleep between polls while waiting for samples
const POLL_INTERVAL: Duration = Duration::from_micros(500);

/// Assembles fixed-size frames from the capture ring buffer
///
/// Waiting for samples blocks the caller; a raised stop flag ends the wait
/// with `Ok(None)` and a failed stream ends it with an error.
pub struct RingFrameSource {
    consumer: SampleConsumer,
    frame_size: usize,
    stop: Arc<AtomicBool>,
    health: StreamHealth,
}

impl RingFrameSource {
    pub fn new(
        consumer: SampleConsumer,
        frame_size: usize,
        stop: Arc<AtomicBool>,
        health: StreamHealth,
    ) -> Self {
        Self {
            consumer,
            frame_size,
            stop,
            health,
        }
    }
}

impl FrameSource for RingFrameSource {
    fn next_frame(&mut self) -> Result<Option<AudioFrame>, AudioError> {
        let mut samples = vec![0i16; self.frame_size];
        let mut filled = 0;

        while filled < self.frame_size {
            self.health.check()?;
            if self.stop.load(Ordering::SeqCst) {
                return Ok(None);
            }

            let n = self.consumer.read(&mut samples[filled..]);
            filled += n;
            if n == 0 {
                std::thread::sleep(POLL_INTERVAL);
            }
        }

        Ok(Some(AudioFrame::new(samples)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::buffer::SampleRingBuffer;

    #[test]
    fn test_assembles_frames_across_writes() {
        let (mut producer, consumer) = SampleRingBuffer::new(64).split();
        let stop = Arc::new(AtomicBool::new(false));
        let mut source = RingFrameSource::new(consumer, 8, Arc::clone(&stop), StreamHealth::new());

        producer.write(&[1, 2, 3]);
        let writer = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(5));
            producer.write(&[4, 5, 6, 7, 8, 9]);
            producer
        });

        let frame = source.next_frame().unwrap().unwrap();
        assert_eq!(frame.samples(), &[1, 2, 3, 4, 5, 6, 7, 8]);
        let _producer = writer.join().unwrap();
    }

    #[test]
    fn test_stop_ends_wait() {
        let (_producer, consumer) = SampleRingBuffer::new(64).split();
        let stop = Arc::new(AtomicBool::new(false));
        let mut source = RingFrameSource::new(consumer, 8, Arc::clone(&stop), StreamHealth::new());

        let stopper = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(5));
            stop.store(true, Ordering::SeqCst);
        });

        assert_eq!(source.next_frame(), Ok(None));
        stopper.join().unwrap();
    }

    #[test]
    fn test_stream_failure_is_reported() {
        let (_producer, consumer) = SampleRingBuffer::new(64).split();
        let health = StreamHealth::new();
        let mut source = RingFrameSource::new(
            consumer,
            8,
            Arc::new(AtomicBool::new(false)),
            health.clone(),
        );

        health.report("device disconnected".into());
        assert_eq!(
            source.next_frame(),
            Err(AudioError::StreamFailed("device disconnected".into()))
        );
    }
}

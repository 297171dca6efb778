//! Lock-free ring buffer for captured PCM
//!
//! Carries i16 samples from the cpal callback thread to the analysis worker

use ringbuf::{HeapConsumer, HeapProducer, HeapRb};

/// Single-producer single-consumer sample buffer
pub struct SampleRingBuffer {
    producer: HeapProducer<i16>,
    consumer: HeapConsumer<i16>,
    capacity: usize,
}

impl SampleRingBuffer {
    /// Create new ring buffer with given capacity
    ///
    /// # Arguments
    /// * `capacity` - Buffer capacity in samples
    pub fn new(capacity: usize) -> Self {
        let rb = HeapRb::<i16>::new(capacity);
        let (producer, consumer) = rb.split();

        Self {
            producer,
            consumer,
            capacity,
        }
    }

    /// Split into producer and consumer ends
    pub fn split(self) -> (SampleProducer, SampleConsumer) {
        (
            SampleProducer {
                producer: self.producer,
                dropped: 0,
            },
            SampleConsumer {
                consumer: self.consumer,
                capacity: self.capacity,
            },
        )
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Writing end, owned by the capture callback
pub struct SampleProducer {
    producer: HeapProducer<i16>,
    dropped: u64,
}

impl SampleProducer {
    /// Write samples to buffer
    ///
    /// # Returns
    /// Number of samples written; the rest are dropped when the reader lags
    pub fn write(&mut self, samples: &[i16]) -> usize {
        let written = self.producer.push_slice(samples);
        self.dropped += (samples.len() - written) as u64;
        written
    }

    /// Write samples produced by an iterator (used for format conversion)
    pub fn write_iter<I: Iterator<Item = i16>>(&mut self, samples: I) -> usize {
        let mut written = 0;
        for sample in samples {
            if self.producer.push(sample).is_ok() {
                written += 1;
            } else {
                self.dropped += 1;
            }
        }
        written
    }

    pub fn free_len(&self) -> usize {
        self.producer.free_len()
    }

    /// Samples discarded because the buffer was full
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

/// Reading end, owned by the analysis worker
pub struct SampleConsumer {
    consumer: HeapConsumer<i16>,
    capacity: usize,
}

impl SampleConsumer {
    /// Read available samples into `buffer`
    ///
    /// # Returns
    /// Number of samples read (may be less than requested)
    pub fn read(&mut self, buffer: &mut [i16]) -> usize {
        self.consumer.pop_slice(buffer)
    }

    /// Check if buffer has n samples available
    pub fn has_data(&self, n: usize) -> bool {
        self.consumer.len() >= n
    }

    pub fn len(&self) -> usize {
        self.consumer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

//! Bounded hand-off queue between producer and consumer.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use image::RgbaImage;
use parking_lot::{Condvar, Mutex};
use thiserror::Error;

use super::control::ExitFlag;
use crate::catalog::{ObjectDescriptor, ObjectTable};
use crate::render::IndexBuffer;

// =============================================================================
// Frame
// =============================================================================

/// One rendered time sample, ready for display.
#[derive(Debug, Clone)]
pub struct Frame {
    /// UTC instant the frame depicts.
    pub timestamp: DateTime<Utc>,
    pub image: RgbaImage,
    /// Object index per pixel (`0` empty, `n` is object `n - 1`).
    pub index: IndexBuffer,
    pub objects: Arc<ObjectTable>,
}

impl Frame {
    /// Metadata of the object under a pixel, if any.
    pub fn object_at(&self, row: i64, col: i64) -> Option<&ObjectDescriptor> {
        self.index
            .get(row, col)
            .and_then(|value| self.objects.by_pixel_value(value))
    }
}

// =============================================================================
// Frame Queue
// =============================================================================

/// Why a push did not enqueue its frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("Frame queue is closed")]
    Closed,
    #[error("Exit requested while waiting for queue space")]
    Exiting,
}

/// Outcome of a timed pop.
#[derive(Debug)]
pub enum PopResult {
    Frame(Box<Frame>),
    /// Nothing arrived before the timeout.
    Timeout,
    /// The queue is closed and fully drained.
    Closed,
}

#[derive(Debug, Default)]
struct Inner {
    frames: VecDeque<Frame>,
    closed: bool,
}

/// Thread-safe bounded FIFO of frames.
///
/// The producer blocks while the queue is full; the consumer blocks (with a
/// timeout) while it is empty. Closing wakes everyone; frames already queued
/// stay poppable.
#[derive(Debug)]
pub struct FrameQueue {
    inner: Mutex<Inner>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: usize,
}

impl FrameQueue {
    /// Creates a queue holding at most `capacity` frames (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Mutex::new(Inner {
                frames: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.inner.lock().frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().frames.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    /// Appends a frame, waiting for space.
    ///
    /// While full, the exit flag is checked every `poll_interval`.
    ///
    /// # Errors
    ///
    /// [`QueueError::Closed`] if the queue is or becomes closed, and
    /// [`QueueError::Exiting`] if exit is requested while waiting.
    pub fn push(&self, frame: Frame, exit: &ExitFlag, poll_interval: Duration) -> Result<(), QueueError> {
        let mut inner = self.inner.lock();
        loop {
            if inner.closed {
                return Err(QueueError::Closed);
            }
            if inner.frames.len() < self.capacity {
                inner.frames.push_back(frame);
                self.not_empty.notify_one();
                return Ok(());
            }
            if exit.is_requested() {
                return Err(QueueError::Exiting);
            }
            self.not_full.wait_for(&mut inner, poll_interval);
        }
    }

    /// Removes the oldest frame without waiting.
    pub fn try_pop(&self) -> Option<Frame> {
        let frame = self.inner.lock().frames.pop_front();
        if frame.is_some() {
            self.not_full.notify_one();
        }
        frame
    }

    /// Removes the oldest frame, waiting up to `timeout` for one to arrive.
    pub fn pop_timeout(&self, timeout: Duration) -> PopResult {
        let deadline = Instant::now() + timeout;
        let mut inner = self.inner.lock();
        loop {
            if let Some(frame) = inner.frames.pop_front() {
                self.not_full.notify_one();
                return PopResult::Frame(Box::new(frame));
            }
            if inner.closed {
                return PopResult::Closed;
            }
            if self.not_empty.wait_until(&mut inner, deadline).timed_out() && inner.frames.is_empty() {
                return if inner.closed {
                    PopResult::Closed
                } else {
                    PopResult::Timeout
                };
            }
        }
    }

    /// Closes the queue and wakes every waiter.
    pub fn close(&self) {
        self.inner.lock().closed = true;
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const POLL: Duration = Duration::from_millis(5);

    fn frame(second: u32) -> Frame {
        Frame {
            timestamp: Utc.with_ymd_and_hms(2025, 7, 5, 0, 0, second).unwrap(),
            image: RgbaImage::new(2, 2),
            index: IndexBuffer::new(2),
            objects: Arc::new(ObjectTable::default()),
        }
    }

    fn second_of(result: PopResult) -> u32 {
        use chrono::Timelike;
        match result {
            PopResult::Frame(frame) => frame.timestamp.second(),
            other => panic!("expected frame, got {:?}", other),
        }
    }

    #[test]
    fn test_fifo_order() {
        let queue = FrameQueue::new(4);
        let exit = ExitFlag::new();
        for second in 0..3 {
            queue.push(frame(second), &exit, POLL).unwrap();
        }
        assert_eq!(queue.len(), 3);
        for second in 0..3 {
            assert_eq!(second_of(queue.pop_timeout(POLL)), second);
        }
        assert!(matches!(queue.pop_timeout(POLL), PopResult::Timeout));
    }

    #[test]
    fn test_full_queue_blocks_until_pop() {
        let queue = Arc::new(FrameQueue::new(1));
        let exit = ExitFlag::new();
        queue.push(frame(0), &exit, POLL).unwrap();

        let producer = {
            let queue = Arc::clone(&queue);
            let exit = exit.clone();
            std::thread::spawn(move || queue.push(frame(1), &exit, POLL))
        };

        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(queue.len(), 1);
        assert_eq!(second_of(queue.pop_timeout(POLL)), 0);

        producer.join().unwrap().unwrap();
        assert_eq!(second_of(queue.pop_timeout(Duration::from_secs(1))), 1);
    }

    #[test]
    fn test_exit_releases_blocked_producer() {
        let queue = Arc::new(FrameQueue::new(1));
        let exit = ExitFlag::new();
        queue.push(frame(0), &exit, POLL).unwrap();

        let producer = {
            let queue = Arc::clone(&queue);
            let exit = exit.clone();
            std::thread::spawn(move || queue.push(frame(1), &exit, POLL))
        };
        exit.request();
        assert_eq!(producer.join().unwrap(), Err(QueueError::Exiting));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_close_drains_then_reports_closed() {
        let queue = FrameQueue::new(4);
        let exit = ExitFlag::new();
        queue.push(frame(0), &exit, POLL).unwrap();
        queue.close();

        assert_eq!(queue.push(frame(1), &exit, POLL), Err(QueueError::Closed));
        assert_eq!(second_of(queue.pop_timeout(POLL)), 0);
        assert!(matches!(queue.pop_timeout(POLL), PopResult::Closed));
    }

    #[test]
    fn test_close_wakes_waiting_consumer() {
        let queue = Arc::new(FrameQueue::new(4));
        let consumer = {
            let queue = Arc::clone(&queue);
            std::thread::spawn(move || queue.pop_timeout(Duration::from_secs(10)))
        };
        std::thread::sleep(Duration::from_millis(20));
        queue.close();
        assert!(matches!(consumer.join().unwrap(), PopResult::Closed));
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let queue = FrameQueue::new(0);
        assert_eq!(queue.capacity(), 1);
        assert!(queue.try_pop().is_none());
    }

    #[test]
    fn test_object_at() {
        use crate::catalog::Catalog;
        use crate::elements::parse_element_set;
        use crate::render::Pixel;

        let record = parse_element_set(
            "iss",
            "1 25544U 98067A   25185.47485775  .00005492  00000+0  10282-3 0  9993",
            "2 25544  51.6344 221.3901 0002450 331.8120  28.2736 15.50368910517843",
        )
        .unwrap()
        .record;
        let catalog = Catalog::from_records(vec![record]);

        let mut frame = frame(0);
        frame.objects = Arc::clone(catalog.objects());
        frame.index.set(Pixel { row: 1, col: 1 }, 1);

        assert_eq!(frame.object_at(1, 1).unwrap().catalog_id, "25544");
        assert!(frame.object_at(0, 0).is_none());
        assert!(frame.object_at(5, 5).is_none());
    }
}

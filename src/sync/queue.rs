//! Bounded message queue
//!
//! Fixed-capacity FIFO shared by several producer tasks and one consumer.
//! Items are copied in and out; the internal lock is a critical section
//! held only for the slot copy, never across a wait.
//!
//! A caller that finds the queue full (or empty) is parked on the kernel
//! one tick at a time until the condition clears or its bound expires.
//! Parking goes through [`Kernel::delay_until`], so a waiting task yields
//! the processor instead of spinning.

use heapless::Deque;

use crate::config::QUEUE_LENGTH;
use crate::critical::is_isr_context;
use crate::cs_cell::CsCell;
use crate::error::{OsError, OsResult};
use crate::message::Message;
use crate::port::Kernel;
use crate::time::ticks_between;
use crate::types::OsTick;

/// Queue carrying [`Message`] records between the tasks
pub type MessageQueue = Queue<Message, QUEUE_LENGTH>;

/// Fixed-capacity FIFO with bounded blocking on both ends
pub struct Queue<T, const N: usize> {
    slots: CsCell<Deque<T, N>>,
}

impl<T, const N: usize> Queue<T, N> {
    /// Create an empty queue
    ///
    /// `const` so the queue can live in a `static` built once at start-up.
    pub const fn new() -> Self {
        Queue {
            slots: CsCell::new(Deque::new()),
        }
    }

    /// Maximum number of queued items
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Current occupancy
    pub fn len(&self) -> usize {
        self.slots.read(|q| q.len())
    }

    pub fn is_empty(&self) -> bool {
        self.slots.read(|q| q.is_empty())
    }

    pub fn is_full(&self) -> bool {
        self.slots.read(|q| q.is_full())
    }

    /// Append `item` without waiting
    ///
    /// # Returns
    /// * `Ok(())` - Item stored behind every earlier item
    /// * `Err((OsError::QFull, item))` - No free slot; the item is handed back
    pub fn try_send(&self, item: T) -> Result<(), (OsError, T)> {
        self.slots
            .with(|q| q.push_back(item))
            .map_err(|item| (OsError::QFull, item))
    }

    /// Remove the oldest item without waiting
    ///
    /// # Returns
    /// * `Ok(item)` - Oldest unconsumed item
    /// * `Err(OsError::QEmpty)` - Nothing queued
    pub fn try_receive(&self) -> OsResult<T> {
        self.slots.with(|q| q.pop_front()).ok_or(OsError::QEmpty)
    }

    /// Enqueue `item`, waiting up to `timeout` ticks for a free slot
    ///
    /// # Arguments
    /// * `kernel` - Used to read the tick counter and park the caller
    /// * `item` - Copied into the queue on success, dropped on failure
    /// * `timeout` - Maximum ticks to wait (0 = single attempt, forced
    ///   inside an interrupt handler)
    ///
    /// # Returns
    /// * `Ok(())` - Item enqueued
    /// * `Err(OsError::Timeout)` - Still full when the bound expired
    /// * `Err(OsError::QFull)` - Full and `timeout` was 0
    pub fn send<K: Kernel>(&self, kernel: &K, item: T, timeout: OsTick) -> OsResult<()> {
        let mut item = item;
        let timeout = wait_bound(timeout);
        let start = kernel.tick_count();

        loop {
            match self.try_send(item) {
                Ok(()) => return Ok(()),
                Err((err, back)) => {
                    if timeout == 0 {
                        return Err(err);
                    }
                    item = back;
                }
            }

            if !park(kernel, start, timeout) {
                crate::debug!("queue send timed out after {} ticks", timeout);
                return Err(OsError::Timeout);
            }
        }
    }

    /// Dequeue the oldest item, waiting up to `timeout` ticks for one
    ///
    /// # Returns
    /// * `Ok(item)` - Oldest unconsumed item
    /// * `Err(OsError::Timeout)` - Still empty when the bound expired
    /// * `Err(OsError::QEmpty)` - Empty and `timeout` was 0
    pub fn receive<K: Kernel>(&self, kernel: &K, timeout: OsTick) -> OsResult<T> {
        let timeout = wait_bound(timeout);
        let start = kernel.tick_count();

        loop {
            match self.try_receive() {
                Ok(item) => return Ok(item),
                Err(err) if timeout == 0 => return Err(err),
                Err(_) => {}
            }

            if !park(kernel, start, timeout) {
                crate::trace!("queue receive timed out after {} ticks", timeout);
                return Err(OsError::Timeout);
            }
        }
    }
}

impl<T, const N: usize> Default for Queue<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Interrupt handlers may not park
#[inline]
fn wait_bound(timeout: OsTick) -> OsTick {
    if is_isr_context() {
        0
    } else {
        timeout
    }
}

/// Park the caller until the next tick
///
/// Returns `false` without parking once `timeout` ticks have passed since
/// `start`.
fn park<K: Kernel>(kernel: &K, start: OsTick, timeout: OsTick) -> bool {
    let now = kernel.tick_count();
    if ticks_between(start, now) >= timeout {
        return false;
    }
    kernel.delay_until(now.wrapping_add(1));
    true
}

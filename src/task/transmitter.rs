//! Periodic transmitter task
//!
//! Enqueues one numbered text message per release.

use crate::config::MAX_QUEUE_WAIT_TIME;
use crate::message::{Message, MessageId};
use crate::port::Kernel;
use crate::queue::MessageQueue;
use crate::types::TaskId;

use super::PeriodicTask;

pub struct PeriodicTransmitter<'a, K: Kernel> {
    queue: &'a MessageQueue,
    kernel: &'a K,
    counter: u32,
    dropped: u32,
}

impl<'a, K: Kernel> PeriodicTransmitter<'a, K> {
    pub fn new(queue: &'a MessageQueue, kernel: &'a K) -> Self {
        PeriodicTransmitter {
            queue,
            kernel,
            counter: 0,
            dropped: 0,
        }
    }

    /// Sequence number carried by the next message
    #[inline]
    pub fn counter(&self) -> u32 {
        self.counter
    }

    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

impl<'a, K: Kernel> PeriodicTask for PeriodicTransmitter<'a, K> {
    fn id(&self) -> TaskId {
        TaskId::PeriodicTransmitter
    }

    fn release(&mut self) {
        let msg = Message::from_fmt(MessageId::Periodic, format_args!("Periodic Msg {}", self.counter));
        if self.queue.send(self.kernel, msg, MAX_QUEUE_WAIT_TIME).is_err() {
            self.dropped = self.dropped.wrapping_add(1);
            crate::debug!("periodic message {} dropped", self.counter);
        }
        // The sequence advances on drops too, so gaps show lost messages
        self.counter = self.counter.wrapping_add(1);
    }
}

//! Queue consumer task
//!
//! Drains at most one message per release and forwards its text to the
//! output sink. An empty queue after the bounded wait means there is
//! nothing to forward this cycle.

use crate::config::MAX_QUEUE_WAIT_TIME;
use crate::port::{ByteSink, Kernel};
use crate::queue::MessageQueue;
use crate::types::TaskId;

use super::PeriodicTask;

pub struct UartReceiver<'a, K: Kernel, S: ByteSink> {
    queue: &'a MessageQueue,
    kernel: &'a K,
    sink: &'a S,
    forwarded: u32,
}

impl<'a, K: Kernel, S: ByteSink> UartReceiver<'a, K, S> {
    pub fn new(queue: &'a MessageQueue, kernel: &'a K, sink: &'a S) -> Self {
        UartReceiver {
            queue,
            kernel,
            sink,
            forwarded: 0,
        }
    }

    /// Messages written to the sink so far
    #[inline]
    pub fn forwarded(&self) -> u32 {
        self.forwarded
    }
}

impl<'a, K: Kernel, S: ByteSink> PeriodicTask for UartReceiver<'a, K, S> {
    fn id(&self) -> TaskId {
        TaskId::UartReceiver
    }

    fn release(&mut self) {
        if let Ok(msg) = self.queue.receive(self.kernel, MAX_QUEUE_WAIT_TIME) {
            crate::trace!("forwarding message {}", msg.id().tag());
            self.sink.put_bytes(msg.text_bytes());
            self.forwarded = self.forwarded.wrapping_add(1);
        }
    }
}

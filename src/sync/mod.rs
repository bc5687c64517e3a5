//! Inter-task communication
//!
//! Fixed-size messages and the bounded queue that carries them from the
//! producer tasks to the single consumer.

pub mod message;
pub mod queue;

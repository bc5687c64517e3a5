//! Button monitor tasks
//!
//! Each release samples one push-button input, compares it with the
//! previous sample and, on an edge, enqueues a text message naming the
//! button and the edge direction.

use crate::config::{BUTTON_1_INPUT, BUTTON_2_INPUT, MAX_QUEUE_WAIT_TIME};
use crate::critical::critical_section;
use crate::message::{Message, MessageId};
use crate::port::{GpioPort, Kernel};
use crate::queue::MessageQueue;
use crate::types::{Edge, Level, Line, TaskId};

use super::PeriodicTask;

/// Classify two consecutive samples
#[inline]
pub fn classify(previous: Level, current: Level) -> Edge {
    match (previous, current) {
        (Level::Low, Level::High) => Edge::Rising,
        (Level::High, Level::Low) => Edge::Falling,
        _ => Edge::NoChange,
    }
}

/// Previous-sample memory of one input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeDetector {
    previous: Option<Level>,
}

impl EdgeDetector {
    pub const fn new() -> Self {
        EdgeDetector { previous: None }
    }

    /// Feed the next sample
    ///
    /// The very first sample has nothing to compare with and reports
    /// [`Edge::NoChange`].
    pub fn update(&mut self, current: Level) -> Edge {
        let edge = match self.previous {
            Some(previous) => classify(previous, current),
            None => Edge::NoChange,
        };
        self.previous = Some(current);
        edge
    }

    #[inline]
    pub fn previous(&self) -> Option<Level> {
        self.previous
    }
}

/// Which of the two push buttons a monitor watches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    One,
    Two,
}

impl Button {
    pub fn task_id(self) -> TaskId {
        match self {
            Button::One => TaskId::ButtonMonitor1,
            Button::Two => TaskId::ButtonMonitor2,
        }
    }

    pub fn message_id(self) -> MessageId {
        match self {
            Button::One => MessageId::Button1,
            Button::Two => MessageId::Button2,
        }
    }

    pub fn input(self) -> Line {
        match self {
            Button::One => BUTTON_1_INPUT,
            Button::Two => BUTTON_2_INPUT,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            Button::One => 1,
            Button::Two => 2,
        }
    }
}

/// Edge-triggered input monitor
pub struct ButtonMonitor<'a, G: GpioPort, K: Kernel> {
    button: Button,
    input: Line,
    detector: EdgeDetector,
    gpio: &'a G,
    queue: &'a MessageQueue,
    kernel: &'a K,
    sent: u32,
    dropped: u32,
}

impl<'a, G: GpioPort, K: Kernel> ButtonMonitor<'a, G, K> {
    /// Monitor `button` on its configured input line
    pub fn new(button: Button, gpio: &'a G, queue: &'a MessageQueue, kernel: &'a K) -> Self {
        Self::with_input(button, button.input(), gpio, queue, kernel)
    }

    /// Monitor `button` on an explicit input line
    pub fn with_input(
        button: Button,
        input: Line,
        gpio: &'a G,
        queue: &'a MessageQueue,
        kernel: &'a K,
    ) -> Self {
        ButtonMonitor {
            button,
            input,
            detector: EdgeDetector::new(),
            gpio,
            queue,
            kernel,
            sent: 0,
            dropped: 0,
        }
    }

    /// Sample the input and classify it against the previous sample
    ///
    /// Read, compare and store happen with interrupts masked so an input
    /// interrupt cannot tear the comparison.
    pub fn sample(&mut self) -> Edge {
        let gpio = self.gpio;
        let input = self.input;
        let detector = &mut self.detector;
        critical_section(|_cs| detector.update(gpio.read(input)))
    }

    /// Messages successfully enqueued
    #[inline]
    pub fn sent(&self) -> u32 {
        self.sent
    }

    /// Edges whose message was dropped on a queue timeout
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    fn report(&mut self, edge: Edge) {
        let direction = match edge {
            Edge::Rising => "Rising",
            Edge::Falling => "Falling",
            Edge::NoChange => return,
        };

        let msg = Message::from_fmt(
            self.button.message_id(),
            format_args!("Button {} {}", self.button.number(), direction),
        );

        match self.queue.send(self.kernel, msg, MAX_QUEUE_WAIT_TIME) {
            Ok(()) => self.sent = self.sent.wrapping_add(1),
            Err(_err) => {
                self.dropped = self.dropped.wrapping_add(1);
                crate::debug!("button {} edge dropped: {}", self.button.number(), _err.code());
            }
        }
    }
}

impl<'a, G: GpioPort, K: Kernel> PeriodicTask for ButtonMonitor<'a, G, K> {
    fn id(&self) -> TaskId {
        self.button.task_id()
    }

    fn release(&mut self) {
        let edge = self.sample();
        self.report(edge);
    }
}

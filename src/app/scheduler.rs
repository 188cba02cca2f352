use std::collections::VecDeque;

use crate::app::Message;

/// Deferred messages, run one tick after they were scheduled.
///
/// Anything scheduled while a tick is running waits for the next one.
#[derive(Debug, Default)]
pub struct Scheduler {
    queue: VecDeque<Message>,
}

impl Scheduler {
    pub const fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    pub fn schedule(&mut self, msg: Message) {
        self.queue.push_back(msg);
    }

    /// Everything scheduled before this call, in order.
    pub fn take_due(&mut self) -> Vec<Message> {
        self.queue.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

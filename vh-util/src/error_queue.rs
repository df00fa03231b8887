use std::collections::VecDeque;

/// Diagnostic level, mirroring the C core's DEBUG..PANIC ladder
/// (spec.md section 7). ERROR and above unwind to the caller as
/// `Err`; WARNING and below are queued here instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warning,
}

#[derive(Debug, Clone)]
pub struct QueuedMessage {
    pub level: Level,
    pub message: String,
    pub location: &'static str,
}

/// Per-`CatalogContext` ring buffer of non-fatal diagnostics. Messages
/// at ERROR and above are never stored here -- they propagate as
/// `Err(CoreError)` instead. Bounded so a runaway warning loop cannot
/// grow a context's memory without limit.
#[derive(Debug)]
pub struct ErrorQueue {
    messages: VecDeque<QueuedMessage>,
    capacity: usize,
}

impl ErrorQueue {
    pub fn new(capacity: usize) -> Self {
        ErrorQueue {
            messages: VecDeque::with_capacity(capacity.min(256)),
            capacity,
        }
    }

    pub fn push(&mut self, level: Level, location: &'static str, message: impl Into<String>) {
        if self.messages.len() == self.capacity {
            self.messages.pop_front();
        }
        let message = message.into();
        match level {
            Level::Debug => tracing::debug!(location, %message),
            Level::Info => tracing::info!(location, %message),
            Level::Warning => tracing::warn!(location, %message),
        }
        self.messages.push_back(QueuedMessage {
            level,
            message,
            location,
        });
    }

    pub fn drain(&mut self) -> impl Iterator<Item = QueuedMessage> + '_ {
        self.messages.drain(..)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for ErrorQueue {
    fn default() -> Self {
        ErrorQueue::new(1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_queue_drops_oldest() {
        let mut q = ErrorQueue::new(2);
        q.push(Level::Info, "a", "first");
        q.push(Level::Info, "b", "second");
        q.push(Level::Info, "c", "third");
        let msgs: Vec<_> = q.drain().collect();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].message, "second");
        assert_eq!(msgs[1].message, "third");
    }
}

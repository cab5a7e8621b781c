//! Bounded in-memory feedback log. Oldest records are evicted once the
//! capacity is reached; nothing is persisted.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde::Serialize;

pub const FEEDBACK_CAPACITY: usize = 500;

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackRecord {
    pub message: String,
    pub contact: String,
    pub ts: i64,
}

impl FeedbackRecord {
    pub fn new(message: String, contact: String) -> Self {
        Self {
            message,
            contact,
            ts: chrono::Utc::now().timestamp(),
        }
    }
}

#[derive(Debug, Default)]
pub struct FeedbackLog {
    entries: Mutex<VecDeque<FeedbackRecord>>,
}

impl FeedbackLog {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(FEEDBACK_CAPACITY)),
        }
    }

    /// Appends a record, evicting the oldest at capacity.
    /// Returns the new total.
    pub fn push(&self, record: FeedbackRecord) -> usize {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if entries.len() == FEEDBACK_CAPACITY {
            entries.pop_front();
        }
        entries.push_back(record);
        entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_returns_the_running_total() {
        let log = FeedbackLog::new();
        assert_eq!(log.push(FeedbackRecord::new("first".into(), "".into())), 1);
        assert_eq!(log.push(FeedbackRecord::new("second".into(), "".into())), 2);
    }

    #[test]
    fn oldest_record_is_evicted_at_capacity() {
        let log = FeedbackLog::new();
        for i in 0..FEEDBACK_CAPACITY + 10 {
            log.push(FeedbackRecord::new(format!("msg {i}"), String::new()));
        }
        assert_eq!(log.len(), FEEDBACK_CAPACITY);

        let entries = log.entries.lock().unwrap();
        assert_eq!(entries.front().unwrap().message, "msg 10");
        assert_eq!(
            entries.back().unwrap().message,
            format!("msg {}", FEEDBACK_CAPACITY + 9)
        );
    }
}

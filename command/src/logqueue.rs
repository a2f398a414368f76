//! Buffered diagnostics for the bootstrap and compile phase.
//!
//! Builder configuration happens before the application's logger is fully
//! set up, so configuration-time diagnostics are buffered in a [`LogQueue`]
//! and emitted through `tracing` once a subscriber exists. Child queues are
//! merged into their parent during tree verification, so sub-tree problems
//! surface from a single top-level queue even when compilation fails early.

use tracing::Level;

/// One buffered log record: level, message, and structured fields.
#[derive(Debug, Clone)]
pub struct Record {
    pub level: Level,
    pub message: String,
    pub fields: Vec<(String, String)>,
}

/// FIFO queue of buffered log records.
#[derive(Debug, Default)]
pub struct LogQueue {
    records: Vec<Record>,
}

impl LogQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffers one record.
    pub fn push(
        &mut self,
        level: Level,
        message: impl Into<String>,
        fields: Vec<(String, String)>,
    ) {
        self.records.push(Record {
            level,
            message: message.into(),
            fields,
        });
    }

    /// Moves every record from `other` into this queue, preserving order.
    pub fn consume(&mut self, other: &mut LogQueue) {
        self.records.append(&mut other.records);
    }

    /// Buffered records, oldest first.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Emits every buffered record as a `tracing` event and drains the queue.
    pub fn flush(&mut self) {
        for record in self.records.drain(..) {
            let fields = record
                .fields
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join(" ");
            match record.level {
                Level::ERROR => tracing::error!(target: "happy::command", %fields, "{}", record.message),
                Level::WARN => tracing::warn!(target: "happy::command", %fields, "{}", record.message),
                Level::INFO => tracing::info!(target: "happy::command", %fields, "{}", record.message),
                Level::DEBUG => tracing::debug!(target: "happy::command", %fields, "{}", record.message),
                Level::TRACE => tracing::trace!(target: "happy::command", %fields, "{}", record.message),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consume_merges_in_order() {
        let mut parent = LogQueue::new();
        parent.push(Level::WARN, "first", vec![]);

        let mut child = LogQueue::new();
        child.push(
            Level::ERROR,
            "second",
            vec![("command".to_string(), "sub".to_string())],
        );

        parent.consume(&mut child);

        assert!(child.is_empty());
        assert_eq!(parent.len(), 2);
        assert_eq!(parent.records()[0].message, "first");
        assert_eq!(parent.records()[1].message, "second");
    }

    #[test]
    fn test_flush_drains_queue() {
        let mut queue = LogQueue::new();
        queue.push(Level::INFO, "hello", vec![]);
        queue.flush();
        assert!(queue.is_empty());
    }
}

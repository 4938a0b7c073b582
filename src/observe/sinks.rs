use std::sync::Arc;

use super::entry::ErrorEntry;

/// Receives reported failures. Implementations must not panic and have no way to fail.
pub trait ErrorSink: Send + Sync {
    fn record(&self, entry: &ErrorEntry);
}

/// Writes entries at ERROR level through the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ErrorSink for LogSink {
    fn record(&self, entry: &ErrorEntry) {
        log::error!(
            "{} {}: {} request={} additional={}",
            entry.method,
            entry.endpoint,
            entry.message,
            entry.request_data,
            entry.additional
        );
    }
}

/// Forwards every entry to each inner sink, in order.
#[derive(Default, Clone)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn ErrorSink>>,
}

impl FanoutSink {
    #[must_use]
    pub fn new(sinks: Vec<Arc<dyn ErrorSink>>) -> Self {
        Self { sinks }
    }

    #[must_use]
    pub fn with(mut self, sink: Arc<dyn ErrorSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl ErrorSink for FanoutSink {
    fn record(&self, entry: &ErrorEntry) {
        for s in &self.sinks {
            s.record(entry);
        }
    }
}

impl std::fmt::Debug for FanoutSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanoutSink").field("sinks", &self.sinks.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observe::RequestContext;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Memo(Mutex<Vec<String>>);

    impl ErrorSink for Memo {
        fn record(&self, entry: &ErrorEntry) {
            self.0.lock().push(entry.message.clone());
        }
    }

    #[test]
    fn fanout_reaches_every_sink() {
        let a = Arc::new(Memo::default());
        let b = Arc::new(Memo::default());
        let fan = FanoutSink::default().with(a.clone()).with(Arc::new(LogSink)).with(b.clone());
        assert_eq!(fan.len(), 3);
        fan.record(&ErrorEntry::new("boom", &RequestContext::new("GET", "/api/count")));
        assert_eq!(*a.0.lock(), vec!["boom".to_string()]);
        assert_eq!(*b.0.lock(), vec!["boom".to_string()]);
    }
}

//! Developer trace lines (query timings) with a thread-local capture sink, so tests can assert
//! on them without racing the global logger.

use std::cell::RefCell;

pub const TARGET: &str = "evgrid::devtrace";

thread_local! {
    static TL_SINK: RefCell<Option<Vec<String>>> = const { RefCell::new(None) };
}

/// Disables capture for the current thread on drop.
pub struct TraceCapture;

impl Drop for TraceCapture {
    fn drop(&mut self) {
        TL_SINK.with(|s| *s.borrow_mut() = None);
    }
}

/// Starts capturing trace lines emitted on this thread.
#[must_use]
pub fn capture() -> TraceCapture {
    TL_SINK.with(|s| *s.borrow_mut() = Some(Vec::new()));
    TraceCapture
}

pub fn write_str(msg: &str) {
    TL_SINK.with(|s| {
        if let Some(buf) = s.borrow_mut().as_mut() {
            buf.push(msg.to_owned());
        }
    });
}

/// Takes the captured lines, leaving the buffer empty. Empty when capture is off.
#[must_use]
pub fn drain() -> Vec<String> {
    TL_SINK.with(|s| s.borrow_mut().as_mut().map(std::mem::take).unwrap_or_default())
}

#[macro_export]
macro_rules! devtrace {
    ($($arg:tt)*) => {{
        let __s = format!($($arg)*);
        $crate::devlog::write_str(&__s);
        log::trace!(target: $crate::devlog::TARGET, "{}", __s);
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_only_while_enabled() {
        crate::devtrace!("before");
        let guard = capture();
        crate::devtrace!("find {} rows", 3);
        assert_eq!(drain(), vec!["find 3 rows".to_string()]);
        assert!(drain().is_empty());
        drop(guard);
        crate::devtrace!("after");
        assert!(drain().is_empty());
    }

    #[test]
    fn other_threads_are_not_captured() {
        let _g = capture();
        let child = std::thread::spawn(|| {
            crate::devtrace!("child");
            drain()
        })
        .join()
        .unwrap();
        assert!(child.is_empty());
    }
}

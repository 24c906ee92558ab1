use std::cell::RefCell;

/// Last-resort channel for protocol violations and broken callbacks.
///
/// Conversion outcomes never go through here; they always reach the
/// callback. This only carries programming errors: a token with no pending
/// handle, or a callback that panicked.
pub trait DiagnosticSink {
    fn report(&self, message: &str);
}

/// Emits diagnostics as `tracing` errors.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, message: &str) {
        tracing::error!(diagnostic = %message, "Callback protocol violation");
    }
}

/// Keeps diagnostics in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    messages: RefCell<Vec<String>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.borrow().is_empty()
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, message: &str) {
        tracing::error!(diagnostic = %message, "Callback protocol violation");
        self.messages.borrow_mut().push(message.to_string());
    }
}

use super::diagnostics::DiagnosticSink;
use super::registry::{CallbackRegistry, Token};
use crate::error::RasterError;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

/// Terminal state of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Host-owned bytes of the exported raster
    Done(Vec<u8>),
    /// The stage error the run ended with
    Failed(RasterError),
}

impl Completion {
    pub fn error(&self) -> RasterError {
        match self {
            Completion::Done(_) => RasterError::None,
            Completion::Failed(error) => *error,
        }
    }
}

/// Hands a terminal [`Completion`] to the callback registered under a token.
///
/// Success bytes are copied into a transient buffer sized exactly to the
/// byte count. The buffer lives only for the duration of the callback and is
/// released even if the callback panics.
#[derive(Clone)]
pub struct ResultMarshaller {
    registry: Rc<CallbackRegistry>,
    diagnostics: Rc<dyn DiagnosticSink>,
}

impl ResultMarshaller {
    pub fn new(registry: Rc<CallbackRegistry>, diagnostics: Rc<dyn DiagnosticSink>) -> Self {
        Self {
            registry,
            diagnostics,
        }
    }

    /// Obligation to deliver one completion for `token`.
    pub fn delivery(&self, token: Token) -> Delivery {
        Delivery {
            token,
            marshaller: self.clone(),
            delivered: false,
        }
    }

    pub fn deliver(&self, token: Token, completion: Completion) {
        let Some(handle) = self.registry.take(token) else {
            self.diagnostics
                .report(&format!("No pending callback for token {token}"));
            return;
        };

        let outcome = match completion {
            Completion::Done(host_bytes) => {
                let transient: Box<[u8]> = Box::from(host_bytes.as_slice());
                drop(host_bytes);
                tracing::debug!(%token, size = transient.len(), "Invoking callback with raster");
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    handle.invoke(&transient, RasterError::None)
                }));
                drop(transient);
                outcome
            }
            Completion::Failed(error) => {
                debug_assert!(error.is_error(), "failed completion without an error");
                tracing::debug!(%token, error = error.label(), "Invoking callback with error");
                panic::catch_unwind(AssertUnwindSafe(|| handle.invoke(&[], error)))
            }
        };

        if let Err(payload) = outcome {
            self.diagnostics.report(&format!(
                "Callback error for token {token}: {}",
                panic_message(&*payload)
            ));
        }
    }
}

/// Owned by the task that runs a request.
///
/// Dropped without [`Delivery::complete`], for instance when the task set
/// shuts down mid-request or the task never got spawned, it destroys the
/// pending handle without invoking the callback.
pub struct Delivery {
    token: Token,
    marshaller: ResultMarshaller,
    delivered: bool,
}

impl Delivery {
    pub fn token(&self) -> Token {
        self.token
    }

    pub fn complete(mut self, completion: Completion) {
        self.delivered = true;
        self.marshaller.deliver(self.token, completion);
    }
}

impl Drop for Delivery {
    fn drop(&mut self) {
        if self.delivered {
            return;
        }
        if let Some(handle) = self.marshaller.registry.take(self.token) {
            tracing::warn!(token = %self.token, "Conversion dropped before completion");
            drop(handle);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "callback panicked"
    }
}

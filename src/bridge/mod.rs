//! Native side of the host boundary.
//!
//! Callbacks are parked in a [`CallbackRegistry`] and only a [`Token`]
//! crosses into the pipeline. The [`ResultMarshaller`] resolves the token on
//! the one terminal transition and invokes the callback exactly once.

pub mod diagnostics;
pub mod marshal;
pub mod registry;

pub use diagnostics::{CollectingSink, DiagnosticSink, TracingSink};
pub use marshal::{Completion, Delivery, ResultMarshaller};
pub use registry::{BoxedCallback, CallbackHandle, CallbackRegistry, RegistryStats, Token};

use std::rc::Rc;

use tokio::sync::oneshot;
use tracing::Instrument;

use crate::bridge::{
    CallbackRegistry, DiagnosticSink, RegistryStats, ResultMarshaller, TracingSink,
};
use crate::error::{ConvertError, RasterError};
use crate::models::{ConversionRequest, ConvertOptions, RasterImage};
use crate::rendering::Host;
use crate::services::pipeline::StageExecutor;
use crate::services::validator;

/// Entry point: turns markup into raster bytes on a host.
///
/// Requests run on the current thread's [`tokio::task::LocalSet`]. Every
/// request gets its own pipeline run and callback handle; nothing is shared
/// between in-flight requests except the registry that parks the handles.
pub struct Converter<H> {
    executor: StageExecutor<H>,
    registry: Rc<CallbackRegistry>,
    marshaller: ResultMarshaller,
}

impl<H: Host + 'static> Converter<H> {
    pub fn new(host: H) -> Self {
        Self::with_diagnostics(host, Rc::new(TracingSink))
    }

    /// Create a converter that reports broken callbacks to `diagnostics`
    pub fn with_diagnostics(host: H, diagnostics: Rc<dyn DiagnosticSink>) -> Self {
        let registry = Rc::new(CallbackRegistry::new());
        Self {
            executor: StageExecutor::new(Rc::new(host)),
            marshaller: ResultMarshaller::new(Rc::clone(&registry), diagnostics),
            registry,
        }
    }

    pub fn host(&self) -> &H {
        self.executor.host()
    }

    pub fn stats(&self) -> RegistryStats {
        self.registry.stats()
    }

    /// Convert `markup` and hand the result to `callback` exactly once.
    ///
    /// The callback receives the raster bytes, the outcome code and `meta`.
    /// On failure the byte view is empty. The byte view is only valid during
    /// the callback; copy it to keep it.
    ///
    /// Returns before the callback fires, except when the markup is empty or
    /// starts with a NUL byte: then the callback runs synchronously with
    /// [`RasterError::NoInputData`] and the host is never engaged.
    ///
    /// # Panics
    ///
    /// Panics if called outside a [`tokio::task::LocalSet`] with valid input.
    /// The callback is then released without being invoked.
    ///
    /// If the task set shuts down before the request finishes, the callback
    /// is likewise released without being invoked.
    pub fn convert<M, F>(
        &self,
        markup: impl Into<Vec<u8>>,
        options: ConvertOptions,
        meta: M,
        callback: F,
    ) where
        M: 'static,
        F: FnOnce(&[u8], RasterError, M) + 'static,
    {
        let markup = markup.into();
        if let Err(error) = validator::validate(&markup) {
            tracing::debug!(error = error.label(), "Rejected request without dispatch");
            callback(&[], error, meta);
            return;
        }

        let token = self
            .registry
            .register(Box::new(move |bytes: &[u8], error: RasterError| {
                callback(bytes, error, meta)
            }));

        let span = tracing::debug_span!("conversion", %token, format = %options.format);
        let request = ConversionRequest::new(markup, options);
        let executor = self.executor.clone();
        // Moved into the task so a dropped task still releases the handle
        let delivery = self.marshaller.delivery(token);

        tokio::task::spawn_local(
            async move {
                let completion = executor.run(delivery.token(), request).await;
                delivery.complete(completion);
            }
            .instrument(span),
        );
    }

    /// Convert `markup` and wait for an owned copy of the result.
    ///
    /// Must be awaited inside a [`tokio::task::LocalSet`].
    pub async fn convert_async(
        &self,
        markup: impl Into<Vec<u8>>,
        options: ConvertOptions,
    ) -> Result<RasterImage, ConvertError> {
        let (tx, rx) = oneshot::channel();

        self.convert(markup, options, tx, |bytes, error, tx| {
            let result = if error.is_error() {
                Err(error)
            } else {
                Ok(RasterImage::from_bytes(bytes.to_vec()))
            };
            // Receiver gone means the caller stopped waiting
            let _ = tx.send(result);
        });

        // The sender is dropped uninvoked when the request is abandoned
        match rx.await {
            Ok(result) => Ok(result?),
            Err(_) => Err(ConvertError::Abandoned),
        }
    }
}

//! Common test infrastructure for svg2raster integration tests.
//!
//! Each test file compiles its own copy of this module, so items may appear
//! unused from the perspective of a single test file even though they're
//! used elsewhere.

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod assertions;
pub mod fixtures;
pub mod mock_host;

pub use assertions::*;
pub use mock_host::{FailAt, ScriptedHost};

use std::future::Future;
use tokio::sync::mpsc;
use tokio::task::LocalSet;

/// Run a future on a fresh local task set, as conversions require
pub async fn run_local<F: Future>(future: F) -> F::Output {
    LocalSet::new().run_until(future).await
}

/// One callback invocation as seen by a test
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<M> {
    pub bytes: Vec<u8>,
    pub error: svg2raster::RasterError,
    pub meta: M,
}

/// Channel that callbacks report into
pub fn outcomes<M>() -> (
    mpsc::UnboundedSender<Outcome<M>>,
    mpsc::UnboundedReceiver<Outcome<M>>,
) {
    mpsc::unbounded_channel()
}

/// Callback that copies its arguments into `tx`
pub fn reporter<M: 'static>(
    tx: mpsc::UnboundedSender<Outcome<M>>,
) -> impl FnOnce(&[u8], svg2raster::RasterError, M) + 'static {
    move |bytes: &[u8], error: svg2raster::RasterError, meta: M| {
        let _ = tx.send(Outcome {
            bytes: bytes.to_vec(),
            error,
            meta,
        });
    }
}

/// Receive exactly `n` outcomes, then check no further callback fires
pub async fn collect<M>(rx: &mut mpsc::UnboundedReceiver<Outcome<M>>, n: usize) -> Vec<Outcome<M>> {
    let mut received = Vec::with_capacity(n);
    for _ in 0..n {
        received.push(rx.recv().await.expect("callback channel closed early"));
    }
    settle().await;
    assert!(rx.try_recv().is_err(), "Callback fired more than expected");
    received
}

/// Give every spawned task a chance to run to completion
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

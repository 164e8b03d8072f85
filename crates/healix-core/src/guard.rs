//! Bounded model invocation.
//!
//! A model call runs on a short-lived worker thread and the caller waits at
//! most `timeout` for its answer. A timeout, an error, or a panic on the
//! worker all come back as `Unavailable`; nothing escapes to the caller.
//! A timed-out worker is left to finish on its own and its result is dropped.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use tracing::warn;

use healix_contracts::{
    error::HealixResult,
    prediction::{Unavailable, UnavailableReason},
};

/// Run `call` on a worker thread and wait up to `timeout` for its result.
pub(crate) fn invoke_bounded<T, F>(model: &str, timeout: Duration, call: F) -> Result<T, Unavailable>
where
    T: Send + 'static,
    F: FnOnce() -> HealixResult<T> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();

    let spawned = thread::Builder::new()
        .name(format!("healix-{model}"))
        .spawn(move || {
            // The receiver may already be gone after a timeout.
            let _ = tx.send(call());
        });

    if let Err(e) = spawned {
        return Err(Unavailable::new(
            UnavailableReason::ModelFailed,
            format!("could not start {model} worker: {e}"),
        ));
    }

    match rx.recv_timeout(timeout) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(Unavailable::new(UnavailableReason::ModelFailed, e.to_string())),
        Err(RecvTimeoutError::Timeout) => {
            warn!(model, timeout_ms = timeout.as_millis() as u64, "model invocation timed out");
            Err(Unavailable::new(
                UnavailableReason::TimedOut,
                format!("{model} model gave no answer within {} ms", timeout.as_millis()),
            ))
        }
        Err(RecvTimeoutError::Disconnected) => Err(Unavailable::new(
            UnavailableReason::ModelFailed,
            format!("{model} worker exited without a result"),
        )),
    }
}

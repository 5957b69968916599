use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use error::Error;

/// A way to stop an in-progress handshake from the owning connection.
/// Every callout to an external collaborator checks the token first, so a
/// cancelled handshake aborts at the next suspension point without
/// mutating session state any further.
#[derive(Clone, Default)]
pub struct Context {
    cancelled: Arc<AtomicBool>,
}

impl Context {
    pub fn new() -> Self {
        Context {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    // check returns an error when the context has been cancelled. Call at
    // every collaborator boundary.
    pub fn check(&self) -> Result<(), Error> {
        if self.is_cancelled() {
            Err(Error::ContextCancelled)
        } else {
            Ok(())
        }
    }
}

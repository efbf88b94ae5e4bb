use crate::ids::RequestId;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Per-request context passed to binding and to every handler.
///
/// Cloning is cheap; clones share the cancellation flag.
#[derive(Clone)]
pub struct Context {
    request_id: RequestId,
    deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

/// Handle that cancels the [`Context`] it was taken from.
#[derive(Clone)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    #[must_use]
    pub fn new() -> Self {
        Self::with_request_id(RequestId::new())
    }

    #[must_use]
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            deadline: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Reuse the caller's `x-request-id` header when it holds a valid id.
    #[must_use]
    pub fn from_header(header_value: Option<&str>) -> Self {
        Self::with_request_id(RequestId::from_header_or_new(header_value))
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle(Arc::clone(&self.cancelled))
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Fails when the context was cancelled or its deadline has passed.
    ///
    /// # Errors
    ///
    /// Returns a description of why the request must stop.
    pub fn ensure_active(&self) -> Result<(), String> {
        if self.is_cancelled() {
            return Err("context cancelled".to_string());
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                Err("context deadline exceeded".to_string())
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("request_id", &self.request_id)
            .field("deadline", &self.deadline)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_context_is_active() {
        assert!(Context::new().ensure_active().is_ok());
    }

    #[test]
    fn test_cancel_handle_is_shared_with_clones() {
        let ctx = Context::new();
        let clone = ctx.clone();
        ctx.cancel_handle().cancel();
        assert!(clone.is_cancelled());
        assert_eq!(clone.ensure_active(), Err("context cancelled".to_string()));
    }

    #[test]
    fn test_elapsed_deadline() {
        let ctx = Context::new().with_deadline(Instant::now());
        assert_eq!(
            ctx.ensure_active(),
            Err("context deadline exceeded".to_string())
        );
    }

    #[test]
    fn test_from_header_reuses_valid_id() {
        let id = RequestId::new();
        let ctx = Context::from_header(Some(&id.to_string()));
        assert_eq!(ctx.request_id(), id);
    }
}

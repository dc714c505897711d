//! Cooperative cancellation and progress reporting.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::api::EngineError;
use crate::raster::Channel;

/// Number of rows processed between cancellation checks in sequential loops.
pub(crate) const ROW_BATCH: usize = 32;

/// Shared flag that asks a running job to stop.
///
/// Clones share the same flag, so a UI thread can keep one clone and hand
/// another to the worker. The engine polls the flag between row batches and
/// returns [`EngineError::Cancelled`] once it is set; the caller's image is
/// never touched.
///
/// ```
/// use halftone_engine::CancelToken;
///
/// let token = CancelToken::new();
/// let worker_side = token.clone();
/// token.cancel();
/// assert!(worker_side.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// `Err(Cancelled)` once cancellation has been requested.
    #[inline]
    pub fn check(&self) -> Result<(), EngineError> {
        if self.is_cancelled() {
            Err(EngineError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Pipeline stage reported to progress callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Colour separation into five planes.
    Separating,
    /// Screening of one channel has started.
    Screening(Channel),
    /// Preview and result assembly.
    Compositing,
    /// The job finished successfully.
    Done,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_token_not_cancelled() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        assert_eq!(token.check(), Ok(()));
    }

    #[test]
    fn test_clones_share_flag() {
        let token = CancelToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
        assert_eq!(token.check(), Err(EngineError::Cancelled));
    }
}

// SPDX-FileCopyrightText: 2026 Livechat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cancellation handles: closure-backed and composite.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};

use livechat_core::{Cancellable, LiveChatError};

/// A handle that runs a closure on its first cancellation.
pub struct OnCancel<F> {
    action: Mutex<Option<F>>,
}

impl<F> OnCancel<F>
where
    F: FnOnce() -> Result<(), LiveChatError> + Send,
{
    pub fn new(action: F) -> Self {
        Self {
            action: Mutex::new(Some(action)),
        }
    }
}

impl<F> Cancellable for OnCancel<F>
where
    F: FnOnce() -> Result<(), LiveChatError> + Send,
{
    fn cancel(&self) -> Result<(), LiveChatError> {
        let action = self
            .action
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take();
        match action {
            Some(action) => action(),
            None => Ok(()),
        }
    }
}

/// Cancels a group of handles as one.
///
/// Every member is attempted even when an earlier one fails; failures are
/// folded into a single [`LiveChatError::Cancellation`]. A second `cancel`
/// is a no-op.
pub struct CompositeCancellable {
    handles: Vec<Box<dyn Cancellable>>,
    cancelled: AtomicBool,
}

impl CompositeCancellable {
    pub fn new(handles: Vec<Box<dyn Cancellable>>) -> Self {
        Self {
            handles,
            cancelled: AtomicBool::new(false),
        }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl FromIterator<Box<dyn Cancellable>> for CompositeCancellable {
    fn from_iter<I: IntoIterator<Item = Box<dyn Cancellable>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl Cancellable for CompositeCancellable {
    fn cancel(&self) -> Result<(), LiveChatError> {
        if self.cancelled.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        let total = self.handles.len();
        let failures: Vec<String> = self
            .handles
            .iter()
            .enumerate()
            .filter_map(|(index, handle)| match handle.cancel() {
                Ok(()) => None,
                Err(e) => {
                    warn!(index, total, error = %e, "subscription failed to cancel");
                    Some(e.to_string())
                }
            })
            .collect();

        if failures.is_empty() {
            debug!(total, "composite handle cancelled");
            Ok(())
        } else {
            Err(LiveChatError::Cancellation {
                failed: failures.len(),
                total,
                message: failures.join("; "),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    use super::*;

    fn counting(counter: &Arc<AtomicUsize>, fail: bool) -> Box<dyn Cancellable> {
        let counter = Arc::clone(counter);
        Box::new(OnCancel::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            if fail {
                Err(LiveChatError::Internal("refused".into()))
            } else {
                Ok(())
            }
        }))
    }

    #[test]
    fn on_cancel_runs_once() {
        let counter = Arc::new(AtomicUsize::new(0));
        let handle = counting(&counter, false);
        handle.cancel().unwrap();
        handle.cancel().unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn composite_attempts_every_member_when_second_fails() {
        let counters: Vec<_> = (0..5).map(|_| Arc::new(AtomicUsize::new(0))).collect();
        let composite: CompositeCancellable = counters
            .iter()
            .enumerate()
            .map(|(i, c)| counting(c, i == 1))
            .collect();

        let err = composite.cancel().expect_err("second member fails");
        match err {
            LiveChatError::Cancellation { failed, total, .. } => {
                assert_eq!(failed, 1);
                assert_eq!(total, 5);
            }
            other => panic!("unexpected error {other:?}"),
        }
        for c in &counters {
            assert_eq!(c.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn composite_second_cancel_is_noop() {
        let counter = Arc::new(AtomicUsize::new(0));
        let composite = CompositeCancellable::new(vec![counting(&counter, true)]);
        assert!(composite.cancel().is_err());
        assert!(composite.is_cancelled());
        assert!(composite.cancel().is_ok());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn empty_composite_cancels_cleanly() {
        let composite = CompositeCancellable::new(Vec::new());
        assert!(composite.is_empty());
        assert!(composite.cancel().is_ok());
    }
}

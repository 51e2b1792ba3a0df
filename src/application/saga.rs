use std::future::Future;
use std::pin::Pin;

type UndoFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
type UndoFn = Box<dyn FnOnce() -> UndoFuture + Send>;

/// Compensation list for a multi-step provisioning sequence.
///
/// Each step that creates external state pushes an undo action after
/// succeeding. On terminal failure the caller unwinds: undo actions run in
/// reverse order. Steps that merely found pre-existing state push nothing.
///
/// Unwinding is best-effort — an undo action is expected to log its own
/// failure and return; a failed undo never masks the original error.
#[derive(Default)]
pub struct Saga {
    undo: Vec<(&'static str, UndoFn)>,
}

impl Saga {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<F, Fut>(&mut self, label: &'static str, undo: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.undo.push((label, Box::new(move || Box::pin(undo()))));
    }

    pub fn len(&self) -> usize {
        self.undo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo.is_empty()
    }

    /// Run all registered undo actions, most recent first.
    pub async fn unwind(self) {
        for (label, undo) in self.undo.into_iter().rev() {
            tracing::warn!(step = label, "Rolling back provisioning step");
            undo().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn unwind_runs_in_reverse_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut saga = Saga::new();

        for step in ["first", "second", "third"] {
            let order = order.clone();
            saga.push(step, move || async move {
                order.lock().unwrap().push(step);
            });
        }

        assert_eq!(saga.len(), 3);
        saga.unwind().await;
        assert_eq!(*order.lock().unwrap(), vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn empty_saga_unwinds_without_effect() {
        let saga = Saga::new();
        assert!(saga.is_empty());
        saga.unwind().await;
    }
}

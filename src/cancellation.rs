use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Shared flag that voids deferred work once the owner goes away.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Run `work` only if the token is still live.
    pub fn run_unless_cancelled<T>(&self, work: impl FnOnce() -> T) -> Option<T> {
        if self.is_cancelled() {
            None
        } else {
            Some(work())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_cancellation() {
        let token = CancellationToken::new();
        let held_by_timer = token.clone();
        assert_eq!(held_by_timer.run_unless_cancelled(|| 7), Some(7));

        token.cancel();
        assert!(held_by_timer.is_cancelled());
        assert_eq!(held_by_timer.run_unless_cancelled(|| 7), None);
    }
}

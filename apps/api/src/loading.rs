use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared "request in flight" flag. At most one guard exists at a time.
#[derive(Debug, Clone, Default)]
pub struct LoadingFlag(Arc<AtomicBool>);

impl LoadingFlag {
    pub fn is_loading(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Raises the flag, or returns `None` if it is already raised.
    pub fn try_begin(&self) -> Option<LoadingGuard> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| LoadingGuard(self.0.clone()))
    }
}

/// Lowers the flag when dropped, whether the request succeeded or failed.
#[derive(Debug)]
pub struct LoadingGuard(Arc<AtomicBool>);

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_begin_is_refused_until_guard_drops() {
        let flag = LoadingFlag::default();
        let guard = flag.try_begin().expect("first begin");
        assert!(flag.is_loading());
        assert!(flag.try_begin().is_none());
        drop(guard);
        assert!(!flag.is_loading());
        assert!(flag.try_begin().is_some());
    }
}

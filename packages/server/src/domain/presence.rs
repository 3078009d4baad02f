//! Live connection counter.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

/// Number of upgraded WebSocket connections that are still being served,
/// whether or not they have joined a room.
#[derive(Debug, Default)]
pub struct LiveSessions {
    count: AtomicUsize,
}

impl LiveSessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one connection until the returned guard is dropped.
    pub fn enter(self: &Arc<Self>) -> LiveSessionGuard {
        self.count.fetch_add(1, Ordering::SeqCst);
        LiveSessionGuard {
            sessions: Arc::clone(self),
        }
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

/// Keeps its connection counted in `LiveSessions` while alive.
#[derive(Debug)]
pub struct LiveSessionGuard {
    sessions: Arc<LiveSessions>,
}

impl Drop for LiveSessionGuard {
    fn drop(&mut self) {
        self.sessions.count.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_counts_until_dropped() {
        // テスト項目: ガードが生きている間だけ接続が数えられる
        // given (前提条件):
        let sessions = Arc::new(LiveSessions::new());

        // when (操作):
        let first = sessions.enter();
        let second = sessions.enter();
        let while_both = sessions.count();
        drop(first);
        let after_one = sessions.count();
        drop(second);

        // then (期待する結果):
        assert_eq!(while_both, 2);
        assert_eq!(after_one, 1);
        assert_eq!(sessions.count(), 0);
    }
}

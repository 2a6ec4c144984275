//! Lifetime scope of a mounted view.
//!
//! A view creates one [`MountScope`] when it mounts and hands a [`ScopeToken`]
//! to every fetch it starts. Unmounting (or dropping the scope) invalidates all
//! tokens, and fetch completions check their token before touching view state.

use tokio::sync::watch;

#[derive(Debug)]
pub struct MountScope {
    tx: watch::Sender<bool>,
}

impl MountScope {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(true);
        Self { tx }
    }

    /// A token that stays active until this scope ends.
    pub fn token(&self) -> ScopeToken {
        ScopeToken {
            rx: self.tx.subscribe(),
        }
    }

    /// End the scope; outstanding completions become no-ops.
    pub fn cancel(&self) {
        self.tx.send_replace(false);
    }

    pub fn is_active(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for MountScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MountScope {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[derive(Debug, Clone)]
pub struct ScopeToken {
    rx: watch::Receiver<bool>,
}

impl ScopeToken {
    /// Whether the owning view is still mounted.
    pub fn is_active(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the owning scope ends.
    pub async fn cancelled(&mut self) {
        // A closed channel means the scope was dropped.
        let _ = self.rx.wait_for(|active| !*active).await;
    }
}

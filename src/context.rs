//! Shared client state.
//!
//! [`ClientContext`] is the injectable state the session manager and request
//! gateway share: the token store, the resolved-endpoint cache, the redirect
//! latch, and the navigator. Construct one per logical client; clones share
//! state. There are no globals, so tests run isolated instances side by
//! side.

use std::sync::Arc;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::guard::{Navigator, NoopNavigator};
use crate::session::store::{MemoryTokenStore, TokenStore};

/// Callback invoked when the session is cleared.
pub type LogoutHook = Arc<dyn Fn() + Send + Sync>;

/// Shared state for one logical client.
///
/// Cheaply cloneable; all clones observe the same token store, endpoint
/// cache, and redirect latch.
#[derive(Clone)]
pub struct ClientContext {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    store: Arc<dyn TokenStore>,
    navigator: RwLock<Arc<dyn Navigator>>,
    resolved_endpoint: RwLock<Option<String>>,
    redirect_armed: AtomicBool,
    logout_hooks: RwLock<Vec<LogoutHook>>,
}

impl ClientContext {
    /// Create a context over the given token store.
    ///
    /// Starts with a [`NoopNavigator`]; swap one in with
    /// [`set_navigator`](Self::set_navigator). The redirect latch starts
    /// armed.
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                store,
                navigator: RwLock::new(Arc::new(NoopNavigator)),
                resolved_endpoint: RwLock::new(None),
                redirect_armed: AtomicBool::new(true),
                logout_hooks: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Create a context over a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryTokenStore::new()))
    }

    /// The token store backing this context.
    pub fn store(&self) -> Arc<dyn TokenStore> {
        Arc::clone(&self.inner.store)
    }

    /// The current navigator.
    pub fn navigator(&self) -> Arc<dyn Navigator> {
        let guard = self
            .inner
            .navigator
            .read()
            .unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Install the navigator the client redirects through.
    pub fn set_navigator(&self, navigator: Arc<dyn Navigator>) {
        let mut guard = self
            .inner
            .navigator
            .write()
            .unwrap_or_else(|e| e.into_inner());
        *guard = navigator;
    }

    /// The cached resolved base URL, if discovery has run this session.
    pub fn resolved_endpoint(&self) -> Option<String> {
        self.inner
            .resolved_endpoint
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Cache a resolved base URL for the remainder of the session.
    pub fn set_resolved_endpoint(&self, base_url: impl Into<String>) {
        let mut guard = self
            .inner
            .resolved_endpoint
            .write()
            .unwrap_or_else(|e| e.into_inner());
        *guard = Some(base_url.into());
    }

    /// Re-arm the redirect latch. Called when a new token is stored.
    pub fn arm_redirect(&self) {
        self.inner.redirect_armed.store(true, Ordering::SeqCst);
    }

    /// Claim the one redirect for this authenticated session.
    ///
    /// Returns `true` for exactly one caller between arms, however many
    /// requests race into it.
    pub fn claim_redirect(&self) -> bool {
        self.inner.redirect_armed.swap(false, Ordering::SeqCst)
    }

    /// Register a callback fired when the session is cleared.
    pub fn on_logout(&self, hook: impl Fn() + Send + Sync + 'static) {
        let mut hooks = self
            .inner
            .logout_hooks
            .write()
            .unwrap_or_else(|e| e.into_inner());
        hooks.push(Arc::new(hook));
    }

    /// Fire the registered logout callbacks.
    ///
    /// Hooks run outside the registration lock, so a hook may register
    /// further hooks.
    pub fn notify_logout(&self) {
        let hooks: Vec<LogoutHook> = {
            let guard = self
                .inner
                .logout_hooks
                .read()
                .unwrap_or_else(|e| e.into_inner());
            guard.clone()
        };
        for hook in hooks {
            hook();
        }
    }
}

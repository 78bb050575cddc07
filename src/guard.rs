//! Route guarding.
//!
//! The crate never renders UI; it decides. A [`RouteGuard`] answers "may
//! this visitor enter a protected surface?" and, when the answer is no,
//! sends them to login through the context's [`Navigator`]. Denial is a
//! navigation event, not an error: nothing is surfaced to the user.

use tracing::debug;

use crate::session::SessionManager;

/// Where the host application sends the user when a session ends.
///
/// The embedding UI supplies the implementation (push a route, swap a
/// view, print a prompt). Implementations must be cheap and non-blocking.
pub trait Navigator: Send + Sync {
    fn redirect_to_login(&self);
}

/// Default navigator that goes nowhere. Useful headless and in tests
/// that only care about the decision.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn redirect_to_login(&self) {}
}

/// Outcome of a guard check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// A live session exists; render the protected surface.
    Allow,
    /// No live session; the user has already been sent to login.
    RedirectToLogin,
}

/// Gatekeeper for protected surfaces.
///
/// Consults the session on every check, so an expired or tampered token
/// is detected (and removed) at the moment the user tries to enter.
pub struct RouteGuard {
    session: SessionManager,
}

impl RouteGuard {
    pub fn new(session: SessionManager) -> Self {
        Self { session }
    }

    /// Decide whether the current visitor may enter a protected surface.
    ///
    /// On denial the navigator has already been invoked by the time this
    /// returns.
    pub async fn check(&self) -> GuardDecision {
        if self.session.is_authenticated().await {
            GuardDecision::Allow
        } else {
            debug!("no live session; redirecting to login");
            self.session.context().navigator().redirect_to_login();
            GuardDecision::RedirectToLogin
        }
    }

    /// The session this guard consults.
    pub fn session(&self) -> &SessionManager {
        &self.session
    }
}

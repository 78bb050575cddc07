//! Tasklight: authenticated client for the Tasklight to-do backend.
//!
//! This crate owns everything between "the user typed a password" and
//! "application code holds a decoded payload":
//!
//! - **Session**: JWT storage, local expiry checks, lazy cleanup of dead
//!   tokens ([`session::SessionManager`])
//! - **Gateway**: one HTTP pipeline that attaches the bearer token,
//!   translates every failure into a human-readable [`ApiError`], handles
//!   401s with a single forced logout, and rides out backend restarts via
//!   endpoint discovery ([`gateway::RequestGateway`])
//! - **API**: typed clients for the auth, tasks, and chat resources
//!   ([`api`])
//! - **Guard**: route-level session checks for embedding UIs ([`guard`])
//!
//! # Wiring
//!
//! Everything hangs off an explicit [`ClientContext`]; there are no
//! globals, so tests and multi-account embedders construct as many
//! isolated clients as they like:
//!
//! ```no_run
//! use tasklight::{ClientConfig, ClientContext, RequestGateway};
//! use tasklight::api::TasksApi;
//!
//! # async fn demo() -> tasklight::Result<()> {
//! let context = ClientContext::in_memory();
//! let gateway = RequestGateway::new(ClientConfig::from_env(), context);
//! let tasks = TasksApi::new(&gateway);
//! if let Some(user_id) = gateway.session().user_id().await {
//!     for task in tasks.list(&user_id).await? {
//!         println!("{} {}", if task.completed { "x" } else { " " }, task.title);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod gateway;
pub mod guard;
pub mod session;
pub mod types;

pub use config::ClientConfig;
pub use context::ClientContext;
pub use error::{ApiError, Result};
pub use gateway::RequestGateway;
pub use guard::{GuardDecision, Navigator, NoopNavigator, RouteGuard};
pub use session::{SessionManager, SessionState};
pub use session::store::{FileTokenStore, MemoryTokenStore, TokenStore};

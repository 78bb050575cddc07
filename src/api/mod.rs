//! Typed resource clients.
//!
//! Thin, stateless views over a [`RequestGateway`](crate::gateway::RequestGateway):
//! they own the paths and wire shapes of one backend resource each and
//! nothing else. Session handling, bearer injection, retries, and error
//! translation all happen below them in the gateway.

pub mod auth;
pub mod chat;
pub mod tasks;

pub use auth::AuthApi;
pub use chat::ChatApi;
pub use tasks::TasksApi;

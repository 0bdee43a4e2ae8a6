//! # tasko
//!
//! Client-side core for a services marketplace connecting customers
//! ("users") posting jobs and professionals ("pros") bidding on them.
//!
//! The crate owns the session and auth-state lifecycle of the client:
//!
//! - [`storage`]: string key/value persistence with a silent in-memory
//!   fallback when the state directory is unusable.
//! - [`session`]: the session store, covering login for either audience,
//!   logout, and the four persisted session keys.
//! - [`api`]: the backend HTTP client; attaches the bearer token to every
//!   outgoing request and observes unauthorized responses.
//! - [`idle`]: the inactivity monitor that forces logout and a redirect
//!   to the login route after the idle budget elapses.
//!
//! The backend REST API is an external collaborator; its request and
//! response shapes are treated as opaque JSON.

pub mod api;
pub mod cli;
pub mod idle;
pub mod session;
pub mod storage;

pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

/// Git commit recorded at build time, `unknown` outside a checkout.
pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

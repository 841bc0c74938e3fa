//! # gk-session
//!
//! Browser session management for Gatekey.
//!
//! Sessions are dual-tracked: an encrypted cookie carries the principal to
//! the browser, and a server-side row makes logout and expiry sweeps
//! authoritative. Logout also revokes every access and refresh token the
//! user holds.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod cookie;
pub mod error;
pub mod manager;

pub use cookie::{CookieCodec, SessionPrincipal};
pub use error::{SessionError, SessionResult};
pub use manager::SessionManager;

//! # gk-model
//!
//! Domain model for Gatekey.
//!
//! Entities are plain data with constructor-style builders; all persistence
//! goes through the provider traits in `gk-storage`.
//!
//! ## Modules
//!
//! - [`tenant`] - Tenants, keyed by email domain
//! - [`user`] - Users and their custom role grants
//! - [`client`] - Registered OAuth clients
//! - [`token`] - Authorization codes, access/refresh tokens, consents
//! - [`session`] - Browser sessions and MFA trusted devices
//! - [`login`] - Pending login flow records

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod client;
pub mod login;
pub mod session;
pub mod tenant;
pub mod token;
pub mod user;

pub use client::OAuthClient;
pub use login::{LoginStage, PendingLogin};
pub use session::{MfaTrustedDevice, Session};
pub use tenant::Tenant;
pub use token::{AccessToken, AuthorizationCode, RefreshToken, UserConsent};
pub use user::{ClientPermission, CustomRole, User};

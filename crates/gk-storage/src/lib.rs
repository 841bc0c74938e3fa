//! # gk-storage
//!
//! Storage abstraction traits and the in-memory backend for Gatekey.
//!
//! Each entity gets a provider trait; concrete backends implement them and
//! [`Repositories`] bundles one of each for the rest of the system.
//!
//! ## Provider Traits
//!
//! - [`TenantProvider`] - tenants, looked up by ID or email domain
//! - [`UserProvider`] - users, scoped to a tenant
//! - [`ClientProvider`] - OAuth clients by public `client_id`
//! - [`AuthorizationCodeProvider`] - single-use authorization codes
//! - [`AccessTokenProvider`] - access token revocation rows
//! - [`RefreshTokenProvider`] - opaque refresh tokens
//! - [`UserConsentProvider`] - recorded scope approvals
//! - [`SessionProvider`] - browser sessions
//! - [`TrustedDeviceProvider`] - MFA trusted devices
//! - [`PendingLoginProvider`] - multi-step login state

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod client;
pub mod error;
pub mod login;
pub mod memory;
pub mod repo;
pub mod session;
pub mod tenant;
pub mod token;
pub mod user;

pub use client::ClientProvider;
pub use error::{StorageError, StorageResult};
pub use login::PendingLoginProvider;
pub use repo::Repositories;
pub use session::{SessionProvider, TrustedDeviceProvider};
pub use tenant::TenantProvider;
pub use token::{
    AccessTokenProvider, AuthorizationCodeProvider, RefreshTokenProvider, UserConsentProvider,
};
pub use user::UserProvider;

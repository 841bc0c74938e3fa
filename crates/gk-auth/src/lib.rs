//! # gk-auth
//!
//! Authentication engine for Gatekey.
//!
//! Implements the multi-step login flow (password, forced password change,
//! MFA enrollment, MFA challenge), tenant resolution from email domains,
//! the password complexity policy, and the TOTP / backup code / trusted
//! device machinery.
//!
//! Login state between steps lives server-side as a pending login record;
//! clients only ever hold the opaque flow token.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod error;
pub mod login;
pub mod mfa;
pub mod policy;
pub mod tenant;

pub use error::{AuthError, AuthResult};
pub use login::{LoginFlow, LoginOutcome};
pub use mfa::{MfaEngine, MfaSetup};
pub use policy::validate_password;
pub use tenant::{email_domain, TenantResolver};

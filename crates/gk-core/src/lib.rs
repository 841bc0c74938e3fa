//! # gk-core
//!
//! Core configuration and shared service contracts for Gatekey.
//!
//! This crate holds the pieces every other crate agrees on:
//!
//! - [`config`] - Server configuration with sensible defaults
//! - [`notify`] - Outbound email notification contract

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod config;
pub mod notify;

pub use config::{Config, CookieConfig, ServerConfig, TokenTtlConfig};
pub use notify::{EmailMessage, EmailNotifier, LoggingEmailNotifier, NotifyError};

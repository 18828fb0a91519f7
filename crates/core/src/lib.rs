//! Marigold Core - Shared types library.
//!
//! This crate provides common types used across all Marigold components:
//! - `storefront` - Public-facing shop site
//! - `admin` - Internal administration panel
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be
//! used anywhere, including in unit tests that never touch a server.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, and phone numbers
//! - [`flow`] - The OTP verification state machine (signup, password reset,
//!   email change)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod flow;
pub mod types;

pub use flow::*;
pub use types::*;

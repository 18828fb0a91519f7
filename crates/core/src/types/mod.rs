//! Core types for Marigold.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod address_label;
pub mod email;
pub mod id;
pub mod phone;

pub use address_label::{AddressLabel, AddressLabelError};
pub use email::{Email, EmailError};
pub use id::*;
pub use phone::{Phone, PhoneError};

//! Marigold Admin library.
//!
//! This crate provides the admin-panel functionality as a library,
//! allowing it to be tested and reused.
//!
//! # Security
//!
//! This crate serves the privileged surface: customer blocking and catalog
//! management. It runs as its own binary with its own session cookie and
//! session table, so a storefront session can never satisfy an admin
//! request. Bind it to an internal interface; it is not meant to face the
//! internet.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

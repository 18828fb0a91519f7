//! Domain models for the storefront.
//!
//! These types represent validated domain objects separate from database
//! row types and from the form/template types in `routes`.

pub mod address;
pub mod session;
pub mod user;

pub use address::{Address, AddressInput};
pub use session::CurrentUser;
pub use user::User;

//! Domain models for the admin panel.

pub mod session;
pub mod user;

pub use session::{CurrentAdmin, Toast, ToastKind};
pub use user::{AdminAccount, Customer};

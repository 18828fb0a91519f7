//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions with `PostgreSQL` store)
//! 4. Blocked-account enforcement (protected routes only)

pub mod auth;
pub mod blocked;
pub mod session;

pub use auth::{
    OptionalAuth, RequireAuth, clear_current_user, clear_pending_action, load_pending_action,
    set_current_user, store_pending_action,
};
pub use blocked::enforce_not_blocked;
pub use session::create_session_layer;

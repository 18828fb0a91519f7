//! Session-stored types for admin authentication and flash messages.

use std::fmt;

use serde::{Deserialize, Serialize};

use marigold_core::{Email, UserId};

/// Session-stored admin identity.
///
/// Minimal data stored in the session to identify the logged-in admin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Admin's database ID.
    pub id: UserId,
    /// Admin's email address.
    pub email: Email,
    /// Admin's display name.
    pub full_name: String,
}

/// One-shot flash message carried through the session.
///
/// Set by a mutating handler before its redirect and consumed (removed) by
/// the next page render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Toast {
    /// Visual style of the message.
    pub kind: ToastKind,
    /// Human-readable message text.
    pub message: String,
}

impl Toast {
    /// Build a success toast.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Success,
            message: message.into(),
        }
    }

    /// Build an error toast.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            message: message.into(),
        }
    }
}

/// Toast flavor, rendered as a CSS class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    Success,
    Error,
}

impl fmt::Display for ToastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// Session keys for admin data.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";

    /// Key for the one-shot toast message.
    pub const TOAST: &str = "toast";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_kind_renders_as_css_class() {
        assert_eq!(ToastKind::Success.to_string(), "success");
        assert_eq!(ToastKind::Error.to_string(), "error");
    }

    #[test]
    fn test_toast_constructors() {
        let toast = Toast::success("Category added");
        assert_eq!(toast.kind, ToastKind::Success);
        assert_eq!(toast.message, "Category added");

        let toast = Toast::error("Category already exists");
        assert_eq!(toast.kind, ToastKind::Error);
    }
}

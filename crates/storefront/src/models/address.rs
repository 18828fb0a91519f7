//! Address domain types.

use chrono::{DateTime, Utc};

use marigold_core::{AddressId, AddressLabel, Phone, UserId};

/// A delivery address (domain type).
#[derive(Debug, Clone)]
pub struct Address {
    /// Unique address ID.
    pub id: AddressId,
    /// User who owns this address.
    pub user_id: UserId,
    /// Address category (Home / Office / Work).
    pub label: AddressLabel,
    /// Name of the person receiving deliveries at this address.
    pub recipient_name: String,
    /// Contact phone for deliveries.
    pub phone: Phone,
    /// Street address (house, street, area).
    pub address_line: String,
    /// City.
    pub city: String,
    /// State.
    pub state: String,
    /// 6-digit postal code.
    pub pincode: String,
    /// Whether this is the user's default address (at most one per user).
    pub is_default: bool,
    /// When the address was created.
    pub created_at: DateTime<Utc>,
    /// When the address was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Validated fields for creating or updating an address.
///
/// Built by the address form validator; the repository takes it as-is.
#[derive(Debug, Clone)]
pub struct AddressInput {
    pub label: AddressLabel,
    pub recipient_name: String,
    pub phone: Phone,
    pub address_line: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub is_default: bool,
}

//! Identifier helpers

use uuid::Uuid;

/// Generator for resource ids
pub struct ID;

impl ID {
    /// Fresh client-side id: 32 lowercase hex characters
    pub fn unique() -> String {
        Uuid::new_v4().simple().to_string()
    }
}

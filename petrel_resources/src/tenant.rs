//! Type-safe tenant identifiers.
//!
//! Every record in petrel is scoped to a tenant; carrying the identifier as
//! a validated newtype prevents mixing it up with the many other string ids
//! (event ids, upload ids, object keys) that flow through the pipelines.

use serde::{Deserialize, Serialize};
use snafu::Snafu;

/// Errors that can occur when parsing tenant identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
pub enum TenantIdError {
    #[snafu(display(
        "invalid tenant id: '{id}' - must be at least 1 character long, start with a lowercase letter, and contain only lowercase letters, numbers, hyphens, and underscores"
    ))]
    InvalidTenantId { id: String },
}

/// Validate a tenant ID.
///
/// Valid tenant IDs must:
/// - Be at least 1 character long
/// - Start with a lowercase letter [a-z]
/// - Contain only lowercase letters, numbers, hyphens (-), and underscores (_)
pub fn validate_tenant_id(id: &str) -> Result<(), TenantIdError> {
    let mut chars = id.chars();

    match chars.next() {
        Some(first) if first.is_ascii_lowercase() => {}
        _ => return Err(TenantIdError::InvalidTenantId { id: id.to_string() }),
    }

    for ch in chars {
        if !ch.is_ascii_lowercase() && !ch.is_ascii_digit() && ch != '-' && ch != '_' {
            return Err(TenantIdError::InvalidTenantId { id: id.to_string() });
        }
    }

    Ok(())
}

/// Type-safe identifier for a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// Create a new tenant identifier.
    pub fn new(id: impl Into<String>) -> Result<Self, TenantIdError> {
        let id = id.into();
        validate_tenant_id(&id)?;
        Ok(Self(id))
    }

    /// Create a new tenant identifier without validation.
    ///
    /// # Panics
    ///
    /// Panics if the tenant ID is invalid.
    pub fn new_unchecked(id: impl Into<String>) -> Self {
        let id = id.into();
        validate_tenant_id(&id).expect("tenant id must be valid");
        Self(id)
    }

    /// Get the tenant ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TenantId {
    type Err = TenantIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_tenant_ids() {
        assert_eq!(TenantId::new("t1").unwrap().as_str(), "t1");
        assert_eq!(TenantId::new("acme-corp").unwrap().as_str(), "acme-corp");
        assert_eq!(TenantId::new("a_b_c").unwrap().as_str(), "a_b_c");
        assert_eq!(TenantId::new("a").unwrap().as_str(), "a");
    }

    #[test]
    fn test_invalid_tenant_ids() {
        for id in ["", "1abc", "Abc", "acme corp", "acme@corp", "-abc"] {
            assert!(
                matches!(TenantId::new(id), Err(TenantIdError::InvalidTenantId { .. })),
                "expected '{id}' to be rejected"
            );
        }
    }

    #[test]
    #[should_panic(expected = "tenant id must be valid")]
    fn test_new_unchecked_panics_on_invalid_id() {
        TenantId::new_unchecked("Not-Valid");
    }

    #[test]
    fn test_serde_transparent() {
        let tenant = TenantId::new_unchecked("t1");
        let json = serde_json::to_string(&tenant).unwrap();
        assert_eq!(json, "\"t1\"");

        let parsed: TenantId = serde_json::from_str("\"t1\"").unwrap();
        assert_eq!(parsed, tenant);
    }
}

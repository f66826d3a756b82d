//! Register entity.

use super::{CashRegisterValidationError, RegisterId};

/// Maximum length, in characters, of a register display name.
pub const REGISTER_NAME_MAX_LEN: usize = 64;

/// Trimmed, non-empty register display name.
///
/// # Examples
/// ```
/// use caja::domain::RegisterName;
///
/// let name = RegisterName::new("  Caja 1 ").expect("valid name");
/// assert_eq!(name.as_ref(), "Caja 1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegisterName(String);

impl RegisterName {
    /// Validate and normalise a register name.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, CashRegisterValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(CashRegisterValidationError::EmptyRegisterName);
        }
        let actual = trimmed.chars().count();
        if actual > REGISTER_NAME_MAX_LEN {
            return Err(CashRegisterValidationError::RegisterNameTooLong {
                max: REGISTER_NAME_MAX_LEN,
                actual,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for RegisterName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for RegisterName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A physical cash register known to the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Register {
    id: RegisterId,
    name: RegisterName,
}

impl Register {
    /// Create a register.
    #[must_use]
    pub const fn new(id: RegisterId, name: RegisterName) -> Self {
        Self { id, name }
    }

    /// Register identifier.
    #[must_use]
    pub const fn id(&self) -> RegisterId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub const fn name(&self) -> &RegisterName {
        &self.name
    }
}

//! Exact decimal cash amounts.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;

/// Maximum number of fractional digits a cash amount may carry.
///
/// Matches the `NUMERIC(19, 4)` columns used by the ledger store so values
/// are never rounded on the way in.
pub const MONEY_MAX_SCALE: u32 = 4;

/// Maximum number of integer digits a cash amount may carry.
///
/// `NUMERIC(19, 4)` leaves 15 digits before the decimal point.
pub const MONEY_MAX_INTEGER_DIGITS: u32 = 15;

/// Smallest amount that no longer fits in [`MONEY_MAX_INTEGER_DIGITS`].
const MONEY_UPPER_BOUND: i64 = 1_000_000_000_000_000;

/// Reasons a raw amount is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// The input is not a plain decimal number.
    Malformed {
        /// Raw input.
        value: String,
    },
    /// The amount is below zero.
    Negative {
        /// Rejected amount.
        value: Decimal,
    },
    /// The amount must be strictly positive.
    NotPositive {
        /// Rejected amount.
        value: Decimal,
    },
    /// The amount has more fractional digits than the store keeps.
    TooPrecise {
        /// Rejected amount.
        value: Decimal,
    },
    /// The amount has more integer digits than the store keeps.
    TooLarge {
        /// Rejected amount.
        value: Decimal,
    },
}

impl fmt::Display for MoneyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed { value } => write!(f, "amount '{value}' is not a decimal number"),
            Self::Negative { value } => write!(f, "amount must not be negative (got {value})"),
            Self::NotPositive { value } => {
                write!(f, "amount must be greater than zero (got {value})")
            }
            Self::TooPrecise { value } => write!(
                f,
                "amount {value} has more than {MONEY_MAX_SCALE} fractional digits"
            ),
            Self::TooLarge { value } => write!(
                f,
                "amount {value} has more than {MONEY_MAX_INTEGER_DIGITS} integer digits"
            ),
        }
    }
}

impl std::error::Error for MoneyError {}

/// A non-negative cash amount held as an exact decimal.
///
/// # Examples
/// ```
/// use caja::domain::Money;
///
/// let amount: Money = "12000.50".parse().expect("valid amount");
/// assert_eq!(amount.to_string(), "12000.5");
/// assert!("-1".parse::<Money>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(Decimal);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Validate a decimal as a non-negative amount.
    pub fn new(value: Decimal) -> Result<Self, MoneyError> {
        let money = Self::total(value)?;
        if value >= Decimal::from(MONEY_UPPER_BOUND) {
            return Err(MoneyError::TooLarge { value });
        }
        Ok(money)
    }

    /// Validate an aggregate such as a sales total.
    ///
    /// Sums of individually bounded amounts may exceed
    /// [`MONEY_MAX_INTEGER_DIGITS`], so only sign and scale are checked.
    pub fn total(value: Decimal) -> Result<Self, MoneyError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(MoneyError::Negative { value });
        }
        if value.normalize().scale() > MONEY_MAX_SCALE {
            return Err(MoneyError::TooPrecise { value });
        }
        Ok(Self(value))
    }

    /// Validate a decimal as a strictly positive amount.
    pub fn positive(value: Decimal) -> Result<Self, MoneyError> {
        let money = Self::new(value)?;
        if money.is_zero() {
            return Err(MoneyError::NotPositive { value });
        }
        Ok(money)
    }

    /// Underlying decimal value.
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// Whether the amount is zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// Sum amounts, returning `None` on overflow.
    #[must_use]
    pub fn checked_sum<I>(amounts: I) -> Option<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        amounts
            .into_iter()
            .try_fold(Decimal::ZERO, |acc, next| acc.checked_add(next.0))
            .map(Self)
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value = Decimal::from_str_exact(trimmed).map_err(|_| MoneyError::Malformed {
            value: s.to_owned(),
        })?;
        Self::new(value)
    }
}

impl TryFrom<Decimal> for Money {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

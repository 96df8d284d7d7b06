use num_bigint::BigUint;
use num_traits::{One, Zero};

/// Parses a decimal natural number literal.
///
/// ## Parameters
/// - `digits`: The literal as written in source, ASCII digits only.
///
/// ## Returns
/// - `Some(BigUint)`: The parsed value.
/// - `None`: If `digits` is empty or contains anything but digits.
///
/// ## Example
/// ```
/// use num_bigint::BigUint;
/// use tabula::util::num::parse_natural;
///
/// assert_eq!(parse_natural("42"), Some(BigUint::from(42u32)));
/// assert!(parse_natural("123456789012345678901234567890").is_some());
/// assert_eq!(parse_natural("4x"), None);
/// ```
#[must_use]
pub fn parse_natural(digits: &str) -> Option<BigUint> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    BigUint::parse_bytes(digits.as_bytes(), 10)
}

/// Returns `n + 1`.
#[must_use]
pub fn successor(n: &BigUint) -> BigUint {
    n + BigUint::one()
}

/// Returns `n - 1`, or `0` when `n` is already `0`.
///
/// ## Example
/// ```
/// use num_bigint::BigUint;
/// use tabula::util::num::saturating_predecessor;
///
/// assert_eq!(saturating_predecessor(&BigUint::from(0u32)), BigUint::from(0u32));
/// assert_eq!(saturating_predecessor(&BigUint::from(7u32)), BigUint::from(6u32));
/// ```
#[must_use]
pub fn saturating_predecessor(n: &BigUint) -> BigUint {
    if n.is_zero() {
        BigUint::zero()
    } else {
        n - BigUint::one()
    }
}

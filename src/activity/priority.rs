//! # Suspend priority groups.
//!
//! A [`SuspendPriority`] is an ordinal `0..=10`. Activities sharing an ordinal form a
//! priority bucket.
//!
//! ## Ordering
//! ```text
//! suspend phases:  FIRST(0) ─► ... ─► DEFAULT(5) ─► ... ─► LAST(10)
//! resume phase:    LAST(10) ─► ... ─► DEFAULT(5) ─► ... ─► FIRST(0)
//! ```
//! The first to suspend is the last to resume.

use std::fmt;

use crate::error::PriorityError;

/// Ordinal priority group controlling invocation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SuspendPriority(u8);

impl SuspendPriority {
    /// Suspended first, resumed last.
    pub const FIRST: SuspendPriority = SuspendPriority(0);
    /// Middle group; used when no priority is given.
    pub const DEFAULT: SuspendPriority = SuspendPriority(5);
    /// Suspended last, resumed first.
    pub const LAST: SuspendPriority = SuspendPriority(10);

    /// Creates a priority from an ordinal.
    ///
    /// # Example
    /// ```
    /// use suspendvisor::SuspendPriority;
    ///
    /// assert_eq!(SuspendPriority::new(0).unwrap(), SuspendPriority::FIRST);
    /// assert!(SuspendPriority::new(11).is_err());
    /// ```
    pub const fn new(value: u8) -> Result<Self, PriorityError> {
        if value > Self::LAST.0 {
            Err(PriorityError::OutOfRange { value })
        } else {
            Ok(SuspendPriority(value))
        }
    }

    /// Returns the ordinal.
    #[inline]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl Default for SuspendPriority {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u8> for SuspendPriority {
    type Error = PriorityError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for SuspendPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_groups() {
        assert_eq!(SuspendPriority::FIRST.value(), 0);
        assert_eq!(SuspendPriority::DEFAULT.value(), 5);
        assert_eq!(SuspendPriority::LAST.value(), 10);
        assert_eq!(SuspendPriority::default(), SuspendPriority::DEFAULT);
    }

    #[test]
    fn test_range_is_enforced() {
        for v in 0..=10u8 {
            assert_eq!(SuspendPriority::new(v).map(|p| p.value()), Ok(v));
        }
        assert_eq!(
            SuspendPriority::try_from(42),
            Err(PriorityError::OutOfRange { value: 42 })
        );
    }

    #[test]
    fn test_ordering_follows_ordinal() {
        assert!(SuspendPriority::FIRST < SuspendPriority::DEFAULT);
        assert!(SuspendPriority::DEFAULT < SuspendPriority::LAST);
    }
}

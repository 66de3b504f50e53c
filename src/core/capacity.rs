//! Capacity ceilings with an unlimited sentinel.
//!
//! Events carry two independent ceilings: how many registrations may exist,
//! and how many registrant slots may be filled across them. Both use the
//! same arithmetic, so both are expressed as a [`Capacity`].

use serde::{Deserialize, Serialize};

/// A configured ceiling, either a count or unlimited.
///
/// `remaining` never goes negative: excess records (imported, or raced in
/// past a check) clamp the remainder to zero rather than underflowing.
///
/// ```
/// use regkit::core::Capacity;
///
/// assert_eq!(Capacity::Limited(5).remaining(2), Capacity::Limited(3));
/// assert_eq!(Capacity::Limited(5).remaining(9), Capacity::Limited(0));
/// assert_eq!(Capacity::Unlimited.remaining(9), Capacity::Unlimited);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Capacity {
    /// No ceiling.
    Unlimited,
    /// At most this many.
    Limited(u32),
}

impl Capacity {
    /// Interpret a raw configuration value.
    ///
    /// Negative values mean unlimited, matching the conventional `-1`
    /// sentinel in stored settings.
    #[must_use]
    pub const fn from_setting(value: i64) -> Self {
        if value < 0 {
            Self::Unlimited
        } else {
            Self::Limited(value as u32)
        }
    }

    /// How much of this capacity is left after `used` slots are taken.
    #[must_use]
    pub const fn remaining(self, used: u32) -> Self {
        match self {
            Self::Unlimited => Self::Unlimited,
            Self::Limited(total) => Self::Limited(total.saturating_sub(used)),
        }
    }

    /// Whether at least `count` more slots fit.
    #[must_use]
    pub const fn has_room_for(self, used: u32, count: u32) -> bool {
        match self.remaining(used) {
            Self::Unlimited => true,
            Self::Limited(left) => left >= count,
        }
    }

    /// Whether this capacity is the unlimited sentinel.
    #[must_use]
    pub const fn is_unlimited(self) -> bool {
        matches!(self, Self::Unlimited)
    }
}

impl Default for Capacity {
    fn default() -> Self {
        Self::Unlimited
    }
}

impl std::fmt::Display for Capacity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unlimited => write!(f, "unlimited"),
            Self::Limited(n) => write!(f, "{n}"),
        }
    }
}

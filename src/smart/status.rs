use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// Per-attribute health flags. Several flags may be set at once, so this is a
/// bit set rather than an enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeStatus(u8);

impl AttributeStatus {
    pub const PASSED: Self = Self(0);
    pub const FAILED_SMART: Self = Self(1);
    pub const WARNING_SCRUTINY: Self = Self(2);
    pub const FAILED_SCRUTINY: Self = Self(4);
    pub const INVALID_VALUE: Self = Self(8);

    const ALL_BITS: u8 = 0b1111;
    const NAMES: [(Self, &'static str); 4] = [
        (Self::FAILED_SMART, "failed_smart"),
        (Self::WARNING_SCRUTINY, "warning_scrutiny"),
        (Self::FAILED_SCRUTINY, "failed_scrutiny"),
        (Self::INVALID_VALUE, "invalid_value"),
    ];

    /// Unknown bits are dropped so stored history written by newer builds
    /// still decodes.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::ALL_BITS)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_passed(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, flag: Self) -> bool {
        flag.0 != 0 && self.0 & flag.0 == flag.0
    }

    #[must_use]
    pub const fn with(self, flag: Self) -> Self {
        Self(self.0 | flag.0)
    }

    #[must_use]
    pub const fn without(self, flag: Self) -> Self {
        Self(self.0 & !flag.0)
    }
}

impl BitOr for AttributeStatus {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.with(rhs)
    }
}

impl BitOrAssign for AttributeStatus {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.with(rhs);
    }
}

impl BitAnd for AttributeStatus {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Display for AttributeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_passed() {
            return f.write_str("passed");
        }
        let names: Vec<&str> = Self::NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        f.write_str(&names.join("|"))
    }
}

/// Device (or pool) level verdict, recomputed from scratch every collection
/// cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceStatus(u8);

impl DeviceStatus {
    pub const PASSED: Self = Self(0);
    pub const FAILED_SMART: Self = Self(1);
    pub const FAILED_SCRUTINY: Self = Self(2);

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0b11)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_passed(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, flag: Self) -> bool {
        flag.0 != 0 && self.0 & flag.0 == flag.0
    }

    #[must_use]
    pub const fn with(self, flag: Self) -> Self {
        Self(self.0 | flag.0)
    }
}

impl BitOr for DeviceStatus {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.with(rhs)
    }
}

impl BitOrAssign for DeviceStatus {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.with(rhs);
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (
            self.contains(Self::FAILED_SMART),
            self.contains(Self::FAILED_SCRUTINY),
        ) {
            (false, false) => f.write_str("passed"),
            (true, false) => f.write_str("failed_smart"),
            (false, true) => f.write_str("failed_scrutiny"),
            (true, true) => f.write_str("failed_smart|failed_scrutiny"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_combine_and_test_independently() {
        let status = AttributeStatus::FAILED_SMART | AttributeStatus::INVALID_VALUE;
        assert!(status.contains(AttributeStatus::FAILED_SMART));
        assert!(status.contains(AttributeStatus::INVALID_VALUE));
        assert!(!status.contains(AttributeStatus::FAILED_SCRUTINY));
        assert!(!status.is_passed());
        assert_eq!(status.bits(), 9);
    }

    #[test]
    fn passed_is_never_contained_as_a_flag() {
        assert!(!AttributeStatus::PASSED.contains(AttributeStatus::PASSED));
        assert!(AttributeStatus::PASSED.is_passed());
    }

    #[test]
    fn without_clears_only_the_named_bit() {
        let status = AttributeStatus::FAILED_SCRUTINY
            .with(AttributeStatus::WARNING_SCRUTINY)
            .without(AttributeStatus::FAILED_SCRUTINY);
        assert_eq!(status, AttributeStatus::WARNING_SCRUTINY);
    }

    #[test]
    fn from_bits_drops_unknown_bits() {
        assert_eq!(AttributeStatus::from_bits(0xF4), AttributeStatus::FAILED_SCRUTINY);
        assert_eq!(DeviceStatus::from_bits(0xFF).bits(), 3);
    }

    #[test]
    fn display_lists_set_flags() {
        let status = AttributeStatus::WARNING_SCRUTINY | AttributeStatus::FAILED_SMART;
        assert_eq!(status.to_string(), "failed_smart|warning_scrutiny");
        assert_eq!(DeviceStatus::PASSED.to_string(), "passed");
        assert_eq!(
            (DeviceStatus::FAILED_SMART | DeviceStatus::FAILED_SCRUTINY).to_string(),
            "failed_smart|failed_scrutiny"
        );
    }
}

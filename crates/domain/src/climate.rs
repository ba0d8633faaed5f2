//! Climate vocabulary shared by climate integrations.
//!
//! These are the host-side identifiers; integrations translate their own
//! device vocabulary into them.

use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Operating mode of a climate entity as understood by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HvacMode {
    Auto,
    Heat,
    Off,
}

impl HvacMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Heat => "heat",
            Self::Off => "off",
        }
    }
}

impl fmt::Display for HvacMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HvacMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "heat" => Ok(Self::Heat),
            "off" => Ok(Self::Off),
            other => Err(ValidationError::UnknownHvacMode(other.to_string())),
        }
    }
}

/// Unit a thermostat reports its temperatures in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Interpret a device unit indicator: `"F"` is Fahrenheit, anything else
    /// (including nothing) is Celsius.
    #[must_use]
    pub fn from_indicator(indicator: Option<&str>) -> Self {
        match indicator {
            Some("F") => Self::Fahrenheit,
            _ => Self::Celsius,
        }
    }

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Celsius => "\u{b0}C",
            Self::Fahrenheit => "\u{b0}F",
        }
    }
}

/// Bit set of optional climate capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClimateFeatures(u32);

impl ClimateFeatures {
    pub const NONE: Self = Self(0);
    pub const TARGET_TEMPERATURE: Self = Self(1);

    #[must_use]
    pub fn bits(self) -> u32 {
        self.0
    }

    #[must_use]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ClimateFeatures {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

//! Core type definitions with validation.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// A quantity was negative.
    #[error("{field} must be non-negative, got {value}")]
    NegativeQuantity { field: &'static str, value: f64 },

    /// A quantity was NaN or infinite.
    #[error("{field} must be a finite number")]
    NonFiniteQuantity { field: &'static str },
}

/// A validated user identifier.
///
/// User IDs must be non-empty strings. Account management is external to
/// this system; the ID is an opaque key for the entry store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Creates a new ID after validation.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValidationError::Empty { field: "user ID" });
        }
        Ok(Self(id))
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One user's raw activity inputs for one calendar day.
///
/// There is at most one entry per (user, date); resubmitting the same
/// date replaces the prior entry. Quantities must be non-negative finite
/// numbers; an omitted activity contributes zero. Call [`Self::validate`]
/// before handing the entry to [`crate::emission::compute`], which
/// assumes sanitized input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// The calendar day this entry covers.
    pub date: NaiveDate,

    /// Electricity used, in kWh.
    #[serde(default)]
    pub electricity_kwh: f64,

    /// Natural gas burned, in therms.
    #[serde(default)]
    pub natural_gas_therms: f64,

    /// Water consumed, in gallons.
    #[serde(default)]
    pub water_gallons: f64,

    /// Car travel, in miles.
    #[serde(default)]
    pub car_miles: f64,

    /// Public transit travel, in miles.
    #[serde(default)]
    pub transit_miles: f64,

    /// Short-haul flights taken (under ~3 hours).
    #[serde(default)]
    pub short_haul_flights: f64,

    /// Long-haul flights taken (over ~3 hours).
    #[serde(default)]
    pub long_haul_flights: f64,

    /// Meat servings eaten.
    #[serde(default)]
    pub meat_servings: f64,

    /// Dairy servings eaten.
    #[serde(default)]
    pub dairy_servings: f64,

    /// Plant-based servings eaten.
    #[serde(default)]
    pub plant_servings: f64,
}

impl ActivityEntry {
    /// Creates an all-zero entry for the given date.
    #[must_use]
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            date,
            ..Self::default()
        }
    }

    /// Iterates over (field name, quantity) pairs.
    fn quantities(&self) -> [(&'static str, f64); 10] {
        [
            ("electricity_kwh", self.electricity_kwh),
            ("natural_gas_therms", self.natural_gas_therms),
            ("water_gallons", self.water_gallons),
            ("car_miles", self.car_miles),
            ("transit_miles", self.transit_miles),
            ("short_haul_flights", self.short_haul_flights),
            ("long_haul_flights", self.long_haul_flights),
            ("meat_servings", self.meat_servings),
            ("dairy_servings", self.dairy_servings),
            ("plant_servings", self.plant_servings),
        ]
    }

    /// Checks that every quantity is a non-negative finite number.
    ///
    /// Returns the first offending field. This is the validation boundary
    /// the emission model relies on: scoring itself never re-checks.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in self.quantities() {
            if !value.is_finite() {
                return Err(ValidationError::NonFiniteQuantity { field });
            }
            if value < 0.0 {
                return Err(ValidationError::NegativeQuantity { field, value });
            }
        }
        Ok(())
    }
}

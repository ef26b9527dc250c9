//! Emission scoring.
//!
//! Converts one day's raw activity quantities into kg CO2, per category
//! and in total. Scoring is a pure function of the entry: same input,
//! same output, no state.
//!
//! Factors are fixed multiplicative constants (kg CO2 per unit). Inputs
//! are assumed non-negative; [`crate::types::ActivityEntry::validate`]
//! is the boundary that enforces this before scoring runs.

use serde::{Deserialize, Serialize};

use crate::types::ActivityEntry;

/// kg CO2 per kWh of electricity (grid average).
pub const ELECTRICITY_KG_PER_KWH: f64 = 0.4;

/// kg CO2 per therm of natural gas.
pub const NATURAL_GAS_KG_PER_THERM: f64 = 5.3;

/// kg CO2 per gallon of water (pumping and treatment energy).
pub const WATER_KG_PER_GALLON: f64 = 0.0002;

/// kg CO2 per gallon of gasoline.
pub const GASOLINE_KG_PER_GALLON: f64 = 8.887;

/// Assumed fleet fuel efficiency, miles per gallon.
pub const CAR_MILES_PER_GALLON: f64 = 25.0;

/// kg CO2 per public transit mile (average across modes).
pub const TRANSIT_KG_PER_MILE: f64 = 0.17;

/// kg CO2 per short-haul flight.
pub const SHORT_HAUL_KG_PER_FLIGHT: f64 = 500.0;

/// kg CO2 per long-haul flight.
pub const LONG_HAUL_KG_PER_FLIGHT: f64 = 1600.0;

/// kg CO2 per meat serving.
pub const MEAT_KG_PER_SERVING: f64 = 3.0;

/// kg CO2 per dairy serving.
pub const DAIRY_KG_PER_SERVING: f64 = 0.7;

/// kg CO2 per plant-based serving.
pub const PLANT_KG_PER_SERVING: f64 = 0.2;

/// Global average daily footprint per person, kg CO2.
///
/// Reference value for comparative reporting.
pub const GLOBAL_DAILY_AVERAGE_KG: f64 = 49.3;

/// kg CO2 absorbed per tree per year.
pub const TREE_ABSORPTION_KG_PER_YEAR: f64 = 21.77;

/// Per-category and total emissions derived from one [`ActivityEntry`].
///
/// Always recomputed from the entry, never hand-edited. `total_kg` is
/// the sum of the three category values by construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EmissionBreakdown {
    /// Electricity + natural gas + water.
    pub home_energy_kg: f64,
    /// Car + transit + flights.
    pub transportation_kg: f64,
    /// Meat + dairy + plant servings.
    pub food_kg: f64,
    /// Sum of the three categories.
    pub total_kg: f64,
}

/// Fine-grained per-source emissions.
///
/// Each source folds into exactly one [`EmissionBreakdown`] category;
/// flights are reported as a single source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceEmissions {
    pub electricity_kg: f64,
    pub natural_gas_kg: f64,
    pub water_kg: f64,
    pub car_kg: f64,
    pub transit_kg: f64,
    pub flights_kg: f64,
    pub meat_kg: f64,
    pub dairy_kg: f64,
    pub plant_kg: f64,
}

impl SourceEmissions {
    /// (label, kg) pairs in display order.
    #[must_use]
    pub fn labeled(&self) -> [(&'static str, f64); 9] {
        [
            ("electricity", self.electricity_kg),
            ("natural gas", self.natural_gas_kg),
            ("water", self.water_kg),
            ("car", self.car_kg),
            ("transit", self.transit_kg),
            ("flights", self.flights_kg),
            ("meat", self.meat_kg),
            ("dairy", self.dairy_kg),
            ("plant", self.plant_kg),
        ]
    }

    /// Adds another day's sources into this accumulator.
    pub fn accumulate(&mut self, other: &Self) {
        self.electricity_kg += other.electricity_kg;
        self.natural_gas_kg += other.natural_gas_kg;
        self.water_kg += other.water_kg;
        self.car_kg += other.car_kg;
        self.transit_kg += other.transit_kg;
        self.flights_kg += other.flights_kg;
        self.meat_kg += other.meat_kg;
        self.dairy_kg += other.dairy_kg;
        self.plant_kg += other.plant_kg;
    }
}

/// Scores one day's activities.
///
/// Pure and deterministic. Assumes the entry passed
/// [`ActivityEntry::validate`]; negative quantities produce meaningless
/// (negative) scores rather than errors.
#[must_use]
pub fn compute(entry: &ActivityEntry) -> EmissionBreakdown {
    let sources = compute_sources(entry);

    let home_energy_kg = sources.electricity_kg + sources.natural_gas_kg + sources.water_kg;
    let transportation_kg = sources.car_kg + sources.transit_kg + sources.flights_kg;
    let food_kg = sources.meat_kg + sources.dairy_kg + sources.plant_kg;

    EmissionBreakdown {
        home_energy_kg,
        transportation_kg,
        food_kg,
        total_kg: home_energy_kg + transportation_kg + food_kg,
    }
}

/// Scores one day's activities per source.
#[must_use]
pub fn compute_sources(entry: &ActivityEntry) -> SourceEmissions {
    SourceEmissions {
        electricity_kg: entry.electricity_kwh * ELECTRICITY_KG_PER_KWH,
        natural_gas_kg: entry.natural_gas_therms * NATURAL_GAS_KG_PER_THERM,
        water_kg: entry.water_gallons * WATER_KG_PER_GALLON,
        car_kg: (entry.car_miles / CAR_MILES_PER_GALLON) * GASOLINE_KG_PER_GALLON,
        transit_kg: entry.transit_miles * TRANSIT_KG_PER_MILE,
        flights_kg: entry.short_haul_flights * SHORT_HAUL_KG_PER_FLIGHT
            + entry.long_haul_flights * LONG_HAUL_KG_PER_FLIGHT,
        meat_kg: entry.meat_servings * MEAT_KG_PER_SERVING,
        dairy_kg: entry.dairy_servings * DAIRY_KG_PER_SERVING,
        plant_kg: entry.plant_servings * PLANT_KG_PER_SERVING,
    }
}

/// Trees needed to absorb the given emissions over one year.
#[must_use]
pub fn trees_to_offset(total_kg: f64) -> f64 {
    total_kg / TREE_ABSORPTION_KG_PER_YEAR
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn entry() -> ActivityEntry {
        ActivityEntry::for_date(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())
    }

    #[test]
    fn zero_entry_scores_zero() {
        let breakdown = compute(&entry());
        assert!(breakdown.home_energy_kg.abs() < TOLERANCE);
        assert!(breakdown.transportation_kg.abs() < TOLERANCE);
        assert!(breakdown.food_kg.abs() < TOLERANCE);
        assert!(breakdown.total_kg.abs() < TOLERANCE);
    }

    #[test]
    fn electricity_fixture() {
        let e = ActivityEntry {
            electricity_kwh: 100.0,
            ..entry()
        };
        let breakdown = compute(&e);
        assert!((breakdown.home_energy_kg - 40.0).abs() < TOLERANCE);
        assert!((breakdown.total_kg - 40.0).abs() < TOLERANCE);
    }

    #[test]
    fn car_fixture() {
        let e = ActivityEntry {
            car_miles: 25.0,
            ..entry()
        };
        let breakdown = compute(&e);
        // 25 miles at 25 mpg is exactly one gallon
        assert!((breakdown.transportation_kg - 8.887).abs() < TOLERANCE);
    }

    #[test]
    fn food_fixture() {
        let e = ActivityEntry {
            meat_servings: 2.0,
            dairy_servings: 1.0,
            plant_servings: 3.0,
            ..entry()
        };
        let breakdown = compute(&e);
        assert!((breakdown.food_kg - 7.3).abs() < TOLERANCE);
    }

    #[test]
    fn total_is_exact_sum_of_categories() {
        let e = ActivityEntry {
            electricity_kwh: 12.5,
            natural_gas_therms: 2.3,
            water_gallons: 80.0,
            car_miles: 17.0,
            transit_miles: 4.0,
            short_haul_flights: 1.0,
            meat_servings: 2.0,
            dairy_servings: 3.0,
            plant_servings: 1.0,
            ..entry()
        };
        let b = compute(&e);
        // Exact equality: total is defined as this sum
        #[expect(clippy::float_cmp, reason = "total is the sum by construction")]
        {
            assert_eq!(b.total_kg, b.home_energy_kg + b.transportation_kg + b.food_kg);
        }
    }

    #[test]
    fn compute_is_deterministic() {
        let e = ActivityEntry {
            electricity_kwh: 7.7,
            car_miles: 13.0,
            meat_servings: 1.0,
            ..entry()
        };
        assert_eq!(compute(&e), compute(&e));
    }

    #[test]
    fn sources_agree_with_categories() {
        let e = ActivityEntry {
            electricity_kwh: 10.0,
            natural_gas_therms: 1.0,
            water_gallons: 500.0,
            car_miles: 50.0,
            transit_miles: 10.0,
            long_haul_flights: 1.0,
            meat_servings: 1.0,
            dairy_servings: 2.0,
            plant_servings: 4.0,
            ..entry()
        };
        let b = compute(&e);
        let s = compute_sources(&e);
        assert!(
            (b.home_energy_kg - (s.electricity_kg + s.natural_gas_kg + s.water_kg)).abs()
                < TOLERANCE
        );
        assert!(
            (b.transportation_kg - (s.car_kg + s.transit_kg + s.flights_kg)).abs() < TOLERANCE
        );
        assert!((b.food_kg - (s.meat_kg + s.dairy_kg + s.plant_kg)).abs() < TOLERANCE);
    }

    #[test]
    fn flight_factors() {
        let e = ActivityEntry {
            short_haul_flights: 2.0,
            long_haul_flights: 1.0,
            ..entry()
        };
        let breakdown = compute(&e);
        assert!((breakdown.transportation_kg - 2600.0).abs() < TOLERANCE);
    }

    #[test]
    fn trees_to_offset_fixture() {
        assert!((trees_to_offset(21.77) - 1.0).abs() < TOLERANCE);
        assert!(trees_to_offset(0.0).abs() < TOLERANCE);
    }
}

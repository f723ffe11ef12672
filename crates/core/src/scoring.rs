//! Soft-constraint penalty formulas, shared between the model builder's
//! objective assembly (`solver-milp`) and the solution projector's
//! per-assignment recomputation, so the two can never drift apart without
//! the drift being a change to this one module.

use std::collections::HashMap;
use types::{DatasetBundle, SoftConstraint};

#[derive(Clone, Copy, Debug, Default)]
pub struct Weights {
    pub lecturer_preference: f64,
    pub room_utilization: f64,
    pub peak_time_avoidance: f64,
}

impl Weights {
    pub fn from_bundle(bundle: &DatasetBundle) -> Self {
        let mut w = Weights::default();
        for pw in &bundle.penalty_weights {
            match pw.constraint {
                SoftConstraint::LecturerPreference => w.lecturer_preference = pw.weight,
                SoftConstraint::RoomUtilization => w.room_utilization = pw.weight,
                SoftConstraint::PeakTimeAvoidance => w.peak_time_avoidance = pw.weight,
            }
        }
        w
    }
}

/// `W_pref * (1 - preference)`, preference defaults to 0 when unknown.
pub fn lecturer_preference_penalty(weight: f64, preference_score: f64) -> f64 {
    weight * (1.0 - preference_score)
}

/// `W_peak * 1` if the timeslot is peak, else 0.
pub fn peak_time_penalty(weight: f64, is_peak: bool) -> f64 {
    if is_peak {
        weight
    } else {
        0.0
    }
}

/// `W_util * max(capacity - effective_capacity, 0) / capacity`, 0 when capacity is 0.
pub fn room_utilization_penalty(weight: f64, room_capacity: u32, effective_capacity: u32) -> f64 {
    if room_capacity == 0 {
        return 0.0;
    }
    let gap = room_capacity.saturating_sub(effective_capacity) as f64;
    weight * (gap / room_capacity as f64)
}

/// The effective capacity of a class: its enrollment student count when
/// present, else the class's declared capacity.
pub fn effective_capacity(class_capacity: u32, enrolled_students: Option<u32>) -> u32 {
    enrolled_students.unwrap_or(class_capacity)
}

/// Recompute the full penalty breakdown for one chosen (lecturer, room,
/// timeslot) triple, using the same three formulas the objective is built
/// from. Only strictly positive components are kept.
pub fn assignment_breakdown(
    weights: &Weights,
    preference_score: f64,
    is_peak: bool,
    room_capacity: u32,
    effective_capacity: u32,
) -> (f64, HashMap<String, f64>) {
    let mut breakdown = HashMap::new();

    let pref = lecturer_preference_penalty(weights.lecturer_preference, preference_score);
    if pref > 0.0 {
        breakdown.insert(SoftConstraint::LecturerPreference.as_str().to_string(), pref);
    }
    let peak = peak_time_penalty(weights.peak_time_avoidance, is_peak);
    if peak > 0.0 {
        breakdown.insert(SoftConstraint::PeakTimeAvoidance.as_str().to_string(), peak);
    }
    let util = room_utilization_penalty(weights.room_utilization, room_capacity, effective_capacity);
    if util > 0.0 {
        breakdown.insert(SoftConstraint::RoomUtilization.as_str().to_string(), util);
    }

    let total = breakdown.values().sum();
    (total, breakdown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn room_utilization_penalty_never_negative_or_above_weight(
            weight in 0.0f64..1.0,
            room_capacity in 0u32..500,
            effective_capacity in 0u32..500,
        ) {
            let v = room_utilization_penalty(weight, room_capacity, effective_capacity);
            prop_assert!(v >= 0.0);
            prop_assert!(v <= weight + 1e-9);
        }

        #[test]
        fn lecturer_preference_penalty_never_negative_for_scores_in_range(
            weight in 0.0f64..1.0,
            score in 0.0f64..=1.0,
        ) {
            let v = lecturer_preference_penalty(weight, score);
            prop_assert!(v >= -1e-9);
        }
    }

    #[test]
    fn preference_penalty_is_zero_when_fully_preferred() {
        assert_eq!(lecturer_preference_penalty(0.45, 1.0), 0.0);
    }

    #[test]
    fn room_utilization_zero_capacity_is_zero() {
        assert_eq!(room_utilization_penalty(0.35, 0, 10), 0.0);
    }

    #[test]
    fn room_utilization_penalty_scales_with_capacity_gap() {
        // capacity 40, effective capacity 30, weight 0.35 -> 0.0875
        let v = room_utilization_penalty(0.35, 40, 30);
        assert!((v - 0.0875).abs() < 1e-9);
    }

    #[test]
    fn breakdown_drops_zero_components() {
        let weights = Weights {
            lecturer_preference: 0.45,
            room_utilization: 0.0,
            peak_time_avoidance: 0.20,
        };
        let (total, breakdown) = assignment_breakdown(&weights, 1.0, false, 40, 30);
        assert_eq!(total, 0.0);
        assert!(breakdown.is_empty());
    }
}

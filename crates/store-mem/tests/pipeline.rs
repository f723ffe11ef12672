use std::collections::{HashMap, HashSet};

use sched_core::{run_bwm_ilp, scoring, CoreError, SchedulePersister};
use solver_milp::MilpSolver;
use store_mem::fixtures::{
    contended_bundle, lab_and_lecture_routing_bundle, minimal_bundle, preference_tradeoff_bundle,
    single_slot_conflict_bundle, undersized_room_bundle,
};
use store_mem::MemStore;

#[test]
fn every_class_is_scheduled_exactly_once() {
    let bundle = contended_bundle();
    let result = run_bwm_ilp(&bundle, &MilpSolver::new()).expect("feasible dataset");

    let mut seen = HashSet::new();
    for a in &result.assignments {
        assert!(seen.insert(a.class_id), "class {} scheduled more than once", a.class_id);
    }
    assert_eq!(seen.len(), bundle.classes.len());
}

#[test]
fn no_lecturer_is_double_booked() {
    let bundle = contended_bundle();
    let result = run_bwm_ilp(&bundle, &MilpSolver::new()).expect("feasible dataset");

    let mut seen: HashSet<(types::LecturerCode, types::TimeslotId)> = HashSet::new();
    for a in &result.assignments {
        let key = (a.lecturer_code.clone(), a.timeslot_id);
        assert!(
            seen.insert(key),
            "lecturer {} double-booked at timeslot {}",
            a.lecturer_code,
            a.timeslot_id
        );
    }
}

#[test]
fn no_room_is_double_booked() {
    let bundle = contended_bundle();
    let result = run_bwm_ilp(&bundle, &MilpSolver::new()).expect("feasible dataset");

    let mut seen: HashSet<(types::RoomId, types::TimeslotId)> = HashSet::new();
    for a in &result.assignments {
        let key = (a.room_id, a.timeslot_id);
        assert!(
            seen.insert(key),
            "room {} double-booked at timeslot {}",
            a.room_id,
            a.timeslot_id
        );
    }
}

#[test]
fn assigned_lecturer_is_available_at_the_chosen_timeslot() {
    let bundle = contended_bundle();
    let result = run_bwm_ilp(&bundle, &MilpSolver::new()).expect("feasible dataset");

    let available: HashSet<(types::LecturerId, types::TimeslotId)> = bundle
        .availability
        .iter()
        .filter(|a| a.status.is_available())
        .map(|a| (a.lecturer_id, a.timeslot_id))
        .collect();
    let lecturer_id_by_code: HashMap<&str, types::LecturerId> = bundle
        .lecturers
        .iter()
        .map(|l| (l.code.0.as_str(), l.id))
        .collect();

    for a in &result.assignments {
        let lecturer_id = lecturer_id_by_code[a.lecturer_code.0.as_str()];
        assert!(available.contains(&(lecturer_id, a.timeslot_id)));
    }
}

#[test]
fn lab_classes_only_land_in_lab_or_hybrid_rooms() {
    let bundle = contended_bundle();
    let result = run_bwm_ilp(&bundle, &MilpSolver::new()).expect("feasible dataset");

    let room_type_by_id: HashMap<_, _> = bundle.rooms.iter().map(|r| (r.id, &r.room_type)).collect();
    let class_by_id: HashMap<_, _> = bundle.classes.iter().map(|c| (c.id, c)).collect();

    for a in &result.assignments {
        let class = class_by_id[&a.class_id];
        if class.requires_lab() {
            assert!(room_type_by_id[&a.room_id].is_lab_or_hybrid());
        }
    }
}

#[test]
fn penalty_breakdown_matches_assignment_penalty_total() {
    let bundle = minimal_bundle();
    let result = run_bwm_ilp(&bundle, &MilpSolver::new()).expect("feasible dataset");

    for a in &result.assignments {
        let recomputed: f64 = a.penalty_breakdown.values().sum();
        assert!((recomputed - a.penalty).abs() < 1e-9);
    }
}

#[test]
fn solving_the_same_dataset_twice_yields_the_same_objective() {
    let bundle = contended_bundle();
    let first = run_bwm_ilp(&bundle, &MilpSolver::new()).expect("feasible dataset");
    let second = run_bwm_ilp(&bundle, &MilpSolver::new()).expect("feasible dataset");

    assert!((first.objective_value - second.objective_value).abs() < 1e-6);
}

#[tokio::test]
async fn solving_and_persisting_leaves_one_schedule_row_per_class() {
    let bundle = minimal_bundle();
    let dataset_id = bundle.dataset.id;
    let result = run_bwm_ilp(&bundle, &MilpSolver::new()).expect("feasible dataset");

    let lecturer_id_by_code: HashMap<&str, types::LecturerId> = bundle
        .lecturers
        .iter()
        .map(|l| (l.code.0.as_str(), l.id))
        .collect();
    let entries: Vec<_> = result
        .assignments
        .iter()
        .map(|a| types::ScheduleEntry {
            dataset_id,
            class_id: a.class_id,
            lecturer_id: lecturer_id_by_code[a.lecturer_code.0.as_str()],
            room_id: a.room_id,
            timeslot_id: a.timeslot_id,
            status: "simulated".into(),
            penalty: a.penalty,
        })
        .collect();

    let store = MemStore::new();
    store.replace_schedule(dataset_id, &entries).await.unwrap();

    let persisted = store.schedule_for(dataset_id).unwrap();
    assert_eq!(persisted.len(), bundle.classes.len());
}

#[test]
fn room_utilization_penalty_is_never_negative() {
    // Regression check for the scoring formula's saturating subtraction:
    // a class whose enrollment exceeds its declared capacity must not
    // produce a negative penalty.
    let penalty = scoring::room_utilization_penalty(0.35, 20, 25);
    assert!(penalty >= 0.0);
}

#[test]
fn soft_constraint_totals_always_reports_all_three_keys() {
    // A dataset with no peak timeslot should still report
    // PEAK_TIME_AVOIDANCE at 0.0 rather than omitting the key.
    let bundle = minimal_bundle();
    let result = run_bwm_ilp(&bundle, &MilpSolver::new()).expect("feasible dataset");

    for constraint in types::SoftConstraint::ALL {
        assert!(
            result.soft_constraint_totals.contains_key(constraint.as_str()),
            "missing key {constraint} in soft_constraint_totals"
        );
    }
}

#[test]
fn solver_prefers_lower_total_penalty_over_higher_preference_score() {
    // Peak cost: 0.45*(1-1.0) + 0.20*1 = 0.20
    // Off-peak cost: 0.45*(1-0.5) + 0 = 0.225
    // The cheaper peak slot should win even though its raw preference score
    // is lower-cost-looking at a glance; this locks in the weighted-sum
    // arithmetic rather than a naive "highest preference wins" heuristic.
    let bundle = preference_tradeoff_bundle();
    let result = run_bwm_ilp(&bundle, &MilpSolver::new()).expect("feasible dataset");

    let peak_timeslot = bundle.timeslots.iter().find(|t| t.is_peak).unwrap();
    assert_eq!(result.assignments.len(), 1);
    assert_eq!(result.assignments[0].timeslot_id, peak_timeslot.id);
    assert!((result.objective_value - 0.20).abs() < 1e-6);
}

#[test]
fn two_classes_needing_the_same_single_room_timeslot_are_infeasible() {
    let bundle = single_slot_conflict_bundle();
    let err = run_bwm_ilp(&bundle, &MilpSolver::new()).unwrap_err();
    assert!(matches!(err, CoreError::NoFeasibleSchedule));
}

#[test]
fn class_needing_more_capacity_than_any_room_has_is_rejected_before_solving() {
    let bundle = undersized_room_bundle();
    let err = run_bwm_ilp(&bundle, &MilpSolver::new()).unwrap_err();
    assert!(matches!(err, CoreError::NoCompatibleRoom(_)));
}

#[test]
fn lab_class_and_lecture_class_route_to_their_matching_room_types() {
    let bundle = lab_and_lecture_routing_bundle();
    let result = run_bwm_ilp(&bundle, &MilpSolver::new()).expect("feasible dataset");

    let room_type_by_id: HashMap<_, _> = bundle.rooms.iter().map(|r| (r.id, &r.room_type)).collect();
    let class_by_id: HashMap<_, _> = bundle.classes.iter().map(|c| (c.id, c)).collect();

    for a in &result.assignments {
        let class = class_by_id[&a.class_id];
        let room_type = room_type_by_id[&a.room_id];
        if class.requires_lab() {
            assert!(room_type.is_lab_or_hybrid());
        } else {
            assert!(!room_type.is_lab());
        }
    }
}

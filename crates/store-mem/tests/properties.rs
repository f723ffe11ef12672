use std::collections::HashSet;

use proptest::prelude::*;

use sched_core::run_bwm_ilp;
use solver_milp::MilpSolver;
use store_mem::fixtures::uniform_feasible_bundle;

proptest! {
    /// For any small feasible instance, a produced schedule never double-books
    /// a lecturer (H3) or a room (H4) at the same timeslot.
    #[test]
    fn random_feasible_instances_never_violate_exclusivity(n in 1..6i64) {
        let bundle = uniform_feasible_bundle(n);
        let result = run_bwm_ilp(&bundle, &MilpSolver::new()).expect("uniform_feasible_bundle is feasible by construction");

        let mut lecturer_slots = HashSet::new();
        let mut room_slots = HashSet::new();
        for a in &result.assignments {
            prop_assert!(lecturer_slots.insert((a.lecturer_code.clone(), a.timeslot_id)));
            prop_assert!(room_slots.insert((a.room_id, a.timeslot_id)));
        }
        prop_assert_eq!(result.assignments.len(), n as usize);
    }
}

//! Model builder (C3) and solution projector (C5) for the two coupled
//! binary variable families:
//!
//! - `w[c,t,l]`: class c is taught by lecturer l in timeslot t
//! - `x[c,t,r]`: class c occupies room r in timeslot t
//!
//! `w` ranges only over `TL(c)` (timeslot, lecturer) candidate pairs; `x`
//! ranges only over `T(c) x R(c)`. Both are restricted to the candidate
//! sets computed by [`sched_core::preprocess`] so infeasible combinations
//! never become variables.

use std::collections::HashMap;

use good_lp::{Expression, ProblemVariables, Solution, SolverModel, Variable};

use sched_core::preprocess::Prep;
use sched_core::scoring::{self, Weights};
use types::{Assignment, ClassId, DatasetBundle, LecturerId, RoomId, TimeslotId};

pub(crate) struct Vars {
    pub w: HashMap<(ClassId, TimeslotId, LecturerId), Variable>,
    pub x: HashMap<(ClassId, TimeslotId, RoomId), Variable>,
}

pub(crate) fn declare_w(prep: &Prep, vars: &mut ProblemVariables) -> HashMap<(ClassId, TimeslotId, LecturerId), Variable> {
    let mut w = HashMap::new();
    for (&class_id, pairs) in &prep.timeslot_lecturer_candidates {
        for &(ts, lecturer_id) in pairs {
            w.insert((class_id, ts, lecturer_id), vars.add(good_lp::variable().binary()));
        }
    }
    w
}

pub(crate) fn declare_x(prep: &Prep, vars: &mut ProblemVariables) -> HashMap<(ClassId, TimeslotId, RoomId), Variable> {
    let mut x = HashMap::new();
    for (&class_id, timeslots) in &prep.class_timeslots {
        let rooms = prep.room_candidates.get(&class_id).map(|v| v.as_slice()).unwrap_or(&[]);
        for &ts in timeslots {
            for &room_id in rooms {
                x.insert((class_id, ts, room_id), vars.add(good_lp::variable().binary()));
            }
        }
    }
    x
}

/// H1: every class is taught exactly once.
pub(crate) fn add_assignment_constraints<M: SolverModel>(mut model: M, prep: &Prep, v: &Vars) -> M {
    for (&class_id, pairs) in &prep.timeslot_lecturer_candidates {
        let mut sum = Expression::from(0.0);
        for &(ts, lecturer_id) in pairs {
            sum = sum + v.w[&(class_id, ts, lecturer_id)];
        }
        model = model.with(sum.eq(1.0));
    }
    model
}

/// H2: room occupancy for a class at a timeslot mirrors its lecturer
/// occupancy at that same timeslot - the structural coupling between `w`
/// and `x`.
pub(crate) fn add_coupling_constraints<M: SolverModel>(mut model: M, prep: &Prep, v: &Vars) -> M {
    for (&class_id, timeslots) in &prep.class_timeslots {
        let rooms = prep.room_candidates.get(&class_id).map(|v| v.as_slice()).unwrap_or(&[]);
        let pairs = prep
            .timeslot_lecturer_candidates
            .get(&class_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[]);
        for &ts in timeslots {
            let mut room_sum = Expression::from(0.0);
            for &room_id in rooms {
                if let Some(&var) = v.x.get(&(class_id, ts, room_id)) {
                    room_sum = room_sum + var;
                }
            }
            let mut lecturer_sum = Expression::from(0.0);
            for &(pts, lecturer_id) in pairs {
                if pts == ts {
                    lecturer_sum = lecturer_sum + v.w[&(class_id, ts, lecturer_id)];
                }
            }
            model = model.with((room_sum - lecturer_sum).eq(0.0));
        }
    }
    model
}

/// H3: a lecturer teaches at most one class per timeslot.
pub(crate) fn add_lecturer_exclusivity_constraints<M: SolverModel>(mut model: M, bundle: &DatasetBundle, v: &Vars) -> M {
    for lecturer in &bundle.lecturers {
        for ts in &bundle.timeslots {
            let mut sum = Expression::from(0.0);
            let mut any = false;
            for (&(class_id, vt, vl), &var) in &v.w {
                if vl == lecturer.id && vt == ts.id {
                    let _ = class_id;
                    sum = sum + var;
                    any = true;
                }
            }
            if any {
                model = model.with(sum.leq(1.0));
            }
        }
    }
    model
}

/// H4: a room holds at most one class per timeslot.
pub(crate) fn add_room_exclusivity_constraints<M: SolverModel>(mut model: M, bundle: &DatasetBundle, v: &Vars) -> M {
    for room in &bundle.rooms {
        for ts in &bundle.timeslots {
            let mut sum = Expression::from(0.0);
            let mut any = false;
            for (&(class_id, vt, vr), &var) in &v.x {
                if vr == room.id && vt == ts.id {
                    let _ = class_id;
                    sum = sum + var;
                    any = true;
                }
            }
            if any {
                model = model.with(sum.leq(1.0));
            }
        }
    }
    model
}

/// Sparse weighted objective: only strictly positive penalty coefficients
/// contribute a term, mirroring `sched_core::scoring`'s per-component
/// formulas so the model and the post-solve recomputation never drift.
pub(crate) fn build_objective(bundle: &DatasetBundle, prep: &Prep, v: &Vars) -> Expression {
    let weights = Weights::from_bundle(bundle);
    let mut objective = Expression::from(0.0);

    let preference: HashMap<(LecturerId, TimeslotId), f64> = bundle
        .preferences
        .iter()
        .map(|p| ((p.lecturer_id, p.timeslot_id), p.score))
        .collect();

    if weights.lecturer_preference > 0.0 {
        for (&(_class_id, ts, lecturer_id), &var) in &v.w {
            let score = preference.get(&(lecturer_id, ts)).copied().unwrap_or(0.0);
            let coeff = scoring::lecturer_preference_penalty(weights.lecturer_preference, score);
            if coeff > 0.0 {
                objective = objective + coeff * var;
            }
        }
    }

    let timeslot_by_id: HashMap<TimeslotId, &types::Timeslot> =
        bundle.timeslots.iter().map(|t| (t.id, t)).collect();
    let room_by_id: HashMap<RoomId, &types::Room> = bundle.rooms.iter().map(|r| (r.id, r)).collect();
    let enrollment_by_class: HashMap<ClassId, u32> = bundle
        .enrollments
        .iter()
        .map(|e| (e.class_id, e.student_count))
        .collect();
    let class_by_id: HashMap<ClassId, &types::Class> = bundle.classes.iter().map(|c| (c.id, c)).collect();

    if weights.peak_time_avoidance > 0.0 {
        for (&(_class_id, ts, _room_id), &var) in &v.x {
            let is_peak = timeslot_by_id.get(&ts).map(|t| t.is_peak).unwrap_or(false);
            let coeff = scoring::peak_time_penalty(weights.peak_time_avoidance, is_peak);
            if coeff > 0.0 {
                objective = objective + coeff * var;
            }
        }
    }

    if weights.room_utilization > 0.0 {
        for (&(class_id, _ts, room_id), &var) in &v.x {
            let Some(class) = class_by_id.get(&class_id) else { continue };
            let Some(room) = room_by_id.get(&room_id) else { continue };
            let eff_cap = scoring::effective_capacity(
                class.class_capacity,
                enrollment_by_class.get(&class_id).copied(),
            );
            let coeff = scoring::room_utilization_penalty(weights.room_utilization, room.capacity, eff_cap);
            if coeff > 0.0 {
                objective = objective + coeff * var;
            }
        }
    }

    objective
}

pub(crate) fn extract_solution(
    bundle: &DatasetBundle,
    prep: &Prep,
    v: &Vars,
    sol: &impl Solution,
) -> Result<Vec<Assignment>, ClassId> {
    let weights = Weights::from_bundle(bundle);
    let course_by_id: HashMap<_, _> = bundle.courses.iter().map(|c| (c.id, c)).collect();
    let class_by_id: HashMap<_, _> = bundle.classes.iter().map(|c| (c.id, c)).collect();
    let lecturer_by_id: HashMap<_, _> = bundle.lecturers.iter().map(|l| (l.id, l)).collect();
    let room_by_id: HashMap<_, _> = bundle.rooms.iter().map(|r| (r.id, r)).collect();
    let timeslot_by_id: HashMap<_, _> = bundle.timeslots.iter().map(|t| (t.id, t)).collect();
    let preference: HashMap<(LecturerId, TimeslotId), f64> = bundle
        .preferences
        .iter()
        .map(|p| ((p.lecturer_id, p.timeslot_id), p.score))
        .collect();
    let enrollment_by_class: HashMap<ClassId, u32> = bundle
        .enrollments
        .iter()
        .map(|e| (e.class_id, e.student_count))
        .collect();

    let mut assignments = Vec::new();

    for (&class_id, _) in &prep.class_timeslots {
        let chosen_w = v
            .w
            .iter()
            .find(|(&(c, _, _), &var)| c == class_id && sol.value(var) > 0.5);
        let Some((&(_, ts, lecturer_id), _)) = chosen_w else {
            return Err(class_id);
        };
        let chosen_x = v
            .x
            .iter()
            .find(|(&(c, t, _), &var)| c == class_id && t == ts && sol.value(var) > 0.5);
        let Some((&(_, _, room_id), _)) = chosen_x else {
            return Err(class_id);
        };

        let class = class_by_id[&class_id];
        let course = course_by_id[&class.course_id];
        let lecturer = lecturer_by_id[&lecturer_id];
        let room = room_by_id[&room_id];
        let timeslot = timeslot_by_id[&ts];

        let preference_score = preference.get(&(lecturer_id, ts)).copied().unwrap_or(0.0);
        let eff_cap =
            scoring::effective_capacity(class.class_capacity, enrollment_by_class.get(&class_id).copied());

        let (penalty, breakdown) = scoring::assignment_breakdown(
            &weights,
            preference_score,
            timeslot.is_peak,
            room.capacity,
            eff_cap,
        );

        assignments.push(Assignment {
            class_id,
            course_code: course.code.clone(),
            course_name: course.name.clone(),
            cohort_id: class.cohort_id.clone(),
            lecturer: lecturer.name.clone(),
            lecturer_code: lecturer.code.clone(),
            room_id,
            room_code: room.code.clone(),
            building: room.building.clone(),
            timeslot_id: ts,
            day: timeslot.day,
            start: timeslot.start,
            end: timeslot.end,
            penalty,
            penalty_breakdown: breakdown,
        });
    }

    Ok(assignments)
}

pub mod preprocess;
pub mod scoring;

use std::collections::HashSet;

use async_trait::async_trait;
use thiserror::Error;
use tracing::instrument;

pub use types::{Assignment, BwmIlpResult, DatasetBundle, DatasetId, ScheduleEntry};
use types::ClassId;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("dataset not found")]
    DatasetNotFound,
    #[error("dataset has no classes to schedule")]
    EmptyDataset,
    #[error("dataset contains a dangling reference between entities")]
    DanglingReference,
    #[error("class {0} has no room compatible with its requirements")]
    NoCompatibleRoom(ClassId),
    #[error("class {0} has no lecturer with availability overlapping any timeslot")]
    NoLecturerAvailability(ClassId),
    #[error("solver backend is unavailable")]
    SolverUnavailable,
    #[error("no feasible schedule exists for this dataset")]
    NoFeasibleSchedule,
    #[error("solver returned an incomplete assignment for class {0}")]
    IncompleteAssignment(ClassId),
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid dataset: {0}")]
    Msg(String),
}

/// C1: loads a dataset's full relational bundle by id.
#[async_trait]
pub trait DatasetLoader: Send + Sync + 'static {
    async fn load(&self, dataset_id: DatasetId) -> Result<DatasetBundle, CoreError>;
}

/// C6: replaces a dataset's persisted schedule with a freshly solved one.
///
/// Implementations must delete and insert within a single transaction
/// boundary, and only after a successful solve (see DESIGN.md, Open
/// Question 4).
#[async_trait]
pub trait SchedulePersister: Send + Sync + 'static {
    async fn replace_schedule(
        &self,
        dataset_id: DatasetId,
        entries: &[ScheduleEntry],
    ) -> Result<(), CoreError>;
}

/// Solver backend abstraction (C3 + C4), kept out of `sched-core` so the
/// orchestration function stays free of any particular MILP crate.
pub trait Solver: Send + Sync + 'static {
    fn solve(
        &self,
        bundle: &DatasetBundle,
        prep: &preprocess::Prep,
    ) -> Result<SolveOutcome, CoreError>;
}

pub struct SolveOutcome {
    pub solver_status: types::SolverStatus,
    pub status: types::SolutionStatus,
    pub objective_value: f64,
    pub assignments: Vec<Assignment>,
}

pub fn validate(bundle: &DatasetBundle) -> Result<(), ValidationError> {
    let mut errors: Vec<String> = Vec::new();

    if bundle.classes.is_empty() {
        errors.push("dataset has no classes".into());
    }
    if bundle.timeslots.is_empty() {
        errors.push("dataset has no timeslots".into());
    }

    fn chk_unique<I: ToString>(name: &str, ids: impl Iterator<Item = I>, errors: &mut Vec<String>) {
        let mut seen = HashSet::new();
        for id in ids {
            let s = id.to_string();
            if !seen.insert(s.clone()) {
                errors.push(format!("duplicate {name} id: {s}"));
            }
        }
    }
    chk_unique("course", bundle.courses.iter().map(|c| c.id), &mut errors);
    chk_unique("class", bundle.classes.iter().map(|c| c.id), &mut errors);
    chk_unique("lecturer", bundle.lecturers.iter().map(|l| l.id), &mut errors);
    chk_unique("room", bundle.rooms.iter().map(|r| r.id), &mut errors);
    chk_unique("timeslot", bundle.timeslots.iter().map(|t| t.id), &mut errors);

    fn chk_unique_keys<K: Eq + std::hash::Hash + std::fmt::Debug + Clone>(
        name: &str,
        keys: impl Iterator<Item = K>,
        errors: &mut Vec<String>,
    ) {
        let mut seen = HashSet::new();
        for key in keys {
            if !seen.insert(key.clone()) {
                errors.push(format!("duplicate {name} natural key: {:?}", key));
            }
        }
    }
    chk_unique_keys(
        "availability",
        bundle.availability.iter().map(|a| (a.lecturer_id, a.timeslot_id)),
        &mut errors,
    );
    chk_unique_keys(
        "preference",
        bundle.preferences.iter().map(|p| (p.lecturer_id, p.timeslot_id)),
        &mut errors,
    );
    chk_unique_keys("enrollment", bundle.enrollments.iter().map(|e| e.class_id), &mut errors);

    let course_ids: HashSet<_> = bundle.courses.iter().map(|c| c.id).collect();
    let lecturer_ids: HashSet<_> = bundle.lecturers.iter().map(|l| l.id).collect();
    let timeslot_ids: HashSet<_> = bundle.timeslots.iter().map(|t| t.id).collect();
    let class_ids: HashSet<_> = bundle.classes.iter().map(|c| c.id).collect();

    for class in &bundle.classes {
        if !course_ids.contains(&class.course_id) {
            errors.push(format!(
                "class {} references missing course {}",
                class.id, class.course_id
            ));
        }
    }
    for a in &bundle.availability {
        if !lecturer_ids.contains(&a.lecturer_id) {
            errors.push(format!(
                "availability references missing lecturer {}",
                a.lecturer_id
            ));
        }
        if !timeslot_ids.contains(&a.timeslot_id) {
            errors.push(format!(
                "availability references missing timeslot {}",
                a.timeslot_id
            ));
        }
    }
    for p in &bundle.preferences {
        if !lecturer_ids.contains(&p.lecturer_id) {
            errors.push(format!(
                "preference references missing lecturer {}",
                p.lecturer_id
            ));
        }
        if !timeslot_ids.contains(&p.timeslot_id) {
            errors.push(format!(
                "preference references missing timeslot {}",
                p.timeslot_id
            ));
        }
    }
    for e in &bundle.enrollments {
        if !class_ids.contains(&e.class_id) {
            errors.push(format!("enrollment references missing class {}", e.class_id));
        }
    }
    for req in &bundle.equipment_requirements {
        if !course_ids.contains(&req.course_id) {
            errors.push(format!(
                "equipment requirement references missing course {}",
                req.course_id
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::Msg(errors.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{Availability, AvailabilityStatus, Enrollment, Preference};

    fn bundle_with(mutate: impl FnOnce(&mut types::DatasetBundle)) -> types::DatasetBundle {
        let mut bundle = store_mem_fixture();
        mutate(&mut bundle);
        bundle
    }

    // `sched-core` has no fixture crate of its own; this mirrors
    // `store_mem::fixtures::minimal_bundle` closely enough to exercise
    // `validate` without introducing a dependency cycle.
    fn store_mem_fixture() -> types::DatasetBundle {
        use chrono::NaiveTime;
        use std::collections::HashMap;
        let dataset_id = DatasetId(1);
        types::DatasetBundle {
            dataset: types::Dataset { id: dataset_id, name: "fixture".into() },
            courses: vec![types::Course {
                id: types::CourseId(1),
                dataset_id,
                code: "CS101".into(),
                name: "Intro".into(),
                credits: 3,
                requires_lab: false,
                session_profile: types::SessionProfile {
                    candidate_lecturer_codes: vec![types::LecturerCode("L1".into())],
                },
            }],
            classes: vec![types::Class {
                id: ClassId(1),
                dataset_id,
                course_id: types::CourseId(1),
                cohort_id: "A".into(),
                class_capacity: 30,
                session_type: types::SessionType::Lecture,
                needs_back_to_back: false,
                same_room_preferred: false,
            }],
            lecturers: vec![types::Lecturer {
                id: types::LecturerId(1),
                dataset_id,
                code: types::LecturerCode("L1".into()),
                name: "Dr. Ada".into(),
                home_building: None,
            }],
            rooms: vec![types::Room {
                id: types::RoomId(1),
                dataset_id,
                code: "R100".into(),
                capacity: 40,
                room_type: types::RoomType::Lecture,
                building: "Main".into(),
                equipment: HashMap::new(),
            }],
            timeslots: vec![types::Timeslot {
                id: types::TimeslotId(1),
                dataset_id,
                day: types::DayOfWeek::Mon,
                start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                end: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
                block_minutes: 60,
                is_peak: false,
            }],
            availability: vec![Availability {
                lecturer_id: types::LecturerId(1),
                timeslot_id: types::TimeslotId(1),
                status: AvailabilityStatus::Available,
            }],
            preferences: vec![Preference {
                lecturer_id: types::LecturerId(1),
                timeslot_id: types::TimeslotId(1),
                score: 1.0,
            }],
            enrollments: vec![Enrollment { class_id: ClassId(1), student_count: 25 }],
            equipment_requirements: Vec::new(),
            penalty_weights: Vec::new(),
        }
    }

    #[test]
    fn valid_bundle_passes() {
        assert!(validate(&store_mem_fixture()).is_ok());
    }

    #[test]
    fn duplicate_availability_natural_key_is_rejected() {
        let bundle = bundle_with(|b| {
            let dup = b.availability[0].clone();
            b.availability.push(dup);
        });
        let err = validate(&bundle).unwrap_err();
        assert!(err.to_string().contains("duplicate availability natural key"));
    }

    #[test]
    fn duplicate_preference_natural_key_is_rejected() {
        let bundle = bundle_with(|b| {
            let dup = b.preferences[0].clone();
            b.preferences.push(dup);
        });
        let err = validate(&bundle).unwrap_err();
        assert!(err.to_string().contains("duplicate preference natural key"));
    }

    #[test]
    fn duplicate_enrollment_class_id_is_rejected() {
        let bundle = bundle_with(|b| {
            let dup = b.enrollments[0].clone();
            b.enrollments.push(dup);
        });
        let err = validate(&bundle).unwrap_err();
        assert!(err.to_string().contains("duplicate enrollment natural key"));
    }
}

/// Runs the full C1 -> C6 pipeline against an already-loaded bundle: validate,
/// preprocess (C2), hand off to the solver (C3 + C4 + C5), and assemble the
/// result envelope. Persistence (C6) is the caller's responsibility, since it
/// needs the dataset's name and id alongside the raw schedule rows.
#[instrument(skip(bundle, solver))]
pub fn run_bwm_ilp(bundle: &DatasetBundle, solver: &dyn Solver) -> Result<BwmIlpResult, CoreError> {
    if bundle.classes.is_empty() {
        return Err(CoreError::EmptyDataset);
    }
    validate(bundle).map_err(|_| CoreError::DanglingReference)?;

    let start = std::time::Instant::now();
    let prep = preprocess::preprocess(bundle)?;
    let outcome = solver.solve(bundle, &prep)?;
    let execution_time = start.elapsed().as_secs_f64();

    tracing::info!(
        dataset_id = %bundle.dataset.id,
        classes = bundle.classes.len(),
        assignments = outcome.assignments.len(),
        objective_value = outcome.objective_value,
        "bwm-ilp solve completed"
    );

    let mut soft_constraint_totals: std::collections::HashMap<String, f64> = types::SoftConstraint::ALL
        .iter()
        .map(|c| (c.as_str().to_string(), 0.0))
        .collect();
    for a in &outcome.assignments {
        for (k, v) in &a.penalty_breakdown {
            *soft_constraint_totals.entry(k.clone()).or_insert(0.0) += v;
        }
    }

    Ok(BwmIlpResult {
        dataset_id: bundle.dataset.id,
        dataset_name: bundle.dataset.name.clone(),
        objective_value: outcome.objective_value,
        soft_constraint_totals,
        solver_status: outcome.solver_status,
        status: outcome.status,
        execution_time,
        assignments: outcome.assignments,
    })
}

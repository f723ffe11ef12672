//! Feasibility Preprocessor (C2): per-class room and timeslot/lecturer
//! candidate sets, computed once before the model is built.

use std::collections::HashMap;

use types::{
    Class, ClassId, Course, CourseEquipmentRequirement, DatasetBundle, LecturerId, RoomId,
    TimeslotId,
};

use crate::CoreError;

pub struct Prep {
    /// `R(c)`: room ids admissible for class c.
    pub room_candidates: HashMap<ClassId, Vec<RoomId>>,
    /// `TL(c)`: (timeslot, lecturer) pairs admissible for class c.
    pub timeslot_lecturer_candidates: HashMap<ClassId, Vec<(TimeslotId, LecturerId)>>,
    /// `T(c)`: distinct timeslots appearing in `TL(c)`.
    pub class_timeslots: HashMap<ClassId, Vec<TimeslotId>>,
}

/// Effective capacity: enrollment student count when present, else declared capacity.
pub fn effective_capacity(class: &Class, enrollment_by_class: &HashMap<ClassId, u32>) -> u32 {
    enrollment_by_class
        .get(&class.id)
        .copied()
        .unwrap_or(class.class_capacity)
}

/// Room-compatibility rule for one class.
///
/// Preserves the source's permissive short-circuit: a non-lab class dropped
/// into a lab/hybrid room skips equipment checks entirely. See DESIGN.md,
/// Open Question 1.
pub fn room_ok_for_course(
    class: &Class,
    room: &types::Room,
    effective_cap: u32,
    requirements: &[&CourseEquipmentRequirement],
) -> bool {
    if room.capacity < effective_cap {
        return false;
    }
    if class.requires_lab() && !room.room_type.is_lab_or_hybrid() {
        return false;
    }
    if !class.requires_lab() && room.room_type.is_lab() {
        return true;
    }
    for req in requirements {
        let applies = match &req.session_type {
            None => true,
            Some(st) => st.eq_ci(&class.session_type),
        };
        if !applies || !req.required {
            continue;
        }
        let have = room.equipment.get(&req.requirement_key).copied().unwrap_or(0);
        let need = req.min_quantity.unwrap_or(1).max(1);
        if have < need {
            return false;
        }
    }
    true
}

fn resolve_candidate_lecturers(
    course: &Course,
    lecturer_by_code: &HashMap<&str, LecturerId>,
    all_lecturer_ids: &[LecturerId],
) -> Vec<LecturerId> {
    let mut resolved: Vec<LecturerId> = course
        .session_profile
        .candidate_lecturer_codes
        .iter()
        .filter_map(|code| lecturer_by_code.get(code.0.as_str()).copied())
        .collect();
    resolved.sort_by_key(|id| id.0);
    resolved.dedup();
    if resolved.is_empty() {
        let mut all = all_lecturer_ids.to_vec();
        all.sort_by_key(|id| id.0);
        all
    } else {
        resolved
    }
}

pub fn preprocess(bundle: &DatasetBundle) -> Result<Prep, CoreError> {
    let course_by_id: HashMap<_, _> = bundle.courses.iter().map(|c| (c.id, c)).collect();
    let lecturer_by_code: HashMap<&str, LecturerId> = bundle
        .lecturers
        .iter()
        .map(|l| (l.code.0.as_str(), l.id))
        .collect();
    let all_lecturer_ids: Vec<LecturerId> = bundle.lecturers.iter().map(|l| l.id).collect();

    let mut availability: HashMap<(LecturerId, TimeslotId), bool> = HashMap::new();
    for a in &bundle.availability {
        availability.insert((a.lecturer_id, a.timeslot_id), a.status.is_available());
    }

    let enrollment_by_class: HashMap<ClassId, u32> = bundle
        .enrollments
        .iter()
        .map(|e| (e.class_id, e.student_count))
        .collect();

    let mut requirements_by_course: HashMap<types::CourseId, Vec<&CourseEquipmentRequirement>> =
        HashMap::new();
    for req in &bundle.equipment_requirements {
        requirements_by_course.entry(req.course_id).or_default().push(req);
    }

    let mut room_candidates = HashMap::new();
    let mut timeslot_lecturer_candidates = HashMap::new();
    let mut class_timeslots = HashMap::new();

    for class in &bundle.classes {
        let course = course_by_id
            .get(&class.course_id)
            .ok_or(CoreError::DanglingReference)?;

        let eff_cap = effective_capacity(class, &enrollment_by_class);
        let requirements = requirements_by_course
            .get(&class.course_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[]);

        let rooms: Vec<RoomId> = bundle
            .rooms
            .iter()
            .filter(|r| room_ok_for_course(class, r, eff_cap, requirements))
            .map(|r| r.id)
            .collect();
        if rooms.is_empty() {
            return Err(CoreError::NoCompatibleRoom(class.id));
        }
        room_candidates.insert(class.id, rooms);

        let candidate_lecturers =
            resolve_candidate_lecturers(course, &lecturer_by_code, &all_lecturer_ids);

        let mut pairs = Vec::new();
        let mut timeslots = Vec::new();
        for &lecturer_id in &candidate_lecturers {
            for ts in &bundle.timeslots {
                if availability
                    .get(&(lecturer_id, ts.id))
                    .copied()
                    .unwrap_or(false)
                {
                    pairs.push((ts.id, lecturer_id));
                    if !timeslots.contains(&ts.id) {
                        timeslots.push(ts.id);
                    }
                }
            }
        }
        if pairs.is_empty() {
            return Err(CoreError::NoLecturerAvailability(class.id));
        }
        timeslot_lecturer_candidates.insert(class.id, pairs);
        class_timeslots.insert(class.id, timeslots);
    }

    Ok(Prep {
        room_candidates,
        timeslot_lecturer_candidates,
        class_timeslots,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::*;

    fn room(id: i64, capacity: u32, room_type: RoomType) -> Room {
        Room {
            id: RoomId(id),
            dataset_id: DatasetId(1),
            code: format!("R{id}"),
            capacity,
            room_type,
            building: "Main".into(),
            equipment: Default::default(),
        }
    }

    fn lecture_class(capacity: u32) -> Class {
        Class {
            id: ClassId(1),
            dataset_id: DatasetId(1),
            course_id: CourseId(1),
            cohort_id: "A".into(),
            class_capacity: capacity,
            session_type: SessionType::Lecture,
            needs_back_to_back: false,
            same_room_preferred: false,
        }
    }

    #[test]
    fn lecture_class_rejected_by_undersized_room() {
        let c = lecture_class(50);
        let r = room(1, 30, RoomType::Lecture);
        assert!(!room_ok_for_course(&c, &r, 50, &[]));
    }

    #[test]
    fn non_lab_class_permitted_in_lab_room_without_equipment_checks() {
        let c = lecture_class(20);
        let r = room(1, 30, RoomType::Lab);
        let req = CourseEquipmentRequirement {
            course_id: CourseId(1),
            session_type: None,
            requirement_key: "projector".into(),
            min_quantity: Some(1),
            required: true,
            preferred: false,
        };
        assert!(room_ok_for_course(&c, &r, 20, &[&req]));
    }

    #[test]
    fn lab_class_requires_lab_or_hybrid_room() {
        let mut c = lecture_class(20);
        c.session_type = SessionType::Lab;
        let lecture_room = room(1, 30, RoomType::Lecture);
        assert!(!room_ok_for_course(&c, &lecture_room, 20, &[]));
        let lab_room = room(2, 30, RoomType::Lab);
        assert!(room_ok_for_course(&c, &lab_room, 20, &[]));
    }

    #[test]
    fn lab_class_enforces_required_equipment() {
        let mut c = lecture_class(20);
        c.session_type = SessionType::Lab;
        let r = room(1, 30, RoomType::Lab);
        let req = CourseEquipmentRequirement {
            course_id: CourseId(1),
            session_type: Some(SessionType::Lab),
            requirement_key: "workstation".into(),
            min_quantity: Some(20),
            required: true,
            preferred: false,
        };
        assert!(!room_ok_for_course(&c, &r, 20, &[&req]));
    }
}

//! Builders for constructing [`DatasetBundle`]s in tests without having to
//! hand-write every field of every entity.

use std::collections::HashMap;

use chrono::NaiveTime;
use types::{
    Availability, AvailabilityStatus, Class, Course, CourseEquipmentRequirement, DatasetBundle,
    DatasetId, DayOfWeek, Enrollment, Lecturer, LecturerCode, PenaltyWeight, Preference, Room,
    RoomType, SessionProfile, SessionType, SoftConstraint, Timeslot,
};

pub struct DatasetBuilder {
    bundle: DatasetBundle,
}

impl DatasetBuilder {
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            bundle: DatasetBundle {
                dataset: types::Dataset {
                    id: DatasetId(id),
                    name: name.to_string(),
                },
                courses: Vec::new(),
                classes: Vec::new(),
                lecturers: Vec::new(),
                rooms: Vec::new(),
                timeslots: Vec::new(),
                availability: Vec::new(),
                preferences: Vec::new(),
                enrollments: Vec::new(),
                equipment_requirements: Vec::new(),
                penalty_weights: Vec::new(),
            },
        }
    }

    pub fn course(mut self, course: Course) -> Self {
        self.bundle.courses.push(course);
        self
    }

    pub fn class(mut self, class: Class) -> Self {
        self.bundle.classes.push(class);
        self
    }

    pub fn lecturer(mut self, lecturer: Lecturer) -> Self {
        self.bundle.lecturers.push(lecturer);
        self
    }

    pub fn room(mut self, room: Room) -> Self {
        self.bundle.rooms.push(room);
        self
    }

    pub fn timeslot(mut self, timeslot: Timeslot) -> Self {
        self.bundle.timeslots.push(timeslot);
        self
    }

    pub fn availability(mut self, availability: Availability) -> Self {
        self.bundle.availability.push(availability);
        self
    }

    pub fn preference(mut self, preference: Preference) -> Self {
        self.bundle.preferences.push(preference);
        self
    }

    pub fn enrollment(mut self, enrollment: Enrollment) -> Self {
        self.bundle.enrollments.push(enrollment);
        self
    }

    pub fn equipment_requirement(mut self, req: CourseEquipmentRequirement) -> Self {
        self.bundle.equipment_requirements.push(req);
        self
    }

    pub fn penalty_weight(mut self, constraint: SoftConstraint, weight: f64) -> Self {
        self.bundle.penalty_weights.push(PenaltyWeight {
            dataset_id: self.bundle.dataset.id,
            constraint,
            weight,
        });
        self
    }

    pub fn build(self) -> DatasetBundle {
        self.bundle
    }
}

/// One course, one class, one lecturer, one room, two timeslots - the
/// smallest dataset `run_bwm_ilp` can schedule. Used as a base for scenario
/// tests that only need to perturb a single field.
pub fn minimal_bundle() -> DatasetBundle {
    let dataset_id = DatasetId(1);
    let course = Course {
        id: types::CourseId(1),
        dataset_id,
        code: "CS101".into(),
        name: "Intro to Computing".into(),
        credits: 3,
        requires_lab: false,
        session_profile: SessionProfile {
            candidate_lecturer_codes: vec![LecturerCode("L1".into())],
        },
    };
    let class = Class {
        id: types::ClassId(1),
        dataset_id,
        course_id: course.id,
        cohort_id: "A".into(),
        class_capacity: 30,
        session_type: SessionType::Lecture,
        needs_back_to_back: false,
        same_room_preferred: false,
    };
    let lecturer = Lecturer {
        id: types::LecturerId(1),
        dataset_id,
        code: LecturerCode("L1".into()),
        name: "Dr. Ada".into(),
        home_building: None,
    };
    let room = Room {
        id: types::RoomId(1),
        dataset_id,
        code: "R100".into(),
        capacity: 40,
        room_type: RoomType::Lecture,
        building: "Main".into(),
        equipment: HashMap::new(),
    };
    let morning = Timeslot {
        id: types::TimeslotId(1),
        dataset_id,
        day: DayOfWeek::Mon,
        start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        end: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        block_minutes: 60,
        is_peak: false,
    };
    let afternoon = Timeslot {
        id: types::TimeslotId(2),
        dataset_id,
        day: DayOfWeek::Mon,
        start: NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
        end: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
        block_minutes: 60,
        is_peak: true,
    };

    DatasetBuilder::new(1, "fixture")
        .course(course)
        .class(class)
        .lecturer(lecturer)
        .room(room)
        .timeslot(morning.clone())
        .timeslot(afternoon.clone())
        .availability(Availability {
            lecturer_id: types::LecturerId(1),
            timeslot_id: morning.id,
            status: AvailabilityStatus::Available,
        })
        .availability(Availability {
            lecturer_id: types::LecturerId(1),
            timeslot_id: afternoon.id,
            status: AvailabilityStatus::Available,
        })
        .preference(Preference {
            lecturer_id: types::LecturerId(1),
            timeslot_id: morning.id,
            score: 1.0,
        })
        .preference(Preference {
            lecturer_id: types::LecturerId(1),
            timeslot_id: afternoon.id,
            score: 0.2,
        })
        .enrollment(Enrollment {
            class_id: types::ClassId(1),
            student_count: 25,
        })
        .penalty_weight(SoftConstraint::LecturerPreference, 0.45)
        .penalty_weight(SoftConstraint::RoomUtilization, 0.35)
        .penalty_weight(SoftConstraint::PeakTimeAvoidance, 0.20)
        .build()
}

/// Three classes, two lecturers, two rooms, three timeslots, with enough
/// candidate overlap that a correct solve has to actively avoid lecturer and
/// room double-booking rather than trivially satisfying it by having only
/// one option per class.
pub fn contended_bundle() -> DatasetBundle {
    let dataset_id = DatasetId(2);

    let lecturer_codes = ["LA", "LB"];
    let lecturers: Vec<Lecturer> = lecturer_codes
        .iter()
        .enumerate()
        .map(|(i, code)| Lecturer {
            id: types::LecturerId(i as i64 + 1),
            dataset_id,
            code: LecturerCode((*code).into()),
            name: format!("Lecturer {code}"),
            home_building: None,
        })
        .collect();

    let rooms: Vec<Room> = (1..=2)
        .map(|i| Room {
            id: types::RoomId(i),
            dataset_id,
            code: format!("R{i}"),
            capacity: 35,
            room_type: if i == 2 { RoomType::Lab } else { RoomType::Lecture },
            building: "Main".into(),
            equipment: HashMap::new(),
        })
        .collect();

    let timeslots: Vec<Timeslot> = (1..=3)
        .map(|i| Timeslot {
            id: types::TimeslotId(i),
            dataset_id,
            day: DayOfWeek::Mon,
            start: NaiveTime::from_hms_opt((8 + i as u32), 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt((9 + i as u32), 0, 0).unwrap(),
            block_minutes: 60,
            is_peak: i == 2,
        })
        .collect();

    let mut builder = DatasetBuilder::new(2, "contended");
    for l in lecturers {
        builder = builder.lecturer(l);
    }
    for r in rooms {
        builder = builder.room(r);
    }
    for t in &timeslots {
        builder = builder.timeslot(t.clone());
    }
    for lecturer_id in 1..=2i64 {
        for t in &timeslots {
            builder = builder.availability(Availability {
                lecturer_id: types::LecturerId(lecturer_id),
                timeslot_id: t.id,
                status: AvailabilityStatus::Available,
            });
            builder = builder.preference(Preference {
                lecturer_id: types::LecturerId(lecturer_id),
                timeslot_id: t.id,
                score: 0.5,
            });
        }
    }

    // Three lecture classes, all eligible for either lecturer and both rooms,
    // so the solver must actively separate them across timeslots/rooms.
    for i in 1..=3i64 {
        let course = Course {
            id: types::CourseId(i),
            dataset_id,
            code: format!("C{i}"),
            name: format!("Course {i}"),
            credits: 3,
            requires_lab: false,
            session_profile: SessionProfile {
                candidate_lecturer_codes: vec![LecturerCode("LA".into()), LecturerCode("LB".into())],
            },
        };
        let class = Class {
            id: types::ClassId(i),
            dataset_id,
            course_id: course.id,
            cohort_id: format!("Cohort{i}"),
            class_capacity: 30,
            session_type: SessionType::Lecture,
            needs_back_to_back: false,
            same_room_preferred: false,
        };
        builder = builder
            .course(course)
            .class(class)
            .enrollment(Enrollment {
                class_id: types::ClassId(i),
                student_count: 20,
            });
    }

    builder
        .penalty_weight(SoftConstraint::LecturerPreference, 0.45)
        .penalty_weight(SoftConstraint::RoomUtilization, 0.35)
        .penalty_weight(SoftConstraint::PeakTimeAvoidance, 0.20)
        .build()
}

/// One class, one lecturer, one room, two timeslots (one peak, one not),
/// with preference scores set so that taking the peak penalty outweighs
/// chasing the higher preference score - a fixed-point regression for the
/// weighted-sum arithmetic rather than a feasibility check.
pub fn preference_tradeoff_bundle() -> DatasetBundle {
    let dataset_id = DatasetId(3);
    let course = Course {
        id: types::CourseId(1),
        dataset_id,
        code: "CS201".into(),
        name: "Tradeoff Course".into(),
        credits: 3,
        requires_lab: false,
        session_profile: SessionProfile {
            candidate_lecturer_codes: vec![LecturerCode("L1".into())],
        },
    };
    let class = Class {
        id: types::ClassId(1),
        dataset_id,
        course_id: course.id,
        cohort_id: "A".into(),
        class_capacity: 20,
        session_type: SessionType::Lecture,
        needs_back_to_back: false,
        same_room_preferred: false,
    };
    let lecturer = Lecturer {
        id: types::LecturerId(1),
        dataset_id,
        code: LecturerCode("L1".into()),
        name: "Dr. Bell".into(),
        home_building: None,
    };
    let room = Room {
        id: types::RoomId(1),
        dataset_id,
        code: "R1".into(),
        capacity: 20,
        room_type: RoomType::Lecture,
        building: "Main".into(),
        equipment: HashMap::new(),
    };
    let peak = Timeslot {
        id: types::TimeslotId(1),
        dataset_id,
        day: DayOfWeek::Mon,
        start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        end: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        block_minutes: 60,
        is_peak: true,
    };
    let off_peak = Timeslot {
        id: types::TimeslotId(2),
        dataset_id,
        day: DayOfWeek::Mon,
        start: NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
        end: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
        block_minutes: 60,
        is_peak: false,
    };

    DatasetBuilder::new(3, "tradeoff")
        .course(course)
        .class(class)
        .lecturer(lecturer)
        .room(room)
        .timeslot(peak.clone())
        .timeslot(off_peak.clone())
        .availability(Availability {
            lecturer_id: types::LecturerId(1),
            timeslot_id: peak.id,
            status: AvailabilityStatus::Available,
        })
        .availability(Availability {
            lecturer_id: types::LecturerId(1),
            timeslot_id: off_peak.id,
            status: AvailabilityStatus::Available,
        })
        .preference(Preference {
            lecturer_id: types::LecturerId(1),
            timeslot_id: peak.id,
            score: 1.0,
        })
        .preference(Preference {
            lecturer_id: types::LecturerId(1),
            timeslot_id: off_peak.id,
            score: 0.5,
        })
        .enrollment(Enrollment {
            class_id: types::ClassId(1),
            student_count: 20,
        })
        .penalty_weight(SoftConstraint::LecturerPreference, 0.45)
        .penalty_weight(SoftConstraint::RoomUtilization, 0.0)
        .penalty_weight(SoftConstraint::PeakTimeAvoidance, 0.20)
        .build()
}

/// Two classes, one room, one timeslot, two lecturers (each the sole
/// candidate for its own class). Both classes need the room at the only
/// timeslot available, which H4 forbids - no feasible schedule exists.
pub fn single_slot_conflict_bundle() -> DatasetBundle {
    let dataset_id = DatasetId(4);
    let room = Room {
        id: types::RoomId(1),
        dataset_id,
        code: "R1".into(),
        capacity: 30,
        room_type: RoomType::Lecture,
        building: "Main".into(),
        equipment: HashMap::new(),
    };
    let timeslot = Timeslot {
        id: types::TimeslotId(1),
        dataset_id,
        day: DayOfWeek::Mon,
        start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        end: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        block_minutes: 60,
        is_peak: false,
    };

    let mut builder = DatasetBuilder::new(4, "conflict").room(room).timeslot(timeslot.clone());

    for i in 1..=2i64 {
        let lecturer_code = LecturerCode(format!("L{i}"));
        let lecturer = Lecturer {
            id: types::LecturerId(i),
            dataset_id,
            code: lecturer_code.clone(),
            name: format!("Lecturer {i}"),
            home_building: None,
        };
        let course = Course {
            id: types::CourseId(i),
            dataset_id,
            code: format!("C{i}"),
            name: format!("Course {i}"),
            credits: 3,
            requires_lab: false,
            session_profile: SessionProfile {
                candidate_lecturer_codes: vec![lecturer_code],
            },
        };
        let class = Class {
            id: types::ClassId(i),
            dataset_id,
            course_id: course.id,
            cohort_id: format!("Cohort{i}"),
            class_capacity: 20,
            session_type: SessionType::Lecture,
            needs_back_to_back: false,
            same_room_preferred: false,
        };
        builder = builder
            .lecturer(lecturer)
            .course(course)
            .class(class)
            .availability(Availability {
                lecturer_id: types::LecturerId(i),
                timeslot_id: timeslot.id,
                status: AvailabilityStatus::Available,
            })
            .enrollment(Enrollment {
                class_id: types::ClassId(i),
                student_count: 20,
            });
    }

    builder
        .penalty_weight(SoftConstraint::LecturerPreference, 0.45)
        .penalty_weight(SoftConstraint::RoomUtilization, 0.35)
        .penalty_weight(SoftConstraint::PeakTimeAvoidance, 0.20)
        .build()
}

/// One lab class and one lecture class, one lab room and one lecture room,
/// a single shared timeslot, each class with its own dedicated lecturer.
/// The lab class can only legally land in the lab room, and H4 forces the
/// two classes into different rooms, so the lecture class is forced into
/// the lecture room by elimination.
pub fn lab_and_lecture_routing_bundle() -> DatasetBundle {
    let dataset_id = DatasetId(5);
    let timeslot = Timeslot {
        id: types::TimeslotId(1),
        dataset_id,
        day: DayOfWeek::Mon,
        start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        end: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        block_minutes: 60,
        is_peak: false,
    };
    let lab_room = Room {
        id: types::RoomId(1),
        dataset_id,
        code: "LAB1".into(),
        capacity: 25,
        room_type: RoomType::Lab,
        building: "Main".into(),
        equipment: HashMap::new(),
    };
    let lecture_room = Room {
        id: types::RoomId(2),
        dataset_id,
        code: "LEC1".into(),
        capacity: 25,
        room_type: RoomType::Lecture,
        building: "Main".into(),
        equipment: HashMap::new(),
    };

    let mut builder = DatasetBuilder::new(5, "lab-routing")
        .timeslot(timeslot.clone())
        .room(lab_room)
        .room(lecture_room);

    let session_types = [SessionType::Lab, SessionType::Lecture];
    for (i, session_type) in session_types.into_iter().enumerate() {
        let idx = i as i64 + 1;
        let lecturer_code = LecturerCode(format!("L{idx}"));
        let lecturer = Lecturer {
            id: types::LecturerId(idx),
            dataset_id,
            code: lecturer_code.clone(),
            name: format!("Lecturer {idx}"),
            home_building: None,
        };
        let course = Course {
            id: types::CourseId(idx),
            dataset_id,
            code: format!("C{idx}"),
            name: format!("Course {idx}"),
            credits: 3,
            requires_lab: session_type == SessionType::Lab,
            session_profile: SessionProfile {
                candidate_lecturer_codes: vec![lecturer_code],
            },
        };
        let class = Class {
            id: types::ClassId(idx),
            dataset_id,
            course_id: course.id,
            cohort_id: format!("Cohort{idx}"),
            class_capacity: 20,
            session_type,
            needs_back_to_back: false,
            same_room_preferred: false,
        };
        builder = builder
            .lecturer(lecturer)
            .course(course)
            .class(class)
            .availability(Availability {
                lecturer_id: types::LecturerId(idx),
                timeslot_id: timeslot.id,
                status: AvailabilityStatus::Available,
            })
            .enrollment(Enrollment {
                class_id: types::ClassId(idx),
                student_count: 20,
            });
    }

    builder
        .penalty_weight(SoftConstraint::LecturerPreference, 0.45)
        .penalty_weight(SoftConstraint::RoomUtilization, 0.35)
        .penalty_weight(SoftConstraint::PeakTimeAvoidance, 0.20)
        .build()
}

/// `n` classes, `n` lecturers, `n` rooms, one shared timeslot, each class
/// free to use any lecturer and any room. Feasible by construction for any
/// `n` (a bijection between classes, lecturers and rooms always exists),
/// so every generated size is a valid case for a property test.
pub fn uniform_feasible_bundle(n: i64) -> DatasetBundle {
    let dataset_id = DatasetId(1000 + n);
    let timeslot = Timeslot {
        id: types::TimeslotId(1),
        dataset_id,
        day: DayOfWeek::Mon,
        start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        end: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        block_minutes: 60,
        is_peak: false,
    };
    let mut builder = DatasetBuilder::new(1000 + n, "uniform").timeslot(timeslot.clone());

    let all_codes: Vec<LecturerCode> = (1..=n).map(|i| LecturerCode(format!("L{i}"))).collect();

    for i in 1..=n {
        let lecturer = Lecturer {
            id: types::LecturerId(i),
            dataset_id,
            code: LecturerCode(format!("L{i}")),
            name: format!("Lecturer {i}"),
            home_building: None,
        };
        let room = Room {
            id: types::RoomId(i),
            dataset_id,
            code: format!("R{i}"),
            capacity: 20,
            room_type: RoomType::Lecture,
            building: "Main".into(),
            equipment: HashMap::new(),
        };
        builder = builder.lecturer(lecturer).room(room).availability(Availability {
            lecturer_id: types::LecturerId(i),
            timeslot_id: timeslot.id,
            status: AvailabilityStatus::Available,
        });
    }

    for i in 1..=n {
        let course = Course {
            id: types::CourseId(i),
            dataset_id,
            code: format!("C{i}"),
            name: format!("Course {i}"),
            credits: 3,
            requires_lab: false,
            session_profile: SessionProfile {
                candidate_lecturer_codes: all_codes.clone(),
            },
        };
        let class = Class {
            id: types::ClassId(i),
            dataset_id,
            course_id: course.id,
            cohort_id: format!("Cohort{i}"),
            class_capacity: 20,
            session_type: SessionType::Lecture,
            needs_back_to_back: false,
            same_room_preferred: false,
        };
        builder = builder.course(course).class(class).enrollment(Enrollment {
            class_id: types::ClassId(i),
            student_count: 20,
        });
    }

    builder
        .penalty_weight(SoftConstraint::LecturerPreference, 0.45)
        .penalty_weight(SoftConstraint::RoomUtilization, 0.35)
        .penalty_weight(SoftConstraint::PeakTimeAvoidance, 0.20)
        .build()
}

/// One class whose capacity exceeds every room's, one lecturer, one room,
/// one timeslot - preprocessing must reject the class before a model is
/// ever built.
pub fn undersized_room_bundle() -> DatasetBundle {
    let dataset_id = DatasetId(6);
    let course = Course {
        id: types::CourseId(1),
        dataset_id,
        code: "CS301".into(),
        name: "Oversubscribed Course".into(),
        credits: 3,
        requires_lab: false,
        session_profile: SessionProfile {
            candidate_lecturer_codes: vec![LecturerCode("L1".into())],
        },
    };
    let class = Class {
        id: types::ClassId(1),
        dataset_id,
        course_id: course.id,
        cohort_id: "A".into(),
        class_capacity: 50,
        session_type: SessionType::Lecture,
        needs_back_to_back: false,
        same_room_preferred: false,
    };
    let lecturer = Lecturer {
        id: types::LecturerId(1),
        dataset_id,
        code: LecturerCode("L1".into()),
        name: "Dr. Carver".into(),
        home_building: None,
    };
    let room = Room {
        id: types::RoomId(1),
        dataset_id,
        code: "R1".into(),
        capacity: 30,
        room_type: RoomType::Lecture,
        building: "Main".into(),
        equipment: HashMap::new(),
    };
    let timeslot = Timeslot {
        id: types::TimeslotId(1),
        dataset_id,
        day: DayOfWeek::Mon,
        start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        end: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        block_minutes: 60,
        is_peak: false,
    };

    DatasetBuilder::new(6, "undersized")
        .course(course)
        .class(class)
        .lecturer(lecturer)
        .room(room)
        .timeslot(timeslot.clone())
        .availability(Availability {
            lecturer_id: types::LecturerId(1),
            timeslot_id: timeslot.id,
            status: AvailabilityStatus::Available,
        })
        .enrollment(Enrollment {
            class_id: types::ClassId(1),
            student_count: 50,
        })
        .penalty_weight(SoftConstraint::LecturerPreference, 0.45)
        .penalty_weight(SoftConstraint::RoomUtilization, 0.35)
        .penalty_weight(SoftConstraint::PeakTimeAvoidance, 0.20)
        .build()
}

use chrono::NaiveTime;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use utoipa::ToSchema;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash, Ord, PartialOrd,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}
id_newtype!(DatasetId);
id_newtype!(CourseId);
id_newtype!(ClassId);
id_newtype!(LecturerId);
id_newtype!(RoomId);
id_newtype!(TimeslotId);

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[serde(transparent)]
pub struct LecturerCode(pub String);

impl fmt::Display for LecturerCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl DayOfWeek {
    pub fn parse_ci(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mon" | "monday" => Some(Self::Mon),
            "tue" | "tuesday" => Some(Self::Tue),
            "wed" | "wednesday" => Some(Self::Wed),
            "thu" | "thursday" => Some(Self::Thu),
            "fri" | "friday" => Some(Self::Fri),
            "sat" | "saturday" => Some(Self::Sat),
            "sun" | "sunday" => Some(Self::Sun),
            _ => None,
        }
    }
}

/// Closed session-kind variants. `Other` keeps ingestion total over dataset
/// values the hard rules don't special-case, instead of rejecting them.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    Lecture,
    Lab,
    Seminar,
    Other(String),
}

impl SessionType {
    pub fn parse_ci(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "lecture" => Self::Lecture,
            "lab" => Self::Lab,
            "seminar" => Self::Seminar,
            _ => Self::Other(s.to_string()),
        }
    }

    pub fn eq_ci(&self, other: &SessionType) -> bool {
        self.as_str_lower() == other.as_str_lower()
    }

    pub fn as_str_lower(&self) -> String {
        match self {
            Self::Lecture => "lecture".to_string(),
            Self::Lab => "lab".to_string(),
            Self::Seminar => "seminar".to_string(),
            Self::Other(s) => s.to_ascii_lowercase(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    Lecture,
    Lab,
    Hybrid,
    Seminar,
    Other(String),
}

impl RoomType {
    pub fn parse_ci(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "lecture" => Self::Lecture,
            "lab" => Self::Lab,
            "hybrid" => Self::Hybrid,
            "seminar" => Self::Seminar,
            _ => Self::Other(s.to_string()),
        }
    }

    pub fn is_lab_or_hybrid(&self) -> bool {
        matches!(self, Self::Lab | Self::Hybrid)
    }

    pub fn is_lab(&self) -> bool {
        matches!(self, Self::Lab)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityStatus {
    Available,
    Unavailable,
    Other(String),
}

impl AvailabilityStatus {
    pub fn parse_ci(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "available" => Self::Available,
            "unavailable" => Self::Unavailable,
            _ => Self::Other(s.to_string()),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SoftConstraint {
    LecturerPreference,
    RoomUtilization,
    PeakTimeAvoidance,
}

impl SoftConstraint {
    pub const ALL: [SoftConstraint; 3] = [
        SoftConstraint::LecturerPreference,
        SoftConstraint::RoomUtilization,
        SoftConstraint::PeakTimeAvoidance,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "LECTURER_PREFERENCE" => Some(Self::LecturerPreference),
            "ROOM_UTILIZATION" => Some(Self::RoomUtilization),
            "PEAK_TIME_AVOIDANCE" => Some(Self::PeakTimeAvoidance),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LecturerPreference => "LECTURER_PREFERENCE",
            Self::RoomUtilization => "ROOM_UTILIZATION",
            Self::PeakTimeAvoidance => "PEAK_TIME_AVOIDANCE",
        }
    }
}

impl fmt::Display for SoftConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Dataset {
    pub id: DatasetId,
    pub name: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct SessionProfile {
    #[serde(default)]
    pub candidate_lecturer_codes: Vec<LecturerCode>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Course {
    pub id: CourseId,
    pub dataset_id: DatasetId,
    pub code: String,
    pub name: String,
    pub credits: u16,
    #[serde(default)]
    pub requires_lab: bool,
    #[serde(default)]
    pub session_profile: SessionProfile,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Class {
    pub id: ClassId,
    pub dataset_id: DatasetId,
    pub course_id: CourseId,
    pub cohort_id: String,
    pub class_capacity: u32,
    pub session_type: SessionType,
    #[serde(default)]
    pub needs_back_to_back: bool,
    #[serde(default)]
    pub same_room_preferred: bool,
}

impl Class {
    /// A class requires a lab room iff its session type is `Lab`.
    pub fn requires_lab(&self) -> bool {
        matches!(self.session_type, SessionType::Lab)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Lecturer {
    pub id: LecturerId,
    pub dataset_id: DatasetId,
    pub code: LecturerCode,
    pub name: String,
    #[serde(default)]
    pub home_building: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Room {
    pub id: RoomId,
    pub dataset_id: DatasetId,
    pub code: String,
    pub capacity: u32,
    pub room_type: RoomType,
    pub building: String,
    #[serde(default)]
    pub equipment: HashMap<String, u32>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Timeslot {
    pub id: TimeslotId,
    pub dataset_id: DatasetId,
    pub day: DayOfWeek,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub block_minutes: u32,
    #[serde(default)]
    pub is_peak: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Availability {
    pub lecturer_id: LecturerId,
    pub timeslot_id: TimeslotId,
    pub status: AvailabilityStatus,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Preference {
    pub lecturer_id: LecturerId,
    pub timeslot_id: TimeslotId,
    pub score: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Enrollment {
    pub class_id: ClassId,
    pub student_count: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct CourseEquipmentRequirement {
    pub course_id: CourseId,
    #[serde(default)]
    pub session_type: Option<SessionType>,
    pub requirement_key: String,
    #[serde(default)]
    pub min_quantity: Option<u32>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub preferred: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct PenaltyWeight {
    pub dataset_id: DatasetId,
    pub constraint: SoftConstraint,
    pub weight: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct DatasetBundle {
    pub dataset: Dataset,
    pub courses: Vec<Course>,
    pub classes: Vec<Class>,
    pub lecturers: Vec<Lecturer>,
    pub rooms: Vec<Room>,
    pub timeslots: Vec<Timeslot>,
    pub availability: Vec<Availability>,
    pub preferences: Vec<Preference>,
    pub enrollments: Vec<Enrollment>,
    pub equipment_requirements: Vec<CourseEquipmentRequirement>,
    pub penalty_weights: Vec<PenaltyWeight>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct ScheduleEntry {
    pub dataset_id: DatasetId,
    pub class_id: ClassId,
    pub lecturer_id: LecturerId,
    pub room_id: RoomId,
    pub timeslot_id: TimeslotId,
    pub status: String,
    pub penalty: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Assignment {
    pub class_id: ClassId,
    pub course_code: String,
    pub course_name: String,
    pub cohort_id: String,
    pub lecturer: String,
    pub lecturer_code: LecturerCode,
    pub room_id: RoomId,
    pub room_code: String,
    pub building: String,
    pub timeslot_id: TimeslotId,
    pub day: DayOfWeek,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub penalty: f64,
    pub penalty_breakdown: HashMap<String, f64>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolverStatus {
    Feasible,
    NotFeasible,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolutionStatus {
    Optimal,
    NotOptimal,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct BwmIlpResult {
    pub dataset_id: DatasetId,
    pub dataset_name: String,
    pub objective_value: f64,
    pub soft_constraint_totals: HashMap<String, f64>,
    pub solver_status: SolverStatus,
    pub status: SolutionStatus,
    pub execution_time: f64,
    pub assignments: Vec<Assignment>,
}

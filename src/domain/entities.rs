//! Domain entities. Pure data structures for the core business.
//!
//! Catalog records (courses, pools, degrees) are read-only to the engine;
//! timelines and audits are recomputed on every request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A catalog course, keyed by its code (e.g. "COMP 248").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub title: String,
    pub credits: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub offered_in: Vec<String>,
    /// Conjunctive-normal requisites: every inner set must be satisfied by one of its members.
    #[serde(default)]
    pub requisites: Vec<Vec<String>>,
}

impl Course {
    /// Stand-in record for a code the catalog does not know.
    pub fn placeholder(code: &str, credits: f64) -> Self {
        Self {
            id: code.to_string(),
            title: code.to_string(),
            credits,
            description: String::new(),
            offered_in: Vec::new(),
            requisites: Vec::new(),
        }
    }
}

/// Named bucket of courses from which a student must earn `credits_required`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePool {
    pub id: String,
    pub name: String,
    pub credits_required: f64,
    #[serde(default)]
    pub courses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Degree {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub total_credits: Option<f64>,
    /// Ids of the pools that make up the degree.
    #[serde(default)]
    pub course_pools: Vec<String>,
}

/// Build-time status of a course on a timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseStatus {
    Completed,
    Planned,
    Incomplete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseStatusEntry {
    pub status: CourseStatus,
    pub semester: Option<String>,
}

impl CourseStatusEntry {
    pub fn new(status: CourseStatus, semester: Option<String>) -> Self {
        Self { status, semester }
    }

    /// Never attempted: incomplete with no semester.
    pub fn unattempted() -> Self {
        Self::new(CourseStatus::Incomplete, None)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemesterCourse {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    /// Display hint, e.g. "DISC" for a discontinued course.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SemesterCourse {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            grade: None,
            message: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Semester {
    pub term: String,
    #[serde(default)]
    pub courses: Vec<SemesterCourse>,
}

impl Semester {
    pub fn empty(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            courses: Vec::new(),
        }
    }
}

/// Catalog course enriched with its resolved status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineCourse {
    #[serde(flatten)]
    pub course: Course,
    pub status: CourseStatusEntry,
}

/// Canonical timeline: output of the builder, input of the audit.
///
/// Every course id referenced by a pool or a semester has an entry in `courses`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineResult {
    pub degree: Degree,
    #[serde(rename = "coursePools", alias = "pools")]
    pub pools: Vec<CoursePool>,
    pub semesters: Vec<Semester>,
    #[serde(default)]
    pub courses: BTreeMap<String, TimelineCourse>,
}

impl TimelineResult {
    pub fn status_of(&self, code: &str) -> Option<&CourseStatusEntry> {
        self.courses.get(code).map(|c| &c.status)
    }

    pub fn has_pool(&self, pool_id: &str) -> bool {
        self.pools.iter().any(|p| p.id == pool_id)
    }
}

/// A timeline document previously saved by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTimeline {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    pub degree_id: String,
    #[serde(default)]
    pub semesters: Vec<Semester>,
    #[serde(default)]
    pub course_status_map: BTreeMap<String, CourseStatusEntry>,
    #[serde(default)]
    pub exemptions: Vec<String>,
    #[serde(default)]
    pub deficiencies: Vec<String>,
    #[serde(default)]
    pub is_extended_credit: bool,
    #[serde(default)]
    pub is_coop: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────
// Co-op validation
// ─────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoopRuleViolation {
    pub rule_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoopMetadata {
    pub total_terms: usize,
    pub work_terms: usize,
    pub study_terms: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoopValidationResult {
    pub valid: bool,
    pub errors: Vec<CoopRuleViolation>,
    pub warnings: Vec<CoopRuleViolation>,
    pub metadata: CoopMetadata,
}

// ─────────────────────────────────────────────────────────────────────────
// Degree audit
// ─────────────────────────────────────────────────────────────────────────

/// Audit-time status of a single course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditCourseStatus {
    Completed,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Not Started")]
    NotStarted,
    Missing,
}

/// Requirement status. Variant order is severity order: `Missing` sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RequirementStatus {
    Missing,
    #[serde(rename = "Not Started")]
    NotStarted,
    Incomplete,
    #[serde(rename = "In Progress")]
    InProgress,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NoticeKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementCourse {
    pub code: String,
    pub status: AuditCourseStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirement {
    pub id: String,
    pub title: String,
    pub status: RequirementStatus,
    pub credits_completed: f64,
    pub credits_total: f64,
    pub courses: Vec<RequirementCourse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentInfo {
    pub name: String,
    pub program: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admission_term: Option<String>,
    pub expected_graduation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditProgress {
    pub completed: f64,
    pub in_progress: f64,
    pub remaining: f64,
    pub total: f64,
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegreeAudit {
    pub student: StudentInfo,
    pub progress: AuditProgress,
    pub notices: Vec<Notice>,
    pub requirements: Vec<Requirement>,
}

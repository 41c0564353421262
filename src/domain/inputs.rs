//! Timeline build inputs. One closed union, one variant per source.

use super::entities::{Semester, StoredTimeline};
use serde::{Deserialize, Serialize};

/// Input of a timeline build: `{"type": "file" | "form" | "timelineData", "data": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum BuildInput {
    /// Parsed transcript or acceptance letter.
    File(ParsedDocument),
    /// Manual form input.
    Form(FormInput),
    /// Previously saved timeline; statuses are reused verbatim.
    TimelineData(StoredTimeline),
}

/// Output of the transcript / acceptance-letter parser.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedDocument {
    pub program_info: ProgramInfo,
    #[serde(default)]
    pub semesters: Vec<Semester>,
    #[serde(default, alias = "transferredCourses")]
    pub transfered_courses: Vec<String>,
    #[serde(default)]
    pub exempted_courses: Vec<String>,
    #[serde(default)]
    pub deficiency_courses: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramInfo {
    /// Degree name as printed on the document; matched fuzzily against the catalog.
    pub degree: String,
    #[serde(default)]
    pub first_term: Option<String>,
    #[serde(default)]
    pub last_term: Option<String>,
    #[serde(default)]
    pub is_coop: bool,
    #[serde(default)]
    pub is_extended_credit_program: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormInput {
    pub degree_id: String,
    pub first_term: String,
    #[serde(default)]
    pub last_term: Option<String>,
    #[serde(default)]
    pub is_extended_credit_program: bool,
    #[serde(default)]
    pub is_coop: bool,
    #[serde(default)]
    pub predefined_sequence: Option<Vec<SequenceEntry>>,
    #[serde(default)]
    pub exempted_courses: Vec<String>,
    #[serde(default)]
    pub deficiency_courses: Vec<String>,
}

/// One slot of a predefined sequence. Term labels are derived from the form's first term.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceEntry {
    #[serde(default)]
    pub term: Option<String>,
    #[serde(rename = "type")]
    pub kind: SequenceKind,
    #[serde(default)]
    pub courses: Vec<String>,
    #[serde(default)]
    pub coop_label: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SequenceKind {
    Academic,
    #[serde(rename = "Co-op")]
    Coop,
}

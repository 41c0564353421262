//! Core domain layer. No external I/O dependencies.
//!
//! Entities, term arithmetic and status rules live here. Dependencies flow inward.

pub mod entities;
pub mod errors;
pub mod inputs;
pub mod program;
pub mod status;
pub mod term;

pub use entities::{
    AuditCourseStatus, AuditProgress, CoopMetadata, CoopRuleViolation, CoopValidationResult,
    Course, CoursePool, CourseStatus, CourseStatusEntry, Degree, DegreeAudit, Notice, NoticeKind,
    Requirement, RequirementCourse, RequirementStatus, Semester, SemesterCourse, StoredTimeline,
    StudentInfo, TimelineCourse, TimelineResult, User,
};
pub use errors::DomainError;
pub use inputs::{BuildInput, FormInput, ParsedDocument, ProgramInfo, SequenceEntry, SequenceKind};
pub use program::ProgramFamily;
pub use term::{Term, TermRange};

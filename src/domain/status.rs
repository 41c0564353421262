//! Course status resolution.
//!
//! Build time: (grade, term, today) -> completed / planned / incomplete.
//! Audit time: stored entry + today -> Completed / In Progress / Not Started / Missing.

use super::entities::{AuditCourseStatus, CourseStatus, CourseStatusEntry};
use super::term::{is_term_in_progress, term_range};
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

/// Grade token for a discontinued course.
pub const DISCONTINUED: &str = "DISC";

/// Code prefix of co-op work-term pseudo-courses.
pub const WORK_TERM_PREFIX: &str = "CWT";

static COURSE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{3})").expect("valid course number pattern"));

/// Result of build-time classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildResolution {
    pub status: CourseStatus,
    /// Surfaced on the semester entry for display (e.g. "DISC").
    pub message: Option<String>,
}

impl BuildResolution {
    fn of(status: CourseStatus) -> Self {
        Self {
            status,
            message: None,
        }
    }
}

pub fn is_work_term(code: &str) -> bool {
    code.trim()
        .get(..WORK_TERM_PREFIX.len())
        .is_some_and(|p| p.eq_ignore_ascii_case(WORK_TERM_PREFIX))
}

/// Hundreds level of a course code: "COMP 248" -> 200.
pub fn course_level(code: &str) -> Option<u32> {
    COURSE_NUMBER
        .captures(code)
        .and_then(|c| c[1].parse::<u32>().ok())
        .map(|n| n / 100 * 100)
}

/// Rank on the letter scale; F = 0, A+ = 12.
fn letter_rank(grade: &str) -> Option<u8> {
    let rank = match grade {
        "A+" => 12,
        "A" => 11,
        "A-" => 10,
        "B+" => 9,
        "B" => 8,
        "B-" => 7,
        "C+" => 6,
        "C" => 5,
        "C-" => 4,
        "D+" => 3,
        "D" => 2,
        "D-" => 1,
        "F" => 0,
        _ => return None,
    };
    Some(rank)
}

/// Minimum passing rank: C- from the 200 level up, D- below.
fn minimum_rank(code: &str) -> u8 {
    match course_level(code) {
        Some(level) if level >= 200 => 4,
        _ => 1,
    }
}

fn grade_passes(code: &str, grade: &str) -> bool {
    if is_work_term(code) {
        return matches!(grade, "PASS" | "P");
    }
    match grade {
        "PASS" | "P" | "EX" | "TRC" | "CR" => true,
        "FAIL" | "FNS" | "R" | "NR" => false,
        letter => match letter_rank(letter) {
            Some(rank) => rank >= minimum_rank(code),
            None => {
                warn!(code, grade = letter, "unrecognized grade token; treating as incomplete");
                false
            }
        },
    }
}

/// Build-time classification of one course attempt.
pub fn resolve_build_status(
    code: &str,
    grade: Option<&str>,
    term: Option<&str>,
    today: NaiveDate,
) -> BuildResolution {
    let grade = grade
        .map(|g| g.trim().to_ascii_uppercase())
        .filter(|g| !g.is_empty());

    match grade {
        Some(g) if g == DISCONTINUED => BuildResolution {
            status: CourseStatus::Incomplete,
            message: Some(DISCONTINUED.to_string()),
        },
        Some(g) if grade_passes(code, &g) => BuildResolution::of(CourseStatus::Completed),
        Some(_) => BuildResolution::of(CourseStatus::Incomplete),
        None if term_not_over(term, today) => BuildResolution::of(CourseStatus::Planned),
        None => BuildResolution::of(CourseStatus::Incomplete),
    }
}

/// True when the term is current or upcoming.
fn term_not_over(term: Option<&str>, today: NaiveDate) -> bool {
    let Some(term) = term else {
        return false;
    };
    match term_range(term) {
        Ok(range) => range.end >= today,
        Err(e) => {
            warn!(term, error = %e, "cannot place term chronologically");
            false
        }
    }
}

/// Audit-time classification of a stored status entry.
pub fn audit_status(entry: Option<&CourseStatusEntry>, today: NaiveDate) -> AuditCourseStatus {
    match entry {
        None => AuditCourseStatus::Missing,
        Some(e) => match e.status {
            CourseStatus::Completed => AuditCourseStatus::Completed,
            CourseStatus::Planned if is_term_in_progress(e.semester.as_deref(), today) => {
                AuditCourseStatus::InProgress
            }
            CourseStatus::Planned => AuditCourseStatus::NotStarted,
            CourseStatus::Incomplete => AuditCourseStatus::Missing,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 10, 15).unwrap()
    }

    #[test]
    fn test_letter_grade_minimum_for_200_level() {
        let d = resolve_build_status("COMP 248", Some("D"), Some("Fall 2023"), today());
        assert_eq!(d.status, CourseStatus::Incomplete);
        let c_plus = resolve_build_status("COMP 248", Some("C+"), Some("Fall 2023"), today());
        assert_eq!(c_plus.status, CourseStatus::Completed);
        let c_minus = resolve_build_status("COMP 248", Some("c-"), Some("Fall 2023"), today());
        assert_eq!(c_minus.status, CourseStatus::Completed);
    }

    #[test]
    fn test_letter_grade_below_200_level_accepts_d() {
        let r = resolve_build_status("MATH 105", Some("D"), Some("Fall 2023"), today());
        assert_eq!(r.status, CourseStatus::Completed);
        let f = resolve_build_status("MATH 105", Some("F"), Some("Fall 2023"), today());
        assert_eq!(f.status, CourseStatus::Incomplete);
    }

    #[test]
    fn test_discontinued_carries_message() {
        let r = resolve_build_status("SOEN 287", Some("DISC"), Some("Fall 2023"), today());
        assert_eq!(r.status, CourseStatus::Incomplete);
        assert_eq!(r.message.as_deref(), Some("DISC"));
    }

    #[test]
    fn test_work_term_pass_fail() {
        let pass = resolve_build_status("CWT 100", Some("PASS"), Some("Summer 2023"), today());
        assert_eq!(pass.status, CourseStatus::Completed);
        let letter = resolve_build_status("CWT 100", Some("A"), Some("Summer 2023"), today());
        assert_eq!(letter.status, CourseStatus::Incomplete);
    }

    #[test]
    fn test_no_grade_uses_chronology() {
        let current = resolve_build_status("COMP 352", None, Some("Fall 2024"), today());
        assert_eq!(current.status, CourseStatus::Planned);
        let future = resolve_build_status("COMP 352", Some(""), Some("Winter 2025"), today());
        assert_eq!(future.status, CourseStatus::Planned);
        let past = resolve_build_status("COMP 352", None, Some("Summer 2024"), today());
        assert_eq!(past.status, CourseStatus::Incomplete);
        let absent = resolve_build_status("COMP 352", None, None, today());
        assert_eq!(absent.status, CourseStatus::Incomplete);
    }

    #[test]
    fn test_course_level() {
        assert_eq!(course_level("COMP 248"), Some(200));
        assert_eq!(course_level("ENGR201"), Some(200));
        assert_eq!(course_level("MATH 105"), Some(100));
        assert_eq!(course_level("CWT"), None);
        assert!(is_work_term("cwt 200"));
        assert!(!is_work_term("COMP 248"));
    }

    #[test]
    fn test_audit_status_mapping() {
        let planned_now = CourseStatusEntry::new(CourseStatus::Planned, Some("Fall 2024".into()));
        let planned_later =
            CourseStatusEntry::new(CourseStatus::Planned, Some("Winter 2025".into()));
        let planned_nowhere = CourseStatusEntry::new(CourseStatus::Planned, None);
        let done = CourseStatusEntry::new(CourseStatus::Completed, Some("Fall 2023".into()));

        assert_eq!(audit_status(Some(&done), today()), AuditCourseStatus::Completed);
        assert_eq!(audit_status(Some(&planned_now), today()), AuditCourseStatus::InProgress);
        assert_eq!(audit_status(Some(&planned_later), today()), AuditCourseStatus::NotStarted);
        assert_eq!(audit_status(Some(&planned_nowhere), today()), AuditCourseStatus::NotStarted);
        assert_eq!(
            audit_status(Some(&CourseStatusEntry::unattempted()), today()),
            AuditCourseStatus::Missing
        );
        assert_eq!(audit_status(None, today()), AuditCourseStatus::Missing);
    }
}

//! Co-op sequence rules. Violations are returned as data, never raised.

use crate::domain::status::is_work_term;
use crate::domain::{
    CoopMetadata, CoopRuleViolation, CoopValidationResult, ProgramFamily, Semester, TimelineResult,
};
use tracing::debug;

pub const THREE_WORK_TERMS_REQUIRED: &str = "THREE_WORK_TERMS_REQUIRED";
pub const SEQ_STARTS_WITH_STUDY: &str = "SEQ_STARTS_WITH_STUDY";
pub const SEQ_ENDS_WITH_STUDY: &str = "SEQ_ENDS_WITH_STUDY";
pub const MIN_TWO_STUDY_BEFORE_WORK: &str = "MIN_TWO_STUDY_BEFORE_WORK";
pub const NO_CONSECUTIVE_WORK_TERMS: &str = "NO_CONSECUTIVE_WORK_TERMS";
pub const LONG_SEQUENCE_WARNING: &str = "LONG_SEQUENCE_WARNING";

const REQUIRED_WORK_TERMS: usize = 3;
const MIN_STUDY_BEFORE_WORK: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TermKind {
    Study,
    Work,
}

fn classify(semester: &Semester) -> TermKind {
    if semester.courses.iter().any(|c| is_work_term(&c.code)) {
        TermKind::Work
    } else {
        TermKind::Study
    }
}

fn violation(rule_id: &str, message: String) -> CoopRuleViolation {
    CoopRuleViolation {
        rule_id: rule_id.to_string(),
        message,
    }
}

/// Check a timeline's semester sequence against co-op structure rules.
pub fn validate_coop_timeline(timeline: &TimelineResult) -> CoopValidationResult {
    let semesters = &timeline.semesters;
    let kinds: Vec<TermKind> = semesters.iter().map(classify).collect();
    let work_terms = kinds.iter().filter(|k| **k == TermKind::Work).count();
    let metadata = CoopMetadata {
        total_terms: kinds.len(),
        work_terms,
        study_terms: kinds.len() - work_terms,
    };

    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if work_terms != REQUIRED_WORK_TERMS {
        errors.push(violation(
            THREE_WORK_TERMS_REQUIRED,
            format!(
                "Co-op programs require exactly {} work terms; found {}",
                REQUIRED_WORK_TERMS, work_terms
            ),
        ));
    }

    if kinds.first() == Some(&TermKind::Work) {
        errors.push(violation(
            SEQ_STARTS_WITH_STUDY,
            format!("Sequence must start with a study term, not {}", semesters[0].term),
        ));
    }
    if let (Some(TermKind::Work), Some(last)) = (kinds.last(), semesters.last()) {
        errors.push(violation(
            SEQ_ENDS_WITH_STUDY,
            format!("Sequence must end with a study term, not {}", last.term),
        ));
    }

    if let Some(first_work) = kinds.iter().position(|k| *k == TermKind::Work) {
        if first_work < MIN_STUDY_BEFORE_WORK {
            errors.push(violation(
                MIN_TWO_STUDY_BEFORE_WORK,
                format!(
                    "At least {} study terms must precede the first work term ({}); found {}",
                    MIN_STUDY_BEFORE_WORK, semesters[first_work].term, first_work
                ),
            ));
        }
    }

    for (i, pair) in kinds.windows(2).enumerate() {
        if pair == [TermKind::Work, TermKind::Work] {
            errors.push(violation(
                NO_CONSECUTIVE_WORK_TERMS,
                format!(
                    "Work terms {} and {} are consecutive",
                    semesters[i].term,
                    semesters[i + 1].term
                ),
            ));
        }
    }

    let max_terms = ProgramFamily::classify(&timeline.degree.id).max_coop_terms();
    if kinds.len() > max_terms {
        warnings.push(violation(
            LONG_SEQUENCE_WARNING,
            format!(
                "Sequence has {} terms; the program normally spans at most {}",
                kinds.len(),
                max_terms
            ),
        ));
    }

    debug!(
        degree_id = %timeline.degree.id,
        errors = errors.len(),
        warnings = warnings.len(),
        "co-op sequence validated"
    );

    CoopValidationResult {
        valid: errors.is_empty(),
        errors,
        warnings,
        metadata,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Degree, SemesterCourse};
    use std::collections::BTreeMap;

    /// 's' = study, 'w' = work
    fn timeline(degree_id: &str, pattern: &str) -> TimelineResult {
        let semesters = pattern
            .chars()
            .enumerate()
            .map(|(i, k)| Semester {
                term: format!("Term {}", i + 1),
                courses: match k {
                    'w' => vec![SemesterCourse::new(format!("CWT {}00", i))],
                    _ => vec![SemesterCourse::new("COMP 248")],
                },
            })
            .collect();
        TimelineResult {
            degree: Degree {
                id: degree_id.into(),
                name: degree_id.into(),
                total_credits: Some(120.0),
                course_pools: vec![],
            },
            pools: vec![],
            semesters,
            courses: BTreeMap::new(),
        }
    }

    fn rule_ids(v: &[CoopRuleViolation]) -> Vec<&str> {
        v.iter().map(|e| e.rule_id.as_str()).collect()
    }

    #[test]
    fn test_valid_twelve_term_sequence() {
        let result = validate_coop_timeline(&timeline("BEng_SOFTWARE", "sswsswsswsss"));
        assert!(result.valid, "{:?}", result.errors);
        assert!(result.warnings.is_empty());
        assert_eq!(
            result.metadata,
            CoopMetadata {
                total_terms: 12,
                work_terms: 3,
                study_terms: 9
            }
        );
    }

    #[test]
    fn test_long_sequence_is_only_a_warning() {
        let result = validate_coop_timeline(&timeline("BCompSc_CS", "sswsswsswsss"));
        assert!(result.valid);
        assert_eq!(rule_ids(&result.warnings), vec![LONG_SEQUENCE_WARNING]);
    }

    #[test]
    fn test_consecutive_work_terms() {
        let result = validate_coop_timeline(&timeline("BEng_SOFTWARE", "sswwswss"));
        assert!(!result.valid);
        assert!(rule_ids(&result.errors).contains(&NO_CONSECUTIVE_WORK_TERMS));
    }

    #[test]
    fn test_sequence_boundaries() {
        let result = validate_coop_timeline(&timeline("BEng_SOFTWARE", "wsswssw"));
        let ids = rule_ids(&result.errors);
        assert!(ids.contains(&SEQ_STARTS_WITH_STUDY));
        assert!(ids.contains(&SEQ_ENDS_WITH_STUDY));
        assert!(ids.contains(&MIN_TWO_STUDY_BEFORE_WORK));
        assert!(!ids.contains(&THREE_WORK_TERMS_REQUIRED));
    }

    #[test]
    fn test_work_term_count() {
        let result = validate_coop_timeline(&timeline("BEng_SOFTWARE", "sswsswss"));
        assert_eq!(rule_ids(&result.errors), vec![THREE_WORK_TERMS_REQUIRED]);
        assert_eq!(result.metadata.work_terms, 2);

        let empty = validate_coop_timeline(&timeline("BEng_SOFTWARE", ""));
        assert_eq!(rule_ids(&empty.errors), vec![THREE_WORK_TERMS_REQUIRED]);
        assert_eq!(empty.metadata.total_terms, 0);
    }
}

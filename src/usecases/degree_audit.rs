//! Degree audit: evaluate a timeline against its pools.
//!
//! Orchestrates the flow:
//! 1. Load the saved timeline and check ownership (entry points only)
//! 2. Rebuild it against current catalog data
//! 3. Classify every pool member and total credits per requirement
//! 4. Derive notices, overall progress and a graduation estimate

use crate::domain::program::{DEFICIENCIES_POOL_ID, EXEMPTIONS_POOL_ID};
use crate::domain::status::audit_status;
use crate::domain::term::sort_key;
use crate::domain::{
    AuditCourseStatus, AuditProgress, BuildInput, CoursePool, DegreeAudit, DomainError, Notice,
    NoticeKind, Requirement, RequirementCourse, RequirementStatus, StudentInfo, Term,
    TimelineResult,
};
use crate::ports::{Clock, TimelineRepository, UserRepository};
use crate::shared::CreditPolicy;
use crate::usecases::timeline_builder::TimelineBuilder;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{info, warn};

/// Shown when the audit is generated without a user record.
pub const DEFAULT_STUDENT_NAME: &str = "Student";

/// Completion percentage from which the near-graduation notice is shown.
const NEAR_GRADUATION_PERCENT: u32 = 90;

/// Upper bound on the graduation projection (twenty years of terms).
const MAX_PROJECTED_TERMS: usize = 60;

/// Tolerance for fractional credit sums (e.g. 3.5-credit courses).
const CREDIT_EPSILON: f64 = 1e-9;

/// Service for generating degree audits.
pub struct DegreeAuditGenerator {
    timelines: Arc<dyn TimelineRepository>,
    users: Arc<dyn UserRepository>,
    builder: Arc<TimelineBuilder>,
    clock: Arc<dyn Clock>,
    policy: CreditPolicy,
}

impl DegreeAuditGenerator {
    pub fn new(
        timelines: Arc<dyn TimelineRepository>,
        users: Arc<dyn UserRepository>,
        builder: Arc<TimelineBuilder>,
        clock: Arc<dyn Clock>,
        policy: CreditPolicy,
    ) -> Self {
        Self {
            timelines,
            users,
            builder,
            clock,
            policy,
        }
    }

    /// Audit a saved timeline on behalf of its owner.
    ///
    /// # Errors
    /// `NotFound` for an unknown timeline or user, `Authorization` when the
    /// timeline belongs to someone else.
    pub async fn generate_degree_audit(
        &self,
        timeline_id: &str,
        user_id: &str,
    ) -> Result<DegreeAudit, DomainError> {
        let stored = self
            .timelines
            .find_by_id(timeline_id)
            .await?
            .ok_or_else(|| DomainError::timeline_not_found(timeline_id))?;
        if stored.user_id != user_id {
            return Err(DomainError::Authorization(format!(
                "timeline {} does not belong to user {}",
                timeline_id, user_id
            )));
        }
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::user_not_found(user_id))?;

        let timeline = self
            .builder
            .build_timeline(BuildInput::TimelineData(stored))
            .await?;
        let mut audit = self.generate_degree_audit_from_timeline(&timeline)?;
        audit.student.name = user.name;

        info!(
            timeline_id,
            user_id,
            percentage = audit.progress.percentage,
            "degree audit generated"
        );
        Ok(audit)
    }

    /// Audit the user's most recently updated timeline.
    pub async fn generate_degree_audit_for_user(
        &self,
        user_id: &str,
    ) -> Result<DegreeAudit, DomainError> {
        let latest = self
            .timelines
            .find_by_user(user_id)
            .await?
            .into_iter()
            .max_by_key(|t| t.updated_at)
            .ok_or_else(|| DomainError::timeline_not_found(format!("any for user {}", user_id)))?;
        self.generate_degree_audit(&latest.id, user_id).await
    }

    /// Audit a loosely-typed timeline document.
    ///
    /// # Errors
    /// `Validation` when `degree`, `coursePools` (or `pools`) or `semesters` is
    /// absent, or the document does not deserialize.
    pub fn generate_degree_audit_from_json(
        &self,
        document: serde_json::Value,
    ) -> Result<DegreeAudit, DomainError> {
        let present = |key: &str| document.get(key).is_some_and(|v| !v.is_null());
        let missing: Vec<&str> = [
            ("degree", present("degree")),
            ("coursePools", present("coursePools") || present("pools")),
            ("semesters", present("semesters")),
        ]
        .into_iter()
        .filter(|(_, ok)| !ok)
        .map(|(k, _)| k)
        .collect();
        if !missing.is_empty() {
            return Err(DomainError::Validation(format!(
                "timeline is missing required fields: {}",
                missing.join(", ")
            )));
        }

        let timeline: TimelineResult = serde_json::from_value(document)
            .map_err(|e| DomainError::Validation(format!("malformed timeline: {}", e)))?;
        self.generate_degree_audit_from_timeline(&timeline)
    }

    /// Audit an already-built timeline. No I/O.
    pub fn generate_degree_audit_from_timeline(
        &self,
        timeline: &TimelineResult,
    ) -> Result<DegreeAudit, DomainError> {
        if timeline.degree.id.trim().is_empty() {
            return Err(DomainError::Validation("timeline has no degree".into()));
        }
        let today = self.clock.today();

        let requirements: Vec<Requirement> = timeline
            .pools
            .iter()
            .map(|pool| evaluate_pool(pool, timeline, today))
            .collect();

        let progress = self.progress(timeline, &requirements);
        let notices = notices(&requirements, &progress);
        let expected_graduation = self.expected_graduation(progress.remaining, today);

        let admission_term = timeline
            .semesters
            .iter()
            .min_by_key(|s| sort_key(&s.term))
            .map(|s| s.term.clone());

        let mut requirements = requirements;
        requirements.sort_by_key(|r| r.status);

        Ok(DegreeAudit {
            student: StudentInfo {
                name: DEFAULT_STUDENT_NAME.to_string(),
                program: timeline.degree.name.clone(),
                admission_term,
                expected_graduation,
            },
            progress,
            notices,
            requirements,
        })
    }

    fn progress(&self, timeline: &TimelineResult, requirements: &[Requirement]) -> AuditProgress {
        let mut completed = 0.0;
        let mut in_progress = 0.0;
        let mut total = 0.0;
        for req in requirements {
            completed += req.credits_completed;
            in_progress += in_progress_credits(req, timeline);
            total += req.credits_total;
        }
        if total <= CREDIT_EPSILON {
            total = timeline
                .degree
                .total_credits
                .filter(|t| *t > 0.0)
                .unwrap_or(self.policy.default_total_credits);
        }

        let remaining = (total - completed - in_progress).max(0.0);
        let percentage = if total > 0.0 {
            ((100.0 * completed / total).round() as u32).min(100)
        } else {
            0
        };

        AuditProgress {
            completed,
            in_progress,
            remaining,
            total,
            percentage,
        }
    }

    /// Term in which the remaining credits would be finished at the assumed load.
    fn expected_graduation(&self, remaining: f64, today: NaiveDate) -> String {
        let terms_needed = (remaining / self.policy.credits_per_term - CREDIT_EPSILON)
            .ceil()
            .max(0.0) as usize;
        if terms_needed > MAX_PROJECTED_TERMS {
            warn!(remaining, terms_needed, "graduation projection capped");
        }
        Term::current(today)
            .advance(terms_needed.min(MAX_PROJECTED_TERMS))
            .to_string()
    }
}

fn course_credits(code: &str, timeline: &TimelineResult) -> f64 {
    timeline
        .courses
        .get(code)
        .map(|c| c.course.credits)
        .unwrap_or(0.0)
}

fn in_progress_credits(req: &Requirement, timeline: &TimelineResult) -> f64 {
    req.courses
        .iter()
        .filter(|c| c.status == AuditCourseStatus::InProgress)
        .map(|c| course_credits(&c.code, timeline))
        .sum()
}

fn evaluate_pool(pool: &CoursePool, timeline: &TimelineResult, today: NaiveDate) -> Requirement {
    let courses: Vec<RequirementCourse> = pool
        .courses
        .iter()
        .map(|code| RequirementCourse {
            code: code.clone(),
            status: audit_status(timeline.status_of(code), today),
        })
        .collect();

    let credits_with = |status: AuditCourseStatus| -> f64 {
        courses
            .iter()
            .filter(|c| c.status == status)
            .map(|c| course_credits(&c.code, timeline))
            .sum()
    };
    let mut credits_completed = credits_with(AuditCourseStatus::Completed);
    let credits_in_progress = credits_with(AuditCourseStatus::InProgress);
    let credits_total = pool.credits_required;

    let status = if pool.id == EXEMPTIONS_POOL_ID {
        credits_completed = credits_completed.max(credits_total);
        RequirementStatus::Complete
    } else {
        requirement_status(
            credits_completed,
            credits_in_progress,
            credits_total,
            !courses.is_empty(),
        )
    };

    Requirement {
        id: pool.id.clone(),
        title: pool.name.clone(),
        status,
        credits_completed,
        credits_total,
        courses,
    }
}

/// A pool with required credits but no member courses can never be satisfied: `Missing`.
fn requirement_status(
    completed: f64,
    in_progress: f64,
    total: f64,
    has_courses: bool,
) -> RequirementStatus {
    if completed + CREDIT_EPSILON >= total {
        RequirementStatus::Complete
    } else if !has_courses {
        RequirementStatus::Missing
    } else if completed + in_progress + CREDIT_EPSILON >= total {
        RequirementStatus::InProgress
    } else if completed > 0.0 {
        RequirementStatus::Incomplete
    } else {
        RequirementStatus::NotStarted
    }
}

fn fmt_credits(credits: f64) -> String {
    if credits.fract().abs() < CREDIT_EPSILON {
        format!("{}", credits as i64)
    } else {
        format!("{:.1}", credits)
    }
}

fn notices(requirements: &[Requirement], progress: &AuditProgress) -> Vec<Notice> {
    let mut notices = Vec::new();

    for req in requirements.iter().filter(|r| r.id != EXEMPTIONS_POOL_ID) {
        let deficit = req.credits_total - req.credits_completed;
        if deficit > CREDIT_EPSILON {
            notices.push(Notice {
                id: format!("requirement-{}", req.id),
                kind: NoticeKind::Warning,
                message: format!(
                    "{}: {} of {} credits still needed",
                    req.title,
                    fmt_credits(deficit),
                    fmt_credits(req.credits_total)
                ),
            });
        }
    }

    let outstanding: Vec<&str> = requirements
        .iter()
        .filter(|r| r.id == DEFICIENCIES_POOL_ID)
        .flat_map(|r| r.courses.iter())
        .filter(|c| c.status != AuditCourseStatus::Completed)
        .map(|c| c.code.as_str())
        .collect();
    if !outstanding.is_empty() {
        notices.push(Notice {
            id: "deficiencies-outstanding".into(),
            kind: NoticeKind::Warning,
            message: format!(
                "Deficiency courses must be completed: {}",
                outstanding.join(", ")
            ),
        });
    }

    if progress.percentage >= NEAR_GRADUATION_PERCENT {
        notices.push(Notice {
            id: "near-graduation".into(),
            kind: NoticeKind::Info,
            message: format!(
                "{}% of degree credits completed; review graduation requirements",
                progress.percentage
            ),
        });
    }

    notices
}

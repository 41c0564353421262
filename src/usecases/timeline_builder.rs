//! Timeline construction: file / form / saved-timeline input -> `TimelineResult`.
//!
//! - Each input variant is normalized into one `NormalizedInput` first
//! - Degree pools and courses are fetched, then ECP / co-op pools are merged in
//! - Course statuses come from the resolver, or verbatim from a saved timeline
//! - Any fetch failure aborts the build; no partial result is returned

use crate::domain::program::{DEFICIENCIES_POOL_ID, EXEMPTIONS_POOL_ID};
use crate::domain::status::{is_work_term, resolve_build_status};
use crate::domain::term::{generate_terms, sort_key};
use crate::domain::{
    BuildInput, Course, CoursePool, CourseStatus, CourseStatusEntry, Degree, DomainError, FormInput,
    ParsedDocument, Semester, SemesterCourse, SequenceKind, StoredTimeline, Term, TimelineCourse,
    TimelineResult,
};
use crate::ports::{
    Clock, CoursePoolRepository, CourseRepository, DegreeRepository, TimelineRepository,
};
use crate::shared::CreditPolicy;
use crate::usecases::pool_augmenter::{PoolAugmenter, PoolSet, pseudo_pool};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{info, warn};

/// Minimum token overlap for a fuzzy degree-name match.
const DEGREE_MATCH_THRESHOLD: f64 = 0.5;

/// How the degree is identified by the input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum DegreeRef {
    /// Free-form name from a parsed document.
    Name(String),
    Id(String),
}

/// Canonical intermediate record every input variant is reduced to.
#[derive(Debug, Clone)]
struct NormalizedInput {
    source: &'static str,
    degree: DegreeRef,
    semesters: Vec<Semester>,
    statuses: BTreeMap<String, CourseStatusEntry>,
    extended_credit: bool,
    coop: bool,
    exemptions: Vec<String>,
    deficiencies: Vec<String>,
}

pub struct TimelineBuilder {
    degrees: Arc<dyn DegreeRepository>,
    courses: Arc<dyn CourseRepository>,
    timelines: Arc<dyn TimelineRepository>,
    augmenter: PoolAugmenter,
    clock: Arc<dyn Clock>,
    policy: CreditPolicy,
}

impl TimelineBuilder {
    pub fn new(
        degrees: Arc<dyn DegreeRepository>,
        courses: Arc<dyn CourseRepository>,
        pools: Arc<dyn CoursePoolRepository>,
        timelines: Arc<dyn TimelineRepository>,
        clock: Arc<dyn Clock>,
        policy: CreditPolicy,
    ) -> Self {
        let augmenter = PoolAugmenter::new(
            Arc::clone(&degrees),
            Arc::clone(&courses),
            pools,
            policy,
        );
        Self {
            degrees,
            courses,
            timelines,
            augmenter,
            clock,
            policy,
        }
    }

    /// Build a timeline from any input variant.
    pub async fn build_timeline(&self, input: BuildInput) -> Result<TimelineResult, DomainError> {
        let normalized = normalize(input, self.clock.today())?;
        self.assemble(normalized).await
    }

    /// Rebuild a saved timeline against current catalog data.
    pub async fn build_timeline_from_db(
        &self,
        timeline_id: &str,
    ) -> Result<TimelineResult, DomainError> {
        let stored = self
            .timelines
            .find_by_id(timeline_id)
            .await?
            .ok_or_else(|| DomainError::timeline_not_found(timeline_id))?;
        self.build_timeline(BuildInput::TimelineData(stored)).await
    }

    async fn assemble(&self, input: NormalizedInput) -> Result<TimelineResult, DomainError> {
        let mut degree = self.resolve_degree(&input.degree).await?;

        let (pools, courses) = tokio::try_join!(
            self.degrees.get_course_pools_for_degree(&degree.id),
            self.degrees.get_courses_for_degree(&degree.id),
        )?;
        let mut pool_set = PoolSet::new(pools, courses);

        if input.extended_credit {
            let augmented = self
                .augmenter
                .add_ecp_course_pools(&degree.id, &pool_set, Some(&degree))
                .await?;
            pool_set = augmented.pool_set;
            if let Some(d) = augmented.degree {
                degree = d;
            }
        }
        if input.coop {
            pool_set = self.augmenter.add_coop_pool(&pool_set).await?;
        }

        let referenced = referenced_codes(&input);
        let on_demand = self.fetch_missing(&referenced, &pool_set).await?;
        pool_set = pool_set.merged([], on_demand);
        pool_set.pools = prune_unknown_members(pool_set.pools, &pool_set.courses);

        let mut pseudo = Vec::new();
        if !input.exemptions.is_empty() {
            pseudo.push(pseudo_pool(
                EXEMPTIONS_POOL_ID,
                "Exemptions",
                &input.exemptions,
                &pool_set.courses,
                &self.policy,
            ));
        }
        if !input.deficiencies.is_empty() {
            pseudo.push(pseudo_pool(
                DEFICIENCIES_POOL_ID,
                "Deficiencies",
                &input.deficiencies,
                &pool_set.courses,
                &self.policy,
            ));
        }
        pool_set = pool_set.merged(pseudo, []);

        let courses = timeline_courses(&pool_set, &input.semesters, &input.statuses);

        info!(
            source = input.source,
            degree_id = %degree.id,
            semesters = input.semesters.len(),
            pools = pool_set.pools.len(),
            courses = courses.len(),
            "timeline built"
        );

        Ok(TimelineResult {
            degree,
            pools: pool_set.pools,
            semesters: input.semesters,
            courses,
        })
    }

    async fn resolve_degree(&self, degree: &DegreeRef) -> Result<Degree, DomainError> {
        match degree {
            DegreeRef::Id(id) => self.degrees.read_degree(id).await,
            DegreeRef::Name(name) => {
                let all = self.degrees.read_all_degrees().await?;
                match_degree_name(name, &all)
                    .cloned()
                    .ok_or_else(|| DomainError::degree_not_found(name.as_str()))
            }
        }
    }

    /// Fetch catalog records for referenced codes the working set lacks.
    /// Unknown codes get a placeholder so every reference resolves.
    async fn fetch_missing(
        &self,
        codes: &BTreeSet<String>,
        pool_set: &PoolSet,
    ) -> Result<Vec<Course>, DomainError> {
        let mut fetched = Vec::new();
        for code in codes.iter().filter(|c| !pool_set.courses.contains_key(*c)) {
            match self.courses.get_course_by_code(code).await {
                Ok(course) => fetched.push(course),
                Err(e) if e.is_not_found() => {
                    let credits = if is_work_term(code) {
                        0.0
                    } else {
                        self.policy.default_course_credits
                    };
                    warn!(code = %code, credits, "course not in catalog; using placeholder");
                    fetched.push(Course::placeholder(code, credits));
                }
                Err(e) => return Err(e),
            }
        }
        Ok(fetched)
    }
}

fn normalize(input: BuildInput, today: NaiveDate) -> Result<NormalizedInput, DomainError> {
    match input {
        BuildInput::File(doc) => normalize_file(doc, today),
        BuildInput::Form(form) => normalize_form(form, today),
        BuildInput::TimelineData(stored) => Ok(normalize_stored(stored)),
    }
}

/// Transcripts carry graded semesters. Acceptance letters carry only the
/// program bounds, which expand into empty semesters.
fn normalize_file(doc: ParsedDocument, today: NaiveDate) -> Result<NormalizedInput, DomainError> {
    let ParsedDocument {
        program_info,
        mut semesters,
        transfered_courses,
        mut exempted_courses,
        deficiency_courses,
    } = doc;

    if semesters.is_empty() {
        if let (Some(first), Some(last)) = (&program_info.first_term, &program_info.last_term) {
            semesters = generate_terms(first, last)?
                .into_iter()
                .map(Semester::empty)
                .collect();
        }
    }

    semesters.sort_by_key(|s| sort_key(&s.term));

    let mut statuses = BTreeMap::new();
    for semester in &mut semesters {
        for course in &mut semester.courses {
            let resolved = resolve_build_status(
                &course.code,
                course.grade.as_deref(),
                Some(&semester.term),
                today,
            );
            if resolved.message.is_some() {
                course.message = resolved.message;
            }
            record_attempt(
                &mut statuses,
                &course.code,
                CourseStatusEntry::new(resolved.status, Some(semester.term.clone())),
            );
        }
    }

    // transfer credits are granted like exemptions
    for code in transfered_courses {
        let code = code.trim().to_string();
        if !code.is_empty() && !exempted_courses.contains(&code) {
            exempted_courses.push(code);
        }
    }
    mark_exemptions(&mut statuses, &exempted_courses);
    mark_deficiencies(&mut statuses, &deficiency_courses);

    Ok(NormalizedInput {
        source: "file",
        degree: DegreeRef::Name(program_info.degree),
        semesters,
        statuses,
        extended_credit: program_info.is_extended_credit_program,
        coop: program_info.is_coop,
        exemptions: exempted_courses,
        deficiencies: deficiency_courses,
    })
}

fn normalize_form(form: FormInput, today: NaiveDate) -> Result<NormalizedInput, DomainError> {
    let mut statuses = BTreeMap::new();

    let semesters = match &form.predefined_sequence {
        Some(sequence) => {
            let first: Term = form.first_term.parse()?;
            let mut work_terms = 0;
            let mut semesters = Vec::with_capacity(sequence.len());
            for (i, entry) in sequence.iter().enumerate() {
                let term = first.advance(i).to_string();
                let courses = match entry.kind {
                    SequenceKind::Coop => {
                        work_terms += 1;
                        let label = entry
                            .coop_label
                            .clone()
                            .unwrap_or_else(|| format!("CWT {}00", work_terms));
                        vec![SemesterCourse::new(label)]
                    }
                    SequenceKind::Academic => {
                        entry.courses.iter().map(SemesterCourse::new).collect()
                    }
                };
                for course in &courses {
                    let resolved = resolve_build_status(&course.code, None, Some(&term), today);
                    record_attempt(
                        &mut statuses,
                        &course.code,
                        CourseStatusEntry::new(resolved.status, Some(term.clone())),
                    );
                }
                semesters.push(Semester { term, courses });
            }
            semesters
        }
        None => {
            let last = form.last_term.as_deref().ok_or_else(|| {
                DomainError::Validation("form input needs a last term or a predefined sequence".into())
            })?;
            generate_terms(&form.first_term, last)?
                .into_iter()
                .map(Semester::empty)
                .collect()
        }
    };

    mark_exemptions(&mut statuses, &form.exempted_courses);
    mark_deficiencies(&mut statuses, &form.deficiency_courses);

    Ok(NormalizedInput {
        source: "form",
        degree: DegreeRef::Id(form.degree_id),
        semesters,
        statuses,
        extended_credit: form.is_extended_credit_program,
        coop: form.is_coop,
        exemptions: form.exempted_courses,
        deficiencies: form.deficiency_courses,
    })
}

/// Saved timelines keep their semesters and statuses untouched.
fn normalize_stored(stored: StoredTimeline) -> NormalizedInput {
    NormalizedInput {
        source: "timelineData",
        degree: DegreeRef::Id(stored.degree_id),
        semesters: stored.semesters,
        statuses: stored.course_status_map,
        extended_credit: stored.is_extended_credit,
        coop: stored.is_coop,
        exemptions: stored.exemptions,
        deficiencies: stored.deficiencies,
    }
}

/// A later attempt replaces an earlier one unless the earlier one was completed.
fn record_attempt(
    statuses: &mut BTreeMap<String, CourseStatusEntry>,
    code: &str,
    entry: CourseStatusEntry,
) {
    match statuses.get(code) {
        Some(existing) if existing.status == CourseStatus::Completed => {}
        _ => {
            statuses.insert(code.to_string(), entry);
        }
    }
}

fn mark_exemptions(statuses: &mut BTreeMap<String, CourseStatusEntry>, codes: &[String]) {
    for code in codes {
        statuses.insert(
            code.trim().to_string(),
            CourseStatusEntry::new(CourseStatus::Completed, None),
        );
    }
}

/// Deficiencies keep any status resolved from the semesters; otherwise unattempted.
fn mark_deficiencies(statuses: &mut BTreeMap<String, CourseStatusEntry>, codes: &[String]) {
    for code in codes {
        statuses
            .entry(code.trim().to_string())
            .or_insert_with(CourseStatusEntry::unattempted);
    }
}

fn referenced_codes(input: &NormalizedInput) -> BTreeSet<String> {
    let mut codes: BTreeSet<String> = input
        .semesters
        .iter()
        .flat_map(|s| s.courses.iter().map(|c| c.code.clone()))
        .collect();
    codes.extend(input.statuses.keys().cloned());
    codes.extend(input.exemptions.iter().map(|c| c.trim().to_string()));
    codes.extend(input.deficiencies.iter().map(|c| c.trim().to_string()));
    codes.retain(|c| !c.is_empty());
    codes
}

/// Drop pool members the catalog does not know, so every pool reference resolves.
fn prune_unknown_members(
    pools: Vec<CoursePool>,
    courses: &BTreeMap<String, Course>,
) -> Vec<CoursePool> {
    pools
        .into_iter()
        .map(|mut pool| {
            pool.courses.retain(|code| {
                let known = courses.contains_key(code);
                if !known {
                    warn!(pool_id = %pool.id, code = %code, "pool member not in catalog; skipping");
                }
                known
            });
            pool
        })
        .collect()
}

fn timeline_courses(
    pool_set: &PoolSet,
    semesters: &[Semester],
    statuses: &BTreeMap<String, CourseStatusEntry>,
) -> BTreeMap<String, TimelineCourse> {
    let mut codes: Vec<&str> = Vec::new();
    let mut seen = HashSet::new();
    let pool_codes = pool_set.pools.iter().flat_map(|p| p.courses.iter());
    let semester_codes = semesters
        .iter()
        .flat_map(|s| s.courses.iter().map(|c| &c.code));
    for code in pool_codes.chain(semester_codes).chain(statuses.keys()) {
        if seen.insert(code.as_str()) {
            codes.push(code);
        }
    }

    codes
        .into_iter()
        .filter_map(|code| {
            let course = pool_set.courses.get(code)?.clone();
            let status = statuses
                .get(code)
                .cloned()
                .unwrap_or_else(CourseStatusEntry::unattempted);
            Some((code.to_string(), TimelineCourse { course, status }))
        })
        .collect()
}

fn name_tokens(name: &str) -> Vec<String> {
    name.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn token_overlap(a: &[String], b: &[String]) -> f64 {
    let a: HashSet<&String> = a.iter().collect();
    let b: HashSet<&String> = b.iter().collect();
    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(&b).count() as f64 / union as f64
}

fn best_overlap<'a, 'b>(
    query: &[String],
    candidates: impl IntoIterator<Item = &'b (&'a Degree, Vec<String>)>,
) -> Option<(&'a Degree, f64)>
where
    'a: 'b,
{
    candidates
        .into_iter()
        .map(|(d, tokens)| (*d, token_overlap(query, tokens)))
        .max_by(|a, b| a.1.total_cmp(&b.1))
}

/// Match a printed degree name against catalog degrees.
///
/// Exact (normalized) name or id first, then containment either way, then the
/// best token overlap at or above the threshold.
pub fn match_degree_name<'a>(name: &str, degrees: &'a [Degree]) -> Option<&'a Degree> {
    let query = name_tokens(name);
    if query.is_empty() {
        return None;
    }
    let joined = query.join(" ");

    let candidates: Vec<(&'a Degree, Vec<String>)> =
        degrees.iter().map(|d| (d, name_tokens(&d.name))).collect();

    if let Some((d, _)) = candidates
        .iter()
        .find(|(d, tokens)| tokens.join(" ") == joined || d.id.eq_ignore_ascii_case(name.trim()))
    {
        return Some(*d);
    }

    let containing = candidates.iter().filter(|(_, tokens)| {
        let cand = tokens.join(" ");
        !cand.is_empty() && (cand.contains(&joined) || joined.contains(&cand))
    });
    if let Some((d, _)) = best_overlap(&query, containing) {
        return Some(d);
    }

    best_overlap(&query, &candidates)
        .filter(|(_, score)| *score >= DEGREE_MATCH_THRESHOLD)
        .map(|(d, _)| d)
}

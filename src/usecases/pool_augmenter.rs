//! Program-specific pool injection: extended-credit pools, the co-op work-term
//! pool, and the exemption / deficiency pseudo-pools.
//!
//! Every operation returns a new `PoolSet`; inputs are never mutated.

use crate::domain::program::COOP_POOL_ID;
use crate::domain::{Course, CoursePool, Degree, DomainError, ProgramFamily};
use crate::ports::{CoursePoolRepository, CourseRepository, DegreeRepository};
use crate::shared::CreditPolicy;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Working set of pools plus the course dictionary backing them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoolSet {
    pub pools: Vec<CoursePool>,
    pub courses: BTreeMap<String, Course>,
}

impl PoolSet {
    pub fn new(pools: Vec<CoursePool>, courses: impl IntoIterator<Item = Course>) -> Self {
        Self {
            pools,
            courses: courses.into_iter().map(|c| (c.id.clone(), c)).collect(),
        }
    }

    /// New set with `pools` appended and `courses` merged. Existing courses win.
    pub fn merged(
        &self,
        pools: impl IntoIterator<Item = CoursePool>,
        courses: impl IntoIterator<Item = Course>,
    ) -> Self {
        let mut next = self.clone();
        next.pools.extend(pools);
        for course in courses {
            next.courses.entry(course.id.clone()).or_insert(course);
        }
        next
    }
}

/// Result of extended-credit augmentation.
#[derive(Debug, Clone, PartialEq)]
pub struct EcpAugmentation {
    pub pool_set: PoolSet,
    /// Copy of the supplied degree with the ECP credit load added.
    pub degree: Option<Degree>,
}

pub struct PoolAugmenter {
    degrees: Arc<dyn DegreeRepository>,
    courses: Arc<dyn CourseRepository>,
    pools: Arc<dyn CoursePoolRepository>,
    policy: CreditPolicy,
}

impl PoolAugmenter {
    pub fn new(
        degrees: Arc<dyn DegreeRepository>,
        courses: Arc<dyn CourseRepository>,
        pools: Arc<dyn CoursePoolRepository>,
        policy: CreditPolicy,
    ) -> Self {
        Self {
            degrees,
            courses,
            pools,
            policy,
        }
    }

    /// Append the family's extended-credit pools after the existing ones.
    ///
    /// Degrees outside the Engineering / Computer Science families are returned
    /// unchanged. For the two families, a supplied degree always gains the fixed
    /// ECP credit load, even when the reference degree has no pools.
    pub async fn add_ecp_course_pools(
        &self,
        degree_id: &str,
        base: &PoolSet,
        degree: Option<&Degree>,
    ) -> Result<EcpAugmentation, DomainError> {
        let Some(ecp_id) = ProgramFamily::classify(degree_id).ecp_degree_id() else {
            debug!(degree_id, "no extended-credit program for degree family");
            return Ok(EcpAugmentation {
                pool_set: base.clone(),
                degree: degree.cloned(),
            });
        };

        let (ecp_pools, ecp_courses) = tokio::try_join!(
            self.degrees.get_course_pools_for_degree(ecp_id),
            self.degrees.get_courses_for_degree(ecp_id),
        )?;

        info!(
            degree_id,
            ecp_degree = ecp_id,
            pools = ecp_pools.len(),
            courses = ecp_courses.len(),
            "adding extended-credit pools"
        );

        let degree = degree.map(|d| {
            let mut d = d.clone();
            d.total_credits = Some(d.total_credits.unwrap_or(0.0) + self.policy.ecp_credits);
            d
        });

        Ok(EcpAugmentation {
            pool_set: base.merged(ecp_pools, ecp_courses),
            degree,
        })
    }

    /// Append the stored co-op work-term pool and merge its member courses.
    /// A missing pool or member course is skipped with a warning.
    pub async fn add_coop_pool(&self, base: &PoolSet) -> Result<PoolSet, DomainError> {
        let Some(pool) = self.pools.get_course_pool(COOP_POOL_ID).await? else {
            warn!(pool_id = COOP_POOL_ID, "co-op pool not in catalog; skipping");
            return Ok(base.clone());
        };

        let mut members = Vec::new();
        for code in &pool.courses {
            if base.courses.contains_key(code) {
                continue;
            }
            match self.courses.get_course_by_code(code).await {
                Ok(course) => members.push(course),
                Err(e) if e.is_not_found() => {
                    warn!(code = %code, "co-op pool member not in catalog; skipping")
                }
                Err(e) => return Err(e),
            }
        }

        info!(courses = pool.courses.len(), "adding co-op pool");
        Ok(base.merged([pool], members))
    }
}

/// Synthesize an "exemptions" / "deficiencies" pool over `codes`.
///
/// Required credits are the sum of the named courses' credits, using
/// `policy.default_course_credits` for codes missing from `courses`.
pub fn pseudo_pool(
    id: &str,
    name: &str,
    codes: &[String],
    courses: &BTreeMap<String, Course>,
    policy: &CreditPolicy,
) -> CoursePool {
    let mut seen = HashSet::new();
    let members: Vec<String> = codes
        .iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty() && seen.insert(c.clone()))
        .collect();
    let credits_required = members
        .iter()
        .map(|code| {
            courses
                .get(code)
                .map(|c| c.credits)
                .unwrap_or(policy.default_course_credits)
        })
        .sum();

    CoursePool {
        id: id.to_string(),
        name: name.to_string(),
        credits_required,
        courses: members,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::InMemoryCatalog;

    fn pool(id: &str, credits: f64, courses: &[&str]) -> CoursePool {
        CoursePool {
            id: id.into(),
            name: id.into(),
            credits_required: credits,
            courses: courses.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn degree(id: &str, pools: &[&str]) -> Degree {
        Degree {
            id: id.into(),
            name: id.into(),
            total_credits: Some(120.0),
            course_pools: pools.iter().map(|p| p.to_string()).collect(),
        }
    }

    fn augmenter(catalog: InMemoryCatalog) -> PoolAugmenter {
        let catalog = Arc::new(catalog);
        PoolAugmenter::new(
            catalog.clone(),
            catalog.clone(),
            catalog,
            CreditPolicy::default(),
        )
    }

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::new()
            .with_course(Course::placeholder("MATH 203", 3.0))
            .with_course(Course::placeholder("PHYS 204", 3.0))
            .with_course(Course::placeholder("CWT 100", 0.0))
            .with_course(Course::placeholder("CWT 200", 0.0))
            .with_pool(pool("ecp_math", 6.0, &["MATH 203"]))
            .with_pool(pool("ecp_sci", 9.0, &["PHYS 204"]))
            .with_pool(pool(COOP_POOL_ID, 0.0, &["CWT 100", "CWT 200", "CWT 999"]))
            .with_degree(degree("ENGR_ECP", &["ecp_math", "ecp_sci"]))
            .with_degree(degree("COMP_ECP", &[]))
    }

    fn base() -> PoolSet {
        PoolSet::new(
            vec![pool("core", 30.0, &["SOEN 287"]), pool("elec", 12.0, &[])],
            [Course::placeholder("SOEN 287", 3.0)],
        )
    }

    #[tokio::test]
    async fn test_ecp_pools_appended_in_order() {
        let aug = augmenter(catalog());
        let base = base();
        let out = aug
            .add_ecp_course_pools("BEng_SOFTWARE", &base, None)
            .await
            .unwrap();
        let ids: Vec<_> = out.pool_set.pools.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["core", "elec", "ecp_math", "ecp_sci"]);
        assert_eq!(out.pool_set.pools[0], base.pools[0]);
        assert_eq!(out.pool_set.pools[2].credits_required, 6.0);
        assert!(out.pool_set.courses.contains_key("MATH 203"));
        assert!(out.pool_set.courses.contains_key("SOEN 287"));
        // input untouched
        assert_eq!(base.pools.len(), 2);
    }

    #[tokio::test]
    async fn test_ecp_credits_added_with_zero_pools() {
        let aug = augmenter(catalog());
        let d = degree("BCompSc_CS", &[]);
        let out = aug
            .add_ecp_course_pools("BCompSc_CS", &base(), Some(&d))
            .await
            .unwrap();
        assert_eq!(out.pool_set.pools.len(), 2);
        assert_eq!(out.degree.unwrap().total_credits, Some(150.0));
        assert_eq!(d.total_credits, Some(120.0));
    }

    #[tokio::test]
    async fn test_ecp_other_family_is_noop() {
        let aug = augmenter(catalog());
        let d = degree("BA_ECON", &[]);
        let out = aug
            .add_ecp_course_pools("BA_ECON", &base(), Some(&d))
            .await
            .unwrap();
        assert_eq!(out.pool_set, base());
        assert_eq!(out.degree, Some(d));
    }

    #[tokio::test]
    async fn test_existing_courses_not_overwritten() {
        let aug = augmenter(catalog());
        let base = PoolSet::new(vec![], [Course::placeholder("MATH 203", 4.0)]);
        let out = aug
            .add_ecp_course_pools("BEng_X", &base, None)
            .await
            .unwrap();
        assert_eq!(out.pool_set.courses["MATH 203"].credits, 4.0);
    }

    #[tokio::test]
    async fn test_coop_pool_merges_members() {
        let aug = augmenter(catalog());
        let out = aug.add_coop_pool(&base()).await.unwrap();
        assert_eq!(out.pools.last().unwrap().id, COOP_POOL_ID);
        assert!(out.courses.contains_key("CWT 100"));
        assert!(out.courses.contains_key("CWT 200"));
        assert!(!out.courses.contains_key("CWT 999"));
    }

    #[tokio::test]
    async fn test_missing_coop_pool_is_skipped() {
        let aug = augmenter(InMemoryCatalog::new());
        let out = aug.add_coop_pool(&base()).await.unwrap();
        assert_eq!(out, base());
    }

    #[test]
    fn test_pseudo_pool_credits() {
        let courses = PoolSet::new(vec![], [Course::placeholder("MATH 203", 4.0)]).courses;
        let codes = vec!["MATH 203".to_string(), "UNKN 101".into(), "MATH 203".into()];
        let p = pseudo_pool("exemptions", "Exemptions", &codes, &courses, &CreditPolicy::default());
        assert_eq!(p.courses, vec!["MATH 203", "UNKN 101"]);
        assert_eq!(p.credits_required, 7.0);
    }
}

//! Implements every repository port over in-process maps.
//!
//! Backs the JSON catalog and the test suites.

use crate::domain::program::is_ecp_degree;
use crate::domain::{Course, CoursePool, Degree, DomainError, StoredTimeline, User};
use crate::ports::{
    CoursePoolRepository, CourseRepository, DegreeRepository, TimelineRepository, UserRepository,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use tracing::warn;

/// Serializable catalog contents.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub degrees: Vec<Degree>,
    #[serde(default)]
    pub course_pools: Vec<CoursePool>,
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub timelines: Vec<StoredTimeline>,
    #[serde(default)]
    pub users: Vec<User>,
}

#[derive(Debug, Default)]
struct CatalogData {
    degrees: HashMap<String, Degree>,
    pools: HashMap<String, CoursePool>,
    courses: HashMap<String, Course>,
    timelines: HashMap<String, StoredTimeline>,
    users: HashMap<String, User>,
}

/// In-memory catalog. Safe to share via Arc.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    data: RwLock<CatalogData>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: CatalogSnapshot) -> Self {
        let CatalogSnapshot {
            degrees,
            course_pools,
            courses,
            timelines,
            users,
        } = snapshot;
        let data = CatalogData {
            degrees: degrees.into_iter().map(|d| (d.id.clone(), d)).collect(),
            pools: course_pools.into_iter().map(|p| (p.id.clone(), p)).collect(),
            courses: courses.into_iter().map(|c| (c.id.clone(), c)).collect(),
            timelines: timelines.into_iter().map(|t| (t.id.clone(), t)).collect(),
            users: users.into_iter().map(|u| (u.id.clone(), u)).collect(),
        };
        Self {
            data: RwLock::new(data),
        }
    }

    pub fn with_degree(mut self, degree: Degree) -> Self {
        self.data.get_mut().degrees.insert(degree.id.clone(), degree);
        self
    }

    pub fn with_pool(mut self, pool: CoursePool) -> Self {
        self.data.get_mut().pools.insert(pool.id.clone(), pool);
        self
    }

    pub fn with_course(mut self, course: Course) -> Self {
        self.data.get_mut().courses.insert(course.id.clone(), course);
        self
    }

    pub fn with_timeline(mut self, timeline: StoredTimeline) -> Self {
        self.data
            .get_mut()
            .timelines
            .insert(timeline.id.clone(), timeline);
        self
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.data.get_mut().users.insert(user.id.clone(), user);
        self
    }

    /// Insert or replace a saved timeline. Last write wins.
    pub async fn save_timeline(&self, timeline: StoredTimeline) {
        self.data
            .write()
            .await
            .timelines
            .insert(timeline.id.clone(), timeline);
    }

    fn degree_pools(data: &CatalogData, degree: &Degree) -> Vec<CoursePool> {
        degree
            .course_pools
            .iter()
            .filter_map(|id| {
                let pool = data.pools.get(id).cloned();
                if pool.is_none() {
                    warn!(degree_id = %degree.id, pool_id = %id, "degree references unknown pool");
                }
                pool
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl DegreeRepository for InMemoryCatalog {
    async fn read_degree(&self, id: &str) -> Result<Degree, DomainError> {
        self.data
            .read()
            .await
            .degrees
            .get(id)
            .cloned()
            .ok_or_else(|| DomainError::degree_not_found(id))
    }

    async fn get_course_pools_for_degree(&self, id: &str) -> Result<Vec<CoursePool>, DomainError> {
        let data = self.data.read().await;
        let degree = data
            .degrees
            .get(id)
            .ok_or_else(|| DomainError::degree_not_found(id))?;
        Ok(Self::degree_pools(&data, degree))
    }

    async fn get_courses_for_degree(&self, id: &str) -> Result<Vec<Course>, DomainError> {
        let data = self.data.read().await;
        let degree = data
            .degrees
            .get(id)
            .ok_or_else(|| DomainError::degree_not_found(id))?;
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for pool in Self::degree_pools(&data, degree) {
            for code in &pool.courses {
                if !seen.insert(code.clone()) {
                    continue;
                }
                if let Some(course) = data.courses.get(code) {
                    out.push(course.clone());
                }
            }
        }
        Ok(out)
    }

    async fn read_all_degrees(&self) -> Result<Vec<Degree>, DomainError> {
        let data = self.data.read().await;
        let mut degrees: Vec<Degree> = data
            .degrees
            .values()
            .filter(|d| !is_ecp_degree(&d.id))
            .cloned()
            .collect();
        degrees.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(degrees)
    }
}

#[async_trait::async_trait]
impl CourseRepository for InMemoryCatalog {
    async fn get_course_by_code(&self, code: &str) -> Result<Course, DomainError> {
        self.data
            .read()
            .await
            .courses
            .get(code)
            .cloned()
            .ok_or_else(|| DomainError::course_not_found(code))
    }
}

#[async_trait::async_trait]
impl CoursePoolRepository for InMemoryCatalog {
    async fn get_course_pool(&self, id: &str) -> Result<Option<CoursePool>, DomainError> {
        Ok(self.data.read().await.pools.get(id).cloned())
    }
}

#[async_trait::async_trait]
impl TimelineRepository for InMemoryCatalog {
    async fn find_by_id(&self, id: &str) -> Result<Option<StoredTimeline>, DomainError> {
        Ok(self.data.read().await.timelines.get(id).cloned())
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<StoredTimeline>, DomainError> {
        Ok(self
            .data
            .read()
            .await
            .timelines
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl UserRepository for InMemoryCatalog {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, DomainError> {
        Ok(self.data.read().await.users.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(code: &str) -> Course {
        Course::placeholder(code, 3.0)
    }

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::new()
            .with_course(course("COMP 248"))
            .with_course(course("COMP 249"))
            .with_pool(CoursePool {
                id: "core".into(),
                name: "Core".into(),
                credits_required: 6.0,
                courses: vec!["COMP 248".into(), "COMP 249".into(), "COMP 999".into()],
            })
            .with_degree(Degree {
                id: "BCompSc_CS".into(),
                name: "Computer Science".into(),
                total_credits: Some(90.0),
                course_pools: vec!["core".into(), "ghost".into()],
            })
            .with_degree(Degree {
                id: "COMP_ECP".into(),
                name: "Extended Credit Program - Computer Science".into(),
                total_credits: Some(30.0),
                course_pools: vec![],
            })
    }

    #[tokio::test]
    async fn test_degree_lookups() {
        let cat = catalog();
        let pools = cat.get_course_pools_for_degree("BCompSc_CS").await.unwrap();
        assert_eq!(pools.len(), 1);
        let courses = cat.get_courses_for_degree("BCompSc_CS").await.unwrap();
        let codes: Vec<_> = courses.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(codes, vec!["COMP 248", "COMP 249"]);
        let err = cat.read_degree("nope").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_read_all_degrees_excludes_ecp() {
        let degrees = catalog().read_all_degrees().await.unwrap();
        assert_eq!(degrees.len(), 1);
        assert_eq!(degrees[0].id, "BCompSc_CS");
    }

    fn timeline(id: &str, name: &str) -> StoredTimeline {
        StoredTimeline {
            id: id.into(),
            user_id: "u-1".into(),
            name: name.into(),
            degree_id: "BCompSc_CS".into(),
            semesters: vec![],
            course_status_map: Default::default(),
            exemptions: vec![],
            deficiencies: vec![],
            is_extended_credit: false,
            is_coop: false,
            updated_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_save_timeline_replaces_by_id() {
        let cat = catalog();
        cat.save_timeline(timeline("tl-1", "draft")).await;
        cat.save_timeline(timeline("tl-2", "other")).await;
        cat.save_timeline(timeline("tl-1", "final")).await;

        let saved = TimelineRepository::find_by_id(&cat, "tl-1").await.unwrap().unwrap();
        assert_eq!(saved.name, "final");
        assert_eq!(cat.find_by_user("u-1").await.unwrap().len(), 2);
        assert!(cat.find_by_user("u-2").await.unwrap().is_empty());
    }
}

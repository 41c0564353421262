//! Outbound ports. Engine calls into the catalog and document stores.
//!
//! Implemented by adapters.

use crate::domain::{Course, CoursePool, Degree, DomainError, StoredTimeline, User};

/// Degree catalog.
#[async_trait::async_trait]
pub trait DegreeRepository: Send + Sync {
    /// Fails with `NotFound` when the id is unknown.
    async fn read_degree(&self, id: &str) -> Result<Degree, DomainError>;

    async fn get_course_pools_for_degree(&self, id: &str) -> Result<Vec<CoursePool>, DomainError>;

    /// Courses that belong to any pool of the degree.
    async fn get_courses_for_degree(&self, id: &str) -> Result<Vec<Course>, DomainError>;

    /// All offered degrees. Extended-credit pseudo-degrees are excluded.
    async fn read_all_degrees(&self) -> Result<Vec<Degree>, DomainError>;
}

/// Course catalog.
#[async_trait::async_trait]
pub trait CourseRepository: Send + Sync {
    /// Fails with `NotFound` when the code is unknown.
    async fn get_course_by_code(&self, code: &str) -> Result<Course, DomainError>;
}

/// Stand-alone pools (e.g. the co-op work-term pool).
#[async_trait::async_trait]
pub trait CoursePoolRepository: Send + Sync {
    async fn get_course_pool(&self, id: &str) -> Result<Option<CoursePool>, DomainError>;
}

/// Saved timelines.
#[async_trait::async_trait]
pub trait TimelineRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<StoredTimeline>, DomainError>;

    /// All timelines owned by a user, in no particular order.
    async fn find_by_user(&self, user_id: &str) -> Result<Vec<StoredTimeline>, DomainError>;
}

#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, DomainError>;
}

//! Loads a JSON catalog snapshot from disk into an `InMemoryCatalog`.
//!
//! File shape: `{"degrees": [...], "coursePools": [...], "courses": [...], "timelines": [...], "users": [...]}`.

use super::memory_catalog::{CatalogSnapshot, InMemoryCatalog};
use crate::domain::DomainError;
use std::path::Path;
use tokio::fs;
use tracing::info;

pub struct JsonCatalog;

impl JsonCatalog {
    /// Read and parse the snapshot. Missing or malformed files are `Repo` errors.
    pub async fn load(path: impl AsRef<Path>) -> Result<InMemoryCatalog, DomainError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .await
            .map_err(|e| DomainError::Repo(format!("read catalog {}: {}", path.display(), e)))?;
        let snapshot: CatalogSnapshot = serde_json::from_str(&raw)
            .map_err(|e| DomainError::Repo(format!("parse catalog {}: {}", path.display(), e)))?;

        info!(
            path = %path.display(),
            degrees = snapshot.degrees.len(),
            pools = snapshot.course_pools.len(),
            courses = snapshot.courses.len(),
            timelines = snapshot.timelines.len(),
            "loaded catalog"
        );

        Ok(InMemoryCatalog::from_snapshot(snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{CourseRepository, DegreeRepository};

    #[tokio::test]
    async fn test_load_catalog_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        let json = r#"{
            "degrees": [{"id": "BEng_SOFTWARE", "name": "Software Engineering", "totalCredits": 120, "coursePools": ["core"]}],
            "coursePools": [{"id": "core", "name": "Core", "creditsRequired": 3, "courses": ["SOEN 287"]}],
            "courses": [{"id": "SOEN 287", "title": "Web Programming", "credits": 3}]
        }"#;
        tokio::fs::write(&path, json).await.unwrap();

        let catalog = JsonCatalog::load(&path).await.unwrap();
        let degree = catalog.read_degree("BEng_SOFTWARE").await.unwrap();
        assert_eq!(degree.total_credits, Some(120.0));
        let course = catalog.get_course_by_code("SOEN 287").await.unwrap();
        assert_eq!(course.title, "Web Programming");
    }

    #[tokio::test]
    async fn test_load_missing_and_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let missing = JsonCatalog::load(dir.path().join("none.json")).await;
        assert!(matches!(missing, Err(DomainError::Repo(_))));

        let bad = dir.path().join("bad.json");
        tokio::fs::write(&bad, "{not json").await.unwrap();
        let err = JsonCatalog::load(&bad).await.unwrap_err();
        assert!(err.to_string().contains("bad.json"));
    }
}

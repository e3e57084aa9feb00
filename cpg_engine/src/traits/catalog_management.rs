use thiserror::Error;

use crate::db_types::{Course, CourseId};

#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("The course {0} does not exist")]
    CourseNotFound(CourseId),
}

impl From<sqlx::Error> for CatalogError {
    fn from(e: sqlx::Error) -> Self {
        CatalogError::DatabaseError(e.to_string())
    }
}

/// Read-only access to the course catalog. Prices are read at checkout time and copied into the order, so nothing
/// downstream ever depends on the live catalog price again.
#[allow(async_fn_in_trait)]
pub trait CatalogManagement {
    /// Fetches the current snapshot for the course. Fails with [`CatalogError::CourseNotFound`] if it is unknown.
    async fn fetch_course(&self, course_id: &CourseId) -> Result<Course, CatalogError>;

    /// Fetches snapshots for all the given courses, in the order requested. Any unknown id fails the whole call.
    async fn fetch_courses(&self, course_ids: &[CourseId]) -> Result<Vec<Course>, CatalogError> {
        let mut courses = Vec::with_capacity(course_ids.len());
        for id in course_ids {
            courses.push(self.fetch_course(id).await?);
        }
        Ok(courses)
    }
}

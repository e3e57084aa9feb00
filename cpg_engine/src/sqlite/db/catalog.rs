use sqlx::SqliteConnection;

use crate::db_types::{Course, CourseId};

pub async fn fetch_course(course_id: &CourseId, conn: &mut SqliteConnection) -> Result<Option<Course>, sqlx::Error> {
    let course = sqlx::query_as("SELECT * FROM courses WHERE course_id = $1")
        .bind(course_id.as_str())
        .fetch_optional(conn)
        .await?;
    Ok(course)
}

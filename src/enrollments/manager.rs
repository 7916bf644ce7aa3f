/// Enrollment manager implementation using runtime queries
use crate::{
    db::models::{Course, StudentEnrollment, UserRole},
    error::{DataError, DataResult},
    roles,
};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

/// Enrollment manager service
#[derive(Clone)]
pub struct EnrollmentManager {
    db: SqlitePool,
}

impl EnrollmentManager {
    /// Create a new enrollment manager
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Enroll a student in a course.
    ///
    /// The course's current price and currency are copied onto the
    /// enrollment; later catalog changes never touch the snapshot.
    pub async fn enroll_student(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> DataResult<StudentEnrollment> {
        let mut tx = self.db.begin().await?;

        roles::require_role(&mut *tx, "student_enrollment", student_id, UserRole::Student).await?;

        let course = sqlx::query_as::<_, Course>(
            "SELECT id, teacher_user_id, title, category, description, image_url,
                    price, currency_code, subject_id, is_published, created_at, updated_at
             FROM courses
             WHERE id = ?1",
        )
        .bind(course_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DataError::not_found("course", course_id))?;

        let enrolled: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM student_enrollments
                           WHERE student_user_id = ?1 AND course_id = ?2)",
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_one(&mut *tx)
        .await?;
        if enrolled {
            return Err(DataError::Duplicate(format!(
                "Student {} is already enrolled in course {}",
                student_id, course_id
            )));
        }

        let now = Utc::now();
        let id = sqlx::query(
            "INSERT INTO student_enrollments (student_user_id, course_id, enrollment_date,
                                              progress, price_at_enrollment, currency_at_enrollment)
             VALUES (?1, ?2, ?3, 0, ?4, ?5)",
        )
        .bind(student_id)
        .bind(course_id)
        .bind(now)
        .bind(course.price)
        .bind(&course.currency_code)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        tx.commit().await?;

        info!("Enrolled student {} in course {}", student_id, course_id);

        Ok(StudentEnrollment {
            id,
            student_user_id: Some(student_id),
            course_id,
            enrollment_date: now,
            last_accessed: None,
            progress: 0,
            completed_date: None,
            price_at_enrollment: course.price,
            currency_at_enrollment: course.currency_code,
        })
    }

    /// Get an enrollment by id
    pub async fn get_enrollment(&self, enrollment_id: i64) -> DataResult<StudentEnrollment> {
        let enrollment = sqlx::query_as::<_, StudentEnrollment>(
            "SELECT id, student_user_id, course_id, enrollment_date, last_accessed,
                    progress, completed_date, price_at_enrollment, currency_at_enrollment
             FROM student_enrollments
             WHERE id = ?1",
        )
        .bind(enrollment_id)
        .fetch_optional(&self.db)
        .await?;

        enrollment.ok_or_else(|| DataError::not_found("student_enrollment", enrollment_id))
    }

    /// Enrollments of a student
    pub async fn list_enrollments_by_student(
        &self,
        student_id: i64,
    ) -> DataResult<Vec<StudentEnrollment>> {
        let enrollments = sqlx::query_as::<_, StudentEnrollment>(
            "SELECT id, student_user_id, course_id, enrollment_date, last_accessed,
                    progress, completed_date, price_at_enrollment, currency_at_enrollment
             FROM student_enrollments
             WHERE student_user_id = ?1
             ORDER BY id",
        )
        .bind(student_id)
        .fetch_all(&self.db)
        .await?;

        Ok(enrollments)
    }

    /// Record progress through a course. Reaching 100 stamps the completion
    /// date; the price snapshot is never rewritten.
    pub async fn update_progress(&self, enrollment_id: i64, progress: i32) -> DataResult<StudentEnrollment> {
        if !(0..=100).contains(&progress) {
            return Err(DataError::DomainRange(format!(
                "Progress must be between 0 and 100, got {}",
                progress
            )));
        }

        let mut tx = self.db.begin().await?;

        let mut current = sqlx::query_as::<_, StudentEnrollment>(
            "SELECT id, student_user_id, course_id, enrollment_date, last_accessed,
                    progress, completed_date, price_at_enrollment, currency_at_enrollment
             FROM student_enrollments
             WHERE id = ?1",
        )
        .bind(enrollment_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DataError::not_found("student_enrollment", enrollment_id))?;

        if progress == 100 && current.completed_date.is_none() {
            current.completed_date = Some(Utc::now());
        }

        sqlx::query(
            "UPDATE student_enrollments SET progress = ?1, completed_date = ?2 WHERE id = ?3",
        )
        .bind(progress)
        .bind(current.completed_date)
        .bind(enrollment_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        current.progress = progress;

        Ok(current)
    }

    /// Stamp the enrollment's last-accessed time
    pub async fn touch_last_accessed(&self, enrollment_id: i64) -> DataResult<()> {
        let result =
            sqlx::query("UPDATE student_enrollments SET last_accessed = ?1 WHERE id = ?2")
                .bind(Utc::now())
                .bind(enrollment_id)
                .execute(&self.db)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DataError::not_found("student_enrollment", enrollment_id));
        }

        Ok(())
    }

    /// Remove an enrollment record
    pub async fn unenroll(&self, enrollment_id: i64) -> DataResult<()> {
        let result = sqlx::query("DELETE FROM student_enrollments WHERE id = ?1")
            .bind(enrollment_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DataError::not_found("student_enrollment", enrollment_id));
        }

        Ok(())
    }
}

/// Course manager implementation using runtime queries
use crate::{
    courses::{NewClass, NewCourse, UpdateClass, UpdateCourse},
    db::models::{Class, Course, UserRole, SUPPORTED_CURRENCY},
    error::{DataError, DataResult},
    roles,
};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::info;

/// Course manager service
#[derive(Clone)]
pub struct CourseManager {
    db: SqlitePool,
}

impl CourseManager {
    /// Create a new course manager
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Create a new course
    pub async fn create_course(&self, new_course: NewCourse) -> DataResult<Course> {
        if new_course.title.trim().is_empty() {
            return Err(DataError::Validation("Title cannot be empty".to_string()));
        }
        validate_price(new_course.price, &new_course.currency_code)?;

        let mut tx = self.db.begin().await?;

        if let Some(teacher_id) = new_course.teacher_user_id {
            roles::require_role(&mut *tx, "course", teacher_id, UserRole::Teacher).await?;
        }
        if let Some(ref subject_id) = new_course.subject_id {
            ensure_subject_exists(&mut tx, subject_id).await?;
        }

        let now = Utc::now();
        let id = sqlx::query(
            "INSERT INTO courses (teacher_user_id, title, category, description, image_url,
                                  price, currency_code, subject_id, is_published,
                                  created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
        )
        .bind(new_course.teacher_user_id)
        .bind(&new_course.title)
        .bind(&new_course.category)
        .bind(&new_course.description)
        .bind(&new_course.image_url)
        .bind(new_course.price)
        .bind(&new_course.currency_code)
        .bind(&new_course.subject_id)
        .bind(new_course.is_published)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        tx.commit().await?;

        info!("Created course {} ({})", id, new_course.title);

        Ok(Course {
            id,
            teacher_user_id: new_course.teacher_user_id,
            title: new_course.title,
            category: new_course.category,
            description: new_course.description,
            image_url: new_course.image_url,
            price: new_course.price,
            currency_code: new_course.currency_code,
            subject_id: new_course.subject_id,
            is_published: new_course.is_published,
            created_at: now,
            updated_at: now,
        })
    }

    /// Partially update a course. A reassigned teacher is validated against
    /// the `teacher` role just like at creation.
    pub async fn update_course(&self, course_id: i64, update: UpdateCourse) -> DataResult<Course> {
        let mut tx = self.db.begin().await?;

        let current = fetch_course(&mut *tx, course_id)
            .await?
            .ok_or_else(|| DataError::not_found("course", course_id))?;

        let price = update.price.unwrap_or(current.price);
        let currency_code = update.currency_code.unwrap_or(current.currency_code);
        validate_price(price, &currency_code)?;

        if let Some(teacher_id) = update.teacher_user_id {
            if current.teacher_user_id != Some(teacher_id) {
                roles::require_role(&mut *tx, "course", teacher_id, UserRole::Teacher).await?;
            }
        }
        if let Some(ref subject_id) = update.subject_id {
            if current.subject_id.as_deref() != Some(subject_id) {
                ensure_subject_exists(&mut tx, subject_id).await?;
            }
        }

        let teacher_user_id = update.teacher_user_id.or(current.teacher_user_id);
        let title = update.title.unwrap_or(current.title);
        let category = update.category.or(current.category);
        let description = update.description.or(current.description);
        let image_url = update.image_url.or(current.image_url);
        let subject_id = update.subject_id.or(current.subject_id);
        let is_published = update.is_published.unwrap_or(current.is_published);

        if title.trim().is_empty() {
            return Err(DataError::Validation("Title cannot be empty".to_string()));
        }

        let now = Utc::now();
        sqlx::query(
            "UPDATE courses
             SET teacher_user_id = ?1, title = ?2, category = ?3, description = ?4,
                 image_url = ?5, price = ?6, currency_code = ?7, subject_id = ?8,
                 is_published = ?9, updated_at = ?10
             WHERE id = ?11",
        )
        .bind(teacher_user_id)
        .bind(&title)
        .bind(&category)
        .bind(&description)
        .bind(&image_url)
        .bind(price)
        .bind(&currency_code)
        .bind(&subject_id)
        .bind(is_published)
        .bind(now)
        .bind(course_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Course {
            id: course_id,
            teacher_user_id,
            title,
            category,
            description,
            image_url,
            price,
            currency_code,
            subject_id,
            is_published,
            created_at: current.created_at,
            updated_at: now,
        })
    }

    /// Get a course by id
    pub async fn get_course(&self, course_id: i64) -> DataResult<Course> {
        fetch_course(&self.db, course_id)
            .await?
            .ok_or_else(|| DataError::not_found("course", course_id))
    }

    /// Courses taught by a teacher
    pub async fn list_courses_by_teacher(&self, teacher_id: i64) -> DataResult<Vec<Course>> {
        let courses = sqlx::query_as::<_, Course>(
            "SELECT id, teacher_user_id, title, category, description, image_url,
                    price, currency_code, subject_id, is_published, created_at, updated_at
             FROM courses
             WHERE teacher_user_id = ?1
             ORDER BY id",
        )
        .bind(teacher_id)
        .fetch_all(&self.db)
        .await?;

        Ok(courses)
    }

    /// Published catalog entries
    pub async fn list_published_courses(&self) -> DataResult<Vec<Course>> {
        let courses = sqlx::query_as::<_, Course>(
            "SELECT id, teacher_user_id, title, category, description, image_url,
                    price, currency_code, subject_id, is_published, created_at, updated_at
             FROM courses
             WHERE is_published = 1
             ORDER BY id",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(courses)
    }

    /// Flip a course's publish flag
    pub async fn set_published(&self, course_id: i64, published: bool) -> DataResult<()> {
        let result = sqlx::query("UPDATE courses SET is_published = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(published)
            .bind(Utc::now())
            .bind(course_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DataError::not_found("course", course_id));
        }

        Ok(())
    }

    /// Delete a course, cascading to its classes and enrollments
    pub async fn delete_course(&self, course_id: i64) -> DataResult<()> {
        let result = sqlx::query("DELETE FROM courses WHERE id = ?1")
            .bind(course_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DataError::not_found("course", course_id));
        }

        info!("Deleted course {}", course_id);

        Ok(())
    }

    /// Schedule a class session inside a course
    pub async fn schedule_class(&self, new_class: NewClass) -> DataResult<Class> {
        if new_class.title.trim().is_empty() {
            return Err(DataError::Validation("Title cannot be empty".to_string()));
        }
        validate_schedule(new_class.scheduled_start_time, new_class.scheduled_end_time)?;

        let mut tx = self.db.begin().await?;

        if fetch_course(&mut *tx, new_class.course_id).await?.is_none() {
            return Err(DataError::not_found("class", format!("course {}", new_class.course_id)));
        }

        let now = Utc::now();
        let id = sqlx::query(
            "INSERT INTO classes (course_id, title, description, is_published,
                                  scheduled_start_time, scheduled_end_time,
                                  created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
        )
        .bind(new_class.course_id)
        .bind(&new_class.title)
        .bind(&new_class.description)
        .bind(new_class.is_published)
        .bind(new_class.scheduled_start_time)
        .bind(new_class.scheduled_end_time)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        tx.commit().await?;

        Ok(Class {
            id,
            course_id: new_class.course_id,
            title: new_class.title,
            description: new_class.description,
            is_published: new_class.is_published,
            scheduled_start_time: new_class.scheduled_start_time,
            scheduled_end_time: new_class.scheduled_end_time,
            created_at: now,
            updated_at: now,
        })
    }

    /// Partially update a class session, revalidating the schedule window
    pub async fn update_class(&self, class_id: i64, update: UpdateClass) -> DataResult<Class> {
        let mut tx = self.db.begin().await?;

        let current = sqlx::query_as::<_, Class>(
            "SELECT id, course_id, title, description, is_published,
                    scheduled_start_time, scheduled_end_time, created_at, updated_at
             FROM classes
             WHERE id = ?1",
        )
        .bind(class_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DataError::not_found("class", class_id))?;

        let scheduled_start_time = update
            .scheduled_start_time
            .unwrap_or(current.scheduled_start_time);
        let scheduled_end_time = update
            .scheduled_end_time
            .unwrap_or(current.scheduled_end_time);
        validate_schedule(scheduled_start_time, scheduled_end_time)?;

        let title = update.title.unwrap_or(current.title);
        let description = update.description.or(current.description);
        let is_published = update.is_published.unwrap_or(current.is_published);

        let now = Utc::now();
        sqlx::query(
            "UPDATE classes
             SET title = ?1, description = ?2, is_published = ?3,
                 scheduled_start_time = ?4, scheduled_end_time = ?5, updated_at = ?6
             WHERE id = ?7",
        )
        .bind(&title)
        .bind(&description)
        .bind(is_published)
        .bind(scheduled_start_time)
        .bind(scheduled_end_time)
        .bind(now)
        .bind(class_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Class {
            id: class_id,
            course_id: current.course_id,
            title,
            description,
            is_published,
            scheduled_start_time,
            scheduled_end_time,
            created_at: current.created_at,
            updated_at: now,
        })
    }

    /// Delete a class session
    pub async fn delete_class(&self, class_id: i64) -> DataResult<()> {
        let result = sqlx::query("DELETE FROM classes WHERE id = ?1")
            .bind(class_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DataError::not_found("class", class_id));
        }

        Ok(())
    }

    /// Class sessions of a course, ordered by start time
    pub async fn list_classes(&self, course_id: i64) -> DataResult<Vec<Class>> {
        let classes = sqlx::query_as::<_, Class>(
            "SELECT id, course_id, title, description, is_published,
                    scheduled_start_time, scheduled_end_time, created_at, updated_at
             FROM classes
             WHERE course_id = ?1
             ORDER BY scheduled_start_time",
        )
        .bind(course_id)
        .fetch_all(&self.db)
        .await?;

        Ok(classes)
    }
}

async fn fetch_course(
    executor: impl sqlx::SqliteExecutor<'_>,
    course_id: i64,
) -> DataResult<Option<Course>> {
    let course = sqlx::query_as::<_, Course>(
        "SELECT id, teacher_user_id, title, category, description, image_url,
                price, currency_code, subject_id, is_published, created_at, updated_at
         FROM courses
         WHERE id = ?1",
    )
    .bind(course_id)
    .fetch_optional(executor)
    .await?;

    Ok(course)
}

async fn ensure_subject_exists(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    subject_id: &str,
) -> DataResult<()> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM subjects WHERE id = ?1)")
        .bind(subject_id)
        .fetch_one(&mut **tx)
        .await?;

    if !exists {
        return Err(DataError::not_found("subject", subject_id));
    }

    Ok(())
}

fn validate_price(price: i64, currency_code: &str) -> DataResult<()> {
    if price < 0 {
        return Err(DataError::DomainRange(format!(
            "Price must be non-negative, got {}",
            price
        )));
    }
    if currency_code != SUPPORTED_CURRENCY {
        return Err(DataError::DomainRange(format!(
            "Unsupported currency code '{}', only '{}' is accepted",
            currency_code, SUPPORTED_CURRENCY
        )));
    }

    Ok(())
}

fn validate_schedule(start: DateTime<Utc>, end: DateTime<Utc>) -> DataResult<()> {
    if end <= start {
        return Err(DataError::DomainRange(format!(
            "Class must end after it starts ({} <= {})",
            end, start
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::initialize_schema;
    use crate::db::seed::seed_subjects;
    use crate::db::{create_pool, DatabaseOptions};
    use crate::users::{NewUser, UserManager};
    use chrono::Duration;
    use std::path::Path;

    async fn setup() -> (UserManager, CourseManager) {
        let pool = create_pool(
            Path::new(":memory:"),
            DatabaseOptions {
                max_connections: 1,
                enable_wal: false,
            },
        )
        .await
        .unwrap();
        initialize_schema(&pool).await.unwrap();
        seed_subjects(&pool).await.unwrap();
        (UserManager::new(pool.clone()), CourseManager::new(pool))
    }

    async fn make_user(users: &UserManager, email: &str, role: UserRole) -> i64 {
        users
            .create_user(NewUser {
                name: "Test User".to_string(),
                email: email.to_string(),
                password_hash: "$2b$12$hash".to_string(),
                role,
                ..Default::default()
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_course_requires_teacher_role() {
        let (users, courses) = setup().await;
        let teacher = make_user(&users, "huong@waiedu.test", UserRole::Teacher).await;
        let student = make_user(&users, "linh@waiedu.test", UserRole::Student).await;

        courses
            .create_course(NewCourse {
                teacher_user_id: Some(teacher),
                title: "Mechanics 101".to_string(),
                subject_id: Some("physics".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let err = courses
            .create_course(NewCourse {
                teacher_user_id: Some(student),
                title: "Broken".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::RoleMismatch { .. }));
    }

    #[tokio::test]
    async fn test_course_without_teacher_is_allowed() {
        let (_, courses) = setup().await;

        let course = courses
            .create_course(NewCourse {
                title: "Self-paced Algebra".to_string(),
                subject_id: Some("math".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(course.teacher_user_id.is_none());
    }

    #[tokio::test]
    async fn test_course_rejects_bad_price_and_currency() {
        let (_, courses) = setup().await;

        let err = courses
            .create_course(NewCourse {
                title: "Negative".to_string(),
                price: -100,
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::DomainRange(_)));

        let err = courses
            .create_course(NewCourse {
                title: "Dollars".to_string(),
                currency_code: "USD".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::DomainRange(_)));
    }

    #[tokio::test]
    async fn test_course_rejects_unknown_subject() {
        let (_, courses) = setup().await;

        let err = courses
            .create_course(NewCourse {
                title: "Alchemy".to_string(),
                subject_id: Some("alchemy".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::NotFound { entity: "subject", .. }));
    }

    #[tokio::test]
    async fn test_class_schedule_window_validated() {
        let (_, courses) = setup().await;
        let course = courses
            .create_course(NewCourse {
                title: "Physics".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let start = Utc::now();
        let err = courses
            .schedule_class(NewClass {
                course_id: course.id,
                title: "Inverted".to_string(),
                description: None,
                is_published: false,
                scheduled_start_time: start,
                scheduled_end_time: start - Duration::hours(1),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::DomainRange(_)));
    }

    #[tokio::test]
    async fn test_classes_listed_in_start_order() {
        let (_, courses) = setup().await;
        let course = courses
            .create_course(NewCourse {
                title: "Physics".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let base = Utc::now();
        for (title, offset) in [("Later", 3), ("Earlier", 1), ("Middle", 2)] {
            courses
                .schedule_class(NewClass {
                    course_id: course.id,
                    title: title.to_string(),
                    description: None,
                    is_published: false,
                    scheduled_start_time: base + Duration::hours(offset),
                    scheduled_end_time: base + Duration::hours(offset + 1),
                })
                .await
                .unwrap();
        }

        let classes = courses.list_classes(course.id).await.unwrap();
        let titles: Vec<&str> = classes.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Earlier", "Middle", "Later"]);
    }
}

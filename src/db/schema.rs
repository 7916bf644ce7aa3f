/// Structural provisioning for the WaiEdu store
///
/// `initialize_schema` has clean-slate semantics: it unconditionally drops
/// and recreates every table, so it is only suitable for first-time setup
/// and test provisioning. In-place migration of a live deployment is a
/// separate concern handled outside this layer.
use crate::error::{DataError, DataResult};
use sqlx::SqlitePool;
use tracing::info;

/// Drop order is the reverse of creation order so foreign keys never
/// dangle mid-provisioning.
const DROP_STATEMENTS: &[&str] = &[
    "DROP TABLE IF EXISTS student_enrollments",
    "DROP TABLE IF EXISTS classes",
    "DROP TABLE IF EXISTS courses",
    "DROP TABLE IF EXISTS parent_child_links",
    "DROP TABLE IF EXISTS user_subjects",
    "DROP TABLE IF EXISTS subjects",
    "DROP TABLE IF EXISTS users",
];

const CREATE_STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        phone TEXT,
        birth_date DATE,
        gender TEXT CHECK (gender IN ('male', 'female', 'other')),
        role TEXT NOT NULL DEFAULT 'student'
            CHECK (role IN ('student', 'teacher', 'parent')),
        grade TEXT,
        school TEXT,
        teaching_subject TEXT,
        child_grade TEXT,
        is_verified BOOLEAN NOT NULL DEFAULT 0,
        verification_token TEXT,
        reset_token TEXT,
        reset_token_expiry DATETIME,
        created_at DATETIME NOT NULL,
        updated_at DATETIME NOT NULL
    )
    "#,
    r#"
    CREATE TABLE subjects (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE user_subjects (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        subject_id TEXT NOT NULL REFERENCES subjects(id) ON DELETE CASCADE,
        UNIQUE (user_id, subject_id)
    )
    "#,
    r#"
    CREATE TABLE parent_child_links (
        parent_user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        child_user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        PRIMARY KEY (parent_user_id, child_user_id)
    )
    "#,
    r#"
    CREATE TABLE courses (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        teacher_user_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
        title TEXT NOT NULL,
        category TEXT,
        description TEXT,
        image_url TEXT,
        price BIGINT NOT NULL DEFAULT 0 CHECK (price >= 0),
        currency_code TEXT NOT NULL DEFAULT 'VND' CHECK (currency_code = 'VND'),
        subject_id TEXT REFERENCES subjects(id) ON DELETE SET NULL,
        is_published BOOLEAN NOT NULL DEFAULT 0,
        created_at DATETIME NOT NULL,
        updated_at DATETIME NOT NULL
    )
    "#,
    r#"
    CREATE TABLE classes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        course_id INTEGER NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
        title TEXT NOT NULL,
        description TEXT,
        is_published BOOLEAN NOT NULL DEFAULT 0,
        scheduled_start_time DATETIME NOT NULL,
        scheduled_end_time DATETIME NOT NULL,
        created_at DATETIME NOT NULL,
        updated_at DATETIME NOT NULL,
        CHECK (scheduled_end_time > scheduled_start_time)
    )
    "#,
    r#"
    CREATE TABLE student_enrollments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        student_user_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
        course_id INTEGER NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
        enrollment_date DATETIME NOT NULL,
        last_accessed DATETIME,
        progress INTEGER NOT NULL DEFAULT 0 CHECK (progress >= 0 AND progress <= 100),
        completed_date DATETIME,
        price_at_enrollment BIGINT NOT NULL DEFAULT 0 CHECK (price_at_enrollment >= 0),
        currency_at_enrollment TEXT NOT NULL DEFAULT 'VND'
            CHECK (currency_at_enrollment = 'VND'),
        UNIQUE (student_user_id, course_id)
    )
    "#,
    "CREATE INDEX idx_classes_course_id ON classes(course_id)",
    "CREATE INDEX idx_classes_scheduled_start_time ON classes(scheduled_start_time)",
];

/// Drop and recreate every table and index. Idempotent: re-running always
/// converges to the same (empty) structure.
pub async fn initialize_schema(pool: &SqlitePool) -> DataResult<()> {
    info!("Provisioning store schema (clean slate)");

    for statement in DROP_STATEMENTS {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(DataError::Database)?;
    }

    for statement in CREATE_STATEMENTS {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(DataError::Database)?;
    }

    info!("Store schema ready");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, DatabaseOptions};
    use std::path::Path;

    async fn test_pool() -> SqlitePool {
        create_pool(
            Path::new(":memory:"),
            DatabaseOptions {
                max_connections: 1,
                enable_wal: false,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let pool = test_pool().await;

        initialize_schema(&pool).await.unwrap();
        initialize_schema(&pool).await.unwrap();

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        assert_eq!(
            tables,
            vec![
                "classes",
                "courses",
                "parent_child_links",
                "student_enrollments",
                "subjects",
                "user_subjects",
                "users"
            ]
        );
    }

    #[tokio::test]
    async fn test_initialize_discards_existing_rows() {
        let pool = test_pool().await;
        initialize_schema(&pool).await.unwrap();

        sqlx::query("INSERT INTO subjects (id, name) VALUES ('physics', 'Physics')")
            .execute(&pool)
            .await
            .unwrap();

        initialize_schema(&pool).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM subjects")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}

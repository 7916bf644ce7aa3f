/// User manager implementation using runtime queries
use crate::{
    db::models::{ParentChildLink, Subject, User, UserRole, UserSubject},
    error::{DataError, DataResult},
    roles,
    users::{NewUser, UpdateUser},
};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sqlx::SqlitePool;
use tracing::info;

/// How long a password-reset token stays valid.
const RESET_TOKEN_TTL_HOURS: i64 = 1;

/// User manager service
#[derive(Clone)]
pub struct UserManager {
    db: SqlitePool,
}

impl UserManager {
    /// Create a new user manager
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Create a new user
    pub async fn create_user(&self, new_user: NewUser) -> DataResult<User> {
        if new_user.name.trim().is_empty() {
            return Err(DataError::Validation("Name cannot be empty".to_string()));
        }
        validate_email(&new_user.email)?;
        if new_user.password_hash.is_empty() {
            return Err(DataError::Validation(
                "Credential hash cannot be empty".to_string(),
            ));
        }

        let mut tx = self.db.begin().await?;

        if email_exists(&mut tx, &new_user.email).await? {
            return Err(DataError::Duplicate(format!(
                "Email {} already registered",
                new_user.email
            )));
        }

        let verification_token = generate_token();
        let now = Utc::now();
        let id = sqlx::query(
            "INSERT INTO users (name, email, password_hash, phone, birth_date, gender, role,
                                grade, school, teaching_subject, child_grade,
                                is_verified, verification_token, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, 0, ?12, ?13, ?13)",
        )
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.phone)
        .bind(new_user.birth_date)
        .bind(new_user.gender)
        .bind(new_user.role)
        .bind(&new_user.grade)
        .bind(&new_user.school)
        .bind(&new_user.teaching_subject)
        .bind(&new_user.child_grade)
        .bind(&verification_token)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        tx.commit().await?;

        info!("Created user {} ({})", id, new_user.email);

        Ok(User {
            id,
            name: new_user.name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            phone: new_user.phone,
            birth_date: new_user.birth_date,
            gender: new_user.gender,
            role: new_user.role,
            grade: new_user.grade,
            school: new_user.school,
            teaching_subject: new_user.teaching_subject,
            child_grade: new_user.child_grade,
            is_verified: false,
            verification_token: Some(verification_token),
            reset_token: None,
            reset_token_expiry: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a user by id
    pub async fn get_user(&self, user_id: i64) -> DataResult<User> {
        fetch_user(&self.db, user_id)
            .await?
            .ok_or_else(|| DataError::not_found("user", user_id))
    }

    /// Get a user by email
    pub async fn get_user_by_email(&self, email: &str) -> DataResult<User> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, phone, birth_date, gender, role,
                    grade, school, teaching_subject, child_grade,
                    is_verified, verification_token, reset_token, reset_token_expiry,
                    created_at, updated_at
             FROM users
             WHERE email = ?1",
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;

        user.ok_or_else(|| DataError::not_found("user", email))
    }

    /// Whether the user currently holds `role`. Usable by calling code for
    /// authorization decisions, not just internal enforcement.
    pub async fn has_role(&self, user_id: i64, role: UserRole) -> DataResult<bool> {
        roles::has_role(&self.db, user_id, role).await
    }

    /// Partially update a user's profile.
    ///
    /// A role change is refused while courses, enrollments, or family links
    /// still reference the user: those rows were validated against the role
    /// they were written under.
    pub async fn update_profile(&self, user_id: i64, update: UpdateUser) -> DataResult<User> {
        let mut tx = self.db.begin().await?;

        let current = fetch_user(&mut *tx, user_id)
            .await?
            .ok_or_else(|| DataError::not_found("user", user_id))?;

        if let Some(ref email) = update.email {
            validate_email(email)?;
            if email != &current.email && email_exists(&mut tx, email).await? {
                return Err(DataError::Duplicate(format!(
                    "Email {} already registered",
                    email
                )));
            }
        }

        if let Some(role) = update.role {
            if role != current.role && has_dependent_rows(&mut tx, user_id).await? {
                return Err(DataError::Validation(format!(
                    "Cannot change role of user {} while courses, enrollments, or family links reference it",
                    user_id
                )));
            }
        }

        let name = update.name.unwrap_or(current.name);
        let email = update.email.unwrap_or(current.email);
        let role = update.role.unwrap_or(current.role);
        let gender = update.gender.or(current.gender);
        let phone = update.phone.or(current.phone);
        let birth_date = update.birth_date.or(current.birth_date);
        let grade = update.grade.or(current.grade);
        let school = update.school.or(current.school);
        let teaching_subject = update.teaching_subject.or(current.teaching_subject);
        let child_grade = update.child_grade.or(current.child_grade);

        let now = Utc::now();
        sqlx::query(
            "UPDATE users
             SET name = ?1, email = ?2, role = ?3, gender = ?4, phone = ?5, birth_date = ?6,
                 grade = ?7, school = ?8, teaching_subject = ?9, child_grade = ?10,
                 updated_at = ?11
             WHERE id = ?12",
        )
        .bind(&name)
        .bind(&email)
        .bind(role)
        .bind(gender)
        .bind(&phone)
        .bind(birth_date)
        .bind(&grade)
        .bind(&school)
        .bind(&teaching_subject)
        .bind(&child_grade)
        .bind(now)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(User {
            id: user_id,
            name,
            email,
            password_hash: current.password_hash,
            phone,
            birth_date,
            gender,
            role,
            grade,
            school,
            teaching_subject,
            child_grade,
            is_verified: current.is_verified,
            verification_token: current.verification_token,
            reset_token: current.reset_token,
            reset_token_expiry: current.reset_token_expiry,
            created_at: current.created_at,
            updated_at: now,
        })
    }

    /// Delete a user.
    ///
    /// Subject associations and family links are hard-deleted with the row;
    /// courses and enrollments only lose their teacher/student reference.
    pub async fn delete_user(&self, user_id: i64) -> DataResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(user_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DataError::not_found("user", user_id));
        }

        info!("Deleted user {}", user_id);

        Ok(())
    }

    /// Associate a subject with a user. Advances the user's last-modified
    /// timestamp in the same transaction.
    pub async fn assign_subject(&self, user_id: i64, subject_id: &str) -> DataResult<UserSubject> {
        let mut tx = self.db.begin().await?;

        if roles::fetch_role(&mut *tx, user_id).await?.is_none() {
            return Err(DataError::not_found("user_subject", format!("user {}", user_id)));
        }
        if !subject_exists(&mut tx, subject_id).await? {
            return Err(DataError::not_found(
                "user_subject",
                format!("subject {}", subject_id),
            ));
        }

        let pair_taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM user_subjects WHERE user_id = ?1 AND subject_id = ?2)",
        )
        .bind(user_id)
        .bind(subject_id)
        .fetch_one(&mut *tx)
        .await?;
        if pair_taken {
            return Err(DataError::Duplicate(format!(
                "User {} already has subject {}",
                user_id, subject_id
            )));
        }

        let id = sqlx::query("INSERT INTO user_subjects (user_id, subject_id) VALUES (?1, ?2)")
            .bind(user_id)
            .bind(subject_id)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

        touch_user(&mut tx, user_id, Utc::now()).await?;

        tx.commit().await?;

        Ok(UserSubject {
            id,
            user_id,
            subject_id: subject_id.to_string(),
        })
    }

    /// Remove a subject association. The owning user's last-modified
    /// timestamp advances even though the association row is gone.
    pub async fn remove_subject(&self, user_id: i64, subject_id: &str) -> DataResult<()> {
        let mut tx = self.db.begin().await?;

        let result =
            sqlx::query("DELETE FROM user_subjects WHERE user_id = ?1 AND subject_id = ?2")
                .bind(user_id)
                .bind(subject_id)
                .execute(&mut *tx)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DataError::not_found(
                "user_subject",
                format!("user {} / subject {}", user_id, subject_id),
            ));
        }

        touch_user(&mut tx, user_id, Utc::now()).await?;

        tx.commit().await?;

        Ok(())
    }

    /// Subjects associated with a user
    pub async fn subjects_of(&self, user_id: i64) -> DataResult<Vec<Subject>> {
        let subjects = sqlx::query_as::<_, Subject>(
            "SELECT s.id, s.name
             FROM subjects s
             JOIN user_subjects us ON us.subject_id = s.id
             WHERE us.user_id = ?1
             ORDER BY s.id",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(subjects)
    }

    /// Link a parent user to a child (student) user
    pub async fn link_child(&self, parent_id: i64, child_id: i64) -> DataResult<ParentChildLink> {
        let mut tx = self.db.begin().await?;

        roles::require_role(&mut *tx, "parent_child_link", parent_id, UserRole::Parent).await?;
        roles::require_role(&mut *tx, "parent_child_link", child_id, UserRole::Student).await?;

        let linked: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM parent_child_links
                           WHERE parent_user_id = ?1 AND child_user_id = ?2)",
        )
        .bind(parent_id)
        .bind(child_id)
        .fetch_one(&mut *tx)
        .await?;
        if linked {
            return Err(DataError::Duplicate(format!(
                "Users {} and {} are already linked",
                parent_id, child_id
            )));
        }

        sqlx::query("INSERT INTO parent_child_links (parent_user_id, child_user_id) VALUES (?1, ?2)")
            .bind(parent_id)
            .bind(child_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(ParentChildLink {
            parent_user_id: parent_id,
            child_user_id: child_id,
        })
    }

    /// Remove a parent-child link
    pub async fn unlink_child(&self, parent_id: i64, child_id: i64) -> DataResult<()> {
        let result = sqlx::query(
            "DELETE FROM parent_child_links WHERE parent_user_id = ?1 AND child_user_id = ?2",
        )
        .bind(parent_id)
        .bind(child_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DataError::not_found(
                "parent_child_link",
                format!("parent {} / child {}", parent_id, child_id),
            ));
        }

        Ok(())
    }

    /// Children linked to a parent user
    pub async fn children_of(&self, parent_id: i64) -> DataResult<Vec<User>> {
        let children = sqlx::query_as::<_, User>(
            "SELECT u.id, u.name, u.email, u.password_hash, u.phone, u.birth_date, u.gender,
                    u.role, u.grade, u.school, u.teaching_subject, u.child_grade,
                    u.is_verified, u.verification_token, u.reset_token, u.reset_token_expiry,
                    u.created_at, u.updated_at
             FROM users u
             JOIN parent_child_links l ON l.child_user_id = u.id
             WHERE l.parent_user_id = ?1
             ORDER BY u.id",
        )
        .bind(parent_id)
        .fetch_all(&self.db)
        .await?;

        Ok(children)
    }

    /// Parents linked to a child user
    pub async fn parents_of(&self, child_id: i64) -> DataResult<Vec<User>> {
        let parents = sqlx::query_as::<_, User>(
            "SELECT u.id, u.name, u.email, u.password_hash, u.phone, u.birth_date, u.gender,
                    u.role, u.grade, u.school, u.teaching_subject, u.child_grade,
                    u.is_verified, u.verification_token, u.reset_token, u.reset_token_expiry,
                    u.created_at, u.updated_at
             FROM users u
             JOIN parent_child_links l ON l.parent_user_id = u.id
             WHERE l.child_user_id = ?1
             ORDER BY u.id",
        )
        .bind(child_id)
        .fetch_all(&self.db)
        .await?;

        Ok(parents)
    }

    /// Confirm a user's email with the token issued at creation
    pub async fn verify_email(&self, user_id: i64, token: &str) -> DataResult<()> {
        let mut tx = self.db.begin().await?;

        let user = fetch_user(&mut *tx, user_id)
            .await?
            .ok_or_else(|| DataError::not_found("user", user_id))?;

        match user.verification_token {
            Some(ref expected) if expected == token => {}
            _ => {
                return Err(DataError::Validation(
                    "Invalid verification token".to_string(),
                ))
            }
        }

        sqlx::query(
            "UPDATE users SET is_verified = 1, verification_token = NULL, updated_at = ?1
             WHERE id = ?2",
        )
        .bind(Utc::now())
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Issue a password-reset token for the account behind `email`.
    /// Returns the token; delivering it is the caller's concern.
    pub async fn begin_password_reset(&self, email: &str) -> DataResult<String> {
        let mut tx = self.db.begin().await?;

        let user_id: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE email = ?1")
            .bind(email)
            .fetch_optional(&mut *tx)
            .await?;
        let user_id = user_id.ok_or_else(|| DataError::not_found("user", email))?;

        let token = generate_token();
        let now = Utc::now();
        let expiry = now + Duration::hours(RESET_TOKEN_TTL_HOURS);

        sqlx::query(
            "UPDATE users SET reset_token = ?1, reset_token_expiry = ?2, updated_at = ?3
             WHERE id = ?4",
        )
        .bind(&token)
        .bind(expiry)
        .bind(now)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(token)
    }

    /// Swap the credential hash for the account holding a live reset token
    pub async fn complete_password_reset(
        &self,
        token: &str,
        new_password_hash: &str,
    ) -> DataResult<()> {
        if new_password_hash.is_empty() {
            return Err(DataError::Validation(
                "Credential hash cannot be empty".to_string(),
            ));
        }

        let mut tx = self.db.begin().await?;

        let row: Option<(i64, Option<DateTime<Utc>>)> =
            sqlx::query_as("SELECT id, reset_token_expiry FROM users WHERE reset_token = ?1")
                .bind(token)
                .fetch_optional(&mut *tx)
                .await?;

        let (user_id, expiry) = row.ok_or_else(|| {
            DataError::Validation("Invalid or expired reset token".to_string())
        })?;

        match expiry {
            Some(expiry) if expiry > Utc::now() => {}
            _ => {
                return Err(DataError::Validation(
                    "Invalid or expired reset token".to_string(),
                ))
            }
        }

        sqlx::query(
            "UPDATE users
             SET password_hash = ?1, reset_token = NULL, reset_token_expiry = NULL,
                 updated_at = ?2
             WHERE id = ?3",
        )
        .bind(new_password_hash)
        .bind(Utc::now())
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }
}

/// Advance a user's last-modified timestamp. Called from association write
/// paths inside their transaction; a plain column update, so it cannot
/// re-enter any propagation path.
async fn touch_user(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    user_id: i64,
    now: DateTime<Utc>,
) -> DataResult<()> {
    sqlx::query("UPDATE users SET updated_at = ?1 WHERE id = ?2")
        .bind(now)
        .bind(user_id)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

async fn fetch_user(
    executor: impl sqlx::SqliteExecutor<'_>,
    user_id: i64,
) -> DataResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, name, email, password_hash, phone, birth_date, gender, role,
                grade, school, teaching_subject, child_grade,
                is_verified, verification_token, reset_token, reset_token_expiry,
                created_at, updated_at
         FROM users
         WHERE id = ?1",
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await?;

    Ok(user)
}

async fn email_exists(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    email: &str,
) -> DataResult<bool> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1)")
            .bind(email)
            .fetch_one(&mut **tx)
            .await?;

    Ok(exists)
}

async fn subject_exists(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    subject_id: &str,
) -> DataResult<bool> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM subjects WHERE id = ?1)")
            .bind(subject_id)
            .fetch_one(&mut **tx)
            .await?;

    Ok(exists)
}

/// Whether any role-validated row still references this user
async fn has_dependent_rows(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    user_id: i64,
) -> DataResult<bool> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM courses WHERE teacher_user_id = ?1)
             OR EXISTS(SELECT 1 FROM student_enrollments WHERE student_user_id = ?1)
             OR EXISTS(SELECT 1 FROM parent_child_links
                       WHERE parent_user_id = ?1 OR child_user_id = ?1)",
    )
    .bind(user_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(exists)
}

fn validate_email(email: &str) -> DataResult<()> {
    // Basic email validation
    if !email.contains('@') {
        return Err(DataError::Validation("Invalid email format".to_string()));
    }

    Ok(())
}

/// Generate an opaque token for email verification / password reset
fn generate_token() -> String {
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    (0..32)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::initialize_schema;
    use crate::db::seed::seed_subjects;
    use crate::db::{create_pool, DatabaseOptions};
    use std::path::Path;

    async fn setup() -> UserManager {
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
        UserManager::new(pool)
    }

    fn student(email: &str) -> NewUser {
        NewUser {
            name: "Linh Tran".to_string(),
            email: email.to_string(),
            password_hash: "$2b$12$hash".to_string(),
            role: UserRole::Student,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_user_rejects_duplicate_email() {
        let users = setup().await;

        users.create_user(student("linh@waiedu.test")).await.unwrap();
        let err = users
            .create_user(student("linh@waiedu.test"))
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_create_user_rejects_malformed_email() {
        let users = setup().await;

        let err = users.create_user(student("not-an-email")).await.unwrap_err();
        assert!(matches!(err, DataError::Validation(_)));
    }

    #[tokio::test]
    async fn test_verify_email_consumes_token() {
        let users = setup().await;
        let user = users.create_user(student("linh@waiedu.test")).await.unwrap();
        let token = user.verification_token.clone().unwrap();

        users.verify_email(user.id, "wrong-token").await.unwrap_err();
        users.verify_email(user.id, &token).await.unwrap();

        let reloaded = users.get_user(user.id).await.unwrap();
        assert!(reloaded.is_verified);
        assert!(reloaded.verification_token.is_none());
    }

    #[tokio::test]
    async fn test_password_reset_round_trip() {
        let users = setup().await;
        let user = users.create_user(student("linh@waiedu.test")).await.unwrap();

        let token = users.begin_password_reset("linh@waiedu.test").await.unwrap();
        users
            .complete_password_reset(&token, "$2b$12$newhash")
            .await
            .unwrap();

        let reloaded = users.get_user(user.id).await.unwrap();
        assert_eq!(reloaded.password_hash, "$2b$12$newhash");
        assert!(reloaded.reset_token.is_none());

        // Token is single-use
        let err = users
            .complete_password_reset(&token, "$2b$12$other")
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::Validation(_)));
    }

    #[tokio::test]
    async fn test_unknown_reset_token_leaves_credentials_alone() {
        let users = setup().await;
        let user = users.create_user(student("linh@waiedu.test")).await.unwrap();

        let err = users
            .complete_password_reset("no-such-token", "$2b$12$other")
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::Validation(_)));

        let reloaded = users.get_user(user.id).await.unwrap();
        assert_eq!(reloaded.password_hash, "$2b$12$hash");
    }

    #[tokio::test]
    async fn test_assign_subject_advances_updated_at() {
        let users = setup().await;
        let user = users.create_user(student("linh@waiedu.test")).await.unwrap();
        let before = users.get_user(user.id).await.unwrap().updated_at;

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        users.assign_subject(user.id, "physics").await.unwrap();

        let after = users.get_user(user.id).await.unwrap().updated_at;
        assert!(after > before);
    }

    #[tokio::test]
    async fn test_remove_subject_uses_pre_image_user() {
        let users = setup().await;
        let user = users.create_user(student("linh@waiedu.test")).await.unwrap();
        users.assign_subject(user.id, "physics").await.unwrap();
        let before = users.get_user(user.id).await.unwrap().updated_at;

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        users.remove_subject(user.id, "physics").await.unwrap();

        let after = users.get_user(user.id).await.unwrap().updated_at;
        assert!(after > before);
        assert!(users.subjects_of(user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_assign_subject_rejects_duplicate_pair() {
        let users = setup().await;
        let user = users.create_user(student("linh@waiedu.test")).await.unwrap();

        users.assign_subject(user.id, "physics").await.unwrap();
        let err = users.assign_subject(user.id, "physics").await.unwrap_err();
        assert!(matches!(err, DataError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_link_child_enforces_both_roles() {
        let users = setup().await;
        let parent = users
            .create_user(NewUser {
                role: UserRole::Parent,
                ..student("mai@waiedu.test")
            })
            .await
            .unwrap();
        let child = users.create_user(student("linh@waiedu.test")).await.unwrap();
        let teacher = users
            .create_user(NewUser {
                role: UserRole::Teacher,
                ..student("huong@waiedu.test")
            })
            .await
            .unwrap();

        users.link_child(parent.id, child.id).await.unwrap();

        // A student cannot sit on the parent side
        let err = users.link_child(child.id, teacher.id).await.unwrap_err();
        assert!(matches!(err, DataError::RoleMismatch { .. }));

        // Nor can a teacher sit on the child side
        let err = users.link_child(parent.id, teacher.id).await.unwrap_err();
        assert!(matches!(err, DataError::RoleMismatch { .. }));
    }

    #[tokio::test]
    async fn test_role_change_blocked_by_dependents() {
        let users = setup().await;
        let parent = users
            .create_user(NewUser {
                role: UserRole::Parent,
                ..student("mai@waiedu.test")
            })
            .await
            .unwrap();
        let child = users.create_user(student("linh@waiedu.test")).await.unwrap();
        users.link_child(parent.id, child.id).await.unwrap();

        let err = users
            .update_profile(
                parent.id,
                UpdateUser {
                    role: Some(UserRole::Teacher),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::Validation(_)));

        // After the link is gone the role may change freely
        users.unlink_child(parent.id, child.id).await.unwrap();
        let updated = users
            .update_profile(
                parent.id,
                UpdateUser {
                    role: Some(UserRole::Teacher),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.role, UserRole::Teacher);
    }
}

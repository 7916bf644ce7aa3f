/// Role validation for the WaiEdu store
///
/// The single predicate every role-based integrity rule is built on. All
/// functions are generic over the sqlx executor so a caller holding an open
/// transaction observes its own uncommitted writes.
use crate::db::models::UserRole;
use crate::error::{DataError, DataResult};
use sqlx::SqliteExecutor;

/// Look up a user's current role. `None` when the user does not exist.
pub async fn fetch_role(
    executor: impl SqliteExecutor<'_>,
    user_id: i64,
) -> DataResult<Option<UserRole>> {
    let role: Option<UserRole> = sqlx::query_scalar("SELECT role FROM users WHERE id = ?1")
        .bind(user_id)
        .fetch_optional(executor)
        .await
        .map_err(DataError::Database)?;

    Ok(role)
}

/// Whether the user currently holds `role`. A missing user answers false,
/// not an error. No side effects.
pub async fn has_role(
    executor: impl SqliteExecutor<'_>,
    user_id: i64,
    role: UserRole,
) -> DataResult<bool> {
    Ok(fetch_role(executor, user_id).await? == Some(role))
}

/// Constraint-enforcement primitive: reject a write whose referenced user
/// is missing (`NotFound`) or holds the wrong role (`RoleMismatch`).
/// `entity` names the row being written, for error reporting.
pub async fn require_role(
    executor: impl SqliteExecutor<'_>,
    entity: &'static str,
    user_id: i64,
    expected: UserRole,
) -> DataResult<()> {
    match fetch_role(executor, user_id).await? {
        None => Err(DataError::not_found(entity, format!("user {}", user_id))),
        Some(actual) if actual != expected => Err(DataError::RoleMismatch {
            entity,
            user_id,
            expected,
            actual,
        }),
        Some(_) => Ok(()),
    }
}

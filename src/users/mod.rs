/// User management system
///
/// Handles user records, their subject associations, parent-child links,
/// and the verification / password-reset token lifecycle.

mod manager;

pub use manager::UserManager;

use crate::db::models::{UserGender, UserRole};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// New user payload. The credential must already be hashed by the caller;
/// this layer never sees plaintext passwords.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub gender: Option<UserGender>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub grade: Option<String>,
    pub school: Option<String>,
    pub teaching_subject: Option<String>,
    pub child_grade: Option<String>,
}

/// Partial profile update; `None` fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub gender: Option<UserGender>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub grade: Option<String>,
    pub school: Option<String>,
    pub teaching_subject: Option<String>,
    pub child_grade: Option<String>,
}

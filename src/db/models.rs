/// Database models for the WaiEdu store
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The only currency the platform currently supports.
pub const SUPPORTED_CURRENCY: &str = "VND";

/// Mutually-exclusive role held by a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum UserRole {
    Student,
    Teacher,
    Parent,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Student => "student",
            UserRole::Teacher => "teacher",
            UserRole::Parent => "parent",
        }
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Student
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional user gender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum UserGender {
    Male,
    Female,
    Other,
}

/// User record in the database
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<UserGender>,
    pub role: UserRole,
    /// Student metadata
    pub grade: Option<String>,
    pub school: Option<String>,
    /// Teacher metadata
    pub teaching_subject: Option<String>,
    /// Parent metadata
    pub child_grade: Option<String>,
    pub is_verified: bool,
    pub verification_token: Option<String>,
    pub reset_token: Option<String>,
    pub reset_token_expiry: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Subject catalog record
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    pub name: String,
}

/// Association between a user and a subject they teach or study
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserSubject {
    pub id: i64,
    pub user_id: i64,
    pub subject_id: String,
}

/// Link between a parent user and a child (student) user
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ParentChildLink {
    pub parent_user_id: i64,
    pub child_user_id: i64,
}

/// Course catalog record
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub teacher_user_id: Option<i64>,
    pub title: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    /// Price in integral minor units
    pub price: i64,
    pub currency_code: String,
    pub subject_id: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Scheduled class session within a course
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Class {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub is_published: bool,
    pub scheduled_start_time: DateTime<Utc>,
    pub scheduled_end_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Record of a student enrolling in a course
///
/// Price and currency are snapshotted at enrollment time so later catalog
/// changes never alter what a student owes or paid.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct StudentEnrollment {
    pub id: i64,
    pub student_user_id: Option<i64>,
    pub course_id: i64,
    pub enrollment_date: DateTime<Utc>,
    pub last_accessed: Option<DateTime<Utc>>,
    pub progress: i32,
    pub completed_date: Option<DateTime<Utc>>,
    pub price_at_enrollment: i64,
    pub currency_at_enrollment: String,
}

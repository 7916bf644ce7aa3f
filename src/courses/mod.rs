/// Course catalog management
///
/// Courses optionally owned by a teacher, priced in a single supported
/// currency, plus the scheduled class sessions inside each course.

mod manager;

pub use manager::CourseManager;

use crate::db::models::SUPPORTED_CURRENCY;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// New course payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCourse {
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
}

impl Default for NewCourse {
    fn default() -> Self {
        Self {
            teacher_user_id: None,
            title: String::new(),
            category: None,
            description: None,
            image_url: None,
            price: 0,
            currency_code: SUPPORTED_CURRENCY.to_string(),
            subject_id: None,
            is_published: false,
        }
    }
}

/// Partial course update; `None` fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCourse {
    pub teacher_user_id: Option<i64>,
    pub title: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price: Option<i64>,
    pub currency_code: Option<String>,
    pub subject_id: Option<String>,
    pub is_published: Option<bool>,
}

/// New class session payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewClass {
    pub course_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub is_published: bool,
    pub scheduled_start_time: DateTime<Utc>,
    pub scheduled_end_time: DateTime<Utc>,
}

/// Partial class update; `None` fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateClass {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_published: Option<bool>,
    pub scheduled_start_time: Option<DateTime<Utc>>,
    pub scheduled_end_time: Option<DateTime<Utc>>,
}

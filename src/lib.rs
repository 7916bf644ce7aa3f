/// WaiEdu data integrity layer
///
/// A thin rule-enforcement layer between the WaiEdu application and its
/// SQLite store: role-validated writes, price/currency domain checks,
/// last-modified propagation from subject associations to their owning
/// user, clean-slate schema provisioning, and reference-data seeding.

pub mod config;
pub mod courses;
pub mod db;
pub mod enrollments;
pub mod error;
pub mod roles;
pub mod users;

pub use config::StoreConfig;
pub use courses::CourseManager;
pub use db::models;
pub use db::schema::initialize_schema;
pub use db::seed::seed_subjects;
pub use db::{create_pool, DatabaseOptions};
pub use enrollments::EnrollmentManager;
pub use error::{DataError, DataResult};
pub use roles::has_role;
pub use users::UserManager;

/// Student enrollment management
///
/// Tracks which students enrolled in which courses, their progress, and the
/// price snapshot taken at enrollment time.

mod manager;

pub use manager::EnrollmentManager;

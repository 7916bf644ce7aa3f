/// Reference data seeding for the WaiEdu store
use crate::error::{DataError, DataResult};
use sqlx::SqlitePool;
use tracing::info;

/// The curated subject catalog: (stable identifier, display name).
pub const SEEDED_SUBJECTS: &[(&str, &str)] = &[
    ("physics", "Physics"),
    ("chemistry", "Chemistry"),
    ("biology", "Biology"),
    ("math", "Mathematics"),
    ("literature", "Literature"),
    ("english", "English"),
    ("history", "History"),
    ("geography", "Geography"),
];

/// Upsert the subject catalog: insert missing identifiers, refresh display
/// names on the rest. Safe to run on every startup; rows referencing a
/// subject are never touched.
pub async fn seed_subjects(pool: &SqlitePool) -> DataResult<()> {
    for &(id, name) in SEEDED_SUBJECTS {
        sqlx::query(
            "INSERT INTO subjects (id, name) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name",
        )
        .bind(id)
        .bind(name)
        .execute(pool)
        .await
        .map_err(DataError::Database)?;
    }

    info!("Seeded {} subjects", SEEDED_SUBJECTS.len());

    Ok(())
}

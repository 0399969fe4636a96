use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

const SCHEMA_V1: [&str; 12] = [
    r"
        CREATE TABLE IF NOT EXISTS life_areas (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT,
            color TEXT NOT NULL,
            display_order INTEGER NOT NULL DEFAULT 0
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS subcategories (
            id INTEGER PRIMARY KEY,
            life_area_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            display_order INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY (life_area_id) REFERENCES life_areas(id) ON DELETE CASCADE
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS questions (
            id INTEGER PRIMARY KEY,
            subcategory_id INTEGER NOT NULL,
            text TEXT NOT NULL,
            display_order INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY (subcategory_id) REFERENCES subcategories(id) ON DELETE CASCADE
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS assessments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            status TEXT NOT NULL CHECK (status IN ('in_progress', 'completed')),
            current_step INTEGER NOT NULL DEFAULT 0 CHECK (current_step >= 0),
            started_at TEXT NOT NULL,
            completed_at TEXT
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS responses (
            assessment_id INTEGER NOT NULL,
            question_id INTEGER NOT NULL,
            score INTEGER NOT NULL CHECK (score BETWEEN 0 AND 10),
            PRIMARY KEY (assessment_id, question_id),
            FOREIGN KEY (assessment_id) REFERENCES assessments(id) ON DELETE CASCADE,
            FOREIGN KEY (question_id) REFERENCES questions(id)
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS area_results (
            assessment_id INTEGER NOT NULL,
            life_area_id INTEGER NOT NULL,
            average_score REAL NOT NULL CHECK (average_score BETWEEN 0 AND 10),
            percentage INTEGER NOT NULL CHECK (percentage BETWEEN 0 AND 100),
            PRIMARY KEY (assessment_id, life_area_id),
            FOREIGN KEY (assessment_id) REFERENCES assessments(id) ON DELETE CASCADE,
            FOREIGN KEY (life_area_id) REFERENCES life_areas(id)
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS subcategory_results (
            assessment_id INTEGER NOT NULL,
            subcategory_id INTEGER NOT NULL,
            average_score REAL NOT NULL CHECK (average_score BETWEEN 0 AND 10),
            percentage INTEGER NOT NULL CHECK (percentage BETWEEN 0 AND 100),
            PRIMARY KEY (assessment_id, subcategory_id),
            FOREIGN KEY (assessment_id) REFERENCES assessments(id) ON DELETE CASCADE,
            FOREIGN KEY (subcategory_id) REFERENCES subcategories(id)
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS action_plans (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            assessment_id INTEGER NOT NULL UNIQUE,
            focus_area_id INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY (assessment_id) REFERENCES assessments(id) ON DELETE CASCADE,
            FOREIGN KEY (focus_area_id) REFERENCES life_areas(id)
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS contribution_points (
            action_plan_id INTEGER NOT NULL,
            life_area_id INTEGER NOT NULL,
            points INTEGER NOT NULL CHECK (points BETWEEN 0 AND 100),
            PRIMARY KEY (action_plan_id, life_area_id),
            FOREIGN KEY (action_plan_id) REFERENCES action_plans(id) ON DELETE CASCADE,
            FOREIGN KEY (life_area_id) REFERENCES life_areas(id)
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS action_items (
            id INTEGER PRIMARY KEY,
            action_plan_id INTEGER NOT NULL,
            position INTEGER NOT NULL,
            action_text TEXT NOT NULL,
            strategy_text TEXT NOT NULL,
            target_date TEXT,
            status TEXT NOT NULL
                CHECK (status IN ('planned', 'in_progress', 'completed', 'cancelled')),
            FOREIGN KEY (action_plan_id) REFERENCES action_plans(id) ON DELETE CASCADE
        );
    ",
    r"
        CREATE INDEX IF NOT EXISTS idx_assessments_user_status
            ON assessments (user_id, status, completed_at);
    ",
    r"
        CREATE INDEX IF NOT EXISTS idx_action_items_plan_position
            ON action_items (action_plan_id, position);
    ",
];

/// Applies versioned schema changes recorded in `schema_migrations`.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
        ",
    )
    .execute(pool)
    .await?;

    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;
        for statement in SCHEMA_V1 {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        tracing::info!(version = 1, "applied schema migration");
    }

    Ok(())
}

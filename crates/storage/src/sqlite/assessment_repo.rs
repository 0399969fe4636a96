use chrono::{DateTime, Utc};
use sqlx::Row;
use wheel_core::model::{
    AssessmentId, AssessmentRecord, AssessmentResults, AssessmentStatus, ScoreResult,
    SubcategoryResult, UserId,
};

use super::SqliteRepository;
use super::mapping::{
    area_id_from_i64, assessment_id_from_i64, conn, id_i64, map_assessment_row,
    percentage_from_i64, question_id_from_i64, score_from_i64, ser, step_to_i64,
    subcategory_id_from_i64,
};
use crate::repository::{
    AssessmentRepository, CatalogRepository, ResponseMap, ResponseRecord, StorageError,
    score_saved_responses,
};

const ASSESSMENT_COLUMNS: &str = "id, user_id, status, current_step, started_at, completed_at";

impl SqliteRepository {
    /// Rejects writes to unknown or completed assessments.
    async fn ensure_open(&self, id: AssessmentId) -> Result<(), StorageError> {
        let record = self.get_assessment(id).await?;
        if record.is_completed() {
            return Err(StorageError::Conflict);
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl AssessmentRepository for SqliteRepository {
    async fn start_or_resume(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<AssessmentRecord, StorageError> {
        let user = id_i64("user_id", user_id.value())?;

        let open = sqlx::query(&format!(
            "SELECT {ASSESSMENT_COLUMNS} FROM assessments
             WHERE user_id = ?1 AND status = 'in_progress'
             ORDER BY id DESC LIMIT 1"
        ))
        .bind(user)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        if let Some(row) = open {
            let record = map_assessment_row(&row)?;
            tracing::debug!(assessment = %record.id(), "resuming assessment");
            return Ok(record);
        }

        let res = sqlx::query(
            r"
                INSERT INTO assessments (user_id, status, current_step, started_at)
                VALUES (?1, ?2, 0, ?3)
            ",
        )
        .bind(user)
        .bind(AssessmentStatus::InProgress.as_str())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        let id = AssessmentId::new(
            u64::try_from(res.last_insert_rowid())
                .map_err(|_| StorageError::Serialization("assessment id sign overflow".into()))?,
        );
        tracing::info!(assessment = %id, user = %user_id, "started assessment");
        Ok(AssessmentRecord::started(id, user_id, now))
    }

    async fn get_assessment(&self, id: AssessmentId) -> Result<AssessmentRecord, StorageError> {
        let row = sqlx::query(&format!(
            "SELECT {ASSESSMENT_COLUMNS} FROM assessments WHERE id = ?1"
        ))
        .bind(id_i64("assessment_id", id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        .ok_or(StorageError::NotFound)?;

        map_assessment_row(&row)
    }

    async fn fetch_responses(&self, id: AssessmentId) -> Result<ResponseMap, StorageError> {
        self.get_assessment(id).await?;

        let rows = sqlx::query(
            r"
                SELECT question_id, score
                FROM responses
                WHERE assessment_id = ?1
            ",
        )
        .bind(id_i64("assessment_id", id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter()
            .map(|row| -> Result<_, StorageError> {
                Ok((
                    question_id_from_i64(row.try_get("question_id").map_err(ser)?)?,
                    score_from_i64(row.try_get("score").map_err(ser)?)?,
                ))
            })
            .collect()
    }

    async fn fetch_prior_responses(
        &self,
        user_id: UserId,
    ) -> Result<Option<ResponseMap>, StorageError> {
        let latest = sqlx::query(
            r"
                SELECT id
                FROM assessments
                WHERE user_id = ?1 AND status = 'completed'
                ORDER BY completed_at DESC, id DESC
                LIMIT 1
            ",
        )
        .bind(id_i64("user_id", user_id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        match latest {
            Some(row) => {
                let id: i64 = row.try_get("id").map_err(ser)?;
                let id = assessment_id_from_i64(id)?;
                Ok(Some(self.fetch_responses(id).await?))
            }
            None => Ok(None),
        }
    }

    async fn save_responses(
        &self,
        id: AssessmentId,
        responses: &[ResponseRecord],
    ) -> Result<(), StorageError> {
        self.ensure_open(id).await?;
        let assessment = id_i64("assessment_id", id.value())?;

        let mut tx = self.pool.begin().await.map_err(conn)?;
        for r in responses {
            sqlx::query(
                r"
                    INSERT INTO responses (assessment_id, question_id, score)
                    VALUES (?1, ?2, ?3)
                    ON CONFLICT(assessment_id, question_id) DO UPDATE SET
                        score = excluded.score
                ",
            )
            .bind(assessment)
            .bind(id_i64("question_id", r.question_id.value())?)
            .bind(i64::from(r.score.value()))
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }
        tx.commit().await.map_err(conn)?;
        Ok(())
    }

    async fn set_current_step(&self, id: AssessmentId, step: usize) -> Result<(), StorageError> {
        self.ensure_open(id).await?;
        sqlx::query("UPDATE assessments SET current_step = ?2 WHERE id = ?1")
            .bind(id_i64("assessment_id", id.value())?)
            .bind(step_to_i64(step)?)
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(())
    }

    async fn finalize_assessment(
        &self,
        id: AssessmentId,
        completed_at: DateTime<Utc>,
    ) -> Result<AssessmentResults, StorageError> {
        let mut record = self.get_assessment(id).await?;
        if record.is_completed() {
            return self.get_results(id).await;
        }
        record.complete(completed_at).map_err(ser)?;

        let catalog = self.fetch_catalog().await?;
        let saved = self.fetch_responses(id).await?;
        let results = score_saved_responses(&catalog, &saved);
        let assessment = id_i64("assessment_id", id.value())?;

        let mut tx = self.pool.begin().await.map_err(conn)?;
        for area in &results.area_results {
            sqlx::query(
                r"
                    INSERT INTO area_results (assessment_id, life_area_id, average_score, percentage)
                    VALUES (?1, ?2, ?3, ?4)
                ",
            )
            .bind(assessment)
            .bind(id_i64("life_area_id", area.id.value())?)
            .bind(area.average_score)
            .bind(i64::from(area.percentage))
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }
        for sub in &results.subcategory_results {
            sqlx::query(
                r"
                    INSERT INTO subcategory_results
                        (assessment_id, subcategory_id, average_score, percentage)
                    VALUES (?1, ?2, ?3, ?4)
                ",
            )
            .bind(assessment)
            .bind(id_i64("subcategory_id", sub.result.id.value())?)
            .bind(sub.result.average_score)
            .bind(i64::from(sub.result.percentage))
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }
        sqlx::query(
            r"
                UPDATE assessments
                SET status = ?2, completed_at = ?3
                WHERE id = ?1
            ",
        )
        .bind(assessment)
        .bind(AssessmentStatus::Completed.as_str())
        .bind(completed_at)
        .execute(&mut *tx)
        .await
        .map_err(conn)?;
        tx.commit().await.map_err(conn)?;

        tracing::info!(assessment = %id, "assessment finalized");
        Ok(results)
    }

    async fn get_results(&self, id: AssessmentId) -> Result<AssessmentResults, StorageError> {
        if !self.get_assessment(id).await?.is_completed() {
            return Err(StorageError::NotFound);
        }
        let assessment = id_i64("assessment_id", id.value())?;

        let area_rows = sqlx::query(
            r"
                SELECT ar.life_area_id, la.name, la.color, ar.average_score, ar.percentage
                FROM area_results ar
                JOIN life_areas la ON la.id = ar.life_area_id
                WHERE ar.assessment_id = ?1
                ORDER BY la.display_order, la.id
            ",
        )
        .bind(assessment)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let area_results = area_rows
            .iter()
            .map(|row| -> Result<_, StorageError> {
                Ok(ScoreResult {
                    id: area_id_from_i64(row.try_get("life_area_id").map_err(ser)?)?,
                    name: row.try_get("name").map_err(ser)?,
                    color: row.try_get("color").map_err(ser)?,
                    average_score: row.try_get("average_score").map_err(ser)?,
                    percentage: percentage_from_i64(row.try_get("percentage").map_err(ser)?)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let sub_rows = sqlx::query(
            r"
                SELECT sr.subcategory_id, s.life_area_id, s.name, la.color,
                       sr.average_score, sr.percentage
                FROM subcategory_results sr
                JOIN subcategories s ON s.id = sr.subcategory_id
                JOIN life_areas la ON la.id = s.life_area_id
                WHERE sr.assessment_id = ?1
                ORDER BY la.display_order, la.id, s.display_order, s.id
            ",
        )
        .bind(assessment)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let subcategory_results = sub_rows
            .iter()
            .map(|row| -> Result<_, StorageError> {
                Ok(SubcategoryResult {
                    life_area_id: area_id_from_i64(row.try_get("life_area_id").map_err(ser)?)?,
                    result: ScoreResult {
                        id: subcategory_id_from_i64(row.try_get("subcategory_id").map_err(ser)?)?,
                        name: row.try_get("name").map_err(ser)?,
                        color: row.try_get("color").map_err(ser)?,
                        average_score: row.try_get("average_score").map_err(ser)?,
                        percentage: percentage_from_i64(row.try_get("percentage").map_err(ser)?)?,
                    },
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(AssessmentResults {
            area_results,
            subcategory_results,
        })
    }

    async fn list_completed(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<AssessmentRecord>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {ASSESSMENT_COLUMNS} FROM assessments
             WHERE user_id = ?1 AND status = 'completed'
             ORDER BY completed_at DESC, id DESC
             LIMIT ?2"
        ))
        .bind(id_i64("user_id", user_id.value())?)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_assessment_row).collect()
    }
}

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::Row;
use wheel_core::model::{
    ActionItem, ActionPlan, ActionPlanDraft, ActionStatus, AssessmentId, ContributionAllocation,
};

use super::SqliteRepository;
use super::mapping::{area_id_from_i64, conflict_or_conn, conn, id_i64, plan_id_from_i64, ser};
use crate::repository::{ActionPlanRepository, AssessmentRepository, StorageError};

#[async_trait::async_trait]
impl ActionPlanRepository for SqliteRepository {
    async fn submit_contribution_plan(
        &self,
        assessment_id: AssessmentId,
        draft: &ActionPlanDraft,
        created_at: DateTime<Utc>,
    ) -> Result<ActionPlan, StorageError> {
        self.get_assessment(assessment_id).await?;
        let assessment = id_i64("assessment_id", assessment_id.value())?;

        let mut tx = self.pool.begin().await.map_err(conn)?;

        let res = sqlx::query(
            r"
                INSERT INTO action_plans (assessment_id, focus_area_id, created_at)
                VALUES (?1, ?2, ?3)
            ",
        )
        .bind(assessment)
        .bind(id_i64("focus_area_id", draft.focus_area_id.value())?)
        .bind(created_at)
        .execute(&mut *tx)
        .await
        .map_err(conflict_or_conn)?;
        let plan_row_id = res.last_insert_rowid();

        for (area, points) in draft.allocation.iter() {
            sqlx::query(
                r"
                    INSERT INTO contribution_points (action_plan_id, life_area_id, points)
                    VALUES (?1, ?2, ?3)
                ",
            )
            .bind(plan_row_id)
            .bind(id_i64("life_area_id", area.value())?)
            .bind(i64::from(points))
            .execute(&mut *tx)
            .await
            .map_err(conflict_or_conn)?;
        }

        for (position, item) in (0_i64..).zip(&draft.actions) {
            sqlx::query(
                r"
                    INSERT INTO action_items
                        (action_plan_id, position, action_text, strategy_text, target_date, status)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ",
            )
            .bind(plan_row_id)
            .bind(position)
            .bind(item.action_text())
            .bind(item.strategy_text())
            .bind(item.target_date())
            .bind(item.status().as_str())
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)?;
        tracing::info!(assessment = %assessment_id, "action plan stored");

        Ok(ActionPlan::from_draft(
            plan_id_from_i64(plan_row_id)?,
            assessment_id,
            draft.clone(),
            created_at,
        ))
    }

    async fn get_action_plan(
        &self,
        assessment_id: AssessmentId,
    ) -> Result<Option<ActionPlan>, StorageError> {
        let Some(plan_row) = sqlx::query(
            r"
                SELECT id, focus_area_id, created_at
                FROM action_plans
                WHERE assessment_id = ?1
            ",
        )
        .bind(id_i64("assessment_id", assessment_id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        else {
            return Ok(None);
        };

        let plan_row_id: i64 = plan_row.try_get("id").map_err(ser)?;

        let point_rows = sqlx::query(
            r"
                SELECT life_area_id, points
                FROM contribution_points
                WHERE action_plan_id = ?1
            ",
        )
        .bind(plan_row_id)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut points = Vec::with_capacity(point_rows.len());
        for row in &point_rows {
            let value: i64 = row.try_get("points").map_err(ser)?;
            points.push((
                area_id_from_i64(row.try_get("life_area_id").map_err(ser)?)?,
                u32::try_from(value).map_err(ser)?,
            ));
        }
        let allocation = ContributionAllocation::from_persisted(points).map_err(ser)?;

        let item_rows = sqlx::query(
            r"
                SELECT action_text, strategy_text, target_date, status
                FROM action_items
                WHERE action_plan_id = ?1
                ORDER BY position
            ",
        )
        .bind(plan_row_id)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut actions = Vec::with_capacity(item_rows.len());
        for row in &item_rows {
            let status: String = row.try_get("status").map_err(ser)?;
            let item = ActionItem::new(
                row.try_get::<String, _>("action_text").map_err(ser)?,
                row.try_get::<String, _>("strategy_text").map_err(ser)?,
                row.try_get::<Option<NaiveDate>, _>("target_date")
                    .map_err(ser)?,
            )
            .map_err(ser)?
            .with_status(ActionStatus::parse(&status).map_err(ser)?);
            actions.push(item);
        }

        Ok(Some(ActionPlan {
            id: plan_id_from_i64(plan_row_id)?,
            assessment_id,
            focus_area_id: area_id_from_i64(plan_row.try_get("focus_area_id").map_err(ser)?)?,
            allocation,
            actions,
            created_at: plan_row.try_get("created_at").map_err(ser)?,
        }))
    }
}

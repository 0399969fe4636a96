use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use wheel_core::model::{
    ActionPlanId, AssessmentId, AssessmentRecord, AssessmentStatus, LifeAreaId, QuestionId, Score,
    SubcategoryId, UserId,
};

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

/// Unique-constraint violations become `Conflict`; anything else is a connection error.
pub(crate) fn conflict_or_conn(e: sqlx::Error) -> StorageError {
    match e.as_database_error() {
        Some(db) if db.is_unique_violation() => StorageError::Conflict,
        _ => conn(e),
    }
}

pub(crate) fn id_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn area_id_from_i64(v: i64) -> Result<LifeAreaId, StorageError> {
    Ok(LifeAreaId::new(i64_to_u64("life_area_id", v)?))
}

pub(crate) fn subcategory_id_from_i64(v: i64) -> Result<SubcategoryId, StorageError> {
    Ok(SubcategoryId::new(i64_to_u64("subcategory_id", v)?))
}

pub(crate) fn question_id_from_i64(v: i64) -> Result<QuestionId, StorageError> {
    Ok(QuestionId::new(i64_to_u64("question_id", v)?))
}

pub(crate) fn assessment_id_from_i64(v: i64) -> Result<AssessmentId, StorageError> {
    Ok(AssessmentId::new(i64_to_u64("assessment_id", v)?))
}

pub(crate) fn plan_id_from_i64(v: i64) -> Result<ActionPlanId, StorageError> {
    Ok(ActionPlanId::new(i64_to_u64("action_plan_id", v)?))
}

pub(crate) fn step_to_i64(step: usize) -> Result<i64, StorageError> {
    i64::try_from(step).map_err(|_| StorageError::Serialization("current_step overflow".into()))
}

pub(crate) fn score_from_i64(v: i64) -> Result<Score, StorageError> {
    Score::try_from(v).map_err(ser)
}

pub(crate) fn percentage_from_i64(v: i64) -> Result<u8, StorageError> {
    u8::try_from(v)
        .ok()
        .filter(|p| *p <= 100)
        .ok_or_else(|| StorageError::Serialization(format!("invalid percentage: {v}")))
}

pub(crate) fn map_assessment_row(row: &SqliteRow) -> Result<AssessmentRecord, StorageError> {
    let status: String = row.try_get("status").map_err(ser)?;
    let status = AssessmentStatus::parse(&status).map_err(ser)?;
    let step: i64 = row.try_get("current_step").map_err(ser)?;
    let step = usize::try_from(step)
        .map_err(|_| StorageError::Serialization(format!("invalid current_step: {step}")))?;

    AssessmentRecord::from_persisted(
        assessment_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        UserId::new(i64_to_u64(
            "user_id",
            row.try_get::<i64, _>("user_id").map_err(ser)?,
        )?),
        status,
        step,
        row.try_get("started_at").map_err(ser)?,
        row.try_get("completed_at").map_err(ser)?,
    )
    .map_err(ser)
}

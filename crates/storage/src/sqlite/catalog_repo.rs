use std::collections::HashMap;

use sqlx::Row;
use wheel_core::model::{Catalog, LifeArea, LifeAreaId, Question, Subcategory, SubcategoryId};

use super::SqliteRepository;
use super::mapping::{
    area_id_from_i64, conn, id_i64, question_id_from_i64, ser, subcategory_id_from_i64,
};
use crate::repository::{CatalogRepository, StorageError};

fn order_i64(index: usize) -> Result<i64, StorageError> {
    i64::try_from(index).map_err(|_| StorageError::Serialization("display_order overflow".into()))
}

#[async_trait::async_trait]
impl CatalogRepository for SqliteRepository {
    async fn upsert_catalog(&self, catalog: &Catalog) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        for area in catalog.areas() {
            sqlx::query(
                r"
                    INSERT INTO life_areas (id, name, description, color, display_order)
                    VALUES (?1, ?2, ?3, ?4, ?5)
                    ON CONFLICT(id) DO UPDATE SET
                        name = excluded.name,
                        description = excluded.description,
                        color = excluded.color,
                        display_order = excluded.display_order
                ",
            )
            .bind(id_i64("life_area_id", area.id.value())?)
            .bind(&area.name)
            .bind(area.description.as_deref())
            .bind(&area.color)
            .bind(i64::from(area.display_order))
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

            for (sub_order, sub) in area.subcategories.iter().enumerate() {
                sqlx::query(
                    r"
                        INSERT INTO subcategories (id, life_area_id, name, display_order)
                        VALUES (?1, ?2, ?3, ?4)
                        ON CONFLICT(id) DO UPDATE SET
                            life_area_id = excluded.life_area_id,
                            name = excluded.name,
                            display_order = excluded.display_order
                    ",
                )
                .bind(id_i64("subcategory_id", sub.id.value())?)
                .bind(id_i64("life_area_id", area.id.value())?)
                .bind(&sub.name)
                .bind(order_i64(sub_order)?)
                .execute(&mut *tx)
                .await
                .map_err(conn)?;

                for (q_order, question) in sub.questions.iter().enumerate() {
                    sqlx::query(
                        r"
                            INSERT INTO questions (id, subcategory_id, text, display_order)
                            VALUES (?1, ?2, ?3, ?4)
                            ON CONFLICT(id) DO UPDATE SET
                                subcategory_id = excluded.subcategory_id,
                                text = excluded.text,
                                display_order = excluded.display_order
                        ",
                    )
                    .bind(id_i64("question_id", question.id.value())?)
                    .bind(id_i64("subcategory_id", sub.id.value())?)
                    .bind(&question.text)
                    .bind(order_i64(q_order)?)
                    .execute(&mut *tx)
                    .await
                    .map_err(conn)?;
                }
            }
        }

        tx.commit().await.map_err(conn)?;
        tracing::info!(areas = catalog.step_count(), "catalog stored");
        Ok(())
    }

    async fn fetch_catalog(&self) -> Result<Catalog, StorageError> {
        let question_rows = sqlx::query(
            r"
                SELECT id, subcategory_id, text
                FROM questions
                ORDER BY subcategory_id, display_order, id
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut questions: HashMap<SubcategoryId, Vec<Question>> = HashMap::new();
        for row in &question_rows {
            let sub_id = subcategory_id_from_i64(row.try_get("subcategory_id").map_err(ser)?)?;
            questions.entry(sub_id).or_default().push(Question::new(
                question_id_from_i64(row.try_get("id").map_err(ser)?)?,
                sub_id,
                row.try_get::<String, _>("text").map_err(ser)?,
            ));
        }

        let sub_rows = sqlx::query(
            r"
                SELECT id, life_area_id, name
                FROM subcategories
                ORDER BY life_area_id, display_order, id
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut subcategories: HashMap<LifeAreaId, Vec<Subcategory>> = HashMap::new();
        for row in &sub_rows {
            let id = subcategory_id_from_i64(row.try_get("id").map_err(ser)?)?;
            let area_id = area_id_from_i64(row.try_get("life_area_id").map_err(ser)?)?;
            subcategories.entry(area_id).or_default().push(Subcategory::new(
                id,
                area_id,
                row.try_get::<String, _>("name").map_err(ser)?,
                questions.remove(&id).unwrap_or_default(),
            ));
        }

        let area_rows = sqlx::query(
            r"
                SELECT id, name, description, color, display_order
                FROM life_areas
                ORDER BY display_order, id
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        if area_rows.is_empty() {
            return Err(StorageError::NotFound);
        }

        let mut areas = Vec::with_capacity(area_rows.len());
        for row in &area_rows {
            let id = area_id_from_i64(row.try_get("id").map_err(ser)?)?;
            let order: i64 = row.try_get("display_order").map_err(ser)?;
            let mut area = LifeArea::new(
                id,
                row.try_get::<String, _>("name").map_err(ser)?,
                row.try_get::<String, _>("color").map_err(ser)?,
                subcategories.remove(&id).unwrap_or_default(),
            )
            .with_display_order(u32::try_from(order).map_err(ser)?);
            area.description = row.try_get("description").map_err(ser)?;
            areas.push(area);
        }

        Catalog::new(areas).map_err(ser)
    }
}

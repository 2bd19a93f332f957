use async_trait::async_trait;
use chrono::Utc;
use lab_core::model::{AiEvaluation, LabId, LabResult, ProgressRecord};
use sqlx::{Row, Sqlite, Transaction};

use super::SqliteRepository;
use super::mapping::{PROGRESS_KEY, conn, ser};
use crate::document::{decode_progress, encode_progress};
use crate::repository::{ProgressRepository, StorageError};

async fn read_document(tx: &mut Transaction<'_, Sqlite>) -> Result<ProgressRecord, StorageError> {
    let row = sqlx::query("SELECT body FROM progress_documents WHERE key = ?1")
        .bind(PROGRESS_KEY)
        .fetch_optional(&mut **tx)
        .await
        .map_err(conn)?;

    match row {
        Some(row) => {
            let body: String = row.try_get("body").map_err(ser)?;
            Ok(decode_progress(&body))
        }
        None => Ok(ProgressRecord::default()),
    }
}

async fn write_document(
    tx: &mut Transaction<'_, Sqlite>,
    record: &ProgressRecord,
) -> Result<(), StorageError> {
    let body = encode_progress(record)?;
    sqlx::query(
        r"
        INSERT INTO progress_documents (key, body, updated_at)
        VALUES (?1, ?2, ?3)
        ON CONFLICT(key) DO UPDATE SET
            body = excluded.body,
            updated_at = excluded.updated_at
        ",
    )
    .bind(PROGRESS_KEY)
    .bind(body)
    .bind(Utc::now())
    .execute(&mut **tx)
    .await
    .map_err(conn)?;
    Ok(())
}

impl SqliteRepository {
    async fn update_document<T: Send>(
        &self,
        apply: impl FnOnce(&mut ProgressRecord) -> T + Send,
    ) -> Result<(ProgressRecord, T), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;
        let mut record = read_document(&mut tx).await?;
        let outcome = apply(&mut record);
        write_document(&mut tx, &record).await?;
        tx.commit().await.map_err(conn)?;
        Ok((record, outcome))
    }
}

#[async_trait]
impl ProgressRepository for SqliteRepository {
    async fn load(&self) -> Result<ProgressRecord, StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;
        let record = read_document(&mut tx).await?;
        tx.commit().await.map_err(conn)?;
        Ok(record)
    }

    async fn save(&self, record: &ProgressRecord) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;
        write_document(&mut tx, record).await?;
        tx.commit().await.map_err(conn)?;
        Ok(())
    }

    async fn reset(&self) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM progress_documents WHERE key = ?1")
            .bind(PROGRESS_KEY)
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(())
    }

    async fn record_result(
        &self,
        lab_id: LabId,
        result: LabResult,
    ) -> Result<ProgressRecord, StorageError> {
        let (record, ()) = self
            .update_document(|record| record.record(lab_id, result))
            .await?;
        Ok(record)
    }

    async fn attach_evaluation(
        &self,
        lab_id: LabId,
        evaluation: AiEvaluation,
    ) -> Result<bool, StorageError> {
        let (_, attached) = self
            .update_document(|record| record.attach_evaluation(lab_id, evaluation))
            .await?;
        Ok(attached)
    }
}

use async_trait::async_trait;

use crate::repository::{AppSettingsRepository, StorageError};
use lab_core::model::AppSettings;

use super::SqliteRepository;
use super::mapping::{conn, map_settings_row};

#[async_trait]
impl AppSettingsRepository for SqliteRepository {
    async fn get_settings(&self) -> Result<Option<AppSettings>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT api_key, text_model, image_model, base_url
            FROM app_settings
            WHERE id = 1
            ",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_settings_row).transpose()
    }

    async fn save_settings(&self, settings: &AppSettings) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO app_settings (id, api_key, text_model, image_model, base_url)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                api_key = excluded.api_key,
                text_model = excluded.text_model,
                image_model = excluded.image_model,
                base_url = excluded.base_url
            ",
        )
        .bind(1_i64)
        .bind(settings.api_key())
        .bind(settings.text_model())
        .bind(settings.image_model())
        .bind(settings.base_url())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }
}

use crate::entities::system_setting_entity as settings;
use crate::error::AppResult;
use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use std::collections::HashMap;

/// system_settings 键值读取
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// 返回给定键中存在且值非 NULL 的配置
    async fn find_values(&self, keys: &[&str]) -> AppResult<HashMap<String, String>>;
}

#[derive(Clone)]
pub struct SeaOrmSettingsRepository {
    pool: DatabaseConnection,
}

impl SeaOrmSettingsRepository {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsRepository for SeaOrmSettingsRepository {
    async fn find_values(&self, keys: &[&str]) -> AppResult<HashMap<String, String>> {
        let rows = settings::Entity::find()
            .filter(settings::Column::Key.is_in(keys.iter().copied()))
            .all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| row.value.map(|value| (row.key, value)))
            .collect())
    }
}

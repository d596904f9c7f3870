//! Company settings repository
//!
//! Settings are a free-form key/value document. Values are stored as JSON
//! text so that numbers, booleans and nested objects survive a round trip.

use common::error::{DatabaseError, DatabaseResult};
use serde_json::{Map, Value};
use sqlx::{Row, SqlitePool};

/// Settings repository
#[derive(Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    /// Create a new settings repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// The whole settings document
    pub async fn get_all(&self) -> DatabaseResult<Map<String, Value>> {
        let rows = sqlx::query("SELECT key, value FROM settings ORDER BY key")
            .fetch_all(&self.pool)
            .await?;

        let mut settings = Map::new();
        for row in rows {
            let key: String = row.try_get("key")?;
            let raw: String = row.try_get("value")?;
            let value = serde_json::from_str(&raw)
                .map_err(|e| DatabaseError::Decode(format!("setting {}: {}", key, e)))?;
            settings.insert(key, value);
        }

        Ok(settings)
    }

    /// Upsert every key of `patch`; keys not mentioned are left untouched
    pub async fn merge(&self, patch: &Map<String, Value>) -> DatabaseResult<()> {
        let mut tx = self.pool.begin().await?;

        for (key, value) in patch {
            sqlx::query(
                r#"
                INSERT INTO settings (key, value) VALUES (?, ?)
                ON CONFLICT(key) DO UPDATE SET value = excluded.value
                "#,
            )
            .bind(key)
            .bind(value.to_string())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;
    use serde_json::json;

    #[tokio::test]
    async fn test_merge_keeps_untouched_keys() {
        let settings = SettingsRepository::new(test_support::pool().await);
        assert!(settings.get_all().await.unwrap().is_empty());

        let first = json!({"company_name": "Acme", "work_days": 5});
        settings.merge(first.as_object().unwrap()).await.unwrap();

        let second = json!({"company_name": "Acme Corp", "remote": true});
        settings.merge(second.as_object().unwrap()).await.unwrap();

        let stored = Value::Object(settings.get_all().await.unwrap());
        assert_eq!(
            stored,
            json!({"company_name": "Acme Corp", "work_days": 5, "remote": true})
        );
    }
}

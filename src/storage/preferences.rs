use anyhow::Result;
use futures::future::BoxFuture;

use super::schema::Database;

/// Durable single-value-per-key preference storage.
///
/// Infallible by contract: when the backing store is unavailable `get`
/// returns `None` and `set` does nothing. A completed `set` is visible to the
/// next `get` of the same key.
pub trait PreferenceStore: Send + Sync {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Option<String>>;
    fn set<'a>(&'a self, key: &'a str, value: &'a str) -> BoxFuture<'a, ()>;
}

impl Database {
    // ========================================================================
    // User Preferences Operations
    // ========================================================================

    /// Get a single preference value by key, or `None` if not set.
    pub async fn get_preference(&self, key: &str) -> Result<Option<String>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT value FROM user_preferences WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(value,)| value))
    }

    /// Set a preference value (UPSERT).
    pub async fn set_preference(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_preferences (key, value, updated_at)
            VALUES (?, ?, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
        "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

impl PreferenceStore for Database {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Option<String>> {
        Box::pin(async move {
            match self.get_preference(key).await {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(key, error = %e, "Preference read failed, treating as unset");
                    None
                }
            }
        })
    }

    fn set<'a>(&'a self, key: &'a str, value: &'a str) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            if let Err(e) = self.set_preference(key, value).await {
                tracing::warn!(key, error = %e, "Preference write failed, value not persisted");
            }
        })
    }
}

/// Stand-in used when the preference database cannot be opened.
pub struct Unavailable;

impl PreferenceStore for Unavailable {
    fn get<'a>(&'a self, _key: &'a str) -> BoxFuture<'a, Option<String>> {
        Box::pin(async { None })
    }

    fn set<'a>(&'a self, key: &'a str, _value: &'a str) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            tracing::debug!(key, "Preference storage unavailable, skipping write");
        })
    }
}

// src/storage/sqlite.rs
// SQLite-backed interaction store

use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

use super::{group_conversations, ChatInteraction, InteractionStats, InteractionStore, NewInteraction};
use crate::error::Result;

const SELECT_COLUMNS: &str = "SELECT id, session_id, timestamp, user_message, bot_response, \
     response_time, category, tokens_used, error_occurred, rating FROM chat_interactions";

pub struct SqliteInteractionStore {
    pool: SqlitePool,
}

impl SqliteInteractionStore {
    /// Open (creating if missing) the database at `database_url` and ensure the schema
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        if let Some(parent) = options.get_filename().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await?;

        info!("Connected to interaction database {}", database_url);
        Self::new(pool).await
    }

    /// Wrap an existing pool; creates the table when absent
    pub async fn new(pool: SqlitePool) -> Result<Self> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS chat_interactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                user_message TEXT NOT NULL,
                bot_response TEXT NOT NULL,
                response_time REAL NOT NULL DEFAULT 0,
                category TEXT NOT NULL DEFAULT 'ostatni',
                tokens_used INTEGER NOT NULL DEFAULT 0,
                error_occurred INTEGER NOT NULL DEFAULT 0,
                rating INTEGER
            )
            "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_chat_interactions_session ON chat_interactions(session_id)",
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn row_to_interaction(row: &SqliteRow) -> ChatInteraction {
        let timestamp: DateTime<Utc> = row.get("timestamp");
        ChatInteraction {
            id: row.get("id"),
            session_id: row.get("session_id"),
            timestamp,
            user_message: row.get("user_message"),
            bot_response: row.get("bot_response"),
            response_time: row.get("response_time"),
            category: row.get("category"),
            tokens_used: row.get("tokens_used"),
            error_occurred: row.get::<i64, _>("error_occurred") != 0,
            rating: row.get("rating"),
        }
    }
}

#[async_trait]
impl InteractionStore for SqliteInteractionStore {
    async fn save(&self, interaction: &NewInteraction) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO chat_interactions
                (session_id, timestamp, user_message, bot_response, response_time,
                 category, tokens_used, error_occurred)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&interaction.session_id)
        .bind(interaction.timestamp)
        .bind(&interaction.user_message)
        .bind(&interaction.bot_response)
        .bind(interaction.response_time)
        .bind(&interaction.category)
        .bind(interaction.tokens_used)
        .bind(interaction.error_occurred as i64)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!("Saved interaction {} for session {}", id, interaction.session_id);
        Ok(id)
    }

    async fn rate(&self, id: i64, rating: i64) -> Result<bool> {
        let result = sqlx::query("UPDATE chat_interactions SET rating = ? WHERE id = ?")
            .bind(rating)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get(&self, id: i64) -> Result<Option<ChatInteraction>> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(Self::row_to_interaction))
    }

    async fn stats(&self, limit: usize) -> Result<InteractionStats> {
        let totals = sqlx::query(
            r#"
            SELECT COUNT(*) AS total,
                   COALESCE(AVG(response_time), 0.0) AS avg_time,
                   COALESCE(SUM(error_occurred), 0) AS errors
            FROM chat_interactions
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        let total: i64 = totals.get("total");
        let average: f64 = totals.get("avg_time");
        let errors: i64 = totals.get("errors");

        let category_rows = sqlx::query(
            "SELECT category, COUNT(*) AS n FROM chat_interactions GROUP BY category",
        )
        .fetch_all(&self.pool)
        .await?;
        let distribution: BTreeMap<String, i64> = category_rows
            .iter()
            .map(|row| (row.get::<String, _>("category"), row.get::<i64, _>("n")))
            .collect();

        let recent_rows = sqlx::query(&format!("{} ORDER BY id DESC LIMIT ?", SELECT_COLUMNS))
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;
        let recent: Vec<ChatInteraction> = recent_rows.iter().map(Self::row_to_interaction).collect();

        Ok(InteractionStats::new(
            total,
            average,
            errors,
            distribution,
            group_conversations(recent),
        ))
    }

    async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM chat_interactions")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("total"))
    }
}

// src/storage/memory.rs
// In-process interaction store, used by tests and ephemeral runs

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{group_conversations, ChatInteraction, InteractionStats, InteractionStore, NewInteraction};
use crate::error::Result;

#[derive(Default)]
pub struct MemoryInteractionStore {
    rows: RwLock<Vec<ChatInteraction>>,
}

impl MemoryInteractionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every row in insertion order
    pub async fn all(&self) -> Vec<ChatInteraction> {
        self.rows.read().await.clone()
    }
}

#[async_trait]
impl InteractionStore for MemoryInteractionStore {
    async fn save(&self, interaction: &NewInteraction) -> Result<i64> {
        let mut rows = self.rows.write().await;
        let id = rows.last().map(|r| r.id + 1).unwrap_or(1);
        rows.push(ChatInteraction::from_new(id, interaction));
        Ok(id)
    }

    async fn rate(&self, id: i64, rating: i64) -> Result<bool> {
        let mut rows = self.rows.write().await;
        match rows.iter_mut().find(|r| r.id == id) {
            Some(row) => {
                row.rating = Some(rating);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn get(&self, id: i64) -> Result<Option<ChatInteraction>> {
        Ok(self.rows.read().await.iter().find(|r| r.id == id).cloned())
    }

    async fn stats(&self, limit: usize) -> Result<InteractionStats> {
        let rows = self.rows.read().await;
        let total = rows.len() as i64;
        let average = if rows.is_empty() {
            0.0
        } else {
            rows.iter().map(|r| r.response_time).sum::<f64>() / rows.len() as f64
        };
        let errors = rows.iter().filter(|r| r.error_occurred).count() as i64;

        let mut distribution = BTreeMap::new();
        for row in rows.iter() {
            *distribution.entry(row.category.clone()).or_insert(0) += 1;
        }

        let recent: Vec<ChatInteraction> = rows.iter().rev().take(limit).cloned().collect();
        Ok(InteractionStats::new(
            total,
            average,
            errors,
            distribution,
            group_conversations(recent),
        ))
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.rows.read().await.len() as i64)
    }
}

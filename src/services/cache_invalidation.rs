use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Invalidation notice sent after a successful scoring+refresh cycle, so
/// caches keyed by leaderboard pages, per-match data or per-group data can
/// be dropped.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InvalidationEvent {
    MatchScored {
        match_id: Uuid,
        user_ids: Vec<Uuid>,
        group_ids: Vec<Uuid>,
        completed_at: DateTime<Utc>,
    },
    BonusQuestionSettled {
        question_id: Uuid,
        user_ids: Vec<Uuid>,
        group_ids: Vec<Uuid>,
        completed_at: DateTime<Utc>,
    },
}

/// Notifies the cache collaborator over Redis. The pipeline calls this
/// exactly once per successful cycle and not at all on failure; a Redis
/// outage is logged and swallowed so a finished cycle is never rolled back
/// over a lost notification.
#[derive(Clone)]
pub struct CacheInvalidator {
    redis_client: Option<Arc<redis::Client>>,
}

const EVENT_CHANNEL: &str = "scoring:events";

impl CacheInvalidator {
    pub fn new(redis_client: Option<Arc<redis::Client>>) -> Self {
        Self { redis_client }
    }

    pub async fn match_scored(&self, match_id: Uuid, user_ids: &[Uuid], group_ids: &[Uuid]) {
        let event = InvalidationEvent::MatchScored {
            match_id,
            user_ids: user_ids.to_vec(),
            group_ids: group_ids.to_vec(),
            completed_at: Utc::now(),
        };
        let mut stale_keys = vec![
            "leaderboard:users".to_string(),
            "leaderboard:groups".to_string(),
            format!("match:{}:predictions", match_id),
        ];
        stale_keys.extend(group_ids.iter().map(|id| format!("group:{}:statistics", id)));
        self.publish(&event, stale_keys).await;
    }

    pub async fn bonus_question_settled(
        &self,
        question_id: Uuid,
        user_ids: &[Uuid],
        group_ids: &[Uuid],
    ) {
        let event = InvalidationEvent::BonusQuestionSettled {
            question_id,
            user_ids: user_ids.to_vec(),
            group_ids: group_ids.to_vec(),
            completed_at: Utc::now(),
        };
        let mut stale_keys = vec![
            "leaderboard:users".to_string(),
            "leaderboard:groups".to_string(),
        ];
        stale_keys.extend(group_ids.iter().map(|id| format!("group:{}:statistics", id)));
        self.publish(&event, stale_keys).await;
    }

    async fn publish(&self, event: &InvalidationEvent, stale_keys: Vec<String>) {
        let Some(client) = &self.redis_client else {
            tracing::debug!("No Redis client configured, skipping cache invalidation");
            return;
        };

        let message = match serde_json::to_string(event) {
            Ok(message) => message,
            Err(e) => {
                tracing::error!("Failed to serialize invalidation event: {}", e);
                return;
            }
        };

        let mut conn = match client.get_async_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::error!("Failed to connect to Redis for cache invalidation: {}", e);
                return;
            }
        };

        let published: Result<i32, redis::RedisError> =
            conn.publish(EVENT_CHANNEL, &message).await;
        match published {
            Ok(receivers) => {
                tracing::info!(
                    "Published invalidation event to {} subscribers on {}",
                    receivers,
                    EVENT_CHANNEL
                );
            }
            Err(e) => {
                tracing::error!("Failed to publish invalidation event: {}", e);
            }
        }

        let dropped: Result<i32, redis::RedisError> = conn.del(stale_keys.clone()).await;
        match dropped {
            Ok(count) => {
                tracing::debug!("Dropped {} of {} cached keys", count, stale_keys.len());
            }
            Err(e) => {
                tracing::error!("Failed to drop cached keys: {}", e);
            }
        }
    }
}

use redis::{Client, RedisError, aio::ConnectionManager};

use super::{NotificationIntent, Notifier};

/// Pushes notification intents as JSON onto a Redis list for the delivery
/// workers to consume.
#[derive(Clone)]
pub struct RedisNotifier {
    connection: ConnectionManager,
    queue: String,
}

impl RedisNotifier {
    pub async fn new(redis_url: &str, queue: impl Into<String>) -> Result<Self, RedisError> {
        let client = Client::open(redis_url)?;
        let connection = ConnectionManager::new(client).await?;
        Ok(Self {
            connection,
            queue: queue.into(),
        })
    }

    /// Append one intent to the queue.
    pub async fn push(&self, intent: &NotificationIntent) -> redis::RedisResult<()> {
        let serialized = serde_json::to_string(intent).map_err(|e| {
            RedisError::from((
                redis::ErrorKind::TypeError,
                "Serialization error",
                e.to_string(),
            ))
        })?;

        let _: i64 = redis::cmd("RPUSH")
            .arg(&self.queue)
            .arg(serialized)
            .query_async(&mut self.connection.clone())
            .await?;

        Ok(())
    }
}

impl Notifier for RedisNotifier {
    fn notify(&self, intent: NotificationIntent) {
        let this = self.clone();
        tokio::spawn(async move {
            if let Err(e) = this.push(&intent).await {
                tracing::warn!(
                    error = %e,
                    user_id = %intent.user_id,
                    event = ?intent.event_type,
                    "failed to enqueue notification intent"
                );
            }
        });
    }
}

use std::collections::HashMap;
use std::convert::Infallible;

use tokio::sync::Mutex;

/// Durable per-stream cursor persistence (spec §6: "persisted state" —
/// `cursor_per_stream`). Production adapters back this with the same
/// storage as the local `Store`; the reference [`MemoryCursorStore`] does
/// not survive a restart.
pub trait CursorStore {
    type Error: std::error::Error + Send + Sync + 'static;

    fn load(
        &self,
        stream: &str,
    ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send;

    fn save(
        &self,
        stream: &str,
        cursor: Option<String>,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// The reference in-memory cursor store.
#[derive(Default)]
pub struct MemoryCursorStore {
    cursors: Mutex<HashMap<String, String>>,
}

impl MemoryCursorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CursorStore for MemoryCursorStore {
    type Error = Infallible;

    async fn load(&self, stream: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.cursors.lock().await.get(stream).cloned())
    }

    async fn save(&self, stream: &str, cursor: Option<String>) -> Result<(), Self::Error> {
        let mut cursors = self.cursors.lock().await;
        match cursor {
            Some(cursor) => {
                cursors.insert(stream.to_string(), cursor);
            }
            None => {
                cursors.remove(stream);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trips_a_saved_cursor() {
        let store = MemoryCursorStore::new();
        assert_eq!(store.load("s").await.unwrap(), None);
        store.save("s", Some("42".to_string())).await.unwrap();
        assert_eq!(store.load("s").await.unwrap(), Some("42".to_string()));
    }
}

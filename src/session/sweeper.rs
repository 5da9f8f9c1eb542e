use std::sync::Arc;
use std::time::Duration;

use super::SessionStore;

/// Periodically reap sessions older than `max_age`. Runs until the task is
/// dropped; the first sweep happens immediately at startup.
pub async fn run_sweeper(store: Arc<SessionStore>, period: Duration, max_age: chrono::Duration) {
    let mut ticker = tokio::time::interval(period);
    loop {
        ticker.tick().await;
        let removed = store.sweep(max_age);
        if removed > 0 {
            tracing::info!("Sweeper removed {} expired sessions", removed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sweeper_reaps_past_max_age() {
        let store = Arc::new(SessionStore::new(100));
        store.create(Some("doomed".to_string())).unwrap();

        // Zero max age expires everything created before the tick.
        let handle = tokio::spawn(run_sweeper(
            store.clone(),
            Duration::from_millis(10),
            chrono::Duration::zero(),
        ));

        tokio::time::sleep(Duration::from_millis(60)).await;
        handle.abort();

        assert_eq!(store.count(), 0);
    }

    #[tokio::test]
    async fn test_sweeper_keeps_fresh_sessions() {
        let store = Arc::new(SessionStore::new(100));
        store.create(Some("fresh".to_string())).unwrap();

        let handle = tokio::spawn(run_sweeper(
            store.clone(),
            Duration::from_millis(10),
            chrono::Duration::hours(1),
        ));

        tokio::time::sleep(Duration::from_millis(60)).await;
        handle.abort();

        assert!(store.contains("fresh"));
    }
}

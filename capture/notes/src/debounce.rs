//! Per-path trailing-edge debouncer for file-change bursts.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};

/// Collapses bursts of touches on the same path into one notification,
/// delivered once the path has been quiet for the whole window. Saving a note
/// fires a handful of change events back to back; only the last one matters.
pub struct Debouncer {
    window: Duration,
    generations: Arc<Mutex<HashMap<PathBuf, u64>>>,
    tx: mpsc::UnboundedSender<PathBuf>,
}

impl Debouncer {
    pub fn new(window: Duration) -> (Self, mpsc::UnboundedReceiver<PathBuf>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                window,
                generations: Arc::new(Mutex::new(HashMap::new())),
                tx,
            },
            rx,
        )
    }

    /// Registers a touch. The path is delivered after the window elapses,
    /// unless another touch restarts it first.
    pub async fn touch(&self, path: PathBuf) {
        let generation = {
            let mut generations = self.generations.lock().await;
            let entry = generations.entry(path.clone()).or_insert(0);
            *entry += 1;
            *entry
        };
        let generations = Arc::clone(&self.generations);
        let tx = self.tx.clone();
        let window = self.window;
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let current = generations.lock().await.get(&path).copied();
            // A newer touch owns the delivery now.
            if current == Some(generation) {
                let _ = tx.send(path);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn a_burst_collapses_to_one_delivery() {
        let (debouncer, mut rx) = Debouncer::new(Duration::from_millis(300));
        let path = PathBuf::from("/notes/lecture.md");
        for _ in 0..5 {
            debouncer.touch(path.clone()).await;
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        assert_eq!(rx.recv().await.unwrap(), path);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn spaced_touches_each_deliver() {
        let (debouncer, mut rx) = Debouncer::new(Duration::from_millis(300));
        let path = PathBuf::from("/notes/lecture.md");

        debouncer.touch(path.clone()).await;
        tokio::time::sleep(Duration::from_millis(500)).await;
        debouncer.touch(path.clone()).await;
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert_eq!(rx.recv().await.unwrap(), path);
        assert_eq!(rx.recv().await.unwrap(), path);
    }

    #[tokio::test(start_paused = true)]
    async fn paths_debounce_independently() {
        let (debouncer, mut rx) = Debouncer::new(Duration::from_millis(300));
        debouncer.touch(PathBuf::from("/notes/a.md")).await;
        debouncer.touch(PathBuf::from("/notes/b.md")).await;

        let mut delivered = vec![rx.recv().await.unwrap(), rx.recv().await.unwrap()];
        delivered.sort();
        assert_eq!(
            delivered,
            vec![PathBuf::from("/notes/a.md"), PathBuf::from("/notes/b.md")]
        );
    }
}

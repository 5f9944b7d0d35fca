//! Debounced search scheduling.

use std::time::Duration;

use tokio::{sync::mpsc, task::JoinHandle, time};
use tracing::debug;

/// A search query released after the quiet window, tagged with the
/// sequence number of the keystroke that scheduled it.
///
/// Sequence numbers are monotonic per debouncer. Consumers record the
/// sequence of the last result they applied and drop anything older, so a
/// slow response from an earlier request can never overwrite a newer one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Monotonic sequence number of the scheduling keystroke.
    pub seq: u64,
    /// Query text as of the final keystroke in the window.
    pub query: String,
}

/// Cancel-and-reschedule debounce timer for one search input.
///
/// Each keystroke aborts the pending timer and schedules a new one; only
/// the last keystroke within the window releases a request. At most one
/// timer is live at a time.
pub struct Debouncer {
    delay: Duration,
    seq: u64,
    pending: Option<JoinHandle<()>>,
    tx: mpsc::Sender<SearchRequest>,
}

impl Debouncer {
    /// Create a debouncer that releases requests into `tx` after `delay`
    /// of input silence.
    pub fn new(delay: Duration, tx: mpsc::Sender<SearchRequest>) -> Self {
        Self {
            delay,
            seq: 0,
            pending: None,
            tx,
        }
    }

    /// Register a keystroke: cancel any pending timer and schedule the
    /// full query text. Returns the sequence number assigned.
    pub fn submit(&mut self, query: impl Into<String>) -> u64 {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
        self.seq += 1;
        let seq = self.seq;
        let query = query.into();
        let delay = self.delay;
        let tx = self.tx.clone();
        self.pending = Some(tokio::spawn(async move {
            time::sleep(delay).await;
            if tx.send(SearchRequest { seq, query }).await.is_err() {
                debug!(seq, "search consumer dropped before request fired");
            }
        }));
        seq
    }

    /// Cancel the pending timer, if any, without scheduling a new one.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(40);

    #[tokio::test]
    async fn rapid_keystrokes_release_exactly_one_request() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut debouncer = Debouncer::new(WINDOW, tx);

        debouncer.submit("a");
        debouncer.submit("ab");
        let seq = debouncer.submit("abc");

        let request = time::timeout(WINDOW * 5, rx.recv())
            .await
            .expect("request within the window")
            .expect("sender alive");
        assert_eq!(request.query, "abc");
        assert_eq!(request.seq, seq);

        // Nothing else was released for the earlier keystrokes.
        time::sleep(WINDOW * 2).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn separated_keystrokes_each_fire() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut debouncer = Debouncer::new(WINDOW, tx);

        debouncer.submit("shoes");
        time::sleep(WINDOW * 3).await;
        debouncer.submit("shoes red");

        let first = time::timeout(WINDOW * 5, rx.recv())
            .await
            .expect("first request")
            .expect("sender alive");
        let second = time::timeout(WINDOW * 5, rx.recv())
            .await
            .expect("second request")
            .expect("sender alive");
        assert_eq!(first.query, "shoes");
        assert_eq!(second.query, "shoes red");
        assert!(second.seq > first.seq, "sequence numbers are monotonic");
    }

    #[tokio::test]
    async fn cancel_suppresses_the_pending_request() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut debouncer = Debouncer::new(WINDOW, tx);

        debouncer.submit("abandoned");
        debouncer.cancel();

        time::sleep(WINDOW * 3).await;
        assert!(rx.try_recv().is_err());
    }
}

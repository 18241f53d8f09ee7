//! Per-run crawl state.
//!
//! One [`CrawlSession`] exists per crawl: the frontier queue the workers
//! drain, the visited-set that deduplicates discovery, the accumulating
//! page results, and the pending-work counter that detects completion.
//!
//! Termination hinges on one ordering rule: the pending counter is
//! incremented *before* a link is enqueued and decremented only after the
//! dequeued link has been fully processed, re-enqueues included. The
//! worker that decrements it to zero closes the queue's write side, which
//! ends every worker's read loop once the remaining items drain.

use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::crawl::types::{Link, Page};

/// Shared state for one crawl run.
///
/// Wrapped in `Arc` and shared by every worker. All interior mutability;
/// no method takes `&mut self`.
pub struct CrawlSession {
    /// Write side of the frontier. `None` once the queue is closed.
    sender: Mutex<Option<UnboundedSender<Link>>>,
    /// Read side of the frontier, shared by the pool. Workers take turns
    /// holding the lock while waiting for the next link.
    receiver: Mutex<UnboundedReceiver<Link>>,
    /// URLs that have been accepted into the frontier at least once.
    visited: DashMap<String, ()>,
    /// Accumulated page results, unordered.
    pages: Mutex<Vec<Page>>,
    /// Links enqueued but not yet fully processed.
    pending: AtomicUsize,
}

impl CrawlSession {
    /// Creates an empty session with an open queue.
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender: Mutex::new(Some(sender)),
            receiver: Mutex::new(receiver),
            visited: DashMap::new(),
            pages: Mutex::new(Vec::new()),
            pending: AtomicUsize::new(0),
        }
    }

    /// Marks a URL as visited. Returns `false` if it already was, so the
    /// first caller wins and duplicates never enter the frontier.
    pub fn mark_visited(&self, url: &str) -> bool {
        self.visited.insert(url.to_string(), ()).is_none()
    }

    /// Removes a URL from the visited-set (timeout retry path).
    pub fn unmark_visited(&self, url: &str) {
        self.visited.remove(url);
    }

    /// Whether a URL has been accepted into the frontier before.
    #[must_use]
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains_key(url)
    }

    /// Number of distinct URLs accepted into the frontier so far.
    #[must_use]
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Adds a link to the frontier.
    ///
    /// Increments the pending counter before sending; a link is counted
    /// from the instant it is bound for the queue. Returns `false` (and
    /// rolls the counter back) if the queue is already closed.
    pub async fn enqueue(&self, link: Link) -> bool {
        self.pending.fetch_add(1, Ordering::SeqCst);

        let guard = self.sender.lock().await;
        let sent = guard
            .as_ref()
            .is_some_and(|sender| sender.send(link.clone()).is_ok());
        drop(guard);

        if sent {
            debug!(url = %link.url, depth = link.depth, retries = link.retries, "enqueued link");
        } else {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            debug!(url = %link.url, "enqueue refused, queue closed");
        }
        sent
    }

    /// Pulls the next link off the frontier. Returns `None` once the
    /// queue is closed and drained.
    pub async fn next_link(&self) -> Option<Link> {
        self.receiver.lock().await.recv().await
    }

    /// Marks one dequeued link as fully processed and returns how many
    /// are still pending. The caller that sees zero closes the queue.
    pub fn finish_link(&self) -> usize {
        self.pending.fetch_sub(1, Ordering::SeqCst) - 1
    }

    /// Links currently enqueued or being processed.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Closes the queue's write side. Workers drain what is already
    /// buffered, then their read loops end.
    pub async fn close_queue(&self) {
        let mut guard = self.sender.lock().await;
        if guard.take().is_some() {
            debug!("frontier queue closed");
        }
    }

    /// Appends a page to the result set.
    pub async fn record_page(&self, page: Page) {
        self.pages.lock().await.push(page);
    }

    /// Takes the accumulated pages out of the session.
    pub async fn take_pages(&self) -> Vec<Page> {
        std::mem::take(&mut *self.pages.lock().await)
    }
}

impl Default for CrawlSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::crawl::types::PageStatus;
    use uuid::Uuid;

    fn link(url: &str) -> Link {
        Link::new(url, "example.com", 0)
    }

    // ==================== Queue Tests ====================

    #[tokio::test]
    async fn test_session_enqueue_dequeue_fifo() {
        let session = CrawlSession::new();

        assert!(session.enqueue(link("https://example.com/a")).await);
        assert!(session.enqueue(link("https://example.com/b")).await);

        assert_eq!(
            session.next_link().await.unwrap().url,
            "https://example.com/a"
        );
        assert_eq!(
            session.next_link().await.unwrap().url,
            "https://example.com/b"
        );
    }

    #[tokio::test]
    async fn test_session_queue_drains_after_close() {
        let session = CrawlSession::new();
        session.enqueue(link("https://example.com/a")).await;
        session.close_queue().await;

        // buffered item still comes out, then the stream ends
        assert!(session.next_link().await.is_some());
        assert!(session.next_link().await.is_none());
    }

    #[tokio::test]
    async fn test_session_enqueue_after_close_refused() {
        let session = CrawlSession::new();
        session.close_queue().await;

        assert!(!session.enqueue(link("https://example.com/a")).await);
        assert_eq!(session.pending(), 0);
    }

    // ==================== Pending Counter Tests ====================

    #[tokio::test]
    async fn test_session_pending_counts_enqueues() {
        let session = CrawlSession::new();
        session.enqueue(link("https://example.com/a")).await;
        session.enqueue(link("https://example.com/b")).await;
        assert_eq!(session.pending(), 2);

        session.next_link().await;
        // still pending until the worker finishes processing it
        assert_eq!(session.pending(), 2);

        assert_eq!(session.finish_link(), 1);
        assert_eq!(session.finish_link(), 0);
    }

    // ==================== Visited-Set Tests ====================

    #[test]
    fn test_session_mark_visited_first_caller_wins() {
        let session = CrawlSession::new();

        assert!(session.mark_visited("https://example.com/a"));
        assert!(!session.mark_visited("https://example.com/a"));
        assert!(session.is_visited("https://example.com/a"));
    }

    #[test]
    fn test_session_unmark_allows_revisit() {
        let session = CrawlSession::new();

        session.mark_visited("https://example.com/a");
        session.unmark_visited("https://example.com/a");

        assert!(!session.is_visited("https://example.com/a"));
        assert!(session.mark_visited("https://example.com/a"));
    }

    // ==================== Result Set Tests ====================

    #[tokio::test]
    async fn test_session_records_and_takes_pages() {
        let session = CrawlSession::new();
        let job_id = Uuid::new_v4();

        session
            .record_page(Page::new(
                "https://example.com",
                "example.com",
                0,
                vec!["https://example.com/a".to_string()],
                PageStatus::Ok,
                job_id,
            ))
            .await;

        let pages = session.take_pages().await;
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].page_url, "https://example.com");

        assert!(session.take_pages().await.is_empty());
    }
}

//! Scroll-then-highlight for page results.
//!
//! A deadline-driven state machine: [`Highlighter::begin`] scrolls right
//! away, the mark is applied once the scroll has settled, and removed after
//! the highlight duration. Callers drive it with [`Highlighter::poll`] at or
//! after [`Highlighter::next_deadline`]. Only one highlight exists at a time.

use std::time::Duration;
use tokio::time::Instant;

use crate::core::item::ElementHandle;
use crate::platform::PageDocument;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightPhase {
    /// Scrolled, waiting for the scroll to settle
    Settling { mark_at: Instant },
    /// Marked, waiting to clear
    Marked { clear_at: Instant },
}

#[derive(Debug, Clone, Copy)]
struct ActiveHighlight {
    handle: ElementHandle,
    phase: HighlightPhase,
}

#[derive(Debug)]
pub struct Highlighter {
    scroll_settle: Duration,
    duration: Duration,
    active: Option<ActiveHighlight>,
}

impl Highlighter {
    pub fn new(scroll_settle: Duration, duration: Duration) -> Self {
        Self {
            scroll_settle,
            duration,
            active: None,
        }
    }

    /// Start highlighting `handle`, clearing any previous highlight first.
    ///
    /// Returns false (and does nothing else) if the node is gone.
    pub fn begin(&mut self, doc: &dyn PageDocument, handle: ElementHandle, now: Instant) -> bool {
        self.clear(doc);

        if !doc.is_attached(handle.node) || !doc.scroll_into_view(handle.node) {
            tracing::debug!("Skipping highlight, node {:?} is detached", handle.node);
            return false;
        }

        self.active = Some(ActiveHighlight {
            handle,
            phase: HighlightPhase::Settling {
                mark_at: now + self.scroll_settle,
            },
        });
        true
    }

    /// Advance to `now`.
    pub fn poll(&mut self, doc: &dyn PageDocument, now: Instant) {
        let Some(active) = self.active else {
            return;
        };

        match active.phase {
            HighlightPhase::Settling { mark_at } if now >= mark_at => {
                if doc.is_attached(active.handle.node) {
                    doc.set_highlighted(active.handle.node, true);
                    self.active = Some(ActiveHighlight {
                        handle: active.handle,
                        phase: HighlightPhase::Marked {
                            clear_at: mark_at + self.duration,
                        },
                    });
                    // A long stall can overshoot the whole duration.
                    self.poll(doc, now);
                } else {
                    tracing::debug!("Highlight target detached before marking");
                    self.active = None;
                }
            }
            HighlightPhase::Marked { clear_at } if now >= clear_at => {
                doc.set_highlighted(active.handle.node, false);
                self.active = None;
            }
            _ => {}
        }
    }

    /// Remove any highlight immediately.
    pub fn clear(&mut self, doc: &dyn PageDocument) {
        if let Some(active) = self.active.take() {
            if matches!(active.phase, HighlightPhase::Marked { .. }) {
                doc.set_highlighted(active.handle.node, false);
            }
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.active.map(|a| match a.phase {
            HighlightPhase::Settling { mark_at } => mark_at,
            HighlightPhase::Marked { clear_at } => clear_at,
        })
    }

    pub fn active(&self) -> Option<ElementHandle> {
        self.active.map(|a| a.handle)
    }

    pub fn phase(&self) -> Option<HighlightPhase> {
        self.active.map(|a| a.phase)
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new(Duration::from_millis(300), Duration::from_millis(3000))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::item::{NodeId, SessionId};
    use crate::services::document::{StaticDocument, StaticNode};

    fn doc() -> StaticDocument {
        StaticDocument::new("https://a.com/", "A")
            .with_node(StaticNode::text("p", "first paragraph"))
            .with_node(StaticNode::text("p", "second paragraph"))
    }

    fn handle(node: usize) -> ElementHandle {
        ElementHandle {
            session: SessionId(1),
            node: NodeId(node),
        }
    }

    #[test]
    fn test_scroll_mark_clear_sequence() {
        let doc = doc();
        let mut hl = Highlighter::default();
        let t0 = Instant::now();

        assert!(hl.begin(&doc, handle(0), t0));
        assert_eq!(doc.scrolled(), vec![NodeId(0)]);
        assert!(!doc.is_highlighted(NodeId(0)));

        hl.poll(&doc, t0 + Duration::from_millis(299));
        assert!(!doc.is_highlighted(NodeId(0)));

        hl.poll(&doc, t0 + Duration::from_millis(300));
        assert!(doc.is_highlighted(NodeId(0)));
        assert_eq!(hl.next_deadline(), Some(t0 + Duration::from_millis(3300)));

        hl.poll(&doc, t0 + Duration::from_millis(3300));
        assert!(!doc.is_highlighted(NodeId(0)));
        assert!(hl.active().is_none());
    }

    #[test]
    fn test_new_highlight_supersedes_old() {
        let doc = doc();
        let mut hl = Highlighter::default();
        let t0 = Instant::now();

        hl.begin(&doc, handle(0), t0);
        hl.poll(&doc, t0 + Duration::from_millis(400));
        assert!(doc.is_highlighted(NodeId(0)));

        hl.begin(&doc, handle(1), t0 + Duration::from_millis(500));
        assert!(!doc.is_highlighted(NodeId(0)));
        assert_eq!(hl.active(), Some(handle(1)));

        hl.poll(&doc, t0 + Duration::from_millis(800));
        assert_eq!(doc.highlighted_count(), 1);
        assert!(doc.is_highlighted(NodeId(1)));
    }

    #[test]
    fn test_detached_node_is_skipped() {
        let doc = doc();
        let mut hl = Highlighter::default();
        let t0 = Instant::now();

        doc.detach(NodeId(1));
        assert!(!hl.begin(&doc, handle(1), t0));
        assert!(doc.scrolled().is_empty());

        assert!(hl.begin(&doc, handle(0), t0));
        doc.detach(NodeId(0));
        hl.poll(&doc, t0 + Duration::from_secs(1));
        assert_eq!(doc.highlighted_count(), 0);
        assert!(hl.active().is_none());
    }

    #[test]
    fn test_late_poll_clears_in_one_step() {
        let doc = doc();
        let mut hl = Highlighter::default();
        let t0 = Instant::now();

        hl.begin(&doc, handle(0), t0);
        hl.poll(&doc, t0 + Duration::from_secs(10));
        assert!(!doc.is_highlighted(NodeId(0)));
        assert!(hl.active().is_none());
    }
}

//! List continuity tracking.
//!
//! Consecutive list items sharing one (type, indent) pair belong to one
//! visually contiguous run and must share one reference id, so the numbering
//! definitions emitted downstream restart exactly at run boundaries. Any
//! interruption discards the current run; runs are never resumed.

use ecow::{EcoString, eco_format};

use crate::ir::{ListMetadata, ListType};
use crate::markup::MarkupElement;

/// Mints document-unique list reference ids.
///
/// Owned by one extraction pass, so concurrent exports cannot observe each
/// other's counters.
#[derive(Debug, Default)]
pub struct ReferenceAllocator {
    ordered: usize,
    bullet: usize,
}

impl ReferenceAllocator {
    fn mint(&mut self, list_type: ListType) -> EcoString {
        match list_type {
            ListType::Ordered => {
                let id = self.ordered;
                self.ordered += 1;
                eco_format!("decimal-{id}")
            }
            ListType::Bullet => {
                let id = self.bullet;
                self.bullet += 1;
                eco_format!("bullet-{id}")
            }
        }
    }
}

#[derive(Debug)]
enum TrackerState {
    Idle,
    InRun {
        list_type: ListType,
        indent: usize,
        reference: EcoString,
        started: bool,
    },
}

/// State machine grouping consecutive list items into runs.
#[derive(Debug)]
pub struct ListTracker {
    state: TrackerState,
    refs: ReferenceAllocator,
}

impl Default for ListTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ListTracker {
    /// Creates a tracker in the idle state.
    pub fn new() -> Self {
        Self {
            state: TrackerState::Idle,
            refs: ReferenceAllocator::default(),
        }
    }

    /// Advances the tracker with the next list item and returns its metadata.
    ///
    /// An item matching the current run joins it without a start value; any
    /// other item closes the run and opens a fresh one whose first item
    /// carries start 1.
    pub fn advance(&mut self, list_type: ListType, indent: usize) -> ListMetadata {
        if let TrackerState::InRun {
            list_type: current_type,
            indent: current_indent,
            reference,
            started,
        } = &mut self.state
            && *current_type == list_type
            && *current_indent == indent
        {
            *started = true;
            return ListMetadata {
                list_type,
                indent,
                reference: reference.clone(),
                start: None,
            };
        }

        let reference = self.refs.mint(list_type);
        self.state = TrackerState::InRun {
            list_type,
            indent,
            reference: reference.clone(),
            started: false,
        };
        ListMetadata {
            list_type,
            indent,
            reference,
            start: Some(1),
        }
    }

    /// Closes the current run. A later list of the same shape gets a new
    /// reference id.
    pub fn flush(&mut self) {
        self.state = TrackerState::Idle;
    }
}

/// Reads the explicit list annotation of an item element.
///
/// The annotation is authoritative over nesting depth. Unrecognized type
/// values fall back to bullet and unparseable indents to 0, so corrupted
/// annotations degrade deterministically instead of propagating.
pub fn parse_annotation(element: &MarkupElement) -> (ListType, usize) {
    let list_type = match element.attr("data-list").map(EcoString::as_str) {
        Some("ordered") => ListType::Ordered,
        _ => ListType::Bullet,
    };
    let indent = element
        .attr("data-indent")
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(0);
    (list_type, indent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consecutive_items_share_a_reference() {
        let mut tracker = ListTracker::new();
        let first = tracker.advance(ListType::Ordered, 0);
        let second = tracker.advance(ListType::Ordered, 0);
        assert_eq!(first.reference, second.reference);
        assert_eq!(first.start, Some(1));
        assert_eq!(second.start, None);
    }

    #[test]
    fn indent_change_opens_a_new_run() {
        let mut tracker = ListTracker::new();
        let outer = tracker.advance(ListType::Ordered, 0);
        let inner = tracker.advance(ListType::Ordered, 1);
        assert_ne!(outer.reference, inner.reference);
        assert_eq!(inner.start, Some(1));
    }

    #[test]
    fn type_change_opens_a_new_run() {
        let mut tracker = ListTracker::new();
        let ordered = tracker.advance(ListType::Ordered, 0);
        let bullet = tracker.advance(ListType::Bullet, 0);
        assert_ne!(ordered.reference, bullet.reference);
        assert_eq!(ordered.reference, "decimal-0");
        assert_eq!(bullet.reference, "bullet-0");
    }

    #[test]
    fn interrupted_runs_are_never_resumed() {
        let mut tracker = ListTracker::new();
        let before = tracker.advance(ListType::Bullet, 0);
        tracker.flush();
        let after = tracker.advance(ListType::Bullet, 0);
        assert_ne!(before.reference, after.reference);
        assert_eq!(after.start, Some(1));
    }
}

//! Ancestor stack of currently-open START events

use crate::event::{ContentType, Event, TopologyType};

/// Stack recording the START events enclosing the reader's current position
///
/// Maintained by the pull engine; format readers and applications query it
/// to make context-dependent decisions (e.g. "am I inside a sequence?").
/// The bottom of the stack is the outermost open element.
#[derive(Debug, Default)]
pub struct ParentTracker {
    stack: Vec<Event>,
}

impl ParentTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of currently open ancestors
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// The innermost open START event, if any
    pub fn direct_parent(&self) -> Option<&Event> {
        self.stack.last()
    }

    /// Content type of the innermost open START event, if any
    pub fn parent_content_type(&self) -> Option<ContentType> {
        self.stack.last().map(Event::content_type)
    }

    /// The `n`-th ancestor counted from the innermost (0 = direct parent)
    pub fn parent_from_top(&self, n: usize) -> Option<&Event> {
        self.stack.iter().rev().nth(n)
    }

    /// The `n`-th ancestor counted from the outermost (0 = stream root)
    pub fn parent_from_bottom(&self, n: usize) -> Option<&Event> {
        self.stack.get(n)
    }

    /// Whether the innermost ancestors match `types`, outer to inner
    ///
    /// The last element of `types` is compared against the direct parent,
    /// the one before it against the grandparent, and so on. An empty slice
    /// matches trivially; a slice longer than the stack never matches.
    ///
    /// # Example
    ///
    /// ```
    /// use phylostream::event::{ContentType, Event};
    /// use phylostream::reader::ParentTracker;
    ///
    /// let mut parents = ParentTracker::new();
    /// parents.push(Event::start(ContentType::Document));
    /// parents.push(Event::start(ContentType::Alignment));
    /// parents.push(Event::element_start(ContentType::Sequence, "s1", None, None));
    ///
    /// assert!(parents.is_parent_sequence(&[ContentType::Alignment, ContentType::Sequence]));
    /// assert!(parents.is_parent_sequence(&[ContentType::Sequence]));
    /// assert!(!parents.is_parent_sequence(&[ContentType::Document, ContentType::Sequence]));
    /// ```
    pub fn is_parent_sequence(&self, types: &[ContentType]) -> bool {
        if types.len() > self.stack.len() {
            return false;
        }
        self.stack
            .iter()
            .rev()
            .zip(types.iter().rev())
            .all(|(event, expected)| event.content_type() == *expected)
    }

    /// Push an opening event; must be a START event
    pub fn push(&mut self, event: Event) {
        debug_assert_eq!(event.topology(), TopologyType::Start);
        self.stack.push(event);
    }

    /// Pop the innermost open event
    pub fn pop(&mut self) -> Option<Event> {
        self.stack.pop()
    }

    /// Drop all open ancestors (used when a reader is closed early)
    pub fn clear(&mut self) {
        self.stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> ParentTracker {
        let mut t = ParentTracker::new();
        t.push(Event::start(ContentType::Document));
        t.push(Event::start(ContentType::Alignment));
        t.push(Event::element_start(ContentType::Sequence, "s1", None, None));
        t
    }

    #[test]
    fn test_direct_parent() {
        let t = tracker();
        assert_eq!(t.parent_content_type(), Some(ContentType::Sequence));
        assert_eq!(t.direct_parent().unwrap().id(), Some("s1"));
        assert_eq!(t.depth(), 3);
    }

    #[test]
    fn test_indexing_from_both_ends() {
        let t = tracker();
        assert_eq!(
            t.parent_from_top(0).unwrap().content_type(),
            ContentType::Sequence
        );
        assert_eq!(
            t.parent_from_top(2).unwrap().content_type(),
            ContentType::Document
        );
        assert!(t.parent_from_top(3).is_none());
        assert_eq!(
            t.parent_from_bottom(0).unwrap().content_type(),
            ContentType::Document
        );
        assert_eq!(
            t.parent_from_bottom(2).unwrap().content_type(),
            ContentType::Sequence
        );
    }

    #[test]
    fn test_suffix_match() {
        let t = tracker();
        assert!(t.is_parent_sequence(&[]));
        assert!(t.is_parent_sequence(&[
            ContentType::Document,
            ContentType::Alignment,
            ContentType::Sequence
        ]));
        assert!(!t.is_parent_sequence(&[ContentType::Alignment]));
        assert!(!t.is_parent_sequence(&[
            ContentType::Otu,
            ContentType::Document,
            ContentType::Alignment,
            ContentType::Sequence
        ]));
    }

    #[test]
    fn test_pop_restores_previous_parent() {
        let mut t = tracker();
        let popped = t.pop().unwrap();
        assert_eq!(popped.content_type(), ContentType::Sequence);
        assert_eq!(t.parent_content_type(), Some(ContentType::Alignment));
    }

    #[test]
    fn test_empty_tracker() {
        let t = ParentTracker::new();
        assert_eq!(t.depth(), 0);
        assert!(t.direct_parent().is_none());
        assert!(t.parent_from_top(0).is_none());
        assert!(t.is_parent_sequence(&[]));
        assert!(!t.is_parent_sequence(&[ContentType::Document]));
    }
}

//! Event values and the grammar they obey
//!
//! An [`Event`] is the atomic unit exchanged between format readers, the
//! pull engine, the push engine, and application code. Events are immutable
//! values: they are constructed once at emission time and never modified.
//! Producing a variant of an existing event (for example with a fresh id)
//! yields a new value via [`Event::with_id`].
//!
//! # Example
//!
//! ```
//! use phylostream::event::{ContentType, Event, TopologyType};
//!
//! let start = Event::element_start(ContentType::Sequence, "seq1", Some("taxon A"), Some("otu3"));
//! assert_eq!(start.content_type(), ContentType::Sequence);
//! assert_eq!(start.topology(), TopologyType::Start);
//! assert_eq!(start.id(), Some("seq1"));
//! assert_eq!(start.linked_id(), Some("otu3"));
//!
//! let end = Event::end(ContentType::Sequence);
//! assert_eq!(end.topology(), TopologyType::End);
//! ```

mod types;

pub use types::{can_nest, ContentType, EventType, TopologyType};

use crate::error::Result;

/// Destination for emitted events
///
/// Implemented by format-specific serializers on the writing side and by
/// in-memory collections in tests; the push engine and its helpers emit all
/// events through this seam. Appending may perform I/O and can therefore
/// fail.
pub trait EventSink {
    /// Accept one event
    fn append(&mut self, event: Event) -> Result<()>;
}

impl EventSink for Vec<Event> {
    fn append(&mut self, event: Event) -> Result<()> {
        self.push(event);
        Ok(())
    }
}

/// Type-specific payload carried by an event
///
/// Which payload a given event carries is fixed by its content type; the
/// constructors on [`Event`] are the only way to build events, so the
/// pairing cannot be violated from outside this module.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// No payload (plain structural START/END events)
    None,
    /// Identified element, optionally labeled and/or linked to a prior element
    Element {
        /// Document-unique id (a valid XML name)
        id: String,
        /// Human-readable label, if the source carries one
        label: Option<String>,
        /// Id of a previously emitted element this one references
        linked_id: Option<String>,
    },
    /// Comment text, possibly one piece of a continued run
    Comment {
        /// Comment text (one piece)
        text: String,
        /// True if the next event continues this comment
        continued_in_next: bool,
    },
    /// A bounded chunk of sequence tokens
    Tokens {
        /// Name of the sequence the tokens belong to
        sequence_name: String,
        /// The tokens of this chunk, in sequence order
        tokens: Vec<String>,
    },
    /// A single sequence token (used by padded/annotated token emission)
    Token {
        /// The token value
        token: String,
    },
    /// One piece of a literal metadata value, possibly continued
    LiteralContent {
        /// String form of the value (one piece)
        value: String,
        /// True if the next event continues this value
        continued_in_next: bool,
    },
    /// An edge between two nodes of a tree or network
    Edge {
        /// Document-unique edge id
        id: String,
        /// Human-readable label, if the source carries one
        label: Option<String>,
        /// Source node id; `None` for a root edge
        source: Option<String>,
        /// Target node id
        target: String,
        /// Branch length, if the source carries one
        length: Option<f64>,
    },
    /// A half-open column interval `[start, end)`
    Interval {
        /// First column of the interval
        start: u64,
        /// First column past the interval
        end: u64,
    },
    /// A membership link to a previously emitted element
    Link {
        /// Id of the linked element
        linked_id: String,
    },
    /// A source-format command this library does not model
    UnknownCommand {
        /// Command name as found in the source
        name: String,
        /// Raw command content
        content: String,
    },
}

/// Immutable event value typed by `(content, topology)`
///
/// See the [module documentation](self) for the construction rules and
/// [`can_nest`] for the nesting grammar.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    event_type: EventType,
    payload: Payload,
}

impl Event {
    fn new(content: ContentType, topology: TopologyType, payload: Payload) -> Self {
        debug_assert_eq!(
            content.is_sole(),
            topology == TopologyType::Sole,
            "topology class mismatch for {content:?}"
        );
        Self {
            event_type: EventType::new(content, topology),
            payload,
        }
    }

    /// Plain START event without id or label
    pub fn start(content: ContentType) -> Self {
        Self::new(content, TopologyType::Start, Payload::None)
    }

    /// START event for an identified element with optional label and link
    pub fn element_start(
        content: ContentType,
        id: impl Into<String>,
        label: Option<&str>,
        linked_id: Option<&str>,
    ) -> Self {
        Self::new(
            content,
            TopologyType::Start,
            Payload::Element {
                id: id.into(),
                label: label.map(str::to_owned),
                linked_id: linked_id.map(str::to_owned),
            },
        )
    }

    /// END event closing the innermost open region of `content`
    pub fn end(content: ContentType) -> Self {
        Self::new(content, TopologyType::End, Payload::None)
    }

    /// Standalone comment event
    pub fn comment(text: impl Into<String>, continued_in_next: bool) -> Self {
        Self::new(
            ContentType::Comment,
            TopologyType::Sole,
            Payload::Comment {
                text: text.into(),
                continued_in_next,
            },
        )
    }

    /// Standalone sequence-token chunk event
    pub fn sequence_tokens(sequence_name: impl Into<String>, tokens: Vec<String>) -> Self {
        Self::new(
            ContentType::SequenceTokens,
            TopologyType::Sole,
            Payload::Tokens {
                sequence_name: sequence_name.into(),
                tokens,
            },
        )
    }

    /// START event for a single sequence token
    pub fn single_token_start(token: impl Into<String>) -> Self {
        Self::new(
            ContentType::SingleSequenceToken,
            TopologyType::Start,
            Payload::Token {
                token: token.into(),
            },
        )
    }

    /// START event for an edge or root edge
    ///
    /// `content` must be [`ContentType::Edge`] (with a source node) or
    /// [`ContentType::RootEdge`] (without one). Both node ids must already
    /// have been emitted when the event enters a stream.
    pub fn edge_start(
        content: ContentType,
        id: impl Into<String>,
        label: Option<&str>,
        source: Option<&str>,
        target: impl Into<String>,
        length: Option<f64>,
    ) -> Self {
        debug_assert!(matches!(content, ContentType::Edge | ContentType::RootEdge));
        Self::new(
            content,
            TopologyType::Start,
            Payload::Edge {
                id: id.into(),
                label: label.map(str::to_owned),
                source: source.map(str::to_owned),
                target: target.into(),
                length,
            },
        )
    }

    /// Standalone literal-metadata content event
    pub fn literal_content(value: impl Into<String>, continued_in_next: bool) -> Self {
        Self::new(
            ContentType::LiteralMetaContent,
            TopologyType::Sole,
            Payload::LiteralContent {
                value: value.into(),
                continued_in_next,
            },
        )
    }

    /// Standalone character-set interval event for columns `[start, end)`
    pub fn interval(start: u64, end: u64) -> Self {
        Self::new(
            ContentType::CharacterSetInterval,
            TopologyType::Sole,
            Payload::Interval { start, end },
        )
    }

    /// Standalone set-element link event
    pub fn link(linked_id: impl Into<String>) -> Self {
        Self::new(
            ContentType::SetElementLink,
            TopologyType::Sole,
            Payload::Link {
                linked_id: linked_id.into(),
            },
        )
    }

    /// Standalone unknown-command event
    pub fn unknown_command(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(
            ContentType::UnknownCommand,
            TopologyType::Sole,
            Payload::UnknownCommand {
                name: name.into(),
                content: content.into(),
            },
        )
    }

    /// The `(content, topology)` pair of this event
    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    /// Semantic kind of this event
    pub fn content_type(&self) -> ContentType {
        self.event_type.content
    }

    /// Start/End/Sole
    pub fn topology(&self) -> TopologyType {
        self.event_type.topology
    }

    /// Payload carried by this event
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Document-unique id, if this is an identified element event
    pub fn id(&self) -> Option<&str> {
        match &self.payload {
            Payload::Element { id, .. } | Payload::Edge { id, .. } => Some(id),
            _ => None,
        }
    }

    /// Label, if this is an identified element event carrying one
    pub fn label(&self) -> Option<&str> {
        match &self.payload {
            Payload::Element { label, .. } | Payload::Edge { label, .. } => label.as_deref(),
            _ => None,
        }
    }

    /// Id of the previously emitted element this event references, if any
    pub fn linked_id(&self) -> Option<&str> {
        match &self.payload {
            Payload::Element { linked_id, .. } => linked_id.as_deref(),
            Payload::Link { linked_id } => Some(linked_id),
            _ => None,
        }
    }

    /// Whether this is a comment event
    pub fn is_comment(&self) -> bool {
        self.event_type.content == ContentType::Comment
    }

    /// Whether this event's text payload continues in the next event
    ///
    /// The true value of a long comment or literal-metadata value is the
    /// concatenation of all consecutive pieces up to and including the first
    /// one for which this returns false.
    pub fn continued_in_next(&self) -> bool {
        match &self.payload {
            Payload::Comment {
                continued_in_next, ..
            }
            | Payload::LiteralContent {
                continued_in_next, ..
            } => *continued_in_next,
            _ => false,
        }
    }

    /// New event equal to this one except for a fresh id
    ///
    /// Events are immutable; this is the supported way to re-identify an
    /// element event. Non-element events are returned unchanged.
    pub fn with_id(&self, new_id: impl Into<String>) -> Self {
        let mut clone = self.clone();
        match &mut clone.payload {
            Payload::Element { id, .. } | Payload::Edge { id, .. } => *id = new_id.into(),
            _ => {}
        }
        clone
    }
}

//! Pull-based event reader engine
//!
//! This module implements the format-agnostic half of reading: buffering,
//! lookahead, parent tracking and listener fan-out. A format-specific reader
//! plugs in through the single [`EventProducer`] extension point and appends
//! events through the [`ReaderContext`] it receives; applications consume
//! the resulting stream through [`PullReader`]'s iteration contract without
//! ever seeing format syntax.
//!
//! # Example
//!
//! ```
//! use phylostream::event::{ContentType, Event};
//! use phylostream::options::ParameterMap;
//! use phylostream::reader::{EventProducer, ProducerStatus, PullReader, ReaderContext};
//! use phylostream::Result;
//!
//! /// Producer emitting one empty document
//! struct EmptyDocument {
//!     done: bool,
//! }
//!
//! impl EventProducer for EmptyDocument {
//!     fn produce_more(&mut self, ctx: &mut ReaderContext) -> Result<ProducerStatus> {
//!         if self.done {
//!             return Ok(ProducerStatus::EndOfStream);
//!         }
//!         ctx.append(Event::start(ContentType::Document));
//!         ctx.append(Event::end(ContentType::Document));
//!         self.done = true;
//!         Ok(ProducerStatus::Continue)
//!     }
//! }
//!
//! # fn main() -> Result<()> {
//! let mut reader = PullReader::new(EmptyDocument { done: false }, &ParameterMap::new());
//! while reader.has_next()? {
//!     let event = reader.next()?;
//!     println!("{:?}", event.event_type());
//! }
//! # Ok(())
//! # }
//! ```

mod chunker;
mod id;
mod parent;

pub use chunker::{SequenceTokenChunker, DEFAULT_MAX_TOKENS_PER_EVENT};
pub use id::IdManager;
pub use parent::ParentTracker;

use crate::error::{PhyloStreamError, Result};
use crate::event::{can_nest, Event, EventType, TopologyType};
use crate::options::{keys, ParameterMap};
use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

/// Default comment-splitting threshold (characters per comment event)
///
/// Comments longer than this are emitted as a run of continued comment
/// events, bounding per-event memory the same way the token chunk bound does
/// for sequence data. Overridable through the `max_comment_length` parameter.
pub const DEFAULT_MAX_COMMENT_LENGTH: usize = 4096;

/// Outcome of one [`EventProducer::produce_more`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProducerStatus {
    /// The source is not exhausted; the engine may call again
    Continue,
    /// The source is exhausted; `produce_more` will not be called again
    EndOfStream,
}

/// Single extension point implemented by format-specific readers
///
/// Invoked by the engine whenever the lookahead queue is empty and another
/// event is demanded. A call must either signal [`ProducerStatus::EndOfStream`]
/// or append at least one event to *some* sink of the context — appending
/// into a temporary sink counts, so multi-step internal state machines that
/// buffer out of band remain valid. Returning `Continue` without appending
/// anywhere is a programming error the engine reports as
/// [`PhyloStreamError::InternalInvariant`].
pub trait EventProducer {
    /// Produce further events into `ctx`
    fn produce_more(&mut self, ctx: &mut ReaderContext) -> Result<ProducerStatus>;
}

/// How a listener wants to be treated after a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerAction {
    /// Stay registered
    Keep,
    /// Deregister after this notification pass
    Remove,
}

/// Observer notified synchronously for every event returned by `next()`
///
/// Notification happens after the reader's internal bookkeeping (parent
/// stack, previous event) has been updated and before `next()` returns, in
/// registration order, over a snapshot of the listener list taken at call
/// time. A listener cannot re-enter the reader: `next()` holds the mutable
/// borrow for the whole call.
pub trait EventListener {
    /// Called once per event returned by `next()`
    fn on_event(&mut self, event: &Event) -> ListenerAction;
}

/// Handle identifying a registered listener
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u64);

/// Buffering state a format reader appends into
///
/// Holds the engine's lookahead queue plus a LIFO stack of temporary sinks.
/// `append` targets the top of the stack, or the queue itself when the stack
/// is empty. A sub-parser that needs to buffer events out of band (for
/// example while deciding how many comments precede a structural element)
/// pushes a sink, appends, and pops; popping through the RAII guard flushes
/// the buffered events into whichever sink is then on top, so the indirection
/// is invisible in the final event order.
#[derive(Debug)]
pub struct ReaderContext {
    upcoming: VecDeque<Event>,
    sink_stack: Vec<Vec<Event>>,
    appended: u64,
    ids: IdManager,
    chunker: SequenceTokenChunker,
    max_comment_length: usize,
}

impl ReaderContext {
    fn from_parameters(parameters: &ParameterMap) -> Self {
        let max_tokens =
            parameters.usize_or(keys::MAX_TOKENS_PER_EVENT, DEFAULT_MAX_TOKENS_PER_EVENT);
        let chunker = if parameters.flag(keys::REPLACE_MATCH_TOKENS).unwrap_or(false) {
            let match_token = parameters.text(keys::MATCH_TOKEN).unwrap_or(".");
            SequenceTokenChunker::with_match_token(max_tokens, match_token)
        } else {
            SequenceTokenChunker::new(max_tokens)
        };
        Self {
            upcoming: VecDeque::new(),
            sink_stack: Vec::new(),
            appended: 0,
            ids: IdManager::new(),
            chunker,
            max_comment_length: parameters
                .usize_or(keys::MAX_COMMENT_LENGTH, DEFAULT_MAX_COMMENT_LENGTH)
                .max(1),
        }
    }

    /// Append one event to the current sink
    pub fn append(&mut self, event: Event) {
        self.appended += 1;
        match self.sink_stack.last_mut() {
            Some(sink) => sink.push(event),
            None => self.upcoming.push_back(event),
        }
    }

    /// Push a temporary sink; subsequent appends are buffered out of band
    ///
    /// Prefer [`scoped_sink`](Self::scoped_sink), which cannot leave the
    /// stack unbalanced on early return.
    pub fn push_sink(&mut self) {
        self.sink_stack.push(Vec::new());
    }

    /// Remove and return the top sink with its buffered events
    ///
    /// The caller decides what happens to the events; re-appending them (in
    /// order) restores the transparent-buffering behavior of the guard.
    pub fn pop_sink(&mut self) -> Option<Vec<Event>> {
        self.sink_stack.pop()
    }

    /// Push a temporary sink guarded by RAII
    ///
    /// Dropping the guard (normally or on early return) pops the sink and
    /// flushes its buffered events, in append order, into whichever sink is
    /// then on top.
    pub fn scoped_sink(&mut self) -> SinkGuard<'_> {
        self.push_sink();
        SinkGuard { ctx: self }
    }

    /// Depth of the temporary sink stack
    pub fn sink_depth(&self) -> usize {
        self.sink_stack.len()
    }

    /// Synthesize the next document-unique raw id
    pub fn next_id(&mut self) -> u64 {
        self.ids.next_id()
    }

    /// Synthesize the next document-unique XML-name id
    pub fn next_xml_id(&mut self) -> String {
        self.ids.next_xml_id()
    }

    /// Chunk a raw token run and append the resulting events
    ///
    /// Applies the configured chunk bound and match-token substitution; see
    /// [`SequenceTokenChunker`].
    pub fn emit_sequence_tokens(&mut self, sequence_name: &str, tokens: Vec<String>) {
        for event in self.chunker.events_for(sequence_name, tokens) {
            self.append(event);
        }
    }

    /// Append a comment, splitting it into a continued run when long
    ///
    /// Pieces are at most `max_comment_length` characters; every piece but
    /// the last carries the continued flag.
    pub fn emit_comment(&mut self, text: &str) {
        let chars: Vec<char> = text.chars().collect();
        if chars.len() <= self.max_comment_length {
            self.append(Event::comment(text, false));
            return;
        }
        let mut pieces = chars.chunks(self.max_comment_length).peekable();
        while let Some(piece) = pieces.next() {
            let continued = pieces.peek().is_some();
            self.append(Event::comment(piece.iter().collect::<String>(), continued));
        }
    }

    fn pop_sink_flush(&mut self) -> usize {
        match self.sink_stack.pop() {
            Some(buffered) => {
                let count = buffered.len();
                for event in buffered {
                    self.append(event);
                }
                count
            }
            None => 0,
        }
    }
}

/// RAII guard for a temporary sink; see [`ReaderContext::scoped_sink`]
///
/// Dereferences to the context so appends go through the guard:
///
/// ```
/// use phylostream::event::{ContentType, Event};
/// use phylostream::options::ParameterMap;
/// # use phylostream::reader::{EventProducer, ProducerStatus, PullReader, ReaderContext};
/// # use phylostream::Result;
/// # struct P;
/// # impl EventProducer for P {
/// #     fn produce_more(&mut self, ctx: &mut ReaderContext) -> Result<ProducerStatus> {
/// {
///     // inside produce_more():
/// #   let ctx: &mut ReaderContext = ctx;
///     let mut buffered = ctx.scoped_sink();
///     buffered.append(Event::comment("held back", false));
///     // dropping the guard flushes the comment into the outer sink
/// }
/// #       Ok(ProducerStatus::EndOfStream)
/// #     }
/// # }
/// # let mut r = PullReader::new(P, &ParameterMap::new());
/// # r.has_next().unwrap();
/// ```
pub struct SinkGuard<'a> {
    ctx: &'a mut ReaderContext,
}

impl SinkGuard<'_> {
    /// Pop eagerly, returning the number of events flushed downward
    pub fn finish(self) -> usize {
        // Drop runs right after and finds the stack already balanced for
        // this guard's sink; consume self without a second pop.
        let mut guard = std::mem::ManuallyDrop::new(self);
        guard.ctx.pop_sink_flush()
    }
}

impl Deref for SinkGuard<'_> {
    type Target = ReaderContext;

    fn deref(&self) -> &ReaderContext {
        self.ctx
    }
}

impl DerefMut for SinkGuard<'_> {
    fn deref_mut(&mut self) -> &mut ReaderContext {
        self.ctx
    }
}

impl Drop for SinkGuard<'_> {
    fn drop(&mut self) {
        self.ctx.pop_sink_flush();
    }
}

/// Lookahead-capable pull iterator over a validated event stream
///
/// Wraps an [`EventProducer`] and exposes the uniform iteration contract:
/// [`has_next`](Self::has_next), [`next`](Self::next), [`peek`](Self::peek),
/// [`next_of_type`](Self::next_of_type), listener registration and the
/// [`close`](Self::close) latch. One reader reads one document and holds
/// unsynchronized mutable state; it must not be shared across threads.
pub struct PullReader<P: EventProducer> {
    producer: P,
    ctx: ReaderContext,
    parents: ParentTracker,
    previous: Option<Event>,
    last_non_comment: Option<Event>,
    listeners: Vec<(ListenerId, Rc<RefCell<dyn EventListener>>)>,
    next_listener_id: u64,
    closed: bool,
    exhausted: bool,
    seen_ids: HashSet<String>,
}

impl<P: EventProducer> PullReader<P> {
    /// Create a reader over `producer`, configured from `parameters`
    ///
    /// Recognized keys: `max_tokens_per_event`, `max_comment_length`,
    /// `match_token`, `replace_match_tokens`. Others are ignored here and
    /// left for the format layer.
    pub fn new(producer: P, parameters: &ParameterMap) -> Self {
        Self {
            producer,
            ctx: ReaderContext::from_parameters(parameters),
            parents: ParentTracker::new(),
            previous: None,
            last_non_comment: None,
            listeners: Vec::new(),
            next_listener_id: 0,
            closed: false,
            exhausted: false,
            seen_ids: HashSet::new(),
        }
    }

    /// Whether another event is available
    ///
    /// Drives [`EventProducer::produce_more`] until a lookahead event exists
    /// or the source signals its end; after [`close`](Self::close) this is
    /// always false, even if buffered events remain.
    pub fn has_next(&mut self) -> Result<bool> {
        if self.closed {
            return Ok(false);
        }
        self.ensure_lookahead()?;
        Ok(!self.ctx.upcoming.is_empty())
    }

    /// Return the next event
    ///
    /// Fails with [`PhyloStreamError::EndOfStream`] when
    /// [`has_next`](Self::has_next) is false. Otherwise updates the parent
    /// stack so it holds the open STARTs strictly enclosing the returned
    /// event (the START an END closes is popped only when the stream moves
    /// past the END), records the previous/last-non-comment slots, then
    /// notifies all listeners in registration order before returning.
    pub fn next(&mut self) -> Result<Event> {
        if !self.has_next()? {
            return Err(PhyloStreamError::EndOfStream);
        }
        let event = match self.ctx.upcoming.pop_front() {
            Some(event) => event,
            None => return Err(PhyloStreamError::EndOfStream),
        };

        // Bookkeeping is deferred by one event: the previously returned
        // START opens, and the previously returned END closes its region,
        // only once the stream moves past it. The stack therefore holds
        // exactly the open STARTs strictly enclosing the returned event,
        // including the START an END closes.
        if let Some(previous) = &self.previous {
            match previous.topology() {
                TopologyType::Start => self.parents.push(previous.clone()),
                TopologyType::End => {
                    self.parents.pop();
                }
                TopologyType::Sole => {}
            }
        }
        match event.topology() {
            TopologyType::End => {
                debug_assert!(
                    self.parents
                        .direct_parent()
                        .is_some_and(|o| o.content_type() == event.content_type()),
                    "END {:?} does not close the innermost open START ({:?})",
                    event.content_type(),
                    self.parents.parent_content_type(),
                );
            }
            TopologyType::Start | TopologyType::Sole => {
                debug_assert!(
                    can_nest(self.parents.parent_content_type(), event.content_type()),
                    "{:?} may not nest inside {:?}",
                    event.content_type(),
                    self.parents.parent_content_type(),
                );
            }
        }
        debug_assert!(
            event
                .linked_id()
                .is_none_or(|linked| self.seen_ids.contains(linked)),
            "linked_id {:?} does not refer to a previously emitted id",
            event.linked_id(),
        );
        if let Some(id) = event.id() {
            self.seen_ids.insert(id.to_owned());
        }

        self.previous = Some(event.clone());
        if !event.is_comment() {
            self.last_non_comment = Some(event.clone());
        }

        self.notify(&event);
        Ok(event)
    }

    /// Return the next event without consuming it
    ///
    /// Idempotent: repeated calls between two `next()` calls return equal
    /// events. Fails with [`PhyloStreamError::EndOfStream`] like `next()`.
    pub fn peek(&mut self) -> Result<Event> {
        if !self.has_next()? {
            return Err(PhyloStreamError::EndOfStream);
        }
        match self.ctx.upcoming.front() {
            Some(event) => Ok(event.clone()),
            None => Err(PhyloStreamError::EndOfStream),
        }
    }

    /// Consume events until one matches `types`
    ///
    /// Returns the first matching event, or `Ok(None)` if the stream ends
    /// first; unlike `next()` this never reports exhaustion as an error.
    pub fn next_of_type(&mut self, types: &[EventType]) -> Result<Option<Event>> {
        loop {
            if !self.has_next()? {
                return Ok(None);
            }
            let event = self.next()?;
            if types.contains(&event.event_type()) {
                return Ok(Some(event));
            }
        }
    }

    /// Register a listener; returns the handle for removal
    pub fn add_listener(&mut self, listener: Rc<RefCell<dyn EventListener>>) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Remove a listener by handle; returns whether it was registered
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() < before
    }

    /// Close the reader
    ///
    /// One-way, idempotent latch: afterwards `has_next()` reports false even
    /// if buffered events remain, forcing early termination without draining
    /// the queue.
    pub fn close(&mut self) {
        self.closed = true;
        self.parents.clear();
    }

    /// Whether [`close`](Self::close) has been called
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Stack of START events strictly enclosing the most recently returned
    /// event; after an END, the region it closes is still on the stack
    pub fn parents(&self) -> &ParentTracker {
        &self.parents
    }

    /// The most recently returned event, if any
    pub fn previous(&self) -> Option<&Event> {
        self.previous.as_ref()
    }

    /// The most recently returned non-comment event, if any
    pub fn last_non_comment(&self) -> Option<&Event> {
        self.last_non_comment.as_ref()
    }

    fn ensure_lookahead(&mut self) -> Result<()> {
        while !self.exhausted && self.ctx.upcoming.is_empty() {
            let appended_before = self.ctx.appended;
            match self.producer.produce_more(&mut self.ctx)? {
                ProducerStatus::EndOfStream => self.exhausted = true,
                ProducerStatus::Continue => {
                    if self.ctx.appended == appended_before {
                        return Err(PhyloStreamError::InternalInvariant {
                            msg: "produce_more() returned Continue without appending any event"
                                .to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn notify(&mut self, event: &Event) {
        if self.listeners.is_empty() {
            return;
        }
        // Snapshot so listeners removing themselves cannot corrupt this pass.
        let snapshot: Vec<(ListenerId, Rc<RefCell<dyn EventListener>>)> = self.listeners.clone();
        let mut removed = Vec::new();
        for (id, listener) in &snapshot {
            if listener.borrow_mut().on_event(event) == ListenerAction::Remove {
                removed.push(*id);
            }
        }
        if !removed.is_empty() {
            self.listeners.retain(|(id, _)| !removed.contains(id));
        }
    }
}

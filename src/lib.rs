//! phylostream: event-based, format-agnostic I/O for phylogenetic data
//!
//! # Overview
//!
//! phylostream gives applications one pull-based event stream for *reading*
//! any supported phylogenetic or alignment format, and one push-based data
//! adapter abstraction for *writing* any of them, so application code never
//! depends on a specific file syntax. Format-specific readers and writers
//! plug into the two engines; the engines guarantee a well-formed nested
//! event grammar no matter how irregularly a format tokenizes.
//!
//! ## Key ideas
//!
//! - **One grammar**: every event is typed by `(content, topology)`; the
//!   nesting rules in [`event::can_nest`] bind readers and writers alike.
//! - **Pull reading**: a format reader implements
//!   [`reader::EventProducer`] and appends events; applications iterate
//!   with `has_next`/`next`/`peek` and never see format syntax.
//! - **Push writing**: applications expose their model through read-only
//!   [data adapters](writer); [`writer::EventWriter`] walks them and emits
//!   grammar-valid events into a format serializer.
//! - **Bounded memory**: sequence tokens and comments are chunked
//!   ([`reader::SequenceTokenChunker`], `max_comment_length`), so document
//!   size never dictates per-event memory.
//!
//! ## Quick Start
//!
//! ```
//! use phylostream::event::{ContentType, Event, EventType, TopologyType};
//! use phylostream::options::ParameterMap;
//! use phylostream::reader::{EventProducer, ProducerStatus, PullReader, ReaderContext};
//! use phylostream::Result;
//!
//! /// A minimal producer; real ones tokenize a file instead.
//! struct OneSequence {
//!     done: bool,
//! }
//!
//! impl EventProducer for OneSequence {
//!     fn produce_more(&mut self, ctx: &mut ReaderContext) -> Result<ProducerStatus> {
//!         if self.done {
//!             return Ok(ProducerStatus::EndOfStream);
//!         }
//!         ctx.append(Event::start(ContentType::Document));
//!         ctx.append(Event::start(ContentType::Alignment));
//!         let id = ctx.next_xml_id();
//!         ctx.append(Event::element_start(ContentType::Sequence, id, Some("seq1"), None));
//!         ctx.emit_sequence_tokens("seq1", vec!["A".into(), "C".into(), "G".into()]);
//!         ctx.append(Event::end(ContentType::Sequence));
//!         ctx.append(Event::end(ContentType::Alignment));
//!         ctx.append(Event::end(ContentType::Document));
//!         self.done = true;
//!         Ok(ProducerStatus::Continue)
//!     }
//! }
//!
//! # fn main() -> Result<()> {
//! let mut reader = PullReader::new(OneSequence { done: false }, &ParameterMap::new());
//! let tokens = reader.next_of_type(&[EventType::new(
//!     ContentType::SequenceTokens,
//!     TopologyType::Sole,
//! )])?;
//! assert!(tokens.is_some());
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`event`]: the event values and the `(content, topology)` grammar
//! - [`reader`]: the pull engine, parent tracker, id manager, token chunker
//! - [`writer`]: the push engine, data adapters, label editing, padding
//! - [`options`]: the string-keyed parameter map both engines consume
//! - [`io`]: byte sources/sinks with gzip auto-detection
//!
//! # Concurrency
//!
//! Engines are single-threaded and hold unsynchronized mutable state; one
//! engine instance owns its underlying stream exclusively. Data adapters
//! are read-only and may back any number of write calls.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod event;
pub mod io;
pub mod options;
pub mod reader;
pub mod writer;

// Re-export commonly used types
pub use error::{PhyloStreamError, Result};
pub use event::{ContentType, Event, EventSink, EventType, TopologyType};
pub use options::ParameterMap;
pub use reader::{EventProducer, ProducerStatus, PullReader};
pub use writer::EventWriter;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

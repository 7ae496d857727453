//! Data-adapter traits implemented by applications
//!
//! A data adapter is a read-only view over the application's own model. The
//! push engine walks these traits and never stores or mutates application
//! data, so one adapter may back any number of write calls. Adapter-declared
//! ids and links are treated as untrusted: unresolved references fail the
//! write with `InconsistentAdapterData`.

use crate::error::Result;
use crate::event::EventSink;
use std::ops::Range;

/// Identity, label and link information of one adapter element
///
/// This is the "start event" information the engine turns into an element
/// START event after label editing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementInfo {
    /// Document-unique id declared by the adapter
    pub id: String,
    /// Human-readable label, if the application carries one
    pub label: Option<String>,
    /// Id of the element this one links to (e.g. sequence → OTU)
    pub linked_id: Option<String>,
}

impl ElementInfo {
    /// Info with an id only
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            linked_id: None,
        }
    }

    /// Builder-style label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Builder-style link
    pub fn with_link(mut self, linked_id: impl Into<String>) -> Self {
        self.linked_id = Some(linked_id.into());
        self
    }
}

/// One edge of a tree or network
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeInfo {
    /// Document-unique edge id
    pub id: String,
    /// Optional edge label
    pub label: Option<String>,
    /// Source node id; `None` marks a root edge
    pub source: Option<String>,
    /// Target node id
    pub target: String,
    /// Branch length, if the model carries one
    pub length: Option<f64>,
}

/// Read-only view over one OTU list
pub trait OtuListDataAdapter {
    /// Identity of the list itself
    fn list_info(&self) -> ElementInfo;

    /// Ids of the OTUs, in writing order
    fn otu_ids(&self) -> Vec<String>;

    /// Start information of one OTU
    fn otu(&self, id: &str) -> Option<ElementInfo>;
}

/// Read-only view over one alignment (character matrix)
pub trait MatrixDataAdapter {
    /// Identity of the matrix; `linked_id` names its OTU list, if any
    fn matrix_info(&self) -> ElementInfo;

    /// Ids of the sequences, in writing order
    fn sequence_ids(&self) -> Vec<String>;

    /// Start information of one sequence; `linked_id` names its OTU, if any
    fn sequence(&self, id: &str) -> Option<ElementInfo>;

    /// Number of tokens in one sequence
    fn sequence_length(&self, id: &str) -> Option<usize>;

    /// Stream the tokens of columns `[range.start, range.end)` into `receiver`
    ///
    /// The adapter emits standalone token-chunk events (or single-token
    /// pairs) covering exactly the requested columns, in order. This is the
    /// only way the engine reads sequence content, so arbitrarily long
    /// sequences never have to materialize in one allocation.
    fn write_tokens(
        &self,
        id: &str,
        range: Range<usize>,
        receiver: &mut dyn EventSink,
    ) -> Result<()>;

    /// Fixed column count, when the matrix declares a rectangular shape
    ///
    /// `None` means ragged: sequences keep their own lengths and no padding
    /// applies.
    fn column_count(&self) -> Option<usize> {
        None
    }
}

/// Read-only view over one tree or network
pub trait TreeNetworkDataAdapter {
    /// Identity of the tree/network; `linked_id` is unused here (the group links the OTU list)
    fn tree_info(&self) -> ElementInfo;

    /// True for a tree, false for a network
    fn is_tree(&self) -> bool {
        true
    }

    /// Ids of the nodes, in writing order
    fn node_ids(&self) -> Vec<String>;

    /// Start information of one node; `linked_id` names its OTU, if any
    fn node(&self, id: &str) -> Option<ElementInfo>;

    /// All edges; sources and targets must name ids from [`node_ids`](Self::node_ids)
    fn edges(&self) -> Vec<EdgeInfo>;
}

/// Read-only view over a group of trees/networks sharing one OTU list
pub trait TreeNetworkGroupDataAdapter {
    /// Identity of the group; `linked_id` names its OTU list, if any
    fn group_info(&self) -> ElementInfo;

    /// The trees and networks of the group, in writing order
    fn trees(&self) -> Vec<&dyn TreeNetworkDataAdapter>;
}

/// Read-only view over one whole document
pub trait DocumentDataAdapter {
    /// OTU lists, in writing order
    fn otu_lists(&self) -> Vec<&dyn OtuListDataAdapter>;

    /// Alignments, in writing order
    fn matrices(&self) -> Vec<&dyn MatrixDataAdapter>;

    /// Tree/network groups, in writing order
    fn tree_network_groups(&self) -> Vec<&dyn TreeNetworkGroupDataAdapter> {
        Vec::new()
    }
}

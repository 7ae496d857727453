//! Content/topology type system and the nesting grammar
//!
//! Every event is typed by a pair `(ContentType, TopologyType)`. Content
//! types are a closed set; topology says whether an event opens a nested
//! region, closes one, or stands alone. The adjacency table in [`can_nest`]
//! defines which content may appear directly inside which, and is the single
//! grammar that format readers and writers must both respect.

/// Semantic kind of an event
///
/// The set is closed: format-specific readers map their own syntax onto
/// these kinds and nothing else. Kinds a format cannot express are simply
/// never emitted by its reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// Root of an event stream; exactly one per document
    Document,
    /// A list of operational taxonomic units
    OtuList,
    /// A single operational taxonomic unit (taxon)
    Otu,
    /// A sequence alignment (character matrix)
    Alignment,
    /// One sequence row of an alignment, optionally linked to an OTU
    Sequence,
    /// A chunk of sequence tokens (standalone; chunking is size-bounded)
    SequenceTokens,
    /// A single sequence token with nested content (e.g. an inline comment)
    SingleSequenceToken,
    /// Definition of the token set (e.g. DNA, protein) used by an alignment
    TokenSetDefinition,
    /// A named set of alignment columns
    CharacterSet,
    /// One `[start, end)` column interval of a character set (standalone)
    CharacterSetInterval,
    /// Membership link from a set to a previously emitted element (standalone)
    SetElementLink,
    /// A group of trees and networks sharing one OTU list
    TreeNetworkGroup,
    /// A phylogenetic tree
    Tree,
    /// A phylogenetic network
    Network,
    /// A node of a tree or network
    Node,
    /// An edge connecting two nodes
    Edge,
    /// An edge leading to the root node
    RootEdge,
    /// A comment found in the source (standalone, possibly continued)
    Comment,
    /// A literal (typed-value) metadata annotation
    LiteralMeta,
    /// A piece of a literal metadata value (standalone, possibly continued)
    LiteralMetaContent,
    /// A resource (reference-valued) metadata annotation
    ResourceMeta,
    /// A command of the source format this library does not model (standalone)
    UnknownCommand,
}

impl ContentType {
    /// Whether events of this kind always stand alone (SOLE topology)
    ///
    /// Standalone kinds never open a nested region and are never paired
    /// with an END event.
    pub fn is_sole(self) -> bool {
        matches!(
            self,
            ContentType::SequenceTokens
                | ContentType::CharacterSetInterval
                | ContentType::SetElementLink
                | ContentType::Comment
                | ContentType::LiteralMetaContent
                | ContentType::UnknownCommand
        )
    }
}

/// Whether an event opens, closes, or stands alone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopologyType {
    /// Opens a nested region; matched by exactly one later `End`
    Start,
    /// Closes the innermost open region of the same content type
    End,
    /// Atomic event; never paired
    Sole,
}

/// Value-equal `(content, topology)` pair used for consumer-side filtering
///
/// # Example
///
/// ```
/// use phylostream::event::{ContentType, EventType, TopologyType};
///
/// let t = EventType::new(ContentType::Sequence, TopologyType::Start);
/// assert_eq!(t, EventType::new(ContentType::Sequence, TopologyType::Start));
/// assert_ne!(t, EventType::new(ContentType::Sequence, TopologyType::End));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventType {
    /// Semantic kind
    pub content: ContentType,
    /// Start/End/Sole
    pub topology: TopologyType,
}

impl EventType {
    /// Create an event type pair
    pub fn new(content: ContentType, topology: TopologyType) -> Self {
        Self { content, topology }
    }
}

/// Kinds of metadata/annotation content permitted inside any paired event
fn is_annotation(child: ContentType) -> bool {
    matches!(
        child,
        ContentType::Comment | ContentType::LiteralMeta | ContentType::ResourceMeta
    )
}

/// Nesting grammar: may `child` appear directly inside `parent`?
///
/// `parent` is `None` at the top level of the stream, where only the
/// document event is valid. Any paired event may additionally contain
/// comments, literal/resource metadata and unknown-command records, since a
/// source format may place those anywhere.
///
/// A violation of this table indicates a bug in a format reader or writer,
/// never a property of the input data; the engines check it with debug
/// assertions when emitting events.
pub fn can_nest(parent: Option<ContentType>, child: ContentType) -> bool {
    let parent = match parent {
        None => return child == ContentType::Document,
        Some(p) => p,
    };

    if (is_annotation(child) || child == ContentType::UnknownCommand) && !parent.is_sole() {
        return true;
    }

    use ContentType::*;
    match parent {
        Document => matches!(child, OtuList | Alignment | TreeNetworkGroup),
        OtuList => matches!(child, Otu | SetElementLink),
        Alignment => matches!(child, Sequence | TokenSetDefinition | CharacterSet),
        Sequence => matches!(child, SequenceTokens | SingleSequenceToken),
        TokenSetDefinition => matches!(child, CharacterSetInterval | SetElementLink),
        CharacterSet => matches!(child, CharacterSetInterval | SetElementLink),
        TreeNetworkGroup => matches!(child, Tree | Network | SetElementLink),
        Tree | Network => matches!(child, Node | Edge | RootEdge),
        LiteralMeta => matches!(child, LiteralMetaContent | Comment),
        ResourceMeta => false, // annotations only, handled above
        // Leaf-like paired events accept annotations only
        Otu | SingleSequenceToken | Node | Edge | RootEdge => false,
        // Standalone kinds never have children
        SequenceTokens | CharacterSetInterval | SetElementLink | Comment
        | LiteralMetaContent | UnknownCommand => false,
    }
}

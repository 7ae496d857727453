//! Push-based event writer engine
//!
//! The inverse of the reader: [`EventWriter::write_document`] walks
//! read-only, application-owned [data adapters](adapters) and emits a
//! grammar-valid event stream into a format-specific [`EventSink`]. The
//! engine owns the cross-cutting writing concerns every format needs —
//! label uniqueness, rectangular-matrix padding, OTU-name resolution and
//! dropped-content accounting — so format serializers only translate events
//! into syntax.
//!
//! # Example
//!
//! ```no_run
//! use phylostream::options::ParameterMap;
//! use phylostream::writer::EventWriter;
//! # use phylostream::writer::DocumentDataAdapter;
//! # fn document() -> Box<dyn DocumentDataAdapter> { unimplemented!() }
//!
//! # fn main() -> phylostream::Result<()> {
//! let document = document();
//! let mut events = Vec::new();
//! let mut writer = EventWriter::new(&ParameterMap::new());
//! writer.write_document(document.as_ref(), &mut events)?;
//! let report = writer.into_label_report();
//! # Ok(())
//! # }
//! ```

mod adapters;
mod labels;

pub use adapters::{
    DocumentDataAdapter, EdgeInfo, ElementInfo, MatrixDataAdapter, OtuListDataAdapter,
    TreeNetworkDataAdapter, TreeNetworkGroupDataAdapter,
};
pub use labels::{LabelEditingReport, LabelEditor, LabelStatus};

use crate::error::{PhyloStreamError, Result};
use crate::event::{can_nest, ContentType, Event, EventSink, TopologyType};
use crate::options::{keys, ApplicationInfo, ParameterMap};
use crate::reader::IdManager;
use std::collections::{HashMap, HashSet};

/// Default fill token for rectangular-matrix padding
pub const DEFAULT_SEQUENCE_EXTENSION_TOKEN: &str = "-";

/// Counts of content a target format could not represent
///
/// Format serializers record what they drop (e.g. mid-sequence comments in a
/// format without comment syntax); after the write one summary warning goes
/// through the `log` facade. Dropping is never an error.
#[derive(Debug, Default)]
pub struct DroppedContentLog {
    counts: HashMap<ContentType, usize>,
}

impl DroppedContentLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one dropped piece of content
    pub fn log_dropped(&mut self, content: ContentType) {
        *self.counts.entry(content).or_insert(0) += 1;
    }

    /// How many pieces of `content` were dropped
    pub fn count(&self, content: ContentType) -> usize {
        *self.counts.get(&content).unwrap_or(&0)
    }

    /// Total dropped pieces across all content types
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Whether nothing was dropped
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// One-line summary, e.g. `"3 Comment, 1 LiteralMeta"`
    pub fn summary(&self) -> String {
        let mut parts: Vec<String> = self
            .counts
            .iter()
            .filter(|(_, n)| **n > 0)
            .map(|(content, n)| format!("{n} {content:?}"))
            .collect();
        parts.sort();
        parts.join(", ")
    }

    /// Emit the single summary warning, if anything was dropped
    pub fn warn_summary(&self, format_name: &str) {
        if !self.is_empty() {
            log::warn!(
                "{format_name}: dropped content the target format cannot represent: {}",
                self.summary()
            );
        }
    }
}

/// Sink wrapper asserting the nesting grammar on every emitted event
///
/// The writing-side counterpart of the reader engine's checks: a violation
/// is a bug in the engine or in an adapter's `write_tokens`, never a
/// property of the data.
struct CheckedSink<'a> {
    inner: &'a mut dyn EventSink,
    open: Vec<ContentType>,
}

impl<'a> CheckedSink<'a> {
    fn new(inner: &'a mut dyn EventSink) -> Self {
        Self {
            inner,
            open: Vec::new(),
        }
    }
}

impl EventSink for CheckedSink<'_> {
    fn append(&mut self, event: Event) -> Result<()> {
        match event.topology() {
            TopologyType::Start => {
                debug_assert!(
                    can_nest(self.open.last().copied(), event.content_type()),
                    "{:?} may not nest inside {:?}",
                    event.content_type(),
                    self.open.last(),
                );
                self.open.push(event.content_type());
            }
            TopologyType::End => {
                let opened = self.open.pop();
                debug_assert_eq!(
                    opened,
                    Some(event.content_type()),
                    "END does not close the innermost open START",
                );
            }
            TopologyType::Sole => {
                debug_assert!(
                    can_nest(self.open.last().copied(), event.content_type()),
                    "{:?} may not nest inside {:?}",
                    event.content_type(),
                    self.open.last(),
                );
            }
        }
        self.inner.append(event)
    }
}

/// Resolve an element's display name against its linked OTU
///
/// With `own_first` the element's own label wins over the OTU label; with it
/// false the OTU label wins. The element id is always the final fallback.
/// Both orders exist because target formats disagree on which name is
/// authoritative.
pub fn linked_name(own_first: bool, element: &ElementInfo, otu_label: Option<&str>) -> String {
    let own = element.label.as_deref();
    let chosen = if own_first {
        own.or(otu_label)
    } else {
        otu_label.or(own)
    };
    chosen.unwrap_or(&element.id).to_owned()
}

/// Pad one sequence to `target_length` with single-token event pairs
///
/// Emits `target_length - current_length` SingleSequenceToken START/END
/// pairs carrying `fill_token` into `sink`; used by formats that require
/// rectangular matrices. Returns the number of pairs emitted (zero when the
/// sequence is already long enough).
pub fn extend_sequence(
    matrix: &dyn MatrixDataAdapter,
    id: &str,
    target_length: usize,
    fill_token: &str,
    sink: &mut dyn EventSink,
) -> Result<usize> {
    let current = matrix
        .sequence_length(id)
        .ok_or_else(|| PhyloStreamError::InconsistentAdapterData {
            msg: format!("matrix declares no length for sequence '{id}'"),
        })?;
    let pairs = target_length.saturating_sub(current);
    for _ in 0..pairs {
        sink.append(Event::single_token_start(fill_token))?;
        sink.append(Event::end(ContentType::SingleSequenceToken))?;
    }
    Ok(pairs)
}

/// Push engine driving one document write
///
/// Holds the label editor, the dropped-content log and the id manager used
/// for synthesized metadata ids. One writer instance drives one
/// [`write_document`](Self::write_document) call; the adapters it reads are
/// never mutated and may back any number of writers.
pub struct EventWriter {
    labels: LabelEditor,
    dropped: DroppedContentLog,
    ids: IdManager,
    extension_token: String,
    app_info: Option<ApplicationInfo>,
}

impl EventWriter {
    /// Create a writer configured from `parameters`
    ///
    /// Recognized keys: `maximum_name_length` (label truncation bound,
    /// unbounded when absent) and `sequence_extension_token` (padding fill
    /// value, `-` when absent).
    pub fn new(parameters: &ParameterMap) -> Self {
        let labels = match parameters.integer(keys::MAXIMUM_NAME_LENGTH) {
            Some(max) => LabelEditor::new(max as usize),
            None => LabelEditor::unbounded(),
        };
        Self {
            labels,
            dropped: DroppedContentLog::new(),
            ids: IdManager::new(),
            extension_token: parameters
                .text(keys::SEQUENCE_EXTENSION_TOKEN)
                .unwrap_or(DEFAULT_SEQUENCE_EXTENSION_TOKEN)
                .to_owned(),
            app_info: ApplicationInfo::from_parameters(parameters),
        }
    }

    /// Walk `document` and emit a grammar-valid event stream into `sink`
    ///
    /// OTU lists come first, then alignments, then tree/network groups, so
    /// every linked id resolves backwards in the emitted stream. Fails with
    /// [`PhyloStreamError::InconsistentAdapterData`] when an adapter declares
    /// a reference that does not resolve: a matrix or group naming an absent
    /// OTU list, a sequence or node naming an absent OTU, an edge naming an
    /// unknown node, or a sequence longer than the declared column count.
    pub fn write_document(
        &mut self,
        document: &dyn DocumentDataAdapter,
        sink: &mut dyn EventSink,
    ) -> Result<()> {
        let mut sink = CheckedSink::new(sink);
        sink.append(Event::start(ContentType::Document))?;

        if let Some(app) = self.app_info.clone() {
            let mut generator = format!("{} {}", app.name, app.version);
            if let Some(url) = &app.url {
                generator.push_str(&format!(" ({url})"));
            }
            sink.append(Event::element_start(
                ContentType::LiteralMeta,
                self.ids.next_xml_id(),
                Some("generator"),
                None,
            ))?;
            sink.append(Event::literal_content(generator, false))?;
            sink.append(Event::end(ContentType::LiteralMeta))?;
        }

        // Per OTU list: member ids and their labels, for link checks and
        // linked-name resolution further down.
        let mut otus_by_list: HashMap<String, HashMap<String, Option<String>>> = HashMap::new();

        for list in document.otu_lists() {
            let info = list.list_info();
            let label = self
                .labels
                .unique_label(info.label.as_deref(), &info.id, None);
            sink.append(Event::element_start(
                ContentType::OtuList,
                info.id.clone(),
                Some(&label),
                None,
            ))?;

            let mut members = HashMap::new();
            for otu_id in list.otu_ids() {
                let otu = list.otu(&otu_id).ok_or_else(|| {
                    PhyloStreamError::InconsistentAdapterData {
                        msg: format!("OTU list '{}' iterates absent OTU '{otu_id}'", info.id),
                    }
                })?;
                let otu_label = self
                    .labels
                    .unique_label(otu.label.as_deref(), &otu.id, None);
                sink.append(Event::element_start(
                    ContentType::Otu,
                    otu.id.clone(),
                    Some(&otu_label),
                    None,
                ))?;
                sink.append(Event::end(ContentType::Otu))?;
                members.insert(otu.id, otu.label);
            }
            sink.append(Event::end(ContentType::OtuList))?;
            otus_by_list.insert(info.id, members);
        }

        for matrix in document.matrices() {
            self.write_matrix(matrix, &otus_by_list, &mut sink)?;
        }

        for group in document.tree_network_groups() {
            self.write_tree_group(group, &otus_by_list, &mut sink)?;
        }

        sink.append(Event::end(ContentType::Document))?;
        self.dropped.warn_summary("write_document");
        Ok(())
    }

    /// Report of all label decisions made so far
    pub fn label_report(&self) -> &LabelEditingReport {
        self.labels.report()
    }

    /// Consume the writer, yielding the label report
    pub fn into_label_report(self) -> LabelEditingReport {
        self.labels.into_report()
    }

    /// Dropped-content log, for format serializers to record into
    pub fn dropped_content_mut(&mut self) -> &mut DroppedContentLog {
        &mut self.dropped
    }

    fn write_matrix(
        &mut self,
        matrix: &dyn MatrixDataAdapter,
        otus_by_list: &HashMap<String, HashMap<String, Option<String>>>,
        sink: &mut dyn EventSink,
    ) -> Result<()> {
        let info = matrix.matrix_info();
        let linked_otus = self.resolve_otu_list(&info, otus_by_list, "matrix")?;

        let label = self
            .labels
            .unique_label(info.label.as_deref(), &info.id, None);
        sink.append(Event::element_start(
            ContentType::Alignment,
            info.id.clone(),
            Some(&label),
            info.linked_id.as_deref(),
        ))?;

        let column_count = matrix.column_count();
        for sequence_id in matrix.sequence_ids() {
            let sequence = matrix.sequence(&sequence_id).ok_or_else(|| {
                PhyloStreamError::InconsistentAdapterData {
                    msg: format!(
                        "matrix '{}' iterates absent sequence '{sequence_id}'",
                        info.id
                    ),
                }
            })?;
            let otu_label =
                self.resolve_linked_otu(&sequence, linked_otus, &info.id, "sequence")?;
            let sequence_label = self.labels.unique_label(
                sequence.label.as_deref(),
                &sequence.id,
                otu_label.as_deref(),
            );
            sink.append(Event::element_start(
                ContentType::Sequence,
                sequence.id.clone(),
                Some(&sequence_label),
                sequence.linked_id.as_deref(),
            ))?;

            let length = matrix.sequence_length(&sequence_id).ok_or_else(|| {
                PhyloStreamError::InconsistentAdapterData {
                    msg: format!("matrix declares no length for sequence '{sequence_id}'"),
                }
            })?;
            matrix.write_tokens(&sequence_id, 0..length, sink)?;

            if let Some(target) = column_count {
                if length > target {
                    return Err(PhyloStreamError::InconsistentAdapterData {
                        msg: format!(
                            "sequence '{sequence_id}' has {length} tokens but the matrix declares {target} columns"
                        ),
                    });
                }
                extend_sequence(matrix, &sequence_id, target, &self.extension_token, sink)?;
            }
            sink.append(Event::end(ContentType::Sequence))?;
        }
        sink.append(Event::end(ContentType::Alignment))?;
        Ok(())
    }

    fn write_tree_group(
        &mut self,
        group: &dyn TreeNetworkGroupDataAdapter,
        otus_by_list: &HashMap<String, HashMap<String, Option<String>>>,
        sink: &mut dyn EventSink,
    ) -> Result<()> {
        let info = group.group_info();
        let linked_otus = self.resolve_otu_list(&info, otus_by_list, "tree group")?;

        let label = self
            .labels
            .unique_label(info.label.as_deref(), &info.id, None);
        sink.append(Event::element_start(
            ContentType::TreeNetworkGroup,
            info.id.clone(),
            Some(&label),
            info.linked_id.as_deref(),
        ))?;

        for tree in group.trees() {
            let tree_info = tree.tree_info();
            let content = if tree.is_tree() {
                ContentType::Tree
            } else {
                ContentType::Network
            };
            let tree_label = self
                .labels
                .unique_label(tree_info.label.as_deref(), &tree_info.id, None);
            sink.append(Event::element_start(
                content,
                tree_info.id.clone(),
                Some(&tree_label),
                None,
            ))?;

            let mut known_nodes: HashSet<String> = HashSet::new();
            for node_id in tree.node_ids() {
                let node = tree.node(&node_id).ok_or_else(|| {
                    PhyloStreamError::InconsistentAdapterData {
                        msg: format!(
                            "tree '{}' iterates absent node '{node_id}'",
                            tree_info.id
                        ),
                    }
                })?;
                let otu_label =
                    self.resolve_linked_otu(&node, linked_otus, &tree_info.id, "node")?;
                let node_label =
                    self.labels
                        .unique_label(node.label.as_deref(), &node.id, otu_label.as_deref());
                sink.append(Event::element_start(
                    ContentType::Node,
                    node.id.clone(),
                    Some(&node_label),
                    node.linked_id.as_deref(),
                ))?;
                sink.append(Event::end(ContentType::Node))?;
                known_nodes.insert(node.id);
            }

            for edge in tree.edges() {
                if !known_nodes.contains(&edge.target) {
                    return Err(PhyloStreamError::InconsistentAdapterData {
                        msg: format!(
                            "edge '{}' targets unknown node '{}'",
                            edge.id, edge.target
                        ),
                    });
                }
                let edge_content = match &edge.source {
                    Some(source) => {
                        if !known_nodes.contains(source) {
                            return Err(PhyloStreamError::InconsistentAdapterData {
                                msg: format!(
                                    "edge '{}' starts at unknown node '{source}'",
                                    edge.id
                                ),
                            });
                        }
                        ContentType::Edge
                    }
                    None => ContentType::RootEdge,
                };
                sink.append(Event::edge_start(
                    edge_content,
                    edge.id.clone(),
                    edge.label.as_deref(),
                    edge.source.as_deref(),
                    edge.target.clone(),
                    edge.length,
                ))?;
                sink.append(Event::end(edge_content))?;
            }
            sink.append(Event::end(content))?;
        }
        sink.append(Event::end(ContentType::TreeNetworkGroup))?;
        Ok(())
    }

    fn resolve_otu_list<'a>(
        &self,
        info: &ElementInfo,
        otus_by_list: &'a HashMap<String, HashMap<String, Option<String>>>,
        kind: &str,
    ) -> Result<Option<&'a HashMap<String, Option<String>>>> {
        match &info.linked_id {
            Some(list_id) => match otus_by_list.get(list_id) {
                Some(members) => Ok(Some(members)),
                None => Err(PhyloStreamError::InconsistentAdapterData {
                    msg: format!(
                        "{kind} '{}' links absent OTU list '{list_id}'",
                        info.id
                    ),
                }),
            },
            None => Ok(None),
        }
    }

    fn resolve_linked_otu(
        &self,
        element: &ElementInfo,
        linked_otus: Option<&HashMap<String, Option<String>>>,
        owner_id: &str,
        kind: &str,
    ) -> Result<Option<String>> {
        match &element.linked_id {
            Some(otu_id) => {
                let members =
                    linked_otus.ok_or_else(|| PhyloStreamError::InconsistentAdapterData {
                        msg: format!(
                            "{kind} '{}' links OTU '{otu_id}' but '{owner_id}' links no OTU list",
                            element.id
                        ),
                    })?;
                match members.get(otu_id) {
                    Some(label) => Ok(label.clone()),
                    None => Err(PhyloStreamError::InconsistentAdapterData {
                        msg: format!(
                            "{kind} '{}' links absent OTU '{otu_id}'",
                            element.id
                        ),
                    }),
                }
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Payload, TopologyType};
    use std::ops::Range;

    struct TestOtuList {
        info: ElementInfo,
        otus: Vec<ElementInfo>,
    }

    impl OtuListDataAdapter for TestOtuList {
        fn list_info(&self) -> ElementInfo {
            self.info.clone()
        }

        fn otu_ids(&self) -> Vec<String> {
            self.otus.iter().map(|o| o.id.clone()).collect()
        }

        fn otu(&self, id: &str) -> Option<ElementInfo> {
            self.otus.iter().find(|o| o.id == id).cloned()
        }
    }

    struct TestMatrix {
        info: ElementInfo,
        sequences: Vec<(ElementInfo, Vec<String>)>,
        column_count: Option<usize>,
    }

    impl MatrixDataAdapter for TestMatrix {
        fn matrix_info(&self) -> ElementInfo {
            self.info.clone()
        }

        fn sequence_ids(&self) -> Vec<String> {
            self.sequences.iter().map(|(s, _)| s.id.clone()).collect()
        }

        fn sequence(&self, id: &str) -> Option<ElementInfo> {
            self.sequences
                .iter()
                .find(|(s, _)| s.id == id)
                .map(|(s, _)| s.clone())
        }

        fn sequence_length(&self, id: &str) -> Option<usize> {
            self.sequences
                .iter()
                .find(|(s, _)| s.id == id)
                .map(|(_, tokens)| tokens.len())
        }

        fn write_tokens(
            &self,
            id: &str,
            range: Range<usize>,
            receiver: &mut dyn EventSink,
        ) -> Result<()> {
            let (info, tokens) = self
                .sequences
                .iter()
                .find(|(s, _)| s.id == id)
                .expect("test matrix asked for unknown sequence");
            receiver.append(Event::sequence_tokens(
                info.label.as_deref().unwrap_or(&info.id),
                tokens[range].to_vec(),
            ))
        }

        fn column_count(&self) -> Option<usize> {
            self.column_count
        }
    }

    struct TestDocument {
        otu_lists: Vec<TestOtuList>,
        matrices: Vec<TestMatrix>,
    }

    impl DocumentDataAdapter for TestDocument {
        fn otu_lists(&self) -> Vec<&dyn OtuListDataAdapter> {
            self.otu_lists
                .iter()
                .map(|l| l as &dyn OtuListDataAdapter)
                .collect()
        }

        fn matrices(&self) -> Vec<&dyn MatrixDataAdapter> {
            self.matrices
                .iter()
                .map(|m| m as &dyn MatrixDataAdapter)
                .collect()
        }
    }

    fn tokens(s: &str) -> Vec<String> {
        s.chars().map(|c| c.to_string()).collect()
    }

    fn two_sequence_document(column_count: Option<usize>) -> TestDocument {
        TestDocument {
            otu_lists: vec![TestOtuList {
                info: ElementInfo::new("otus1").with_label("taxa"),
                otus: vec![
                    ElementInfo::new("otu1").with_label("Homo sapiens"),
                    ElementInfo::new("otu2").with_label("Pan troglodytes"),
                ],
            }],
            matrices: vec![TestMatrix {
                info: ElementInfo::new("m1").with_label("alignment").with_link("otus1"),
                sequences: vec![
                    (
                        ElementInfo::new("s1").with_label("seq one").with_link("otu1"),
                        tokens("ACGTACGTAC"),
                    ),
                    (
                        ElementInfo::new("s2").with_label("seq two").with_link("otu2"),
                        tokens("ACGTACG"),
                    ),
                ],
                column_count,
            }],
        }
    }

    fn padding_pairs(events: &[Event], fill: &str) -> usize {
        events
            .iter()
            .filter(|e| match e.payload() {
                Payload::Token { token } => {
                    e.topology() == TopologyType::Start && token == fill
                }
                _ => false,
            })
            .count()
    }

    #[test]
    fn test_write_document_emits_valid_grammar() {
        let document = two_sequence_document(None);
        let mut events = Vec::new();
        let mut writer = EventWriter::new(&ParameterMap::new());
        writer.write_document(&document, &mut events).unwrap();

        assert_eq!(events[0], Event::start(ContentType::Document));
        assert_eq!(
            events.last().unwrap(),
            &Event::end(ContentType::Document)
        );
        // Replaying the emitted stream through the reader engine exercises
        // its nesting checks.
        let mut stack: Vec<ContentType> = Vec::new();
        for event in &events {
            match event.topology() {
                TopologyType::Start => {
                    assert!(
                        crate::event::can_nest(stack.last().copied(), event.content_type()),
                        "{:?} inside {:?}",
                        event.content_type(),
                        stack.last()
                    );
                    stack.push(event.content_type());
                }
                TopologyType::End => {
                    assert_eq!(stack.pop(), Some(event.content_type()));
                }
                TopologyType::Sole => {
                    assert!(crate::event::can_nest(
                        stack.last().copied(),
                        event.content_type()
                    ));
                }
            }
        }
        assert!(stack.is_empty());
    }

    #[test]
    fn test_padding_scenario() {
        // Lengths 10 and 7, target 10: no padding for the first sequence,
        // exactly three "-" pairs for the second.
        let document = two_sequence_document(Some(10));
        let mut events = Vec::new();
        let mut writer = EventWriter::new(&ParameterMap::new());
        writer.write_document(&document, &mut events).unwrap();
        assert_eq!(padding_pairs(&events, "-"), 3);
    }

    #[test]
    fn test_padding_uses_configured_token() {
        let document = two_sequence_document(Some(10));
        let parameters = ParameterMap::new().with_text(keys::SEQUENCE_EXTENSION_TOKEN, "?");
        let mut events = Vec::new();
        let mut writer = EventWriter::new(&parameters);
        writer.write_document(&document, &mut events).unwrap();
        assert_eq!(padding_pairs(&events, "?"), 3);
        assert_eq!(padding_pairs(&events, "-"), 0);
    }

    #[test]
    fn test_sequence_longer_than_declared_columns_fails() {
        let document = two_sequence_document(Some(8));
        let mut events = Vec::new();
        let mut writer = EventWriter::new(&ParameterMap::new());
        assert!(matches!(
            writer.write_document(&document, &mut events),
            Err(PhyloStreamError::InconsistentAdapterData { .. })
        ));
    }

    #[test]
    fn test_missing_otu_list_fails() {
        let mut document = two_sequence_document(None);
        document.matrices[0].info.linked_id = Some("no_such_list".to_owned());
        let mut events = Vec::new();
        let mut writer = EventWriter::new(&ParameterMap::new());
        assert!(matches!(
            writer.write_document(&document, &mut events),
            Err(PhyloStreamError::InconsistentAdapterData { .. })
        ));
    }

    #[test]
    fn test_missing_linked_otu_fails() {
        let mut document = two_sequence_document(None);
        document.matrices[0].sequences[0].0.linked_id = Some("no_such_otu".to_owned());
        let mut events = Vec::new();
        let mut writer = EventWriter::new(&ParameterMap::new());
        assert!(matches!(
            writer.write_document(&document, &mut events),
            Err(PhyloStreamError::InconsistentAdapterData { .. })
        ));
    }

    #[test]
    fn test_label_report_is_queryable_after_write() {
        let document = two_sequence_document(None);
        let mut events = Vec::new();
        let mut writer = EventWriter::new(&ParameterMap::new());
        writer.write_document(&document, &mut events).unwrap();
        let report = writer.into_label_report();
        assert_eq!(report.label("s1"), Some("seq one"));
        assert_eq!(report.status("s1"), Some(LabelStatus::Unchanged));
        assert_eq!(report.label("otu1"), Some("Homo sapiens"));
    }

    #[test]
    fn test_maximum_name_length_truncates_written_labels() {
        let document = two_sequence_document(None);
        let parameters = ParameterMap::new().with_integer(keys::MAXIMUM_NAME_LENGTH, 5);
        let mut events = Vec::new();
        let mut writer = EventWriter::new(&parameters);
        writer.write_document(&document, &mut events).unwrap();
        for event in &events {
            if let Some(label) = event.label() {
                assert!(label.chars().count() <= 5, "{label}");
            }
        }
        assert!(writer.label_report().is_edited("otu1"));
    }

    #[test]
    fn test_application_info_is_written_as_metadata() {
        let document = two_sequence_document(None);
        let parameters = ParameterMap::new()
            .with_text(keys::APPLICATION_NAME, "demo")
            .with_text(keys::APPLICATION_VERSION, "1.2");
        let mut events = Vec::new();
        let mut writer = EventWriter::new(&parameters);
        writer.write_document(&document, &mut events).unwrap();
        assert_eq!(events[1].content_type(), ContentType::LiteralMeta);
        assert_eq!(
            events[2],
            Event::literal_content("demo 1.2", false)
        );
    }

    #[test]
    fn test_linked_name_priority_orders() {
        let element = ElementInfo::new("s1").with_label("own");
        assert_eq!(linked_name(true, &element, Some("otu")), "own");
        assert_eq!(linked_name(false, &element, Some("otu")), "otu");

        let unlabeled = ElementInfo::new("s2");
        assert_eq!(linked_name(true, &unlabeled, Some("otu")), "otu");
        assert_eq!(linked_name(false, &unlabeled, None), "s2");
    }

    #[test]
    fn test_extend_sequence_counts() {
        let document = two_sequence_document(None);
        let matrix = &document.matrices[0];
        let mut sink = Vec::new();
        assert_eq!(extend_sequence(matrix, "s1", 10, "-", &mut sink).unwrap(), 0);
        assert_eq!(extend_sequence(matrix, "s2", 10, "-", &mut sink).unwrap(), 3);
        assert_eq!(sink.len(), 6); // three START/END pairs
        assert!(matches!(
            extend_sequence(matrix, "missing", 10, "-", &mut sink),
            Err(PhyloStreamError::InconsistentAdapterData { .. })
        ));
    }

    struct MisplacedTokens;

    impl MatrixDataAdapter for MisplacedTokens {
        fn matrix_info(&self) -> ElementInfo {
            ElementInfo::new("m1")
        }

        fn sequence_ids(&self) -> Vec<String> {
            vec!["s1".to_owned()]
        }

        fn sequence(&self, id: &str) -> Option<ElementInfo> {
            (id == "s1").then(|| ElementInfo::new("s1"))
        }

        fn sequence_length(&self, id: &str) -> Option<usize> {
            (id == "s1").then_some(1)
        }

        fn write_tokens(
            &self,
            _id: &str,
            _range: Range<usize>,
            receiver: &mut dyn EventSink,
        ) -> Result<()> {
            // An alignment may not open inside a sequence.
            receiver.append(Event::start(ContentType::Alignment))
        }
    }

    struct MisplacedTokensDocument {
        matrix: MisplacedTokens,
    }

    impl DocumentDataAdapter for MisplacedTokensDocument {
        fn otu_lists(&self) -> Vec<&dyn OtuListDataAdapter> {
            Vec::new()
        }

        fn matrices(&self) -> Vec<&dyn MatrixDataAdapter> {
            vec![&self.matrix]
        }
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "may not nest")]
    fn test_adapter_emitting_misplaced_event_is_asserted() {
        let document = MisplacedTokensDocument {
            matrix: MisplacedTokens,
        };
        let mut events = Vec::new();
        let mut writer = EventWriter::new(&ParameterMap::new());
        let _ = writer.write_document(&document, &mut events);
    }

    #[test]
    fn test_dropped_content_log() {
        let mut log = DroppedContentLog::new();
        assert!(log.is_empty());
        log.log_dropped(ContentType::Comment);
        log.log_dropped(ContentType::Comment);
        log.log_dropped(ContentType::LiteralMeta);
        assert_eq!(log.count(ContentType::Comment), 2);
        assert_eq!(log.total(), 3);
        let summary = log.summary();
        assert!(summary.contains("2 Comment"));
        assert!(summary.contains("1 LiteralMeta"));
    }
}

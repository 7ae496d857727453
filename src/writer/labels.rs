//! Unique-label synthesis for written documents
//!
//! Many target formats identify elements by label rather than id and forbid
//! duplicates (or silently merge them). [`LabelEditor`] turns adapter labels
//! into collision-free, length-bounded written labels and records every
//! decision in a [`LabelEditingReport`] the application can query after the
//! write, e.g. to map its own ids onto the labels that actually reached the
//! file.

use std::collections::HashMap;
use std::collections::HashSet;

/// Separator between label components in synthesized candidates
const LABEL_SEPARATOR: char = '_';

/// What happened to one element's label during writing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelStatus {
    /// Written exactly as the adapter declared it
    Unchanged,
    /// Rewritten to restore uniqueness or respect the length bound
    Edited,
    /// The element was not written at all (format limitation)
    NotWritten,
}

/// Mapping from adapter ids to the labels that reached the file
#[derive(Debug, Default)]
pub struct LabelEditingReport {
    entries: HashMap<String, (Option<String>, LabelStatus)>,
}

impl LabelEditingReport {
    /// Final written label of the element with adapter id `id`
    pub fn label(&self, id: &str) -> Option<&str> {
        match self.entries.get(id) {
            Some((label, _)) => label.as_deref(),
            None => None,
        }
    }

    /// Status of the element with adapter id `id`
    pub fn status(&self, id: &str) -> Option<LabelStatus> {
        self.entries.get(id).map(|(_, status)| *status)
    }

    /// Whether the element's label was rewritten
    pub fn is_edited(&self, id: &str) -> bool {
        self.status(id) == Some(LabelStatus::Edited)
    }

    /// Number of recorded elements
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no elements were recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn record(&mut self, id: &str, label: Option<String>, status: LabelStatus) {
        self.entries.insert(id.to_owned(), (label, status));
    }
}

/// Deterministic, collision-free label generator
///
/// Candidates are tried in a fixed ladder and the first unused one wins:
/// 1. the primary label (or the primary id when there is none);
/// 2. primary label + `_` + secondary label;
/// 3. primary id + `_` + primary label;
/// 4. primary id + `_` + primary label + `_` + secondary label;
/// 5. the step-1 base shortened to make room for a numeric suffix counting
///    up from 2; the suffix itself is never truncated, so once it outgrows
///    a very small bound the result exceeds the bound instead of colliding.
///
/// Candidates from steps 1-4 are truncated to the configured maximum length
/// before the uniqueness check, and every accepted label is recorded as
/// used. The secondary label typically comes from a linked element (e.g.
/// the OTU a sequence points to).
#[derive(Debug)]
pub struct LabelEditor {
    max_length: usize,
    used: HashSet<String>,
    report: LabelEditingReport,
}

impl LabelEditor {
    /// Editor truncating to at most `max_length` characters
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length: max_length.max(1),
            used: HashSet::new(),
            report: LabelEditingReport::default(),
        }
    }

    /// Editor without a practical length bound
    pub fn unbounded() -> Self {
        Self::new(usize::MAX)
    }

    /// Synthesize a unique label for the element `primary_id`
    ///
    /// `secondary_label` is the label of a linked element used to
    /// disambiguate, if one exists. The result is recorded in the report
    /// under `primary_id` and marked used.
    pub fn unique_label(
        &mut self,
        primary_label: Option<&str>,
        primary_id: &str,
        secondary_label: Option<&str>,
    ) -> String {
        let base = primary_label.unwrap_or(primary_id);
        let first = self.truncate(base);

        let mut accepted = None;
        if !self.used.contains(&first) {
            accepted = Some(first.clone());
        }
        if accepted.is_none() {
            if let (Some(label), Some(secondary)) = (primary_label, secondary_label) {
                let candidate =
                    self.truncate(&format!("{label}{LABEL_SEPARATOR}{secondary}"));
                if !self.used.contains(&candidate) {
                    accepted = Some(candidate);
                }
            }
        }
        if accepted.is_none() {
            if let Some(label) = primary_label {
                let candidate =
                    self.truncate(&format!("{primary_id}{LABEL_SEPARATOR}{label}"));
                if !self.used.contains(&candidate) {
                    accepted = Some(candidate);
                }
            }
        }
        if accepted.is_none() {
            if let (Some(label), Some(secondary)) = (primary_label, secondary_label) {
                let candidate = self.truncate(&format!(
                    "{primary_id}{LABEL_SEPARATOR}{label}{LABEL_SEPARATOR}{secondary}"
                ));
                if !self.used.contains(&candidate) {
                    accepted = Some(candidate);
                }
            }
        }
        let label = match accepted {
            Some(label) => label,
            // Unbounded numeric fallback. The suffix is kept intact: once
            // it outgrows the length bound the candidate widens past the
            // bound rather than cycling through a finite truncated set.
            None => {
                let mut index: u64 = 2;
                loop {
                    let suffix = index.to_string();
                    let keep = self.max_length.saturating_sub(suffix.len());
                    let mut candidate: String = base.chars().take(keep).collect();
                    candidate.push_str(&suffix);
                    if !self.used.contains(&candidate) {
                        break candidate;
                    }
                    index += 1;
                }
            }
        };

        self.used.insert(label.clone());
        let status = if primary_label == Some(label.as_str())
            || (primary_label.is_none() && label == primary_id)
        {
            LabelStatus::Unchanged
        } else {
            LabelStatus::Edited
        };
        self.report.record(primary_id, Some(label.clone()), status);
        label
    }

    /// Record that the element `id` was dropped by the target format
    pub fn mark_not_written(&mut self, id: &str) {
        self.report.record(id, None, LabelStatus::NotWritten);
    }

    /// The report accumulated so far
    pub fn report(&self) -> &LabelEditingReport {
        &self.report
    }

    /// Consume the editor, yielding the final report
    pub fn into_report(self) -> LabelEditingReport {
        self.report
    }

    fn truncate(&self, label: &str) -> String {
        if label.chars().count() <= self.max_length {
            label.to_owned()
        } else {
            label.chars().take(self.max_length).collect()
        }
    }
}

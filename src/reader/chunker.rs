//! Bounded chunking of raw sequence tokens with match-token substitution
//!
//! Format readers hand whole raw token runs to [`SequenceTokenChunker`],
//! which splits them into standalone token-chunk events of bounded size so
//! that arbitrarily long sequences never require unbounded memory in a
//! single event. Chunk size is the reader's only backpressure mechanism for
//! sequence data.

use crate::event::Event;

/// Default chunk size bound (tokens per emitted event)
///
/// Bounds the size of a single token-chunk event; a 1 Mbp sequence becomes
/// ~500 events of this size instead of one giant one. Overridable through
/// the `max_tokens_per_event` parameter.
pub const DEFAULT_MAX_TOKENS_PER_EVENT: usize = 2048;

/// Converts raw per-sequence token runs into bounded-size chunk events
///
/// When match-token substitution is enabled, the first sequence seen becomes
/// the reference; in every later sequence each occurrence of the match token
/// is replaced by the reference token at the same alignment column. A
/// per-sequence column cursor makes sequential calls for the same sequence
/// compose, so chunk boundaries chosen by the format reader are invisible in
/// the output.
///
/// Substitution columns past the end of the reference pass the literal match
/// token through unchanged; the reference itself is stored and replayed
/// literally even where it contains the match token.
#[derive(Debug)]
pub struct SequenceTokenChunker {
    max_tokens_per_event: usize,
    match_token: Option<String>,
    reference_name: Option<String>,
    reference: Vec<String>,
    cursors: std::collections::HashMap<String, usize>,
}

impl SequenceTokenChunker {
    /// Create a chunker with the given chunk bound and no substitution
    ///
    /// A zero bound is treated as 1: every call must be able to emit at
    /// least one event for a non-empty token run.
    pub fn new(max_tokens_per_event: usize) -> Self {
        Self {
            max_tokens_per_event: max_tokens_per_event.max(1),
            match_token: None,
            reference_name: None,
            reference: Vec::new(),
            cursors: std::collections::HashMap::new(),
        }
    }

    /// Create a chunker that replaces `match_token` from the reference sequence
    pub fn with_match_token(max_tokens_per_event: usize, match_token: impl Into<String>) -> Self {
        let mut chunker = Self::new(max_tokens_per_event);
        chunker.match_token = Some(match_token.into());
        chunker
    }

    /// The configured chunk size bound
    pub fn max_tokens_per_event(&self) -> usize {
        self.max_tokens_per_event
    }

    /// Convert one raw token run into chunk events, in sequence order
    ///
    /// Emits `ceil(tokens.len() / max_tokens_per_event)` standalone events
    /// whose token counts sum to `tokens.len()`; an empty run emits nothing.
    /// Calls for the same `sequence_name` continue at the column where the
    /// previous call stopped.
    pub fn events_for(&mut self, sequence_name: &str, mut tokens: Vec<String>) -> Vec<Event> {
        let start_column = *self.cursors.get(sequence_name).unwrap_or(&0);

        match &self.match_token {
            Some(match_token) => {
                if self.reference_name.is_none() {
                    self.reference_name = Some(sequence_name.to_owned());
                }
                if self.reference_name.as_deref() == Some(sequence_name) {
                    // The reference is kept literally, match tokens included.
                    self.reference.extend(tokens.iter().cloned());
                } else {
                    for (offset, token) in tokens.iter_mut().enumerate() {
                        if token == match_token {
                            if let Some(reference_token) = self.reference.get(start_column + offset)
                            {
                                *token = reference_token.clone();
                            }
                            // Past the reference end the literal match token
                            // passes through.
                        }
                    }
                }
            }
            None => {}
        }

        self.cursors
            .insert(sequence_name.to_owned(), start_column + tokens.len());

        let mut events = Vec::with_capacity(tokens.len().div_ceil(self.max_tokens_per_event));
        let mut remaining = tokens;
        while remaining.len() > self.max_tokens_per_event {
            let rest = remaining.split_off(self.max_tokens_per_event);
            events.push(Event::sequence_tokens(sequence_name, remaining));
            remaining = rest;
        }
        if !remaining.is_empty() {
            events.push(Event::sequence_tokens(sequence_name, remaining));
        }
        events
    }

    /// Current column cursor for a sequence (tokens consumed so far)
    pub fn column(&self, sequence_name: &str) -> usize {
        *self.cursors.get(sequence_name).unwrap_or(&0)
    }
}

impl Default for SequenceTokenChunker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TOKENS_PER_EVENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Payload;

    fn toks(s: &str) -> Vec<String> {
        s.chars().map(|c| c.to_string()).collect()
    }

    fn chunk_tokens(event: &Event) -> Vec<String> {
        match event.payload() {
            Payload::Tokens { tokens, .. } => tokens.clone(),
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn test_chunk_count_and_order() {
        let mut chunker = SequenceTokenChunker::new(4);
        let events = chunker.events_for("s1", toks("ACGTACGTAC"));
        assert_eq!(events.len(), 3); // ceil(10 / 4)
        let rejoined: Vec<String> = events.iter().flat_map(|e| chunk_tokens(e)).collect();
        assert_eq!(rejoined, toks("ACGTACGTAC"));
        assert_eq!(chunk_tokens(&events[0]).len(), 4);
        assert_eq!(chunk_tokens(&events[2]).len(), 2);
    }

    #[test]
    fn test_empty_run_emits_nothing() {
        let mut chunker = SequenceTokenChunker::new(4);
        assert!(chunker.events_for("s1", Vec::new()).is_empty());
    }

    #[test]
    fn test_match_token_substitution() {
        let mut chunker = SequenceTokenChunker::with_match_token(100, ".");
        chunker.events_for("ref", toks("ACGT"));
        let events = chunker.events_for("other", toks("A..T"));
        assert_eq!(chunk_tokens(&events[0]), toks("ACGT"));
    }

    #[test]
    fn test_column_cursor_spans_calls() {
        let mut chunker = SequenceTokenChunker::with_match_token(100, ".");
        chunker.events_for("ref", toks("ACGTAC"));
        // Two chunked calls for the same later sequence must continue at the
        // column where the previous call stopped.
        let first = chunker.events_for("other", toks("..G"));
        let second = chunker.events_for("other", toks(".A."));
        assert_eq!(chunk_tokens(&first[0]), toks("ACG"));
        assert_eq!(chunk_tokens(&second[0]), toks("TAC"));
        assert_eq!(chunker.column("other"), 6);
    }

    #[test]
    fn test_match_token_past_reference_passes_through() {
        let mut chunker = SequenceTokenChunker::with_match_token(100, ".");
        chunker.events_for("ref", toks("AC"));
        let events = chunker.events_for("long", toks("...."));
        assert_eq!(chunk_tokens(&events[0]), toks("AC.."));
    }

    #[test]
    fn test_reference_keeps_literal_match_tokens() {
        let mut chunker = SequenceTokenChunker::with_match_token(100, ".");
        let reference = chunker.events_for("ref", toks("A.C"));
        assert_eq!(chunk_tokens(&reference[0]), toks("A.C"));
        // Later sequences see the literal reference column, dot included.
        let events = chunker.events_for("other", toks("..."));
        assert_eq!(chunk_tokens(&events[0]), toks("A.C"));
    }

    #[test]
    fn test_zero_bound_is_clamped() {
        let mut chunker = SequenceTokenChunker::new(0);
        let events = chunker.events_for("s1", toks("AC"));
        assert_eq!(events.len(), 2);
    }

    // Property-based tests
    use proptest::prelude::*;

    proptest! {
        /// ceil(L/K) chunks, counts summing to L, tokens in original order
        #[test]
        fn test_chunking_property(
            tokens in proptest::collection::vec("[ACGT-]", 0..300),
            bound in 1..64usize,
        ) {
            let mut chunker = SequenceTokenChunker::new(bound);
            let events = chunker.events_for("s", tokens.clone());

            prop_assert_eq!(events.len(), tokens.len().div_ceil(bound));
            let rejoined: Vec<String> =
                events.iter().flat_map(|e| chunk_tokens(e)).collect();
            prop_assert_eq!(rejoined, tokens);
            for event in &events[..events.len().saturating_sub(1)] {
                prop_assert_eq!(chunk_tokens(event).len(), bound);
            }
        }

        /// Substitution result never depends on how the caller splits a run
        #[test]
        fn test_substitution_split_invariance(
            reference in proptest::collection::vec("[ACGT]", 1..60),
            pattern in proptest::collection::vec(proptest::bool::ANY, 1..60),
            split in 0..60usize,
        ) {
            let later: Vec<String> = pattern
                .iter()
                .map(|&m| if m { ".".to_owned() } else { "G".to_owned() })
                .collect();
            let split = split.min(later.len());

            let mut whole = SequenceTokenChunker::with_match_token(1000, ".");
            whole.events_for("ref", reference.clone());
            let expected: Vec<String> = whole
                .events_for("x", later.clone())
                .iter()
                .flat_map(|e| chunk_tokens(e))
                .collect();

            let mut halves = SequenceTokenChunker::with_match_token(1000, ".");
            halves.events_for("ref", reference);
            let mut actual: Vec<String> = halves
                .events_for("x", later[..split].to_vec())
                .iter()
                .flat_map(|e| chunk_tokens(e))
                .collect();
            actual.extend(
                halves
                    .events_for("x", later[split..].to_vec())
                    .iter()
                    .flat_map(|e| chunk_tokens(e)),
            );

            prop_assert_eq!(actual, expected);
        }
    }
}

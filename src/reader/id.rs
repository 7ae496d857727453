//! Per-reader unique id generation

/// Monotonic id generator owned by one reader instance
///
/// Format readers use this to synthesize ids for elements the source format
/// does not identify (e.g. FASTA sequences). Ids are unique per reader, and
/// therefore per document, because one reader owns one document.
#[derive(Debug, Default)]
pub struct IdManager {
    counter: u64,
}

impl IdManager {
    /// Create a manager starting at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Next raw id; strictly increasing per reader instance
    pub fn next_id(&mut self) -> u64 {
        let id = self.counter;
        self.counter += 1;
        id
    }

    /// Next id rendered as a valid XML name (`e0`, `e1`, ...)
    ///
    /// The leading letter keeps the result a valid XML name even though the
    /// counter itself starts with a digit.
    pub fn next_xml_id(&mut self) -> String {
        format!("e{}", self.next_id())
    }
}

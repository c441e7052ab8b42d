use super::{Position, TextRange};

/// Replace `range` with `text`. An empty range inserts, an empty text deletes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: TextRange,
    pub text: String,
}

/// A batch of edits applied atomically by [`Document::apply_edit`](super::Document::apply_edit).
///
/// Ranges refer to the document as it was before the transaction; they may touch but must not
/// overlap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditTransaction {
    edits: Vec<TextEdit>,
}

impl EditTransaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(mut self, range: TextRange, text: impl Into<String>) -> Self {
        self.edits.push(TextEdit {
            range,
            text: text.into(),
        });
        self
    }

    pub fn delete(self, range: TextRange) -> Self {
        self.replace(range, String::new())
    }

    pub fn insert(self, at: Position, text: impl Into<String>) -> Self {
        self.replace(TextRange::empty(at), text)
    }

    pub fn edits(&self) -> &[TextEdit] {
        &self.edits
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub(super) fn into_edits(self) -> Vec<TextEdit> {
        self.edits
    }
}

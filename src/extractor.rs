use std::{collections::BTreeSet, ops::RangeInclusive};

use crate::{
    document::{Document, EditTransaction, Position, Selection, TextRange},
    environment::EditSession,
    error::DocumentError,
    languages::LanguageId,
};

/// Text taken out of a document, with the language of the document it came from.
#[derive(Debug, Clone, PartialEq, Eq, fieldwork::Fieldwork)]
#[fieldwork(get)]
pub struct ExtractedBlock {
    text: String,
    language_id: LanguageId,
}

impl ExtractedBlock {
    pub fn new(text: impl Into<String>, language_id: LanguageId) -> Self {
        Self {
            text: text.into(),
            language_id,
        }
    }
}

/// Contiguous, inclusive run of source lines deleted by a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRemovalSet {
    first: usize,
    last: usize,
}

impl LineRemovalSet {
    /// Lines spanned by the selection, plus the line just before it when that line is blank.
    ///
    /// Gaps cannot occur: the candidates are the selection's first and last line and at most
    /// one line immediately above the first.
    pub fn for_selection(document: &Document, selection: &Selection) -> Result<Self, DocumentError> {
        let mut lines = BTreeSet::from([selection.start.line, selection.end.line]);

        if selection.start.line > 0 {
            let before = document.line_at(selection.start.line - 1)?;
            if before.is_empty_or_whitespace {
                lines.insert(before.line_number);
            }
        }

        let first = lines.first().copied().unwrap_or(selection.start.line);
        let last = lines.last().copied().unwrap_or(selection.end.line);
        Ok(Self { first, last })
    }

    pub fn first(&self) -> usize {
        self.first
    }

    pub fn last(&self) -> usize {
        self.last
    }

    pub fn len(&self) -> usize {
        self.last - self.first + 1
    }

    pub fn lines(&self) -> RangeInclusive<usize> {
        self.first..=self.last
    }

    /// One deletion per line, each including its line break.
    pub fn transaction(&self, document: &Document) -> Result<EditTransaction, DocumentError> {
        self.lines().try_fold(EditTransaction::new(), |transaction, line_number| {
            let line = document.line_at(line_number)?;
            Ok(transaction.delete(line.range_including_line_break))
        })
    }

    /// The exact text the transaction removes.
    pub fn removed_text(&self, document: &Document) -> Result<String, DocumentError> {
        let first = document.line_at(self.first)?;
        let last = document.line_at(self.last)?;
        Ok(document.get_text(&TextRange::new(
            first.range_including_line_break.start,
            last.range_including_line_break.end,
        )))
    }
}

/// A computed but not yet applied extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    block: ExtractedBlock,
    removal: LineRemovalSet,
    removed_text: String,
}

impl Extraction {
    pub fn block(&self) -> &ExtractedBlock {
        &self.block
    }

    pub fn removal(&self) -> LineRemovalSet {
        self.removal
    }

    pub fn into_block(self) -> ExtractedBlock {
        self.block
    }

    /// Delete the source lines in one transaction.
    pub fn apply(&self, session: &mut EditSession<'_>) -> Result<(), DocumentError> {
        let transaction = self.removal.transaction(session.document())?;
        session.apply_edit(transaction)
    }

    /// Put the deleted lines back where they were.
    pub fn restore(&self, session: &mut EditSession<'_>) -> Result<(), DocumentError> {
        session.apply_edit(
            EditTransaction::new().insert(Position::new(self.removal.first, 0), &*self.removed_text),
        )
    }
}

/// Compute what moving `selection` would take out of `document`, without touching it.
///
/// Returns `None` for an empty selection.
pub fn plan_extraction(
    document: &Document,
    selection: &Selection,
) -> Result<Option<Extraction>, DocumentError> {
    let selection = document.clamp_range(*selection);
    if selection.is_empty() {
        return Ok(None);
    }

    let text = document.get_text(&selection);
    let removal = LineRemovalSet::for_selection(document, &selection)?;
    let removed_text = removal.removed_text(document)?;
    log::debug!(
        "extracting {selection}: removing lines {}..={} ({} chars)",
        removal.first + 1,
        removal.last + 1,
        removed_text.chars().count()
    );

    Ok(Some(Extraction {
        block: ExtractedBlock::new(text, document.language_id().clone()),
        removal,
        removed_text,
    }))
}

/// Take the selected text out of the session's document, deleting the lines it spans along
/// with one blank line directly above it.
pub fn extract(
    session: &mut EditSession<'_>,
    selection: &Selection,
) -> Result<Option<ExtractedBlock>, DocumentError> {
    let Some(extraction) = plan_extraction(session.document(), selection)? else {
        return Ok(None);
    };
    extraction.apply(session)?;
    Ok(Some(extraction.into_block()))
}

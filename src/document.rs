mod edit;
mod position;

use std::path::{Path, PathBuf};

use ropey::Rope;
use serde::{Deserialize, Serialize};

pub use edit::{EditTransaction, TextEdit};
pub use position::{Position, Selection, TextRange};

use crate::{error::DocumentError, languages::LanguageId};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DocumentId(pub usize);

/// A single line of a [`Document`], as seen by the extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub line_number: usize,
    /// Line content without its line break
    pub text: String,
    pub is_empty_or_whitespace: bool,
    pub range: TextRange,
    /// Extends to the start of the next line, or to the end of the line for the last line
    pub range_including_line_break: TextRange,
}

/// An open document: text plus the language it is classified as.
///
/// Documents without a path are untitled; they live only in memory until a host saves them
/// somewhere.
#[derive(Debug, Clone, fieldwork::Fieldwork)]
#[fieldwork(get)]
pub struct Document {
    #[fieldwork(get(copy))]
    id: DocumentId,
    language_id: LanguageId,
    #[fieldwork(skip)]
    path: Option<PathBuf>,
    rope: Rope,
    #[fieldwork(skip)]
    dirty: bool,
}

fn is_line_break(c: char) -> bool {
    matches!(c, '\n' | '\r')
}

impl Document {
    pub fn new(id: DocumentId, language_id: LanguageId, path: Option<PathBuf>, text: &str) -> Self {
        Self {
            id,
            language_id,
            path,
            rope: Rope::from_str(text),
            dirty: false,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_untitled(&self) -> bool {
        self.path.is_none()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Number of lines, counting the empty line that follows a trailing line break.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Length of a line in chars, excluding its line break.
    fn line_len(&self, line: usize) -> usize {
        let slice = self.rope.line(line);
        let len = slice.len_chars();
        if len == 0 {
            return 0;
        }
        match slice.char(len - 1) {
            '\n' if len >= 2 && slice.char(len - 2) == '\r' => len - 2,
            c if is_line_break(c) => len - 1,
            _ => len,
        }
    }

    pub fn end_position(&self) -> Position {
        let last = self.line_count() - 1;
        Position::new(last, self.line_len(last))
    }

    /// Clamp a position into the document: lines past the end resolve to the end of the
    /// document, columns past the end of a line resolve to the end of that line.
    pub fn clamp(&self, position: Position) -> Position {
        if position.line >= self.line_count() {
            return self.end_position();
        }
        Position::new(
            position.line,
            position.column.min(self.line_len(position.line)),
        )
    }

    pub fn clamp_range(&self, range: TextRange) -> TextRange {
        TextRange::new(self.clamp(range.start), self.clamp(range.end))
    }

    fn char_offset(&self, position: Position) -> usize {
        let position = self.clamp(position);
        self.rope.line_to_char(position.line) + position.column
    }

    pub fn get_text(&self, range: &TextRange) -> String {
        let start = self.char_offset(range.start);
        let end = self.char_offset(range.end);
        self.rope.slice(start..end).to_string()
    }

    pub fn line_at(&self, line_number: usize) -> Result<Line, DocumentError> {
        let line_count = self.line_count();
        if line_number >= line_count {
            return Err(DocumentError::LineOutOfRange {
                line: line_number,
                line_count,
            });
        }

        let len = self.line_len(line_number);
        let start = Position::new(line_number, 0);
        let end = Position::new(line_number, len);
        let text = self.get_text(&TextRange::new(start, end));
        let break_end = if line_number + 1 < line_count {
            Position::new(line_number + 1, 0)
        } else {
            end
        };

        Ok(Line {
            line_number,
            is_empty_or_whitespace: text.trim().is_empty(),
            text,
            range: TextRange::new(start, end),
            range_including_line_break: TextRange::new(start, break_end),
        })
    }

    /// Apply every edit of the transaction, or none of them.
    pub fn apply_edit(&mut self, transaction: EditTransaction) -> Result<(), DocumentError> {
        if transaction.is_empty() {
            return Ok(());
        }

        let mut spans = transaction
            .into_edits()
            .into_iter()
            .map(|TextEdit { range, text }| {
                (self.char_offset(range.start), self.char_offset(range.end), text)
            })
            .collect::<Vec<_>>();

        spans.sort_by_key(|(start, end, _)| (*start, *end));
        for pair in spans.windows(2) {
            let (_, previous_end, _) = &pair[0];
            let (next_start, _, _) = &pair[1];
            if next_start < previous_end {
                return Err(DocumentError::OverlappingEdits {
                    first: *previous_end,
                    second: *next_start,
                });
            }
        }

        for (start, end, text) in spans.into_iter().rev() {
            if start < end {
                self.rope.remove(start..end);
            }
            self.rope.insert(start, &text);
        }
        self.dirty = true;

        Ok(())
    }
}

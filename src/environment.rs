use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::{
    document::{Document, DocumentId, EditTransaction, Position, Selection, TextRange},
    error::DocumentError,
    languages::LanguageId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyLevel {
    Info,
    Warning,
    Error,
}

/// Per-view editor state: the selection and, when meaningful, the cursor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewState {
    pub selection: Selection,
    /// `None` until the user (or an edit) places the cursor somewhere
    pub cursor: Option<Position>,
}

/// An open document together with the view state the user is editing it through.
#[derive(Debug)]
pub struct EditSession<'a> {
    document: &'a mut Document,
    view: &'a mut ViewState,
}

impl<'a> EditSession<'a> {
    pub fn new(document: &'a mut Document, view: &'a mut ViewState) -> Self {
        Self { document, view }
    }

    pub fn document(&self) -> &Document {
        self.document
    }

    pub fn selection(&self) -> Selection {
        self.view.selection
    }

    pub fn cursor(&self) -> Option<Position> {
        self.view.cursor
    }

    pub fn get_text(&self, range: &TextRange) -> String {
        self.document.get_text(range)
    }

    /// Apply the transaction and collapse the selection to the start of its first edit.
    pub fn apply_edit(&mut self, transaction: EditTransaction) -> Result<(), DocumentError> {
        let first = transaction
            .edits()
            .iter()
            .map(|edit| edit.range.start)
            .min();
        self.document.apply_edit(transaction)?;
        if let Some(first) = first {
            let cursor = self.document.clamp(first);
            self.view.cursor = Some(cursor);
            self.view.selection = Selection::empty(cursor);
        }
        Ok(())
    }
}

/// An entry of a searchable list: a primary label and a secondary description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickPickItem {
    pub label: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOptions {
    pub placeholder: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickPickOptions {
    pub placeholder: String,
    /// Filter on the description as well as the label
    pub match_on_description: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenDialogOptions {
    pub can_select_many: bool,
    pub can_select_files: bool,
    pub can_select_folders: bool,
    pub open_label: String,
    /// Allowed extensions; empty accepts any file type
    pub filters: Vec<String>,
}

impl Default for OpenDialogOptions {
    fn default() -> Self {
        Self {
            can_select_many: false,
            can_select_files: true,
            can_select_folders: false,
            open_label: String::from("Open"),
            filters: vec![],
        }
    }
}

/// Present a fixed set of options and return the index of the chosen one.
pub trait ChoicePrompt {
    fn choose(&mut self, options: &[String], config: &ChoiceOptions) -> Result<Option<usize>>;
}

/// Ask for an existing file.
pub trait FileDialog {
    fn open_file(&mut self, options: &OpenDialogOptions) -> Result<Option<PathBuf>>;
}

/// Let the user filter a list of items and return the index of the chosen one.
pub trait SearchableList {
    fn pick(&mut self, items: &[QuickPickItem], options: &QuickPickOptions)
        -> Result<Option<usize>>;
}

pub trait Notifier {
    fn notify(&mut self, message: &str, level: NotifyLevel);
}

/// Every user-facing capability a host supplies. A `None` answer from any prompt means the
/// user dismissed it.
pub trait Prompter: ChoicePrompt + FileDialog + SearchableList + Notifier {}

impl<T> Prompter for T where T: ChoicePrompt + FileDialog + SearchableList + Notifier {}

/// The host editor, as seen by the move command.
pub trait EditorEnvironment {
    type Prompter: Prompter;

    fn prompter(&mut self) -> &mut Self::Prompter;

    fn active_session(&mut self) -> Option<EditSession<'_>>;

    fn session(&mut self, id: DocumentId) -> Result<EditSession<'_>>;

    /// Create an untitled document. Nothing is written to disk.
    fn open_untitled(&mut self, language_id: &LanguageId, content: &str) -> Result<DocumentId>;

    /// Open a file, reusing the document if it is already open.
    fn open_path(&mut self, path: &Path) -> Result<DocumentId>;

    /// Make the document the active one.
    fn show_document(&mut self, id: DocumentId) -> Result<EditSession<'_>>;

    fn save(&mut self, id: DocumentId) -> Result<()>;

    fn find_workspace_files(&self, glob: &str) -> Result<Vec<PathBuf>>;

    fn relative_path(&self, path: &Path) -> String;

    fn notify(&mut self, message: &str, level: NotifyLevel) {
        match level {
            NotifyLevel::Info => log::info!("{message}"),
            NotifyLevel::Warning => log::warn!("{message}"),
            NotifyLevel::Error => log::error!("{message}"),
        }
        self.prompter().notify(message, level);
    }
}

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures of the text model itself. I/O failures are reported through `anyhow` instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("line {line} is out of range for a document with {line_count} lines")]
    LineOutOfRange { line: usize, line_count: usize },

    #[error("edits overlap: an edit ending at char {first} overlaps one starting at char {second}")]
    OverlappingEdits { first: usize, second: usize },
}

/// The interactive step at which the user dismissed a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptStep {
    ModeChoice,
    FileDialog,
    WorkspaceList,
}

impl Display for PromptStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PromptStep::ModeChoice => "destination choice",
            PromptStep::FileDialog => "file dialog",
            PromptStep::WorkspaceList => "workspace file list",
        })
    }
}

/// Why a move stopped before completing. None of these are errors: each one is an expected,
/// user-visible way for the command to end.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortReason {
    #[error("no document is open")]
    NoActiveSession,

    #[error("no text selected")]
    EmptySelection,

    #[error("cancelled at the {0}")]
    UserCancelled(PromptStep),

    #[error("no files found in workspace")]
    EmptyWorkspace,
}

impl AbortReason {
    /// Whether the source document is guaranteed untouched when the move ends this way,
    /// regardless of when the source deletion is scheduled.
    pub fn preserves_source(&self) -> bool {
        !matches!(self, AbortReason::UserCancelled(_))
    }
}

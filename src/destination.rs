use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::{
    config::DestinationSet,
    document::{DocumentId, EditTransaction, Position},
    environment::{
        ChoiceOptions, ChoicePrompt, EditorEnvironment, FileDialog, NotifyLevel,
        OpenDialogOptions, QuickPickItem, QuickPickOptions, SearchableList,
    },
    error::{AbortReason, PromptStep},
    extractor::ExtractedBlock,
};

pub const MODE_PLACEHOLDER: &str = "Move selection to...";
pub const OPEN_LABEL: &str = "Move selection here";
pub const WORKSPACE_PLACEHOLDER: &str = "Search workspace files";
pub const WORKSPACE_GLOB: &str = "**/*";
pub const EMPTY_WORKSPACE_MESSAGE: &str = "No files found in workspace";

/// An entry of the mode prompt.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
pub enum DestinationKind {
    #[strum(to_string = "New File")]
    NewFile,
    #[strum(to_string = "Choose Existing File")]
    PickExisting,
    #[strum(to_string = "Choose File From Workspace")]
    PickFromWorkspace,
}

/// Where an extracted block lands. Resolved once per move and discarded afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    /// Fresh untitled document with the source language
    NewDocument,
    /// File chosen through the open-file dialog
    PickedFile(PathBuf),
    /// File chosen from the workspace file list
    WorkspaceFile(PathBuf),
}

impl Destination {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Destination::NewDocument => None,
            Destination::PickedFile(path) | Destination::WorkspaceFile(path) => Some(path),
        }
    }

    pub fn kind(&self) -> DestinationKind {
        match self {
            Destination::NewDocument => DestinationKind::NewFile,
            Destination::PickedFile(_) => DestinationKind::PickExisting,
            Destination::WorkspaceFile(_) => DestinationKind::PickFromWorkspace,
        }
    }
}

impl OpenDialogOptions {
    /// Single existing file of any type.
    pub fn move_target() -> Self {
        Self {
            open_label: OPEN_LABEL.into(),
            ..Self::default()
        }
    }
}

fn cancelled(step: PromptStep) -> Result<Result<Destination, AbortReason>> {
    log::debug!("user cancelled at the {step}");
    Ok(Err(AbortReason::UserCancelled(step)))
}

/// Run the interactive part of a move: the mode prompt, then the file dialog or workspace list.
///
/// Nothing is written here. The outer `Result` carries host failures, the inner one the ways
/// a user can end the move.
pub fn choose_destination<E: EditorEnvironment>(
    env: &mut E,
    destinations: DestinationSet,
) -> Result<Result<Destination, AbortReason>> {
    let kinds = destinations.kinds();
    let labels = kinds.iter().map(ToString::to_string).collect::<Vec<_>>();
    let config = ChoiceOptions {
        placeholder: MODE_PLACEHOLDER.into(),
    };

    let Some(index) = env.prompter().choose(&labels, &config)? else {
        return cancelled(PromptStep::ModeChoice);
    };
    let kind = kinds
        .get(index)
        .copied()
        .ok_or_else(|| anyhow!("choice {index} is not one of the {} offered", kinds.len()))?;
    log::debug!("destination kind: {kind}");

    match kind {
        DestinationKind::NewFile => Ok(Ok(Destination::NewDocument)),

        DestinationKind::PickExisting => {
            match env.prompter().open_file(&OpenDialogOptions::move_target())? {
                Some(path) => Ok(Ok(Destination::PickedFile(path))),
                None => cancelled(PromptStep::FileDialog),
            }
        }

        DestinationKind::PickFromWorkspace => {
            let files = env.find_workspace_files(WORKSPACE_GLOB)?;
            if files.is_empty() {
                env.notify(EMPTY_WORKSPACE_MESSAGE, NotifyLevel::Warning);
                return Ok(Err(AbortReason::EmptyWorkspace));
            }

            let items = files
                .iter()
                .map(|path| QuickPickItem {
                    label: path
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                    description: env.relative_path(path),
                })
                .collect::<Vec<_>>();
            let options = QuickPickOptions {
                placeholder: WORKSPACE_PLACEHOLDER.into(),
                match_on_description: true,
            };

            match env.prompter().pick(&items, &options)? {
                Some(index) => {
                    let path = files
                        .get(index)
                        .cloned()
                        .ok_or_else(|| anyhow!("item {index} is not one of the {} listed", files.len()))?;
                    Ok(Ok(Destination::WorkspaceFile(path)))
                }
                None => cancelled(PromptStep::WorkspaceList),
            }
        }
    }
}

/// Write the block to its destination.
///
/// A new document receives the text verbatim and stays unsaved. Existing files get the text
/// plus one newline, at the cursor for a picked file and at the end for a workspace file, and
/// are saved.
pub fn place<E: EditorEnvironment>(
    env: &mut E,
    destination: &Destination,
    block: &ExtractedBlock,
) -> Result<DocumentId> {
    match destination {
        Destination::NewDocument => {
            let id = env.open_untitled(block.language_id(), block.text())?;
            env.show_document(id)?;
            log::info!("moved selection to a new {} document", block.language_id());
            Ok(id)
        }

        Destination::PickedFile(path) | Destination::WorkspaceFile(path) => {
            let id = env.open_path(path)?;
            {
                let mut session = env.show_document(id)?;
                let at = match destination {
                    Destination::PickedFile(_) => session
                        .cursor()
                        .unwrap_or_else(|| session.document().end_position()),
                    _ => Position::new(session.document().line_count(), 0),
                };
                log::debug!("inserting at {at}");
                session.apply_edit(EditTransaction::new().insert(at, format!("{}\n", block.text())))?;
            }
            env.save(id)?;
            log::info!("moved selection to {}", path.display());
            Ok(id)
        }
    }
}

/// Choose a destination and write the block there.
pub fn resolve<E: EditorEnvironment>(
    env: &mut E,
    block: &ExtractedBlock,
    destinations: DestinationSet,
) -> Result<Result<Destination, AbortReason>> {
    let destination = match choose_destination(env, destinations)? {
        Ok(destination) => destination,
        Err(reason) => return Ok(Err(reason)),
    };
    place(env, &destination, block)?;
    Ok(Ok(destination))
}

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::{
    config::{MoveConfig, SourceDeletion},
    destination::{choose_destination, place, resolve, Destination},
    document::DocumentId,
    environment::{EditorEnvironment, NotifyLevel},
    error::AbortReason,
    extractor::{plan_extraction, Extraction},
};

pub const COMMAND_NAME: &str = "moveSelectionToFile";
pub const EMPTY_SELECTION_MESSAGE: &str = "No text selected";

/// How a move ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveOutcome {
    Moved(Destination),
    Aborted(AbortReason),
}

impl MoveOutcome {
    pub fn is_moved(&self) -> bool {
        matches!(self, MoveOutcome::Moved(_))
    }
}

fn remove_source<E: EditorEnvironment>(
    env: &mut E,
    source: DocumentId,
    extraction: &Extraction,
) -> Result<()> {
    extraction.apply(&mut env.session(source)?)?;
    Ok(())
}

/// Move the active session's selection into another document.
///
/// The selected lines (and one blank line above them) leave the source, and the selected text
/// goes to a new document, a picked file, or a workspace file. Host and I/O failures are
/// returned as errors; every user-facing way of stopping is an [`MoveOutcome::Aborted`].
pub fn move_selection_to_file<E: EditorEnvironment>(
    env: &mut E,
    config: &MoveConfig,
) -> Result<MoveOutcome> {
    let planned = {
        let Some(session) = env.active_session() else {
            log::debug!("{COMMAND_NAME}: no active session");
            return Ok(MoveOutcome::Aborted(AbortReason::NoActiveSession));
        };
        let selection = session.selection();
        if session.get_text(&selection).trim().is_empty() {
            None
        } else {
            plan_extraction(session.document(), &selection)?
                .map(|extraction| (session.document().id(), extraction))
        }
    };

    let Some((source, extraction)) = planned else {
        env.notify(EMPTY_SELECTION_MESSAGE, NotifyLevel::Info);
        return Ok(MoveOutcome::Aborted(AbortReason::EmptySelection));
    };

    match config.source_deletion {
        SourceDeletion::BeforeResolve => {
            remove_source(env, source, &extraction)?;

            match resolve(env, extraction.block(), config.destinations)? {
                Ok(destination) => Ok(MoveOutcome::Moved(destination)),
                Err(reason) => {
                    if reason.preserves_source() {
                        extraction.restore(&mut env.session(source)?)?;
                    } else {
                        log::warn!(
                            "{reason}: {} removed line(s) were not written anywhere",
                            extraction.removal().len()
                        );
                    }
                    Ok(MoveOutcome::Aborted(reason))
                }
            }
        }

        SourceDeletion::AfterWrite => {
            let destination = match choose_destination(env, config.destinations)? {
                Ok(destination) => destination,
                Err(reason) => return Ok(MoveOutcome::Aborted(reason)),
            };

            // Writing back into the source itself: remove first so the line numbers still hold.
            let into_source = match destination.path() {
                Some(path) => env.open_path(path)? == source,
                None => false,
            };
            if into_source {
                remove_source(env, source, &extraction)?;
            }

            place(env, &destination, extraction.block())?;

            if !into_source {
                remove_source(env, source, &extraction)?;
            }
            Ok(MoveOutcome::Moved(destination))
        }
    }
}

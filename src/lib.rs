#![allow(clippy::collapsible_if)]
#![deny(dead_code)]

pub mod command;
pub mod config;
pub mod destination;
pub mod document;
pub mod environment;
pub mod error;
pub mod extractor;
pub mod languages;
pub mod prompt;
pub mod workspace;

pub use command::{move_selection_to_file, MoveOutcome};
pub use config::MoveConfig;
pub use destination::{Destination, DestinationKind};
pub use environment::EditorEnvironment;
pub use error::AbortReason;
pub use extractor::ExtractedBlock;
pub use workspace::Workspace;

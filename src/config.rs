use std::path::PathBuf;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::destination::DestinationKind;

/// Which destination kinds the mode prompt offers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DestinationSet {
    /// New file, existing file, or a file searched from the workspace
    #[default]
    All,
    /// New file or existing file only
    NewOrExisting,
}

impl DestinationSet {
    pub fn kinds(&self) -> &'static [DestinationKind] {
        match self {
            DestinationSet::All => &[
                DestinationKind::NewFile,
                DestinationKind::PickExisting,
                DestinationKind::PickFromWorkspace,
            ],
            DestinationSet::NewOrExisting => {
                &[DestinationKind::NewFile, DestinationKind::PickExisting]
            }
        }
    }
}

/// When the selected lines are removed from the source document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceDeletion {
    /// Remove the lines before asking where they go. Cancelling a later prompt loses the text.
    #[default]
    BeforeResolve,
    /// Remove the lines only once the destination has been written and saved.
    AfterWrite,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoveConfig {
    pub destinations: DestinationSet,
    pub source_deletion: SourceDeletion,
}

impl MoveConfig {
    /// Read a JSON config file. Missing keys take their defaults.
    pub fn load(path: &str) -> Result<Self> {
        let path = PathBuf::from(&*shellexpand::tilde(path));
        let contents = std::fs::read_to_string(&path)
            .map_err(|e| anyhow!("could not read config {}: {e}", path.display()))?;
        serde_json::from_str(&contents)
            .map_err(|e| anyhow!("invalid config {}: {e}", path.display()))
    }

    pub fn with_destinations(mut self, destinations: DestinationSet) -> Self {
        self.destinations = destinations;
        self
    }

    pub fn with_source_deletion(mut self, source_deletion: SourceDeletion) -> Self {
        self.source_deletion = source_deletion;
        self
    }
}

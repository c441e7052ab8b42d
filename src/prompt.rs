mod scripted;
mod terminal;

pub use scripted::{PromptRecord, ScriptedAnswer, ScriptedPrompter};
pub use terminal::TerminalPrompter;

use crate::environment::QuickPickItem;

/// Indices of the items matching `query`, case-insensitively, in their original order.
///
/// The label is always searched; the description only when `match_on_description` is set.
/// A blank query matches everything.
pub fn filter_items(items: &[QuickPickItem], query: &str, match_on_description: bool) -> Vec<usize> {
    let query = query.trim().to_lowercase();
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| {
            query.is_empty()
                || item.label.to_lowercase().contains(&query)
                || (match_on_description && item.description.to_lowercase().contains(&query))
        })
        .map(|(index, _)| index)
        .collect()
}

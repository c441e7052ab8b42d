use std::{collections::VecDeque, path::PathBuf};

use anyhow::{anyhow, Result};

use crate::environment::{
    ChoiceOptions, ChoicePrompt, FileDialog, Notifier, NotifyLevel, OpenDialogOptions,
    QuickPickItem, QuickPickOptions, SearchableList,
};

/// A canned reply to the next prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedAnswer {
    /// Pick the choice with this label
    Choose(String),
    /// Answer a file dialog with this path
    Path(PathBuf),
    /// Type this query into a searchable list and take the only match
    Search(String),
    /// Dismiss whatever prompt comes next
    Cancel,
}

impl ScriptedAnswer {
    pub fn choose(label: impl Into<String>) -> Self {
        Self::Choose(label.into())
    }

    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    pub fn search(query: impl Into<String>) -> Self {
        Self::Search(query.into())
    }
}

/// What a scripted prompter was asked to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptRecord {
    Choice {
        placeholder: String,
        options: Vec<String>,
    },
    FileDialog {
        open_label: String,
        can_select_many: bool,
    },
    List {
        placeholder: String,
        items: Vec<QuickPickItem>,
    },
}

/// Answers prompts from a queue and records everything it was shown.
///
/// Running out of answers, or receiving an answer of the wrong kind, is an error so that an
/// unexpected prompt fails loudly.
#[derive(Debug, Default, fieldwork::Fieldwork)]
#[fieldwork(get)]
pub struct ScriptedPrompter {
    #[fieldwork(skip)]
    answers: VecDeque<ScriptedAnswer>,
    prompts: Vec<PromptRecord>,
    notifications: Vec<(NotifyLevel, String)>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = ScriptedAnswer>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            ..Self::default()
        }
    }

    fn next_answer(&mut self, prompt: &str) -> Result<ScriptedAnswer> {
        let answer = self
            .answers
            .pop_front()
            .ok_or_else(|| anyhow!("no scripted answer left for {prompt}"))?;
        log::trace!("{prompt} <- {answer:?}");
        Ok(answer)
    }
}

impl ChoicePrompt for ScriptedPrompter {
    fn choose(&mut self, options: &[String], config: &ChoiceOptions) -> Result<Option<usize>> {
        self.prompts.push(PromptRecord::Choice {
            placeholder: config.placeholder.clone(),
            options: options.to_vec(),
        });

        match self.next_answer("choice prompt")? {
            ScriptedAnswer::Choose(label) => options
                .iter()
                .position(|option| *option == label)
                .map(Some)
                .ok_or_else(|| anyhow!("{label:?} is not among {options:?}")),
            ScriptedAnswer::Cancel => Ok(None),
            other => Err(anyhow!("expected a choice, got {other:?}")),
        }
    }
}

impl FileDialog for ScriptedPrompter {
    fn open_file(&mut self, options: &OpenDialogOptions) -> Result<Option<PathBuf>> {
        self.prompts.push(PromptRecord::FileDialog {
            open_label: options.open_label.clone(),
            can_select_many: options.can_select_many,
        });

        match self.next_answer("file dialog")? {
            ScriptedAnswer::Path(path) => Ok(Some(path)),
            ScriptedAnswer::Cancel => Ok(None),
            other => Err(anyhow!("expected a path, got {other:?}")),
        }
    }
}

impl SearchableList for ScriptedPrompter {
    fn pick(
        &mut self,
        items: &[QuickPickItem],
        options: &QuickPickOptions,
    ) -> Result<Option<usize>> {
        self.prompts.push(PromptRecord::List {
            placeholder: options.placeholder.clone(),
            items: items.to_vec(),
        });

        match self.next_answer("searchable list")? {
            ScriptedAnswer::Search(query) => {
                let matches = super::filter_items(items, &query, options.match_on_description);
                match matches.as_slice() {
                    [index] => Ok(Some(*index)),
                    matches => Err(anyhow!(
                        "query {query:?} should match exactly one item, matched {}",
                        matches.len()
                    )),
                }
            }
            ScriptedAnswer::Cancel => Ok(None),
            other => Err(anyhow!("expected a search, got {other:?}")),
        }
    }
}

impl Notifier for ScriptedPrompter {
    fn notify(&mut self, message: &str, level: NotifyLevel) {
        self.notifications.push((level, message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(label: &str, description: &str) -> QuickPickItem {
        QuickPickItem {
            label: label.into(),
            description: description.into(),
        }
    }

    #[test]
    fn answers_in_order_and_records_prompts() {
        let mut prompter = ScriptedPrompter::new([
            ScriptedAnswer::choose("b"),
            ScriptedAnswer::path("/tmp/x.rs"),
        ]);

        let choice = prompter
            .choose(
                &["a".to_string(), "b".to_string()],
                &ChoiceOptions {
                    placeholder: "pick".into(),
                },
            )
            .unwrap();
        assert_eq!(choice, Some(1));

        let path = prompter.open_file(&OpenDialogOptions::default()).unwrap();
        assert_eq!(path, Some(PathBuf::from("/tmp/x.rs")));

        assert_eq!(prompter.prompts().len(), 2);
        assert!(prompter
            .choose(&["a".to_string()], &ChoiceOptions { placeholder: "pick".into() })
            .is_err());
    }

    #[test]
    fn search_must_be_unambiguous() {
        let items = [item("mod.rs", "src/a/mod.rs"), item("mod.rs", "src/b/mod.rs")];
        let options = QuickPickOptions {
            placeholder: "files".into(),
            match_on_description: true,
        };

        let mut prompter = ScriptedPrompter::new([ScriptedAnswer::search("b/mod")]);
        assert_eq!(prompter.pick(&items, &options).unwrap(), Some(1));

        let mut prompter = ScriptedPrompter::new([ScriptedAnswer::search("mod.rs")]);
        assert!(prompter.pick(&items, &options).is_err());
    }

    #[test]
    fn running_out_of_answers_is_an_error() {
        let mut prompter = ScriptedPrompter::new([]);
        assert!(prompter.open_file(&OpenDialogOptions::default()).is_err());
    }

    #[test]
    fn wrong_answer_kind_is_an_error() {
        let mut prompter = ScriptedPrompter::new([ScriptedAnswer::path("a")]);
        let result = prompter.choose(
            &["a".to_string()],
            &ChoiceOptions {
                placeholder: "pick".into(),
            },
        );
        assert!(result.is_err());
    }
}

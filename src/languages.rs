use std::{
    collections::HashMap,
    fmt::{self, Display, Formatter},
    path::Path,
};

use serde::{Deserialize, Serialize};

/// Classification tag of a document, e.g. `rust` or `markdown`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageId(String);

impl LanguageId {
    pub const PLAIN_TEXT: &'static str = "plaintext";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn plain_text() -> Self {
        Self::new(Self::PLAIN_TEXT)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for LanguageId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, fieldwork::Fieldwork)]
#[fieldwork(get)]
pub struct Language {
    #[fieldwork(get(copy))]
    name: &'static str,
    #[fieldwork(get(copy))]
    file_extensions: &'static [&'static str],
}

impl Language {
    pub const fn new(name: &'static str, file_extensions: &'static [&'static str]) -> Self {
        Self {
            name,
            file_extensions,
        }
    }
}

const BUILTIN_LANGUAGES: &[(&str, &[&str])] = &[
    ("c", &["c", "h"]),
    ("cpp", &["cc", "cpp", "cxx", "hpp", "hh"]),
    ("css", &["css"]),
    ("go", &["go"]),
    ("html", &["html", "htm"]),
    ("java", &["java"]),
    ("javascript", &["js", "mjs", "cjs"]),
    ("javascriptreact", &["jsx"]),
    ("json", &["json"]),
    ("markdown", &["md", "markdown"]),
    ("python", &["py", "pyi"]),
    ("ruby", &["rb"]),
    ("rust", &["rs"]),
    ("shellscript", &["sh", "bash", "zsh"]),
    ("toml", &["toml"]),
    ("typescript", &["ts", "mts", "cts"]),
    ("typescriptreact", &["tsx"]),
    ("yaml", &["yaml", "yml"]),
];

/// Registry mapping file extensions to language ids
#[derive(Debug)]
pub struct LanguageRegistry {
    extensions: HashMap<&'static str, &'static str>,
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            extensions: HashMap::new(),
        };

        for &(name, file_extensions) in BUILTIN_LANGUAGES {
            registry.register_language(Language::new(name, file_extensions));
        }

        registry
    }

    pub fn register_language(&mut self, language: Language) {
        let name = language.name();
        for &extension in language.file_extensions() {
            self.extensions.insert(extension, name);
        }
    }

    pub fn detect_language_from_path(&self, file_path: &Path) -> Option<&'static str> {
        let extension = file_path.extension()?.to_str()?.to_ascii_lowercase();
        self.extensions.get(extension.as_str()).copied()
    }

    /// Language for a file, preferring an explicit hint and falling back to plain text when
    /// nothing is recognized.
    pub fn get_language_with_hint(&self, file_path: &Path, language_hint: Option<&str>) -> LanguageId {
        language_hint
            .or_else(|| self.detect_language_from_path(file_path))
            .map(LanguageId::new)
            .unwrap_or_else(LanguageId::plain_text)
    }
}

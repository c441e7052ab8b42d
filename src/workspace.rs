use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Result};
use diffy::{DiffOptions, PatchFormatter};
use globset::Glob;
use walkdir::{DirEntry, WalkDir};

use crate::{
    document::{Document, DocumentId, Selection},
    environment::{EditSession, EditorEnvironment, Prompter, ViewState},
    languages::{LanguageId, LanguageRegistry},
};

/// Version-control metadata and OS droppings never listed as workspace files.
const EXCLUDED_NAMES: &[&str] = &[".git", ".svn", ".hg", "CVS", ".DS_Store", "Thumbs.db"];

/// A filesystem-backed editor: files under `root` are opened into memory, edited there, and
/// written back on save.
#[derive(fieldwork::Fieldwork)]
#[fieldwork(get)]
pub struct Workspace<P> {
    root: PathBuf,
    #[fieldwork(skip)]
    prompter: P,
    language_registry: LanguageRegistry,
    #[fieldwork(skip)]
    documents: BTreeMap<DocumentId, Document>,
    #[fieldwork(skip)]
    views: BTreeMap<DocumentId, ViewState>,
    /// Text of each path-backed document as last read from or written to disk
    #[fieldwork(skip)]
    on_disk: BTreeMap<DocumentId, String>,
    #[fieldwork(skip)]
    active: Option<DocumentId>,
    #[fieldwork(skip)]
    next_id: usize,
    #[fieldwork(get(copy), set, with)]
    dry_run: bool,
}

impl<P> std::fmt::Debug for Workspace<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("root", &self.root)
            .field("documents", &self.documents.len())
            .field("active", &self.active)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

fn is_excluded(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| EXCLUDED_NAMES.contains(&name))
}

impl<P: Prompter> Workspace<P> {
    pub fn new(root: impl Into<PathBuf>, prompter: P) -> Result<Self> {
        let root = root.into();
        let root = std::fs::canonicalize(&root)
            .map_err(|e| anyhow!("could not open workspace {}: {e}", root.display()))?;

        Ok(Self {
            root,
            prompter,
            language_registry: LanguageRegistry::new(),
            documents: BTreeMap::new(),
            views: BTreeMap::new(),
            on_disk: BTreeMap::new(),
            active: None,
            next_id: 0,
            dry_run: false,
        })
    }

    pub fn prompter_ref(&self) -> &P {
        &self.prompter
    }

    /// Resolve a user-typed path against the workspace root, expanding `~`.
    pub fn resolve_path(&self, path_str: &str) -> Result<PathBuf> {
        self.canonicalize(Path::new(&*shellexpand::tilde(path_str)))
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };
        std::fs::canonicalize(&path).map_err(|e| anyhow!("could not open {}: {e}", path.display()))
    }

    /// Open a file and make it the active session with the given selection.
    pub fn open_session(&mut self, path: &str, selection: Selection) -> Result<DocumentId> {
        let path = self.resolve_path(path)?;
        let id = self.open_path(&path)?;
        let view = self.views.entry(id).or_default();
        view.selection = selection;
        view.cursor = Some(selection.end);
        self.active = Some(id);
        Ok(id)
    }

    pub fn document(&self, id: DocumentId) -> Option<&Document> {
        self.documents.get(&id)
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    pub fn active_document(&self) -> Option<&Document> {
        self.active.and_then(|id| self.documents.get(&id))
    }

    pub fn untitled_documents(&self) -> impl Iterator<Item = &Document> {
        self.documents().filter(|doc| doc.is_untitled())
    }

    /// Path-backed documents whose text differs from what is on disk.
    pub fn dirty_documents(&self) -> impl Iterator<Item = &Document> {
        self.documents().filter(|doc| {
            !doc.is_untitled()
                && doc.is_dirty()
                && self
                    .on_disk
                    .get(&doc.id())
                    .map_or(true, |text| *text != doc.text())
        })
    }

    /// Save every dirty path-backed document, returning the paths written.
    pub fn save_all(&mut self) -> Result<Vec<PathBuf>> {
        let dirty = self.dirty_documents().map(|doc| doc.id()).collect::<Vec<_>>();
        let mut saved = vec![];
        for id in dirty {
            self.save(id)?;
            if self.dry_run {
                continue;
            }
            if let Some(path) = self.documents.get(&id).and_then(|doc| doc.path()) {
                saved.push(path.to_path_buf());
            }
        }
        Ok(saved)
    }

    /// Unified diff between the on-disk text of a document and its current text.
    pub fn diff(&self, id: DocumentId) -> Option<String> {
        let document = self.documents.get(&id)?;
        let original = self.on_disk.get(&id).map(String::as_str).unwrap_or_default();
        let current = document.text();
        if original == current {
            return None;
        }

        let name = document
            .path()
            .map(|path| self.relative_path(path))
            .unwrap_or_else(|| format!("untitled-{}", id.0));
        let mut options = DiffOptions::new();
        options.set_original_filename(format!("a/{name}"));
        options.set_modified_filename(format!("b/{name}"));
        let patch = options.create_patch(original, &current);
        let formatted = PatchFormatter::new().fmt_patch(&patch).to_string();
        Some(formatted)
    }

    fn insert_document(&mut self, language_id: LanguageId, path: Option<PathBuf>, text: &str) -> DocumentId {
        let id = DocumentId(self.next_id);
        self.next_id += 1;
        if path.is_some() {
            self.on_disk.insert(id, text.to_string());
        }
        self.documents
            .insert(id, Document::new(id, language_id, path, text));
        self.views.insert(id, ViewState::default());
        id
    }

    fn session_for(&mut self, id: DocumentId) -> Result<EditSession<'_>> {
        let document = self
            .documents
            .get_mut(&id)
            .ok_or_else(|| anyhow!("no open document {id:?}"))?;
        let view = self.views.entry(id).or_default();
        Ok(EditSession::new(document, view))
    }
}

impl<P: Prompter> EditorEnvironment for Workspace<P> {
    type Prompter = P;

    fn prompter(&mut self) -> &mut P {
        &mut self.prompter
    }

    fn active_session(&mut self) -> Option<EditSession<'_>> {
        let id = self.active?;
        self.session_for(id).ok()
    }

    fn session(&mut self, id: DocumentId) -> Result<EditSession<'_>> {
        self.session_for(id)
    }

    fn open_untitled(&mut self, language_id: &LanguageId, content: &str) -> Result<DocumentId> {
        let id = self.insert_document(language_id.clone(), None, content);
        log::debug!("opened untitled {language_id} document {id:?}");
        Ok(id)
    }

    fn open_path(&mut self, path: &Path) -> Result<DocumentId> {
        let path = self.canonicalize(path)?;

        if let Some(document) = self
            .documents
            .values()
            .find(|doc| doc.path() == Some(path.as_path()))
        {
            return Ok(document.id());
        }

        let text = std::fs::read_to_string(&path)
            .map_err(|e| anyhow!("could not read {}: {e}", path.display()))?;
        let language_id = self.language_registry.get_language_with_hint(&path, None);
        let id = self.insert_document(language_id, Some(path), &text);
        log::debug!("opened {id:?}");
        Ok(id)
    }

    fn show_document(&mut self, id: DocumentId) -> Result<EditSession<'_>> {
        if !self.documents.contains_key(&id) {
            return Err(anyhow!("no open document {id:?}"));
        }
        self.active = Some(id);
        self.session_for(id)
    }

    fn save(&mut self, id: DocumentId) -> Result<()> {
        let dry_run = self.dry_run;
        let document = self
            .documents
            .get_mut(&id)
            .ok_or_else(|| anyhow!("no open document {id:?}"))?;
        let path = document
            .path()
            .ok_or_else(|| anyhow!("untitled document {id:?} has no path to save to"))?
            .to_path_buf();

        if dry_run {
            log::info!("dry run: not writing {}", path.display());
            return Ok(());
        }

        let text = document.text();
        std::fs::write(&path, &text)?;
        document.mark_clean();
        self.on_disk.insert(id, text);
        log::info!("saved {}", path.display());
        Ok(())
    }

    fn find_workspace_files(&self, glob: &str) -> Result<Vec<PathBuf>> {
        let matcher = Glob::new(glob)?.compile_matcher();

        let mut files = WalkDir::new(&self.root)
            .into_iter()
            .filter_entry(|entry| !is_excluded(entry))
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    log::warn!("skipping unreadable workspace entry: {e}");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(DirEntry::into_path)
            .filter(|path| {
                path.strip_prefix(&self.root)
                    .is_ok_and(|relative| matcher.is_match(relative))
            })
            .collect::<Vec<_>>();

        files.sort();
        log::debug!("{} workspace files match {glob}", files.len());
        Ok(files)
    }

    fn relative_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::{
        document::{EditTransaction, Position},
        prompt::ScriptedPrompter,
    };

    fn workspace(dir: &Path) -> Workspace<ScriptedPrompter> {
        Workspace::new(dir, ScriptedPrompter::default()).unwrap()
    }

    #[test]
    fn open_path_reuses_documents() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.rs"), "fn a() {}\n").unwrap();
        let mut ws = workspace(dir.path());

        let first = ws.open_path(Path::new("a.rs")).unwrap();
        let second = ws.open_path(&dir.path().join("a.rs")).unwrap();
        assert_eq!(first, second);
        assert_eq!(ws.documents().count(), 1);
        assert_eq!(ws.document(first).unwrap().language_id().as_str(), "rust");
    }

    #[test]
    fn open_path_takes_paths_literally() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("~")).unwrap();
        fs::write(dir.path().join("~/notes.txt"), "notes\n").unwrap();
        let mut ws = workspace(dir.path());

        let id = ws.open_path(Path::new("~/notes.txt")).unwrap();
        assert_eq!(ws.document(id).unwrap().text(), "notes\n");
    }

    #[cfg(unix)]
    #[test]
    fn open_path_accepts_non_utf8_names() {
        use std::{ffi::OsStr, os::unix::ffi::OsStrExt};

        let dir = tempfile::tempdir().unwrap();
        let name = OsStr::from_bytes(b"caf\xe9.txt");
        if fs::write(dir.path().join(name), "x\n").is_err() {
            // Some filesystems refuse names that are not valid UTF-8.
            return;
        }
        let mut ws = workspace(dir.path());

        let id = ws.open_path(Path::new(name)).unwrap();
        assert_eq!(ws.document(id).unwrap().text(), "x\n");
    }

    #[test]
    fn open_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut ws = workspace(dir.path());
        assert!(ws.open_path(Path::new("missing.rs")).is_err());
    }

    #[test]
    fn save_writes_and_cleans() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "one\n").unwrap();
        let mut ws = workspace(dir.path());

        let id = ws.open_path(&path).unwrap();
        ws.session(id)
            .unwrap()
            .apply_edit(EditTransaction::new().insert(Position::new(1, 0), "two\n"))
            .unwrap();
        assert_eq!(ws.dirty_documents().count(), 1);
        assert!(ws.diff(id).unwrap().contains("+two"));

        ws.save(id).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "one\ntwo\n");
        assert_eq!(ws.dirty_documents().count(), 0);
        assert_eq!(ws.diff(id), None);
    }

    #[test]
    fn dry_run_does_not_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "one\n").unwrap();
        let mut ws = workspace(dir.path()).with_dry_run(true);

        let id = ws.open_path(&path).unwrap();
        ws.session(id)
            .unwrap()
            .apply_edit(EditTransaction::new().insert(Position::new(0, 0), "zero\n"))
            .unwrap();
        ws.save(id).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "one\n");
        assert!(ws.diff(id).unwrap().contains("+zero"));
    }

    #[test]
    fn save_all_writes_only_changed_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.txt", "b.txt", "c.txt"] {
            fs::write(dir.path().join(name), "one\n").unwrap();
        }
        let mut ws = workspace(dir.path());

        let a = ws.open_path(Path::new("a.txt")).unwrap();
        ws.open_path(Path::new("b.txt")).unwrap();
        let c = ws.open_path(Path::new("c.txt")).unwrap();
        ws.open_untitled(&LanguageId::plain_text(), "scratch").unwrap();
        for id in [a, c] {
            ws.session(id)
                .unwrap()
                .apply_edit(EditTransaction::new().insert(Position::new(1, 0), "two\n"))
                .unwrap();
        }

        let saved = ws.save_all().unwrap();

        let root = ws.root().to_path_buf();
        assert_eq!(saved, [root.join("a.txt"), root.join("c.txt")]);
        assert_eq!(fs::read_to_string(dir.path().join("a.txt")).unwrap(), "one\ntwo\n");
        assert_eq!(fs::read_to_string(dir.path().join("b.txt")).unwrap(), "one\n");
        assert_eq!(fs::read_to_string(dir.path().join("c.txt")).unwrap(), "one\ntwo\n");
        assert_eq!(ws.dirty_documents().count(), 0);
        assert_eq!(ws.untitled_documents().count(), 1);
    }

    #[test]
    fn save_all_in_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "one\n").unwrap();
        let mut ws = workspace(dir.path()).with_dry_run(true);

        let id = ws.open_path(Path::new("a.txt")).unwrap();
        ws.session(id)
            .unwrap()
            .apply_edit(EditTransaction::new().insert(Position::new(0, 0), "zero\n"))
            .unwrap();

        assert!(ws.save_all().unwrap().is_empty());
        assert_eq!(fs::read_to_string(dir.path().join("a.txt")).unwrap(), "one\n");
        assert_eq!(ws.dirty_documents().count(), 1);
    }

    #[test]
    fn untitled_documents_cannot_be_saved() {
        let dir = tempfile::tempdir().unwrap();
        let mut ws = workspace(dir.path());
        let id = ws.open_untitled(&LanguageId::new("rust"), "fn a() {}").unwrap();
        assert!(ws.save(id).is_err());
        assert_eq!(ws.untitled_documents().count(), 1);
        assert_eq!(ws.document(id).unwrap().text(), "fn a() {}");
    }

    #[test]
    fn workspace_files_skip_version_control_and_os_files() {
        let dir = tempfile::tempdir().unwrap();
        for file in [
            "src/lib.rs",
            "README.md",
            ".git/config",
            ".hg/store",
            "src/.DS_Store",
            "Thumbs.db",
            ".github/workflows/ci.yml",
            "target/debug/out",
            "docs/a/b.md",
        ] {
            let path = dir.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "").unwrap();
        }
        let ws = workspace(dir.path());

        let files = ws
            .find_workspace_files("**/*")
            .unwrap()
            .into_iter()
            .map(|path| ws.relative_path(&path))
            .collect::<Vec<_>>();
        assert_eq!(
            files,
            [
                ".github/workflows/ci.yml",
                "README.md",
                "docs/a/b.md",
                "src/lib.rs",
                "target/debug/out"
            ]
        );

        let markdown = ws.find_workspace_files("**/*.md").unwrap();
        assert_eq!(markdown.len(), 2);
    }

    #[test]
    fn empty_workspace_has_no_files() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        assert!(ws.find_workspace_files("**/*").unwrap().is_empty());
    }

    #[test]
    fn open_session_sets_selection_and_cursor() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.rs"), "a\nb\n").unwrap();
        let mut ws = workspace(dir.path());

        let selection = Selection::new(Position::new(0, 0), Position::new(1, 1));
        let id = ws.open_session("a.rs", selection).unwrap();
        let session = ws.active_session().unwrap();
        assert_eq!(session.document().id(), id);
        assert_eq!(session.selection(), selection);
        assert_eq!(session.cursor(), Some(Position::new(1, 1)));
    }
}

//! Path-bound documents.
//!
//! A [`File`] pairs a resolved path with a lazily loaded [`Document`]. Paths
//! may start with `~` and may contain name placeholders; both are resolved
//! when the handle is created. Text access on binary content fails, while
//! saving, moving and deleting work on raw bytes.

use std::cell::{Cell, OnceCell};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::application::ApplicationError;
use crate::application::ports::Filesystem;
use crate::domain::encoding::{self, TextEncoding};
use crate::domain::text::is_binary;
use crate::domain::{Document, DomainError, LineCollection, substitute};
use crate::error::QuillResult;

/// Expand a leading `~` and substitute name placeholders.
pub fn resolve_path(path: impl AsRef<Path>, name: Option<&str>) -> PathBuf {
    let raw = path.as_ref().to_string_lossy();
    let expanded = match raw.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with(['/', '\\']) => match dirs::home_dir() {
            Some(home) => format!("{}{}", home.display(), rest),
            None => raw.to_string(),
        },
        _ => raw.to_string(),
    };
    PathBuf::from(substitute(&expanded, name).into_owned())
}

fn ends_with_separator(path: &Path) -> bool {
    path.to_string_lossy().ends_with(['/', '\\'])
}

/// A text or binary file behind a [`Filesystem`].
pub struct File {
    path: PathBuf,
    fs: Arc<dyn Filesystem>,
    document: OnceCell<Document>,
    encoding: Cell<TextEncoding>,
}

impl File {
    /// Bind a handle to `path`, substituting its placeholders for `name`.
    ///
    /// Nothing is read until the content is first needed.
    pub fn new(fs: Arc<dyn Filesystem>, path: impl AsRef<Path>, name: Option<&str>) -> Self {
        Self {
            path: resolve_path(path, name),
            fs,
            document: OnceCell::new(),
            encoding: Cell::new(TextEncoding::default()),
        }
    }

    // ========================================================================
    // Path accessors
    // ========================================================================

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.fs.exists(&self.path)
    }

    /// File name with extension.
    pub fn filename(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// File name without extension.
    pub fn name(&self) -> String {
        self.path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
    }

    /// Directory containing the file.
    pub fn dirname(&self) -> PathBuf {
        self.path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    /// Name of the directory containing the file.
    pub fn folder(&self) -> String {
        self.dirname()
            .components()
            .next_back()
            .and_then(|c| match c {
                Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            })
            .unwrap_or_default()
    }

    pub fn absolute_path(&self) -> QuillResult<PathBuf> {
        std::path::absolute(&self.path)
            .map_err(|e| ApplicationError::filesystem(&self.path, e).into())
    }

    // ========================================================================
    // Content
    // ========================================================================

    fn read_bytes(&self) -> QuillResult<Vec<u8>> {
        if !self.exists() {
            return Ok(Vec::new());
        }
        self.fs.read(&self.path)
    }

    fn binary_error(&self) -> DomainError {
        DomainError::BinaryContent {
            path: self.path.display().to_string(),
        }
    }

    /// Whether the file on disk looks binary. Missing files are text.
    pub fn is_binary(&self) -> QuillResult<bool> {
        Ok(is_binary(&self.read_bytes()?))
    }

    fn read_text(&self) -> QuillResult<(String, TextEncoding)> {
        let bytes = self.read_bytes()?;
        if is_binary(&bytes) {
            return Err(self.binary_error().into());
        }
        encoding::decode(&bytes).ok_or_else(|| self.binary_error().into())
    }

    /// Encoding of the loaded text, reused on save.
    pub fn encoding(&self) -> TextEncoding {
        self.encoding.get()
    }

    /// Encode `text` as this file was read, falling back to UTF-8 when a
    /// character has no mapping in the original encoding.
    fn encode(&self, text: &str, target: &Path) -> Vec<u8> {
        let original = self.encoding.get();
        encoding::encode(text, original).unwrap_or_else(|| {
            warn!(
                path = %target.display(),
                encoding = %original,
                "unmappable characters, writing UTF-8"
            );
            text.as_bytes().to_vec()
        })
    }

    /// Read the file into the document, discarding unsaved edits.
    ///
    /// A missing file loads as empty text.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> QuillResult<&Self> {
        let (text, detected) = self.read_text()?;
        self.encoding.set(detected);
        match self.document.get() {
            Some(doc) => {
                doc.set_text(&text);
            }
            None => {
                let _ = self.document.set(Document::from_text(&text));
            }
        }
        debug!(encoding = %detected, "Loaded file");
        Ok(self)
    }

    /// The document, loaded from disk on first access.
    ///
    /// # Errors
    ///
    /// [`DomainError::BinaryContent`] for binary files.
    pub fn document(&self) -> QuillResult<Document> {
        if let Some(doc) = self.document.get() {
            return Ok(doc.clone());
        }
        self.load()?;
        self.document
            .get()
            .cloned()
            .ok_or_else(|| self.binary_error().into())
    }

    pub fn text(&self) -> QuillResult<String> {
        Ok(self.document()?.text())
    }

    pub fn set_text(&self, text: &str) -> QuillResult<&Self> {
        self.document()?.set_text(text);
        Ok(self)
    }

    pub fn text_array(&self) -> QuillResult<Vec<String>> {
        Ok(self.document()?.text_array())
    }

    pub fn lines(&self) -> QuillResult<LineCollection> {
        Ok(self.document()?.lines())
    }

    pub fn is_empty(&self) -> QuillResult<bool> {
        Ok(self.text()?.is_empty())
    }

    /// Fill an empty file from a template file.
    pub fn use_template_if_empty(
        &self,
        template: impl AsRef<Path>,
        name: Option<&str>,
    ) -> QuillResult<&Self> {
        if self.is_empty()? {
            let template = File::new(self.fs.clone(), template, None);
            let text = template.text()?;
            self.set_text(&substitute(&text, name))?;
        }
        Ok(self)
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Write the content back to this file's path.
    pub fn save(&self) -> QuillResult<File> {
        self.save_as(self.path.clone(), None)
    }

    /// Write the content to `destination` and return a handle bound to it.
    ///
    /// A destination ending in `/` receives this file's name. Placeholders in
    /// the destination and in text content are substituted for `name`; binary
    /// content is copied byte for byte. Text is written back in the encoding
    /// it was read with. Missing parent directories are created. This handle
    /// keeps its own path.
    #[instrument(skip(self, destination), fields(from = %self.path.display()))]
    pub fn save_as(&self, destination: impl AsRef<Path>, name: Option<&str>) -> QuillResult<File> {
        let destination = destination.as_ref();
        let destination = if ends_with_separator(destination) {
            destination.join(self.filename())
        } else {
            destination.to_path_buf()
        };
        let target = resolve_path(&destination, name);

        let content = match self.document.get() {
            Some(doc) => self.encode(&substitute(&doc.text(), name), &target),
            None => {
                let bytes = self.read_bytes()?;
                match name.filter(|n| !n.is_empty()).and_then(|_| encoding::decode(&bytes)) {
                    Some((text, detected)) if !is_binary(&bytes) => {
                        self.encoding.set(detected);
                        self.encode(&substitute(&text, name), &target)
                    }
                    // Nothing to substitute, or binary: copy byte for byte.
                    _ => bytes,
                }
            }
        };

        let existed = self.fs.exists(&target);
        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.fs.create_dir_all(parent)?;
        }
        self.fs.write(&target, &content)?;

        if existed {
            info!(path = %target.display(), "updated");
        } else {
            info!(path = %target.display(), "created");
        }

        Ok(File::new(self.fs.clone(), target, None))
    }

    /// Save to `destination` and delete this file.
    pub fn move_to(&self, destination: impl AsRef<Path>, name: Option<&str>) -> QuillResult<File> {
        let moved = self.save_as(destination, name)?;
        if moved.path() != self.path() {
            self.fs.remove_file(&self.path)?;
        }
        info!(from = %self.path.display(), to = %moved.path().display(), "moved");
        Ok(moved)
    }

    /// Move within the same directory. A new name without an extension keeps
    /// the current one.
    pub fn rename(&self, filename: &str, name: Option<&str>) -> QuillResult<File> {
        let mut filename = filename.to_string();
        if Path::new(&filename).extension().is_none() {
            if let Some(ext) = self.extension() {
                filename = format!("{filename}.{ext}");
            }
        }
        self.move_to(self.dirname().join(filename), name)
    }

    /// # Errors
    ///
    /// [`ApplicationError::FileNotFound`] when there is nothing to delete.
    pub fn delete(&self) -> QuillResult<()> {
        if !self.exists() {
            return Err(ApplicationError::FileNotFound {
                path: self.path.clone(),
            }
            .into());
        }
        self.fs.remove_file(&self.path)?;
        info!(path = %self.path.display(), "deleted");
        Ok(())
    }

    pub fn chmod(&self, mode: u32) -> QuillResult<&Self> {
        self.fs.set_permissions(&self.path, mode)?;
        info!(path = %self.path.display(), mode = %format!("{mode:o}"), "permission changed");
        Ok(self)
    }
}

impl fmt::Debug for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("File")
            .field("path", &self.path)
            .field("loaded", &self.document.get().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockFilesystem;
    use crate::domain::text::EOL;
    use crate::error::QuillError;
    use mockall::predicate::{always, eq};

    fn mock() -> MockFilesystem {
        MockFilesystem::new()
    }

    #[test]
    fn path_accessors() {
        let file = File::new(Arc::new(mock()), "src/models/user.rs", None);
        assert_eq!(file.filename(), "user.rs");
        assert_eq!(file.name(), "user");
        assert_eq!(file.extension().as_deref(), Some("rs"));
        assert_eq!(file.dirname(), PathBuf::from("src/models"));
        assert_eq!(file.folder(), "models");
    }

    #[test]
    fn path_placeholders_are_resolved() {
        let file = File::new(Arc::new(mock()), "src/__na-me__/__NaMe__.ts", Some("userProfile"));
        assert_eq!(file.path(), Path::new("src/user-profile/UserProfile.ts"));
    }

    #[test]
    fn tilde_expands_to_home() {
        let Some(home) = dirs::home_dir() else { return };
        let resolved = resolve_path("~/notes.txt", None);
        assert_eq!(resolved, PathBuf::from(format!("{}/notes.txt", home.display())));
        assert_eq!(resolve_path("~user/x", None), PathBuf::from("~user/x"));
    }

    #[test]
    fn missing_file_loads_as_empty_text() {
        let mut fs = mock();
        fs.expect_exists().return_const(false);
        fs.expect_read().never();

        let file = File::new(Arc::new(fs), "nope.txt", None);
        assert_eq!(file.text().unwrap(), "");
        assert!(file.is_empty().unwrap());
    }

    #[test]
    fn text_access_on_binary_fails() {
        let mut fs = mock();
        fs.expect_exists().return_const(true);
        fs.expect_read()
            .returning(|_| Ok(vec![0x89, b'P', b'N', b'G', 0x00, 0x01]));

        let file = File::new(Arc::new(fs), "logo.png", None);
        assert!(file.is_binary().unwrap());
        let err = file.text().unwrap_err();
        assert!(matches!(
            err,
            QuillError::Domain(DomainError::BinaryContent { .. })
        ));
        assert!(file.lines().is_err());
    }

    #[test]
    fn save_as_directory_keeps_filename_and_substitutes() {
        let mut fs = mock();
        fs.expect_exists()
            .with(eq(PathBuf::from("tpl/__na-me__.rs")))
            .return_const(true);
        fs.expect_read()
            .returning(|_| Ok(b"pub struct __NaMe__;".to_vec()));
        fs.expect_exists()
            .with(eq(PathBuf::from("src/order-item.rs")))
            .return_const(false);
        fs.expect_create_dir_all()
            .with(eq(PathBuf::from("src")))
            .times(1)
            .returning(|_| Ok(()));
        fs.expect_write()
            .with(
                eq(PathBuf::from("src/order-item.rs")),
                eq(b"pub struct OrderItem;".to_vec()),
            )
            .times(1)
            .returning(|_, _| Ok(()));

        let template = File::new(Arc::new(fs), "tpl/__na-me__.rs", None);
        let saved = template.save_as("src/", Some("orderItem")).unwrap();

        assert_eq!(saved.path(), Path::new("src/order-item.rs"));
        assert_eq!(template.path(), Path::new("tpl/__na-me__.rs"));
    }

    #[test]
    fn save_as_copies_binary_bytes_unchanged() {
        let bytes = vec![0x00, 0xff, b'_', b'_', b'n', b'a', b'm', b'e', b'_', b'_'];
        let expected = bytes.clone();

        let mut fs = mock();
        fs.expect_exists().return_const(true);
        fs.expect_read().returning(move |_| Ok(bytes.clone()));
        fs.expect_create_dir_all().returning(|_| Ok(()));
        fs.expect_write()
            .with(always(), eq(expected))
            .times(1)
            .returning(|_, _| Ok(()));

        let file = File::new(Arc::new(fs), "a/icon.bin", None);
        file.save_as("b/icon.bin", Some("foo")).unwrap();
    }

    const LATIN1: &[u8] = b"Le caf\xe9 cr\xe8me co\xfbte deux euros, m\xeame \xe0 la gare.\n";

    fn legacy_file(content: &'static [u8]) -> MockFilesystem {
        let mut fs = mock();
        fs.expect_exists().return_const(true);
        fs.expect_read().returning(move |_| Ok(content.to_vec()));
        fs
    }

    #[test]
    fn unedited_legacy_text_saves_byte_for_byte() {
        let mut fs = legacy_file(LATIN1);
        fs.expect_write()
            .with(eq(PathBuf::from("menu.txt")), eq(LATIN1.to_vec()))
            .times(1)
            .returning(|_, _| Ok(()));

        let file = File::new(Arc::new(fs), "menu.txt", None);
        assert!(!file.is_binary().unwrap());
        file.save().unwrap();
    }

    #[test]
    fn edited_legacy_text_keeps_its_encoding() {
        let mut expected = LATIN1[..LATIN1.len() - 1].to_vec();
        expected.extend_from_slice(format!("{EOL}{EOL}fin").as_bytes());

        let mut fs = legacy_file(LATIN1);
        fs.expect_write()
            .with(eq(PathBuf::from("menu.txt")), eq(expected))
            .times(1)
            .returning(|_, _| Ok(()));

        let file = File::new(Arc::new(fs), "menu.txt", None);
        file.document().unwrap().append(["fin"]).unwrap();
        assert!(matches!(file.encoding(), TextEncoding::Legacy(_)));
        file.save().unwrap();
    }

    #[test]
    fn named_copy_of_legacy_text_substitutes_in_place() {
        const TEMPLATE: &[u8] =
            b"Le caf\xe9 cr\xe8me co\xfbte deux euros, m\xeame \xe0 la gare: __na-me__";
        let mut expected = TEMPLATE[..TEMPLATE.len() - "__na-me__".len()].to_vec();
        expected.extend_from_slice(b"order-item");

        let mut fs = legacy_file(TEMPLATE);
        fs.expect_write()
            .with(eq(PathBuf::from("out.txt")), eq(expected))
            .times(1)
            .returning(|_, _| Ok(()));

        let file = File::new(Arc::new(fs), "menu.txt", None);
        file.save_as("out.txt", Some("orderItem")).unwrap();
    }

    #[test]
    fn delete_missing_file_is_not_found() {
        let mut fs = mock();
        fs.expect_exists().return_const(false);
        fs.expect_remove_file().never();

        let err = File::new(Arc::new(fs), "gone.txt", None).delete().unwrap_err();
        assert!(matches!(
            err,
            QuillError::Application(ApplicationError::FileNotFound { .. })
        ));
    }

    #[test]
    fn chmod_forwards_the_mode() {
        let mut fs = mock();
        fs.expect_set_permissions()
            .with(eq(PathBuf::from("bin/run")), eq(0o755))
            .times(1)
            .returning(|_, _| Ok(()));

        File::new(Arc::new(fs), "bin/run", None).chmod(0o755).unwrap();
    }
}

use std::cell::RefCell;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Durable backing for an experience store.
pub trait ExperienceStorage: fmt::Debug {
    /// Returns the stored text, or `None` when nothing has been saved yet.
    fn read(&self) -> io::Result<Option<String>>;

    fn write(&self, contents: &str) -> io::Result<()>;
}

/// Experience kept in a single JSON file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ExperienceStorage for FileStorage {
    fn read(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Writes next to the target and renames over it, so readers never see a half-written file.
    fn write(&self, contents: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);

        fs::write(&staging, contents)?;
        fs::rename(&staging, &self.path)
    }
}

/// In-process storage. Clones share the same contents, which lets several
/// stores stand in for sessions saving to one file.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    contents: Rc<RefCell<Option<String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Rc::new(RefCell::new(Some(contents.into()))),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.borrow().clone()
    }
}

impl ExperienceStorage for MemoryStorage {
    fn read(&self) -> io::Result<Option<String>> {
        Ok(self.contents())
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        *self.contents.borrow_mut() = Some(contents.to_owned());
        Ok(())
    }
}

impl<S: ExperienceStorage + ?Sized> ExperienceStorage for &S {
    fn read(&self) -> io::Result<Option<String>> {
        (**self).read()
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        (**self).write(contents)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fresh directory under the system temp dir, unique per call.
    pub(crate) fn scratch_dir(name: &str) -> PathBuf {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let unique = COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!(
            "minehint-{name}-{}-{unique}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn missing_file_reads_as_none() {
        let storage = FileStorage::new(scratch_dir("missing").join("nothing.json"));
        assert_eq!(storage.read().unwrap(), None);
    }

    #[test]
    fn file_write_creates_parent_and_replaces_contents() {
        let dir = scratch_dir("write");
        let storage = FileStorage::new(dir.join("nested").join("experience.json"));

        storage.write("first").unwrap();
        storage.write("second").unwrap();

        assert_eq!(storage.read().unwrap().as_deref(), Some("second"));
        assert!(!dir.join("nested").join("experience.json.tmp").exists());
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn memory_clones_share_contents() {
        let a = MemoryStorage::new();
        let b = a.clone();

        a.write("shared").unwrap();

        assert_eq!(b.read().unwrap().as_deref(), Some("shared"));
    }
}

use std::cell::RefCell;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::rc::Rc;

use crate::error::StoreError;
use crate::project::Project;

pub const PROJECTS_KEY: &str = "projects";

/// Persistence backend for the project list.
pub trait ProjectStore {
    /// Returns an empty list when nothing was saved yet.
    fn load(&self) -> Result<Vec<Project>, StoreError>;
    fn save(&self, projects: &[Project]) -> Result<(), StoreError>;
}

/// Key-value store on disk: each key is a JSON file inside `dir`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
    key: String,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_key(dir, PROJECTS_KEY)
    }

    pub fn with_key(dir: impl Into<PathBuf>, key: &str) -> Self {
        Self {
            dir: dir.into(),
            key: key.to_string(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.key))
    }
}

impl ProjectStore for JsonFileStore {
    fn load(&self) -> Result<Vec<Project>, StoreError> {
        let content = match fs::read_to_string(self.path()) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        if content.trim().is_empty() || content.trim() == "null" {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, projects: &[Project]) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let content = serde_json::to_string_pretty(projects)?;
        let target = self.path();
        let tmp = self.dir.join(format!(".{}.json.tmp", self.key));
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &target)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryInner {
    saved: Option<Vec<Project>>,
    attempts: usize,
    saves: usize,
    fail_saves: bool,
}

/// In-memory store. Clones share the same contents, so a test can keep a
/// handle and inspect what the tracker saved.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    inner: Rc<RefCell<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_projects(projects: Vec<Project>) -> Self {
        let store = Self::default();
        store.inner.borrow_mut().saved = Some(projects);
        store
    }

    /// Last saved list, `None` if nothing was ever stored.
    pub fn snapshot(&self) -> Option<Vec<Project>> {
        self.inner.borrow().saved.clone()
    }

    /// Every `save` call, failed ones included.
    pub fn save_attempts(&self) -> usize {
        self.inner.borrow().attempts
    }

    pub fn successful_saves(&self) -> usize {
        self.inner.borrow().saves
    }

    /// Makes every following `save` fail, like a full or missing disk.
    pub fn fail_saves(&self, fail: bool) {
        self.inner.borrow_mut().fail_saves = fail;
    }
}

impl ProjectStore for MemoryStore {
    fn load(&self) -> Result<Vec<Project>, StoreError> {
        Ok(self.inner.borrow().saved.clone().unwrap_or_default())
    }

    fn save(&self, projects: &[Project]) -> Result<(), StoreError> {
        let mut inner = self.inner.borrow_mut();
        inner.attempts += 1;
        if inner.fail_saves {
            return Err(StoreError::Unavailable("quota exceeded".to_string()));
        }
        inner.saved = Some(projects.to_vec());
        inner.saves += 1;
        Ok(())
    }
}

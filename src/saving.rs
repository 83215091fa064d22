use bincode::{deserialize_from, serialize_into};
use chrono::Utc;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use log::{info, warn};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{OrderError, Result};
use crate::images::random_suffix;
use crate::project::{Project, ProjectSummary, StoredProject};

const PROJECT_EXTENSION: &str = "bin.gz";

/// Where saved projects live.
pub trait ProjectRepository: Send + Sync {
    /// Insert, or replace the project whose order number matches exactly.
    /// Returns the id of the saved project.
    fn upsert(&self, project: &Project) -> Result<String>;

    fn get(&self, id: &str) -> Result<Option<StoredProject>>;

    /// Newest first; `filter` is a case-insensitive order number substring.
    fn list(&self, filter: Option<&str>) -> Result<Vec<ProjectSummary>>;

    /// Remove a project together with its rows and image records.
    fn delete(&self, id: &str) -> Result<bool>;
}

/// Remote side of the filter keyword list.
pub trait KeywordRemote: Send + Sync {
    fn fetch(&self) -> Result<Vec<String>>;
    fn insert(&self, keyword: &str) -> Result<()>;
    fn remove(&self, keyword: &str) -> Result<()>;
}

/// Blob storage for uploaded images.
pub trait ImageStore: Send + Sync {
    /// Store `bytes` under the project's namespace and return a public URL.
    fn upload(&self, project_id: &str, file_name: &str, bytes: &[u8]) -> Result<String>;

    fn delete(&self, public_url: &str) -> Result<bool>;
}

pub fn save_project_file(stored: &StoredProject, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut writer = BufWriter::new(encoder);

    serialize_into(&mut writer, stored)?;
    writer.flush()?;
    writer.into_inner().map_err(|e| e.into_error())?.finish()?;

    Ok(())
}

pub fn load_project_file(path: &Path) -> Result<StoredProject> {
    let file = File::open(path)?;
    let decoder = GzDecoder::new(file);
    let mut reader = BufReader::new(decoder);

    let stored: StoredProject = deserialize_from(&mut reader)?;

    Ok(stored)
}

fn matches_filter(order_no: &str, filter: Option<&str>) -> bool {
    match filter.map(str::trim).filter(|f| !f.is_empty()) {
        Some(f) => order_no.to_lowercase().contains(&f.to_lowercase()),
        None => true,
    }
}

fn summaries(mut projects: Vec<StoredProject>, filter: Option<&str>) -> Vec<ProjectSummary> {
    projects.retain(|p| matches_filter(&p.project.order_no, filter));
    projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    projects.iter().map(StoredProject::summary).collect()
}

/// One gzip-compressed bincode file per project.
pub struct FileProjectRepository {
    dir: PathBuf,
    // Serialises read-modify-write of upserts.
    lock: Mutex<()>,
}

impl FileProjectRepository {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(FileProjectRepository {
            dir,
            lock: Mutex::new(()),
        })
    }

    fn path_for(&self, id: &str) -> Result<PathBuf> {
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(OrderError::NotFound(format!("Project {}", id)));
        }
        Ok(self.dir.join(format!("{}.{}", id, PROJECT_EXTENSION)))
    }

    fn load_all(&self) -> Result<Vec<StoredProject>> {
        let mut projects = Vec::new();
        for entry in fs::read_dir(&self.dir)?.flatten() {
            let path = entry.path();
            let is_project = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(PROJECT_EXTENSION));
            if !is_project {
                continue;
            }
            match load_project_file(&path) {
                Ok(stored) => projects.push(stored),
                Err(e) => warn!("Skipping unreadable project file {}: {}", path.display(), e),
            }
        }
        Ok(projects)
    }
}

impl ProjectRepository for FileProjectRepository {
    fn upsert(&self, project: &Project) -> Result<String> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let now = Utc::now();

        let existing = self
            .load_all()?
            .into_iter()
            .find(|p| p.project.order_no == project.order_no);

        let stored = match existing {
            Some(mut found) => {
                info!("Updating project {} ({})", found.id, project.order_no);
                found.project = project.clone();
                found.updated_at = now;
                found
            }
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                info!("Creating project {} ({})", id, project.order_no);
                StoredProject {
                    id,
                    created_at: now,
                    updated_at: now,
                    project: project.clone(),
                }
            }
        };

        save_project_file(&stored, &self.path_for(&stored.id)?)?;
        Ok(stored.id)
    }

    fn get(&self, id: &str) -> Result<Option<StoredProject>> {
        let Ok(path) = self.path_for(id) else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }
        load_project_file(&path).map(Some)
    }

    fn list(&self, filter: Option<&str>) -> Result<Vec<ProjectSummary>> {
        Ok(summaries(self.load_all()?, filter))
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let Ok(path) = self.path_for(id) else {
            return Ok(false);
        };
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(path)?;
        info!("Deleted project {}", id);
        Ok(true)
    }
}

/// In-memory repository, handy as a test double.
#[derive(Default)]
pub struct MemoryProjectRepository {
    projects: Mutex<Vec<StoredProject>>,
}

impl MemoryProjectRepository {
    pub fn new() -> Self {
        MemoryProjectRepository::default()
    }
}

impl ProjectRepository for MemoryProjectRepository {
    fn upsert(&self, project: &Project) -> Result<String> {
        let mut projects = self.projects.lock().unwrap_or_else(|e| e.into_inner());
        let now = Utc::now();

        if let Some(found) = projects
            .iter_mut()
            .find(|p| p.project.order_no == project.order_no)
        {
            found.project = project.clone();
            found.updated_at = now;
            return Ok(found.id.clone());
        }

        let id = uuid::Uuid::new_v4().to_string();
        projects.push(StoredProject {
            id: id.clone(),
            created_at: now,
            updated_at: now,
            project: project.clone(),
        });
        Ok(id)
    }

    fn get(&self, id: &str) -> Result<Option<StoredProject>> {
        let projects = self.projects.lock().unwrap_or_else(|e| e.into_inner());
        Ok(projects.iter().find(|p| p.id == id).cloned())
    }

    fn list(&self, filter: Option<&str>) -> Result<Vec<ProjectSummary>> {
        let projects = self.projects.lock().unwrap_or_else(|e| e.into_inner());
        Ok(summaries(projects.clone(), filter))
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let mut projects = self.projects.lock().unwrap_or_else(|e| e.into_inner());
        let before = projects.len();
        projects.retain(|p| p.id != id);
        Ok(projects.len() != before)
    }
}

fn read_keyword_file(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn write_keyword_file(path: &Path, keywords: &[String]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(keywords)?)?;
    Ok(())
}

/// Keyword list kept in a JSON file.
pub struct FileKeywordRemote {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileKeywordRemote {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileKeywordRemote {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }
}

impl KeywordRemote for FileKeywordRemote {
    fn fetch(&self) -> Result<Vec<String>> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        read_keyword_file(&self.path)
    }

    fn insert(&self, keyword: &str) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut keywords = read_keyword_file(&self.path)?;
        if !keywords.iter().any(|k| k == keyword) {
            keywords.push(keyword.to_string());
            write_keyword_file(&self.path, &keywords)?;
        }
        Ok(())
    }

    fn remove(&self, keyword: &str) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut keywords = read_keyword_file(&self.path)?;
        keywords.retain(|k| k != keyword);
        write_keyword_file(&self.path, &keywords)
    }
}

/// Result of adding a keyword from the settings page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeywordAdded {
    Added,
    AlreadyPresent,
    Empty,
}

/// Filter keywords with a local cache in front of the remote list
///
/// The cache is written first and remote failures are only logged, so adding
/// and removing never fail from the caller's point of view.
pub struct KeywordService {
    remote: Box<dyn KeywordRemote>,
    cache_path: PathBuf,
}

impl KeywordService {
    pub fn new(remote: Box<dyn KeywordRemote>, cache_path: impl Into<PathBuf>) -> Self {
        KeywordService {
            remote,
            cache_path: cache_path.into(),
        }
    }

    fn cached(&self) -> Vec<String> {
        read_keyword_file(&self.cache_path).unwrap_or_else(|e| {
            warn!("Error reading local keyword cache: {}", e);
            Vec::new()
        })
    }

    fn store_cache(&self, keywords: &[String]) {
        if let Err(e) = write_keyword_file(&self.cache_path, keywords) {
            warn!("Error updating local keyword cache: {}", e);
        }
    }

    /// Remote keywords when there are any, otherwise the local cache.
    pub fn keywords(&self) -> Vec<String> {
        match self.remote.fetch() {
            Ok(remote) if !remote.is_empty() => remote,
            Ok(_) => self.cached(),
            Err(e) => {
                warn!("Error loading filter keywords, using local cache: {}", e);
                self.cached()
            }
        }
    }

    pub fn add(&self, keyword: &str) -> KeywordAdded {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return KeywordAdded::Empty;
        }
        if self.keywords().iter().any(|k| k == keyword) {
            return KeywordAdded::AlreadyPresent;
        }

        let mut cache = self.cached();
        if !cache.iter().any(|k| k == keyword) {
            cache.push(keyword.to_string());
            self.store_cache(&cache);
        }

        if let Err(e) = self.remote.insert(keyword) {
            warn!("Error adding filter keyword to remote list: {}", e);
        }
        KeywordAdded::Added
    }

    pub fn remove(&self, keyword: &str) {
        let mut cache = self.cached();
        cache.retain(|k| k != keyword);
        self.store_cache(&cache);

        if let Err(e) = self.remote.remove(keyword) {
            warn!("Error removing filter keyword from remote list: {}", e);
        }
    }
}

/// Images written below a directory that is served under `public_prefix`.
pub struct FileImageStore {
    root: PathBuf,
    public_prefix: String,
}

impl FileImageStore {
    pub fn new(root: impl Into<PathBuf>, public_prefix: &str) -> Self {
        FileImageStore {
            root: root.into(),
            public_prefix: public_prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn safe_segment(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

impl ImageStore for FileImageStore {
    fn upload(&self, project_id: &str, file_name: &str, bytes: &[u8]) -> Result<String> {
        if project_id.trim().is_empty() {
            return Err(OrderError::Validation(
                "Order No is required before uploading images.".to_string(),
            ));
        }

        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(safe_segment)
            .unwrap_or_else(|| "png".to_string());
        let namespace = safe_segment(project_id);
        let name = format!(
            "{}_{}.{}",
            Utc::now().timestamp_millis(),
            random_suffix(8),
            extension
        );

        let dir = self.root.join(&namespace);
        fs::create_dir_all(&dir)?;
        fs::write(dir.join(&name), bytes)?;

        Ok(format!(
            "{}/{}/{}",
            self.public_prefix,
            urlencoding::encode(&namespace),
            urlencoding::encode(&name)
        ))
    }

    fn delete(&self, public_url: &str) -> Result<bool> {
        let Some(rest) = public_url.strip_prefix(&format!("{}/", self.public_prefix)) else {
            return Ok(false);
        };
        let mut parts = rest.splitn(2, '/');
        let (Some(namespace), Some(name)) = (parts.next(), parts.next()) else {
            return Ok(false);
        };
        let namespace = urlencoding::decode(namespace)
            .map_err(|e| OrderError::Persistence(e.to_string()))?;
        let name = urlencoding::decode(name).map_err(|e| OrderError::Persistence(e.to_string()))?;
        if namespace.contains("..") || name.contains("..") || name.contains('/') {
            return Ok(false);
        }

        let path = self.root.join(&*namespace).join(&*name);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(path)?;
        Ok(true)
    }
}

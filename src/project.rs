use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Result, SyncError};
use crate::timing::SyncPoint;
use crate::view::{Annotation, TrackSettings};

const CONFIG_FILE: &str = "config.ron";

/// Everything saved about one song: alignment, track settings, annotations.
///
/// Always read and written whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongProject {
    pub id: String,
    pub title: String,
    pub score_file: String,
    pub performance_file: String,
    #[serde(default)]
    pub sync_points: Vec<SyncPoint>,
    #[serde(default)]
    pub tracks: Vec<TrackSettings>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SongProject {
    /// A fresh record for a song that has never been saved.
    pub fn empty(id: &str) -> Self {
        let now = Utc::now();
        Self {
            id: id.to_string(),
            title: title_from_id(id),
            score_file: format!("{}.mid", id),
            performance_file: format!("{}.mp3", id),
            sync_points: Vec::new(),
            tracks: Vec::new(),
            annotations: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// `bach_846` -> `Bach 846`
fn title_from_id(id: &str) -> String {
    id.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Key-value storage of [`SongProject`]s by song id.
pub trait ProjectStore {
    /// Missing records come back as [`SongProject::empty`].
    fn load(&self, id: &str) -> Result<SongProject>;

    /// Replaces the stored record and refreshes `updated_at`.
    fn save(&self, project: &mut SongProject) -> Result<()>;
}

/// Keeps each song in `<root>/<id>/config.ron`, next to its media files.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn song_dir(&self, id: &str) -> PathBuf {
        self.root.join(id)
    }

    /// Resolves a file name stored in a project against the song directory.
    ///
    /// Only bare file names are accepted, so the result never leaves it.
    pub fn media_path(&self, id: &str, file: &str) -> Result<PathBuf> {
        validate_id(id)?;
        if !is_plain_name(file) {
            return Err(SyncError::InvalidMediaFile(file.to_string()));
        }
        Ok(self.song_dir(id).join(file))
    }
}

/// Song ids name exactly one directory under the store root.
pub fn validate_id(id: &str) -> Result<()> {
    if is_plain_name(id) {
        Ok(())
    } else {
        Err(SyncError::InvalidProjectId(id.to_string()))
    }
}

/// A single normal path component, with no separator of any platform.
fn is_plain_name(name: &str) -> bool {
    if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

impl ProjectStore for DirectoryStore {
    fn load(&self, id: &str) -> Result<SongProject> {
        validate_id(id)?;
        let path = self.song_dir(id).join(CONFIG_FILE);
        if !path.exists() {
            debug!("No saved config for '{}', starting empty", id);
            return Ok(SongProject::empty(id));
        }

        let ron_string = fs::read_to_string(&path)?;
        let project: SongProject = ron::from_str(&ron_string)?;
        info!(
            "Loaded '{}' ({} sync points, {} annotations)",
            project.id,
            project.sync_points.len(),
            project.annotations.len()
        );

        Ok(project)
    }

    fn save(&self, project: &mut SongProject) -> Result<()> {
        validate_id(&project.id)?;

        let song_dir = self.song_dir(&project.id);
        fs::create_dir_all(&song_dir)?;

        project.updated_at = Utc::now();
        let ron_string = ron::ser::to_string_pretty(&*project, ron::ser::PrettyConfig::default())?;
        fs::write(song_dir.join(CONFIG_FILE), ron_string)?;
        info!("Saved '{}'", project.id);

        Ok(())
    }
}

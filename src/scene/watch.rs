use std::{
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};

use anyhow::Context;

use crate::foundation::error::DioramaResult;

/// Scene description file with modification-time polling.
///
/// Reload detection is an explicit poll-and-compare step at the top of the
/// stage tick, not a filesystem-event callback: the frame loop stays
/// single-threaded and deterministic.
#[derive(Debug)]
pub struct SceneFile {
    path: PathBuf,
    last_modified: Option<SystemTime>,
}

impl SceneFile {
    /// Track `path`, recording its current modification time if readable.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let last_modified = mtime(&path);
        Self {
            path,
            last_modified,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory sprites resolve against: the scene file's parent.
    pub fn root(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// True once per observed modification-time change.
    ///
    /// The observed time is recorded even when the caller's subsequent
    /// reload fails, so a broken edit is retried only after the next save.
    pub fn poll_changed(&mut self) -> bool {
        let current = mtime(&self.path);
        if current == self.last_modified {
            return false;
        }
        self.last_modified = current;
        current.is_some()
    }

    pub fn read(&self) -> DioramaResult<String> {
        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("read scene '{}'", self.path.display()))?;
        Ok(text)
    }
}

fn mtime(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn unchanged_file_does_not_trigger() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.json");
        fs::write(&path, "{}").unwrap();

        let mut file = SceneFile::open(&path);
        assert!(!file.poll_changed());
        assert!(!file.poll_changed());
    }

    #[test]
    fn mtime_bump_triggers_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.json");
        fs::write(&path, "{}").unwrap();

        let mut file = SceneFile::open(&path);
        let f = fs::File::options().write(true).open(&path).unwrap();
        f.set_modified(SystemTime::now() + Duration::from_secs(5))
            .unwrap();
        drop(f);

        assert!(file.poll_changed());
        assert!(!file.poll_changed());
    }

    #[test]
    fn missing_file_is_not_a_change() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = SceneFile::open(dir.path().join("absent.json"));
        assert!(!file.poll_changed());
        assert!(file.read().is_err());
    }
}

use crate::aquarium::Aquarium;
use crate::config::atomic_rename;
use crate::error::SceneError;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::info;

pub const AQUA_EXTENSION: &str = "aqua";

impl Aquarium {
    /// Writes the scene to `path` through a temporary file.
    pub fn save(&self, path: &Path) -> Result<(), SceneError> {
        let xml = self.to_xml()?;
        let tmp = path.with_extension("aqua.tmp");
        let write_err = |source| SceneError::Write {
            path: path.to_path_buf(),
            source,
        };
        fs::write(&tmp, xml).map_err(write_err)?;
        if let Err(e) = atomic_rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(write_err(e));
        }
        info!(path = %path.display(), items = self.len(), "aquarium saved");
        Ok(())
    }

    /// Loads `path`, leaving the scene untouched on any failure.
    pub fn load(&mut self, path: &Path) -> Result<(), SceneError> {
        let text = fs::read_to_string(path).map_err(|source| SceneError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_xml(&text)
    }
}

/// Appends `.aqua` to names typed without an extension.
pub fn with_aqua_extension(name: &str) -> PathBuf {
    let path = PathBuf::from(name.trim());
    if path.extension().is_some() {
        path
    } else {
        path.with_extension(AQUA_EXTENSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemKind;

    #[test]
    fn extension_is_added_only_when_missing() {
        assert_eq!(with_aqua_extension("tank"), PathBuf::from("tank.aqua"));
        assert_eq!(with_aqua_extension(" tank.aqua "), PathBuf::from("tank.aqua"));
        assert_eq!(with_aqua_extension("tank.xml"), PathBuf::from("tank.xml"));
        assert_eq!(with_aqua_extension("dir/tank"), PathBuf::from("dir/tank.aqua"));
    }

    #[test]
    fn save_into_missing_directory_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no/such/dir/tank.aqua");
        let aq = Aquarium::new(1024.0, 768.0, 1);
        assert!(matches!(aq.save(&path), Err(SceneError::Write { .. })));
    }

    #[test]
    fn load_of_missing_file_keeps_items() {
        let dir = tempfile::tempdir().unwrap();
        let mut aq = Aquarium::new(1024.0, 768.0, 1);
        aq.spawn(ItemKind::Castle);
        let err = aq.load(&dir.path().join("missing.aqua")).unwrap_err();
        assert!(matches!(err, SceneError::Read { .. }));
        assert_eq!(aq.len(), 1);
    }

    #[test]
    fn save_leaves_no_temporary_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tank.aqua");
        let mut aq = Aquarium::new(1024.0, 768.0, 1);
        aq.spawn(ItemKind::Beta);
        aq.save(&path).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("aqua.tmp").exists());
    }
}

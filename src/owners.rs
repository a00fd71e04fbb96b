// src/owners.rs
use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

/// Static owner-id -> display-nickname mapping, loaded once at startup.
/// A missing or unreadable file yields an empty directory (logged); a
/// missing entry is a per-render problem, not a startup one.
#[derive(Debug, Default, Clone)]
pub struct OwnerDirectory {
    map: HashMap<String, String>,
}

#[derive(Deserialize)]
struct OwnerMapFile {
    #[serde(default)]
    owner_id_to_name: HashMap<String, String>,
}

impl OwnerDirectory {
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<OwnerMapFile>(&content) {
                Ok(file) => Self {
                    map: file.owner_id_to_name,
                },
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "owner map unparsable, using empty directory");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "owner map unreadable, using empty directory");
                Self::default()
            }
        }
    }

    pub fn from_map(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    pub fn nickname(&self, owner_id: &str) -> Option<&str> {
        self.map.get(owner_id).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty_directory() {
        let dir = OwnerDirectory::load("definitely/not/here/owner_map.json");
        assert!(dir.is_empty());
    }

    #[test]
    fn parses_owner_map_shape() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("owner_map.json");
        std::fs::write(
            &path,
            r#"{ "owner_id_to_name": { "{ABC-123}": "moja" } }"#,
        )
        .unwrap();
        let dir = OwnerDirectory::load(&path);
        assert_eq!(dir.nickname("{ABC-123}"), Some("moja"));
        assert_eq!(dir.nickname("{MISSING}"), None);
    }
}

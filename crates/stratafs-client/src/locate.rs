//! Discovery of the control file by walking up from the working directory.

use std::env;
use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ClientError, Result};

/// Name of the control file at the root of every StrataFS mount.
pub const API_FILE_NAME: &str = "api";

/// Inode reserved for the control file.
///
/// No ordinary filesystem hands out inode 2 for a regular file, which is
/// what makes the identity check safe against decoys.
pub const API_FILE_INODE: u64 = 2;

/// Identity the resolver requires of a control-file candidate.
///
/// The defaults match a real mount; tests substitute the name and inode of
/// an arbitrary temporary file.
#[derive(Clone, Debug)]
pub struct ApiFileConfig {
    /// File name probed in each directory on the walk.
    pub file_name: String,
    /// Inode the candidate must have to be accepted.
    pub inode: u64,
}

impl Default for ApiFileConfig {
    fn default() -> Self {
        Self {
            file_name: API_FILE_NAME.to_string(),
            inode: API_FILE_INODE,
        }
    }
}

/// Find the control file starting from the current working directory.
///
/// Failure to read the working directory itself is [`ClientError::DontKnowCwd`],
/// distinct from an unsuccessful walk.
pub fn find_api_path(config: &ApiFileConfig) -> Result<PathBuf> {
    let cwd = env::current_dir().map_err(|source| ClientError::DontKnowCwd { source })?;
    find_api_path_from(&cwd, config)
}

/// Walk from `start` toward the root until a correctly-identified control
/// file is found.
///
/// A candidate must be a regular file or symlink whose inode matches the
/// configured identity. Anything else with the right name (a directory, a
/// wrong-inode file) is a decoy and the walk continues past it. The root
/// directory itself is probed before giving up with
/// [`ClientError::CantFindApiFile`].
pub fn find_api_path_from(start: &Path, config: &ApiFileConfig) -> Result<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(&config.file_name);
        if let Ok(meta) = fs::symlink_metadata(&candidate) {
            let file_type = meta.file_type();
            if (file_type.is_file() || file_type.is_symlink()) && meta.ino() == config.inode {
                debug!(path = %candidate.display(), "found api file");
                return Ok(candidate);
            }
            debug!(path = %candidate.display(), inode = meta.ino(), "ignoring decoy api entry");
        }
        if !dir.pop() {
            return Err(ClientError::CantFindApiFile {
                start: start.to_path_buf(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs::File;
    use std::io::Write;

    fn inode_of(path: &Path) -> u64 {
        fs::symlink_metadata(path).unwrap().ino()
    }

    fn config_for(path: &Path) -> ApiFileConfig {
        ApiFileConfig {
            file_name: API_FILE_NAME.to_string(),
            inode: inode_of(path),
        }
    }

    #[test]
    fn finds_api_file_above_decoys() {
        let root = tempfile::tempdir().unwrap();
        let real = root.path().join("api");
        File::create(&real).unwrap().write_all(b"").unwrap();

        // One level down: a decoy regular file with the wrong inode.
        let mid = root.path().join("mid");
        fs::create_dir(&mid).unwrap();
        File::create(mid.join("api")).unwrap();

        // Two levels down: a decoy directory.
        let leaf = mid.join("leaf");
        fs::create_dir(&leaf).unwrap();
        fs::create_dir(leaf.join("api")).unwrap();

        let found = find_api_path_from(&leaf, &config_for(&real)).unwrap();
        assert_eq!(found, real);
    }

    #[test]
    fn directory_with_matching_inode_is_rejected() {
        let root = tempfile::tempdir().unwrap();
        let decoy_dir = root.path().join("api");
        fs::create_dir(&decoy_dir).unwrap();

        let config = config_for(&decoy_dir);
        let err = find_api_path_from(root.path(), &config).unwrap_err();
        assert!(matches!(err, ClientError::CantFindApiFile { .. }));
    }

    #[test]
    fn walk_fails_when_nothing_matches() {
        let root = tempfile::tempdir().unwrap();
        let leaf = root.path().join("a/b/c");
        fs::create_dir_all(&leaf).unwrap();

        let config = ApiFileConfig {
            file_name: "api".to_string(),
            // An inode no file in the temp tree will have.
            inode: u64::MAX,
        };
        let err = find_api_path_from(&leaf, &config).unwrap_err();
        match err {
            ClientError::CantFindApiFile { start } => assert_eq!(start, leaf),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn default_config_names_the_reserved_identity() {
        let config = ApiFileConfig::default();
        assert_eq!(config.file_name, "api");
        assert_eq!(config.inode, 2);
    }
}

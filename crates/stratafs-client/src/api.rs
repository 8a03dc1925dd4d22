//! Typed commands over the control channel.

use std::path::PathBuf;

use serde_json::Value;
use tracing::warn;

use stratafs_proto::{
    decode_bytes, is_extended_key_valid, AccessedRequest, BranchRequest, DeleteWorkspaceRequest,
    EnableRootWriteRequest, GetBlockRequest, InsertInodeRequest, MergeRequest, PathsAccessed,
    SetBlockRequest, SetWorkspaceImmutableRequest, SyncAllRequest, ACCESS_LIST_FIELD, DATA_FIELD,
    NULL_WORKSPACE_NAME,
};

use crate::channel::ApiChannel;
use crate::codec::{check_destination_path_valid, check_workspace_path_valid, send_request};
use crate::error::{ClientError, Result};

/// Client for the control plane of one mounted StrataFS instance.
///
/// Each method builds a typed request, performs one synchronous exchange
/// over the control file, and interprets the command-specific payload.
/// Construction is cheap; the control file is resolved and opened on the
/// first call.
pub struct ApiClient {
    channel: ApiChannel,
}

impl ApiClient {
    /// Client that discovers the control file on first use.
    pub fn new() -> Self {
        Self {
            channel: ApiChannel::new(),
        }
    }

    /// Client bound to an explicit control-file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            channel: ApiChannel::with_path(path),
        }
    }

    /// Client over a preconfigured channel (custom identity, exchange hook).
    pub fn with_channel(channel: ApiChannel) -> Self {
        Self { channel }
    }

    /// Release the control file early. The client reopens on the next call.
    pub fn close(&mut self) {
        self.channel.close();
    }

    /// Fetch the accessed-paths list of a workspace.
    ///
    /// The payload maps each path to `true` if the file was created in the
    /// workspace and `false` if it was merely accessed. Entries whose value
    /// is not a boolean are skipped.
    pub fn get_accessed(&mut self, workspace: &str) -> Result<PathsAccessed> {
        check_workspace_path_valid(workspace)?;
        let response = send_request(&mut self.channel, &AccessedRequest::get(workspace))?;

        let entries = match response.get(ACCESS_LIST_FIELD) {
            Some(Value::Object(entries)) => entries,
            _ => {
                return Err(ClientError::MissingJsonObject {
                    field: ACCESS_LIST_FIELD,
                })
            }
        };

        let mut accessed = PathsAccessed::new();
        for (path, value) in entries {
            match value {
                Value::Bool(created) => {
                    accessed.insert(path.clone(), *created);
                }
                other => {
                    warn!(path = %path, value = %other, "skipping non-boolean access list entry");
                }
            }
        }
        Ok(accessed)
    }

    /// Clear the accessed-paths list of a workspace.
    pub fn clear_accessed(&mut self, workspace: &str) -> Result<()> {
        check_workspace_path_valid(workspace)?;
        send_request(&mut self.channel, &AccessedRequest::clear(workspace))?;
        Ok(())
    }

    /// Branch the `src` workspace into a new workspace `dst`.
    pub fn branch(&mut self, src: &str, dst: &str) -> Result<()> {
        check_workspace_path_valid(src)?;
        check_workspace_path_valid(dst)?;
        send_request(&mut self.channel, &BranchRequest::new(src, dst))?;
        Ok(())
    }

    /// Merge `remote` into `local`: a three-way merge whose base is the
    /// null workspace.
    pub fn merge(&mut self, remote: &str, local: &str) -> Result<()> {
        self.merge_3way(NULL_WORKSPACE_NAME, remote, local)
    }

    /// Three-way merge. `local` takes precedence on conflicts with matching
    /// modification times and receives the resulting state.
    pub fn merge_3way(&mut self, base: &str, remote: &str, local: &str) -> Result<()> {
        check_workspace_path_valid(base)?;
        check_workspace_path_valid(remote)?;
        check_workspace_path_valid(local)?;
        send_request(&mut self.channel, &MergeRequest::new(base, remote, local))?;
        Ok(())
    }

    /// Flush all dirty workspace state to the datastore.
    pub fn sync_all(&mut self) -> Result<()> {
        send_request(&mut self.channel, &SyncAllRequest::new())?;
        Ok(())
    }

    /// Duplicate the object behind an extended key at `dst`, which names a
    /// workspace root or a path below one.
    pub fn insert_inode(
        &mut self,
        dst: &str,
        key: &str,
        permissions: u32,
        uid: u32,
        gid: u32,
    ) -> Result<()> {
        check_destination_path_valid(dst)?;
        if !is_extended_key_valid(key) {
            return Err(ClientError::KeyInvalid {
                key: key.to_string(),
            });
        }
        send_request(
            &mut self.channel,
            &InsertInodeRequest::new(dst, key, permissions, uid, gid),
        )?;
        Ok(())
    }

    /// Delete a workspace.
    pub fn delete_workspace(&mut self, workspace: &str) -> Result<()> {
        check_workspace_path_valid(workspace)?;
        send_request(&mut self.channel, &DeleteWorkspaceRequest::new(workspace))?;
        Ok(())
    }

    /// Make a workspace writable at its root.
    pub fn enable_root_write(&mut self, workspace: &str) -> Result<()> {
        check_workspace_path_valid(workspace)?;
        send_request(&mut self.channel, &EnableRootWriteRequest::new(workspace))?;
        Ok(())
    }

    /// Make a workspace irreversibly immutable.
    pub fn set_workspace_immutable(&mut self, workspace: &str) -> Result<()> {
        check_workspace_path_valid(workspace)?;
        send_request(
            &mut self.channel,
            &SetWorkspaceImmutableRequest::new(workspace),
        )?;
        Ok(())
    }

    /// Store a block in the datastore under `key`.
    ///
    /// The block namespace is separate from the objects the filesystem
    /// stores on its own behalf.
    pub fn set_block(&mut self, key: &[u8], data: &[u8]) -> Result<()> {
        send_request(&mut self.channel, &SetBlockRequest::new(key, data))?;
        Ok(())
    }

    /// Fetch a block previously stored with [`set_block`](Self::set_block).
    pub fn get_block(&mut self, key: &[u8]) -> Result<Vec<u8>> {
        let response = send_request(&mut self.channel, &GetBlockRequest::new(key))?;

        let data = response
            .get(DATA_FIELD)
            .ok_or(ClientError::MissingJsonObject { field: DATA_FIELD })?;
        let text = data.as_str().ok_or_else(|| {
            ClientError::decoding("block data in response is not a string", data.to_string().as_bytes())
        })?;
        decode_bytes(text)
            .map_err(|err| ClientError::decoding(err.to_string(), text.as_bytes()))
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Partition an accessed list for presentation: created files first, then
/// accessed files, each section newline-joined under its banner.
pub fn format_accessed_list(accessed: &PathsAccessed) -> String {
    let mut result = String::from("------ Created Files ------\n");
    for (path, created) in accessed {
        if *created {
            result.push_str(path);
            result.push('\n');
        }
    }
    result.push_str("------ Accessed Files ------\n");
    for (path, created) in accessed {
        if !*created {
            result.push_str(path);
            result.push('\n');
        }
    }
    result
}

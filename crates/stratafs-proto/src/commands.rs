//! Control plane message types for StrataFS.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::Serializer;
use serde::Serialize;

use crate::keys::encode_bytes;

/// Name of the request field carrying the command discriminator.
pub const COMMAND_ID_FIELD: &str = "CommandId";
/// Name of the mandatory response field carrying the daemon error code.
pub const ERROR_CODE_FIELD: &str = "ErrorCode";
/// Name of the mandatory response field carrying the daemon error message.
pub const MESSAGE_FIELD: &str = "Message";
/// Payload field of the accessed-paths response.
pub const ACCESS_LIST_FIELD: &str = "AccessList";
/// Payload field of the block-fetch response.
pub const DATA_FIELD: &str = "Data";

/// The null workspace, used as the implicit merge base for two-way merges.
pub const NULL_WORKSPACE_NAME: &str = "_null/null";

/// Accessed-paths payload: path to created flag. `true` means the file was
/// created in the workspace, `false` that it was merely accessed.
pub type PathsAccessed = BTreeMap<String, bool>;

/// Command discriminators carried in the `CommandId` request field.
///
/// The numeric values are wire constants shared with every deployed daemon
/// and must never be reordered or reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum CommandId {
    Invalid = 0,
    Error = 1,
    Branch = 2,
    GetAccessed = 3,
    ClearAccessed = 4,
    SyncAll = 5,
    InsertInode = 6,
    DeleteWorkspace = 7,
    SetBlock = 8,
    GetBlock = 9,
    EnableRootWrite = 10,
    SetWorkspaceImmutable = 11,
    MergeWorkspaces = 12,
}

impl Serialize for CommandId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(*self as u32)
    }
}

/// Error codes reported by the daemon in the `ErrorCode` response field.
///
/// Codes this client does not know are carried through as [`Unknown`]
/// rather than rejected, so older clients keep working against newer
/// daemons.
///
/// [`Unknown`]: RemoteError::Unknown
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemoteError {
    Ok,
    BadArgs,
    BadJson,
    BadCommandId,
    CommandFailed,
    KeyNotFound,
    BlockTooLarge,
    WorkspaceNotFound,
    Unknown(u64),
}

impl RemoteError {
    pub fn from_code(code: u64) -> Self {
        match code {
            0 => RemoteError::Ok,
            1 => RemoteError::BadArgs,
            2 => RemoteError::BadJson,
            3 => RemoteError::BadCommandId,
            4 => RemoteError::CommandFailed,
            5 => RemoteError::KeyNotFound,
            6 => RemoteError::BlockTooLarge,
            7 => RemoteError::WorkspaceNotFound,
            other => RemoteError::Unknown(other),
        }
    }

    pub fn code(&self) -> u64 {
        match self {
            RemoteError::Ok => 0,
            RemoteError::BadArgs => 1,
            RemoteError::BadJson => 2,
            RemoteError::BadCommandId => 3,
            RemoteError::CommandFailed => 4,
            RemoteError::KeyNotFound => 5,
            RemoteError::BlockTooLarge => 6,
            RemoteError::WorkspaceNotFound => 7,
            RemoteError::Unknown(code) => *code,
        }
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RemoteError::Ok => "ok",
            RemoteError::BadArgs => "bad arguments",
            RemoteError::BadJson => "unparseable command",
            RemoteError::BadCommandId => "unknown command id",
            RemoteError::CommandFailed => "command failed",
            RemoteError::KeyNotFound => "key not found",
            RemoteError::BlockTooLarge => "block too large",
            RemoteError::WorkspaceNotFound => "workspace not found",
            RemoteError::Unknown(code) => return write!(f, "unknown error code {}", code),
        };
        write!(f, "{} ({})", text, self.code())
    }
}

/// Request for the accessed-paths list of a workspace, also used to clear it.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccessedRequest {
    pub command_id: CommandId,
    pub workspace_root: String,
}

impl AccessedRequest {
    pub fn get(workspace_root: impl Into<String>) -> Self {
        Self {
            command_id: CommandId::GetAccessed,
            workspace_root: workspace_root.into(),
        }
    }

    pub fn clear(workspace_root: impl Into<String>) -> Self {
        Self {
            command_id: CommandId::ClearAccessed,
            workspace_root: workspace_root.into(),
        }
    }
}

/// Branch a source workspace into a new destination workspace.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BranchRequest {
    pub command_id: CommandId,
    pub src: String,
    pub dst: String,
}

impl BranchRequest {
    pub fn new(src: impl Into<String>, dst: impl Into<String>) -> Self {
        Self {
            command_id: CommandId::Branch,
            src: src.into(),
            dst: dst.into(),
        }
    }
}

/// Three-way merge of a remote workspace into a local one.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MergeRequest {
    pub command_id: CommandId,
    pub base_workspace: String,
    pub remote_workspace: String,
    pub local_workspace: String,
}

impl MergeRequest {
    pub fn new(
        base: impl Into<String>,
        remote: impl Into<String>,
        local: impl Into<String>,
    ) -> Self {
        Self {
            command_id: CommandId::MergeWorkspaces,
            base_workspace: base.into(),
            remote_workspace: remote.into(),
            local_workspace: local.into(),
        }
    }
}

/// Flush all dirty workspace state to the datastore.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SyncAllRequest {
    pub command_id: CommandId,
}

impl SyncAllRequest {
    pub fn new() -> Self {
        Self {
            command_id: CommandId::SyncAll,
        }
    }
}

impl Default for SyncAllRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// Duplicate an existing object at a path inside a workspace.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InsertInodeRequest {
    pub command_id: CommandId,
    pub dst_path: String,
    pub key: String,
    pub uid: u32,
    pub gid: u32,
    pub permissions: u32,
}

impl InsertInodeRequest {
    pub fn new(
        dst_path: impl Into<String>,
        key: impl Into<String>,
        permissions: u32,
        uid: u32,
        gid: u32,
    ) -> Self {
        Self {
            command_id: CommandId::InsertInode,
            dst_path: dst_path.into(),
            key: key.into(),
            uid,
            gid,
            permissions,
        }
    }
}

/// Make a workspace writable at its root.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EnableRootWriteRequest {
    pub command_id: CommandId,
    pub workspace: String,
}

impl EnableRootWriteRequest {
    pub fn new(workspace: impl Into<String>) -> Self {
        Self {
            command_id: CommandId::EnableRootWrite,
            workspace: workspace.into(),
        }
    }
}

/// Delete a workspace.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteWorkspaceRequest {
    pub command_id: CommandId,
    pub workspace_path: String,
}

impl DeleteWorkspaceRequest {
    pub fn new(workspace_path: impl Into<String>) -> Self {
        Self {
            command_id: CommandId::DeleteWorkspace,
            workspace_path: workspace_path.into(),
        }
    }
}

/// Make a workspace irreversibly immutable.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SetWorkspaceImmutableRequest {
    pub command_id: CommandId,
    pub workspace_path: String,
}

impl SetWorkspaceImmutableRequest {
    pub fn new(workspace_path: impl Into<String>) -> Self {
        Self {
            command_id: CommandId::SetWorkspaceImmutable,
            workspace_path: workspace_path.into(),
        }
    }
}

/// Store a block in the datastore under the given key.
///
/// Keys and data are byte strings; on the wire they travel base64-encoded,
/// matching the daemon's JSON encoding of byte arrays.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SetBlockRequest {
    pub command_id: CommandId,
    pub key: String,
    pub data: String,
}

impl SetBlockRequest {
    pub fn new(key: &[u8], data: &[u8]) -> Self {
        Self {
            command_id: CommandId::SetBlock,
            key: encode_bytes(key),
            data: encode_bytes(data),
        }
    }
}

/// Fetch a block from the datastore by key.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetBlockRequest {
    pub command_id: CommandId,
    pub key: String,
}

impl GetBlockRequest {
    pub fn new(key: &[u8]) -> Self {
        Self {
            command_id: CommandId::GetBlock,
            key: encode_bytes(key),
        }
    }
}

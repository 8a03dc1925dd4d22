//! Error types for the StrataFS control client.

use std::io;
use std::path::PathBuf;

use stratafs_proto::RemoteError;

/// Result type for control-plane client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Longest prefix of a malformed response carried inside decode errors.
const RESPONSE_PREFIX_LEN: usize = 64;

/// Error type for control-plane client operations.
///
/// Every layer returns these explicitly; the first failure aborts the call
/// and is surfaced verbatim with whatever context the failing stage had.
/// Nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("cannot open api file {}: {source}", .path.display())]
    CantOpenApiFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("api file is not open")]
    ApiFileNotOpen,

    #[error("seek on api file {} failed: {source}", .path.display())]
    ApiFileSeekFail {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("write to api file {} failed: {source}", .path.display())]
    ApiFileWriteFail {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("flush of api file {} failed: {source}", .path.display())]
    ApiFileFlushFail {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("read from api file {} failed: {source}", .path.display())]
    ApiFileReadFail {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("command buffer limit exceeded")]
    BufferTooBig,

    #[error("cannot determine current working directory: {source}")]
    DontKnowCwd {
        #[source]
        source: io::Error,
    },

    #[error("no api file found between {} and the root", .start.display())]
    CantFindApiFile { start: PathBuf },

    #[error("workspace path {path:?} is invalid: {reason}")]
    WorkspacePathInvalid { path: String, reason: &'static str },

    #[error("extended key {key:?} is malformed")]
    KeyInvalid { key: String },

    #[error("failed to encode request JSON: {source}")]
    JsonEncodingError {
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to decode response JSON: {detail} (response starts: {prefix:?})")]
    JsonDecodingError { detail: String, prefix: String },

    #[error("response JSON is missing field {field:?}")]
    MissingJsonObject { field: &'static str },

    #[error("api error {code}: {message}")]
    ApiError {
        code: RemoteError,
        message: String,
        response: String,
    },
}

impl ClientError {
    /// Decode failure carrying a short prefix of the offending bytes.
    pub(crate) fn decoding(detail: impl Into<String>, raw: &[u8]) -> Self {
        let prefix = String::from_utf8_lossy(&raw[..raw.len().min(RESPONSE_PREFIX_LEN)]).into_owned();
        ClientError::JsonDecodingError {
            detail: detail.into(),
            prefix,
        }
    }

    pub(crate) fn invalid_workspace(path: &str, reason: &'static str) -> Self {
        ClientError::WorkspacePathInvalid {
            path: path.to_string(),
            reason,
        }
    }
}

//! StrataFS control protocol — wire types shared by clients and tools.
//!
//! Every StrataFS mount exposes its control plane through the `api` file at
//! the mount root. A command is one JSON object written into that file; the
//! response is another JSON object read back from offset 0. This crate
//! defines the command vocabulary: command ids, typed request bodies, the
//! response envelope field names, the daemon-side error codes, and the
//! helpers for the content-addressed extended key format.

pub mod commands;
pub mod keys;

pub use commands::{
    AccessedRequest, BranchRequest, CommandId, DeleteWorkspaceRequest, EnableRootWriteRequest,
    GetBlockRequest, InsertInodeRequest, MergeRequest, PathsAccessed, RemoteError,
    SetBlockRequest, SetWorkspaceImmutableRequest, SyncAllRequest, ACCESS_LIST_FIELD,
    COMMAND_ID_FIELD, DATA_FIELD, ERROR_CODE_FIELD, MESSAGE_FIELD, NULL_WORKSPACE_NAME,
};
pub use keys::{
    decode_bytes, encode_bytes, encode_extended_key, is_extended_key_valid, EXTENDED_KEY_LENGTH,
    OBJECT_KEY_LENGTH,
};

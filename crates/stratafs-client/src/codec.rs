//! JSON envelope encoding and validation for control commands.

use serde::Serialize;
use serde_json::{Map, Value};

use stratafs_proto::{RemoteError, ERROR_CODE_FIELD, MESSAGE_FIELD};

use crate::buffer::CommandBuffer;
use crate::channel::ApiChannel;
use crate::error::{ClientError, Result};

/// Serialize `request`, exchange it over `channel`, and validate the
/// response envelope.
///
/// On success the parsed response object is returned with the envelope
/// fields still present, ready for command-specific payload decoding. A
/// nonzero `ErrorCode` becomes [`ClientError::ApiError`]; everything the
/// parser or the envelope check rejects becomes a decoding error.
pub fn send_request<T: Serialize>(
    channel: &mut ApiChannel,
    request: &T,
) -> Result<Map<String, Value>> {
    let command = encode_request(request)?;
    let mut response = CommandBuffer::new();
    channel.send_command(&command, &mut response)?;
    decode_response(&mut response)
}

/// Encode a request as its canonical wire form: compact JSON with sorted
/// keys, NUL-terminated.
///
/// Serialization goes through a [`Value`] rather than straight to a string
/// because the object map keeps keys ordered, making the wire bytes
/// reproducible.
pub(crate) fn encode_request<T: Serialize>(request: &T) -> Result<CommandBuffer> {
    let value =
        serde_json::to_value(request).map_err(|source| ClientError::JsonEncodingError { source })?;
    let mut buffer = CommandBuffer::new();
    buffer.copy_string(&value.to_string())?;
    Ok(buffer)
}

/// Parse and validate a response envelope.
pub(crate) fn decode_response(response: &mut CommandBuffer) -> Result<Map<String, Value>> {
    response.sanitize();
    let raw = response.data();

    let value: Value =
        serde_json::from_slice(raw).map_err(|err| ClientError::decoding(err.to_string(), raw))?;

    let object = match value {
        Value::Object(object) => object,
        // Any well-formed but non-object response fails the first field
        // lookup, same as an object without the field.
        _ => {
            return Err(ClientError::MissingJsonObject {
                field: ERROR_CODE_FIELD,
            })
        }
    };

    let error_code = object.get(ERROR_CODE_FIELD).ok_or(ClientError::MissingJsonObject {
        field: ERROR_CODE_FIELD,
    })?;
    let message = object.get(MESSAGE_FIELD).ok_or(ClientError::MissingJsonObject {
        field: MESSAGE_FIELD,
    })?;

    let code = error_code
        .as_u64()
        .ok_or_else(|| ClientError::decoding("error code in response is not an integer", raw))?;

    if code != 0 {
        return Err(ClientError::ApiError {
            code: RemoteError::from_code(code),
            message: message.as_str().unwrap_or_default().to_string(),
            response: String::from_utf8_lossy(raw).into_owned(),
        });
    }

    Ok(object)
}

/// Check a workspace identifier.
///
/// A workspace is named `namespace/workspace`; with the conceptual leading
/// root prepended the full path has exactly two `/` separators, so the raw
/// identifier must carry exactly one.
pub fn check_workspace_path_valid(path: &str) -> Result<()> {
    if separators(path) != 1 {
        return Err(ClientError::invalid_workspace(
            path,
            "workspace names have the form namespace/workspace",
        ));
    }
    Ok(())
}

/// Check a destination path inside a workspace, as used by inserts: the
/// workspace root itself or anything below it.
pub fn check_destination_path_valid(path: &str) -> Result<()> {
    if separators(path) < 1 {
        return Err(ClientError::invalid_workspace(
            path,
            "destination paths start with namespace/workspace",
        ));
    }
    Ok(())
}

fn separators(path: &str) -> usize {
    path.bytes().filter(|&b| b == b'/').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    use stratafs_proto::AccessedRequest;

    #[test]
    fn encode_produces_sorted_compact_nul_terminated_json() {
        let buffer = encode_request(&AccessedRequest::get("a/b")).unwrap();
        assert_eq!(buffer.data(), b"{\"CommandId\":3,\"WorkspaceRoot\":\"a/b\"}\0");
    }

    fn decode(raw: &[u8]) -> Result<Map<String, Value>> {
        let mut buffer = CommandBuffer::from(raw.to_vec());
        decode_response(&mut buffer)
    }

    #[test]
    fn success_envelope_returns_payload_fields() {
        let object =
            decode(br#"{"ErrorCode":0,"Message":"","AccessList":{"a.txt":true}}"#).unwrap();
        assert!(object.contains_key("AccessList"));
        assert!(object.contains_key("ErrorCode"));
    }

    #[test]
    fn trailing_padding_is_ignored() {
        let object = decode(b"{\"ErrorCode\":0,\"Message\":\"\"}\0\0\0\0").unwrap();
        assert_eq!(object.get("ErrorCode"), Some(&Value::from(0)));
    }

    #[test]
    fn malformed_json_carries_a_prefix_of_the_response() {
        let err = decode(b"{\"ErrorCode\": oops").unwrap_err();
        match err {
            ClientError::JsonDecodingError { prefix, .. } => {
                assert!(prefix.starts_with("{\"ErrorCode\": oops"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_error_code_is_named() {
        let err = decode(br#"{"Message":"fine"}"#).unwrap_err();
        match err {
            ClientError::MissingJsonObject { field } => assert_eq!(field, "ErrorCode"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_message_is_named() {
        let err = decode(br#"{"ErrorCode":0}"#).unwrap_err();
        match err {
            ClientError::MissingJsonObject { field } => assert_eq!(field, "Message"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_object_response_is_a_protocol_violation() {
        let err = decode(br#"[1,2,3]"#).unwrap_err();
        assert!(matches!(err, ClientError::MissingJsonObject { .. }));
    }

    #[test]
    fn non_integer_error_code_is_a_decode_failure() {
        let err = decode(br#"{"ErrorCode":"5","Message":"m"}"#).unwrap_err();
        assert!(matches!(err, ClientError::JsonDecodingError { .. }));
    }

    #[test]
    fn nonzero_error_code_becomes_api_error() {
        let raw = br#"{"ErrorCode":5,"Message":"workspace not found"}"#;
        let err = decode(raw).unwrap_err();
        match err {
            ClientError::ApiError {
                code,
                message,
                response,
            } => {
                assert_eq!(code, RemoteError::KeyNotFound);
                assert_eq!(code.code(), 5);
                assert_eq!(message, "workspace not found");
                assert_eq!(response.as_bytes(), raw);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn workspace_path_needs_exactly_one_separator() {
        assert!(check_workspace_path_valid("a/b").is_ok());
        assert!(check_workspace_path_valid("team/scratch").is_ok());
        assert!(check_workspace_path_valid("a").is_err());
        assert!(check_workspace_path_valid("a/b/c").is_err());
        assert!(check_workspace_path_valid("").is_err());
    }

    #[test]
    fn destination_path_needs_at_least_one_separator() {
        assert!(check_destination_path_valid("a/b").is_ok());
        assert!(check_destination_path_valid("a/b/dir/file").is_ok());
        assert!(check_destination_path_valid("a").is_err());
        assert!(check_destination_path_valid("").is_err());
    }
}

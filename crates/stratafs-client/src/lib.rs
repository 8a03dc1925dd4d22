//! Client for the StrataFS control plane.
//!
//! StrataFS exposes filesystem-specific operations (accessed-path queries,
//! workspace branching and merging, object insertion, content-addressed
//! block storage) through a single control file named `api` at the root of
//! every mount, identified by its reserved inode rather than by path alone.
//! Writing a JSON command into that file and reading the file back completes
//! one request/response exchange.
//!
//! This crate implements the client side: discovery of the control file by
//! walking up from the working directory, the synchronous write-then-read
//! exchange, validation of the response envelope, and one typed method per
//! operation.
//!
//! ```no_run
//! use stratafs_client::{format_accessed_list, ApiClient};
//!
//! fn main() -> stratafs_client::Result<()> {
//!     let mut client = ApiClient::new();
//!     let accessed = client.get_accessed("team/scratch")?;
//!     print!("{}", format_accessed_list(&accessed));
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod buffer;
pub mod channel;
pub mod codec;
pub mod error;
pub mod locate;

pub use api::{format_accessed_list, ApiClient};
pub use buffer::{CommandBuffer, MAX_BUFFER_SIZE};
pub use channel::{ApiChannel, ExchangeHook};
pub use codec::{check_destination_path_valid, check_workspace_path_valid};
pub use error::{ClientError, Result};
pub use locate::{find_api_path, find_api_path_from, ApiFileConfig, API_FILE_INODE, API_FILE_NAME};

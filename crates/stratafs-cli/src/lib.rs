//! StrataFS CLI library

use std::path::PathBuf;

// Re-export CLI types for testing
pub use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "strata")]
#[command(about = "StrataFS control-plane client")]
#[command(version, long_about = None)]
pub struct Cli {
    /// Explicit path to the control file (skips discovery)
    #[arg(long, global = true, value_name = "PATH")]
    pub api: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the accessed-paths report for a workspace
    Accessed {
        /// Workspace name (namespace/workspace)
        workspace: String,
    },
    /// Clear the accessed-paths list of a workspace
    ClearAccessed {
        /// Workspace name (namespace/workspace)
        workspace: String,
    },
    /// Branch a source workspace into a new workspace
    Branch {
        /// Source workspace name
        src: String,
        /// Destination workspace name
        dst: String,
    },
    /// Merge a remote workspace into a local one
    Merge {
        /// Remote workspace name
        remote: String,
        /// Local workspace name; receives the merged state
        local: String,
        /// Merge base (defaults to the null workspace)
        #[arg(long)]
        base: Option<String>,
    },
    /// Flush all dirty workspace state to the datastore
    Sync,
    /// Insert an existing object at a path inside a workspace
    Insert {
        /// Destination path (workspace root plus file path)
        dst: String,
        /// Extended object key (base64)
        key: String,
        /// File mode bits for the inserted object
        #[arg(long, default_value_t = 0o644)]
        permissions: u32,
        /// Owning user id
        #[arg(long, default_value_t = 0)]
        uid: u32,
        /// Owning group id
        #[arg(long, default_value_t = 0)]
        gid: u32,
    },
    /// Delete a workspace
    Delete {
        /// Workspace name (namespace/workspace)
        workspace: String,
    },
    /// Make a workspace writable at its root
    EnableRootWrite {
        /// Workspace name (namespace/workspace)
        workspace: String,
    },
    /// Make a workspace irreversibly immutable
    SetImmutable {
        /// Workspace name (namespace/workspace)
        workspace: String,
    },
    /// Store a datastore block under a key
    SetBlock {
        /// Block key (base64)
        key: String,
        /// File holding the block content
        file: PathBuf,
    },
    /// Fetch a datastore block by key and write it to stdout
    GetBlock {
        /// Block key (base64)
        key: String,
    },
}

use std::fs;
use std::io::{self, Write};

use anyhow::{Context, Result};
use stratafs_cli::{Cli, Commands, Parser};
use stratafs_client::{format_accessed_list, ApiClient};
use stratafs_proto::decode_bytes;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let mut client = match &cli.api {
        Some(path) => ApiClient::with_path(path),
        None => ApiClient::new(),
    };

    match cli.command {
        Commands::Accessed { workspace } => {
            let accessed = client.get_accessed(&workspace)?;
            print!("{}", format_accessed_list(&accessed));
        }
        Commands::ClearAccessed { workspace } => {
            client.clear_accessed(&workspace)?;
        }
        Commands::Branch { src, dst } => {
            client.branch(&src, &dst)?;
        }
        Commands::Merge {
            remote,
            local,
            base,
        } => match base {
            Some(base) => client.merge_3way(&base, &remote, &local)?,
            None => client.merge(&remote, &local)?,
        },
        Commands::Sync => {
            client.sync_all()?;
        }
        Commands::Insert {
            dst,
            key,
            permissions,
            uid,
            gid,
        } => {
            client.insert_inode(&dst, &key, permissions, uid, gid)?;
        }
        Commands::Delete { workspace } => {
            client.delete_workspace(&workspace)?;
        }
        Commands::EnableRootWrite { workspace } => {
            client.enable_root_write(&workspace)?;
        }
        Commands::SetImmutable { workspace } => {
            client.set_workspace_immutable(&workspace)?;
        }
        Commands::SetBlock { key, file } => {
            let key = decode_key(&key)?;
            let data =
                fs::read(&file).with_context(|| format!("failed to read {}", file.display()))?;
            client.set_block(&key, &data)?;
        }
        Commands::GetBlock { key } => {
            let key = decode_key(&key)?;
            let data = client.get_block(&key)?;
            io::stdout().write_all(&data)?;
        }
    }

    Ok(())
}

fn decode_key(key: &str) -> Result<Vec<u8>> {
    decode_bytes(key).context("block key is not valid base64")
}

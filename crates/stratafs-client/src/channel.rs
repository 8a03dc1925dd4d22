//! Synchronous write-then-read exchange over the control file.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::buffer::CommandBuffer;
use crate::error::{ClientError, Result};
use crate::locate::{find_api_path, ApiFileConfig};

/// Number of bytes pulled from the control file per read call.
const READ_CHUNK_SIZE: usize = 4096;

/// Strategy slot invoked between the write and read halves of an exchange.
///
/// The default channel performs real file I/O. Tests install an
/// implementation to observe what was written and to substitute a canned
/// response without a daemon behind the file.
pub trait ExchangeHook {
    /// Called after the request bytes have been written and flushed.
    fn post_write(&mut self) -> Result<()> {
        Ok(())
    }

    /// Called before the response is read. Returning a buffer substitutes
    /// it for the file read entirely.
    fn pre_read(&mut self) -> Result<Option<CommandBuffer>> {
        Ok(None)
    }
}

/// Handle to the control file of one mounted filesystem.
///
/// Once the path is resolved it never changes for the lifetime of the
/// handle. The open file is owned exclusively and released on
/// [`close`](Self::close) or on drop, whichever comes first.
pub struct ApiChannel {
    path: Option<PathBuf>,
    file: Option<File>,
    config: ApiFileConfig,
    hook: Option<Box<dyn ExchangeHook + Send>>,
}

impl ApiChannel {
    /// Channel that will discover the control file on first use.
    pub fn new() -> Self {
        Self::with_config(ApiFileConfig::default())
    }

    /// Channel using a non-default control-file identity for discovery.
    pub fn with_config(config: ApiFileConfig) -> Self {
        Self {
            path: None,
            file: None,
            config,
            hook: None,
        }
    }

    /// Channel bound to an explicit control-file path, skipping discovery.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            file: None,
            config: ApiFileConfig::default(),
            hook: None,
        }
    }

    /// Install an exchange hook. Test support; the default is real I/O.
    pub fn set_hook(&mut self, hook: Box<dyn ExchangeHook + Send>) {
        self.hook = Some(hook);
    }

    /// The resolved control-file path, if known yet.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Resolve the path if necessary and open the control file read/write.
    /// A channel that is already open is left as is.
    pub fn open(&mut self) -> Result<()> {
        let path = match &self.path {
            Some(path) => path.clone(),
            None => {
                let path = find_api_path(&self.config)?;
                self.path = Some(path.clone());
                path
            }
        };

        if self.file.is_none() {
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .open(&path)
                .map_err(|source| ClientError::CantOpenApiFile {
                    path: path.clone(),
                    source,
                })?;
            self.file = Some(file);
        }

        Ok(())
    }

    /// Close the control file. Idempotent; safe on an unopened channel.
    pub fn close(&mut self) {
        self.file = None;
    }

    /// Write `command`, then read the response into `response`.
    ///
    /// The exchange is strictly ordered: the response read starts only after
    /// the write has flushed, and a second command must not be issued before
    /// the first response has been read in full, since both sides share the
    /// same file offset.
    pub fn send_command(
        &mut self,
        command: &CommandBuffer,
        response: &mut CommandBuffer,
    ) -> Result<()> {
        self.open()?;
        self.write_command(command)?;

        if let Some(hook) = self.hook.as_mut() {
            hook.post_write()?;
            if let Some(canned) = hook.pre_read()? {
                *response = canned;
                return Ok(());
            }
        }

        self.read_response(response)
    }

    /// Write the full command at offset 0 and flush it through to the
    /// filesystem. Each stage failing yields its own error.
    fn write_command(&mut self, command: &CommandBuffer) -> Result<()> {
        let (path, file) = match (&self.path, self.file.as_mut()) {
            (Some(path), Some(file)) => (path, file),
            _ => return Err(ClientError::ApiFileNotOpen),
        };

        file.seek(SeekFrom::Start(0))
            .map_err(|source| ClientError::ApiFileSeekFail {
                path: path.clone(),
                source,
            })?;
        file.write_all(command.data())
            .map_err(|source| ClientError::ApiFileWriteFail {
                path: path.clone(),
                source,
            })?;
        file.flush()
            .map_err(|source| ClientError::ApiFileFlushFail {
                path: path.clone(),
                source,
            })?;

        debug!(bytes = command.size(), "wrote command");
        Ok(())
    }

    /// Read the response from offset 0 into `response`, in fixed-size
    /// chunks, until end of stream. Any failure other than EOF is fatal;
    /// the handle stays usable for the next exchange afterwards.
    fn read_response(&mut self, response: &mut CommandBuffer) -> Result<()> {
        let (path, file) = match (&self.path, self.file.as_mut()) {
            (Some(path), Some(file)) => (path, file),
            _ => return Err(ClientError::ApiFileNotOpen),
        };

        file.seek(SeekFrom::Start(0))
            .map_err(|source| ClientError::ApiFileSeekFail {
                path: path.clone(),
                source,
            })?;

        response.reset();
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            match file.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => response.append(&chunk[..n])?,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(ClientError::ApiFileReadFail {
                        path: path.clone(),
                        source,
                    })
                }
            }
        }

        debug!(bytes = response.size(), "read response");
        Ok(())
    }
}

impl Default for ApiChannel {
    fn default() -> Self {
        Self::new()
    }
}

//! Renderer process handle
//!
//! A [`BarProcess`] owns one spawned renderer: its argument vector, the write
//! end of its stdin, and a hidden flag. Teardown is close-then-wait: closing
//! stdin is what makes the renderer exit, so waiting first would block
//! forever on a renderer that is still reading.

use std::fmt;
use std::process::Stdio;

use barkeep_types::RendererConfig;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, Command};

use crate::error::BarError;

/// Child and its stdin, always present together.
struct Running {
    child: Child,
    stdin: ChildStdin,
}

pub struct BarProcess {
    name: String,
    args: Vec<String>,
    running: Option<Running>,
    hidden: bool,
}

impl fmt::Debug for BarProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BarProcess")
            .field("name", &self.name)
            .field("pid", &self.id())
            .field("args", &self.args)
            .field("hidden", &self.hidden)
            .finish()
    }
}

impl BarProcess {
    /// Placeholder for a slot that has never been drawn.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            running: None,
            hidden: true,
        }
    }

    /// Launch the renderer with `renderer.args` followed by `args`.
    pub fn spawn(
        name: impl Into<String>,
        renderer: &RendererConfig,
        args: Vec<String>,
    ) -> Result<Self, BarError> {
        let name = name.into();

        let mut child = Command::new(&renderer.program)
            .args(&renderer.args)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| BarError::Spawn {
                name: name.clone(),
                source,
            })?;

        let Some(stdin) = child.stdin.take() else {
            let _ = child.start_kill();
            return Err(BarError::MissingStdin { name });
        };

        tracing::debug!(bar = %name, pid = ?child.id(), ?args, "Renderer spawned");

        Ok(Self {
            name,
            args,
            running: Some(Running { child, stdin }),
            hidden: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// OS process id, while running.
    pub fn id(&self) -> Option<u32> {
        self.running.as_ref().and_then(|r| r.child.id())
    }

    /// Send one line of markup.
    pub async fn write_line(&mut self, content: &str) -> Result<(), BarError> {
        let Some(running) = self.running.as_mut() else {
            return Err(BarError::NotRunning {
                name: self.name.clone(),
            });
        };

        let mut line = String::with_capacity(content.len() + 1);
        line.push_str(content);
        line.push('\n');

        let mut result = running.stdin.write_all(line.as_bytes()).await;
        if result.is_ok() {
            result = running.stdin.flush().await;
        }

        result.map_err(|source| BarError::Write {
            name: self.name.clone(),
            source,
        })
    }

    /// Close stdin, mark hidden, then reap the renderer.
    ///
    /// Returns `Ok(false)` when nothing was running. The handle is hidden and
    /// empty afterwards whatever the outcome.
    pub async fn close(&mut self) -> Result<bool, BarError> {
        let Some(Running { mut child, mut stdin }) = self.running.take() else {
            return Ok(false);
        };

        let closed = stdin.shutdown().await;
        drop(stdin);
        self.hidden = true;

        if let Err(source) = closed {
            return Err(BarError::Close {
                name: self.name.clone(),
                source,
            });
        }

        let status = child.wait().await.map_err(|source| BarError::Wait {
            name: self.name.clone(),
            source,
        })?;

        if !status.success() {
            return Err(BarError::Exited {
                name: self.name.clone(),
                status,
            });
        }

        tracing::debug!(bar = %self.name, "Renderer closed");
        Ok(true)
    }
}

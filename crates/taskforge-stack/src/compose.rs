//! docker compose CLI wrapper
//!
//! Supports both the `docker compose` plugin and the standalone `docker-compose`
//! binary. The style is probed once per [`ComposeCli`] and reused for every call.

use crate::error::{Result, StackError};
use crate::runner::{CommandRunner, CommandSpec};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::sync::OnceCell;

/// One way of invoking compose
pub trait ComposeStyle: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    /// Executable to spawn
    fn program(&self) -> &'static str;

    /// Arguments placed before the compose options
    fn prefix(&self) -> &'static [&'static str];

    /// Lightweight capability check
    fn probe(&self) -> CommandSpec {
        CommandSpec::new(self.program())
            .args(self.prefix().iter().copied())
            .arg("version")
            .captured()
    }

    /// Base command bound to a project directory and descriptor
    fn command(&self, base_dir: &Path, descriptor: &Path) -> CommandSpec {
        CommandSpec::new(self.program())
            .args(self.prefix().iter().copied())
            .arg("-f")
            .arg(descriptor.to_string_lossy())
            .current_dir(base_dir)
    }
}

/// `docker compose ...`
#[derive(Debug, Clone, Copy)]
pub struct PluginStyle;

impl ComposeStyle for PluginStyle {
    fn name(&self) -> &'static str {
        "docker compose"
    }

    fn program(&self) -> &'static str {
        "docker"
    }

    fn prefix(&self) -> &'static [&'static str] {
        &["compose"]
    }
}

/// `docker-compose ...` (v1 standalone binary)
#[derive(Debug, Clone, Copy)]
pub struct StandaloneStyle;

impl ComposeStyle for StandaloneStyle {
    fn name(&self) -> &'static str {
        "docker-compose"
    }

    fn program(&self) -> &'static str {
        "docker-compose"
    }

    fn prefix(&self) -> &'static [&'static str] {
        &[]
    }
}

/// Probe order (first success wins)
pub const PREFERRED_STYLES: [&'static dyn ComposeStyle; 2] = [&PluginStyle, &StandaloneStyle];

/// Pick the first style whose probe exits successfully
pub async fn detect_style<R: CommandRunner + ?Sized>(
    runner: &R,
) -> Result<&'static dyn ComposeStyle> {
    for style in PREFERRED_STYLES {
        let probe = style.probe();
        match runner.run(&probe).await {
            Ok(output) if output.success() => {
                tracing::debug!("using {}", style.name());
                return Ok(style);
            }
            Ok(output) => {
                tracing::debug!("{} unavailable (exit {:?})", style.name(), output.code);
            }
            Err(StackError::ToolNotFound { program }) => {
                tracing::debug!("{} unavailable ({} not found)", style.name(), program);
            }
            Err(e) => return Err(e),
        }
    }

    Err(StackError::ComposeNotAvailable)
}

/// Options for `compose logs`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogsOptions {
    /// Empty means all services
    pub services: Vec<String>,
    pub follow: bool,
    /// `None` shows everything
    pub tail: Option<usize>,
}

impl Default for LogsOptions {
    fn default() -> Self {
        Self {
            services: Vec::new(),
            follow: false,
            tail: Some(200),
        }
    }
}

/// compose operations for one stack directory
pub struct ComposeCli<R> {
    runner: R,
    base_dir: PathBuf,
    descriptor: PathBuf,
    style: OnceCell<&'static dyn ComposeStyle>,
}

impl<R: CommandRunner> ComposeCli<R> {
    pub fn new(runner: R, base_dir: impl Into<PathBuf>, descriptor: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            base_dir: base_dir.into(),
            descriptor: descriptor.into(),
            style: OnceCell::new(),
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Selected style, probing on first use
    pub async fn style(&self) -> Result<&'static dyn ComposeStyle> {
        self.style
            .get_or_try_init(|| detect_style(&self.runner))
            .await
            .copied()
    }

    async fn command<I, S>(&self, args: I) -> Result<CommandSpec>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let style = self.style().await?;
        Ok(style.command(&self.base_dir, &self.descriptor).args(args))
    }

    /// Run with inherited stdio and fail on non-zero exit
    async fn invoke<I, S>(&self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let spec = self.command(args).await?;
        self.runner.run(&spec).await?.check(&spec)?;
        Ok(())
    }

    pub async fn pull(&self) -> Result<()> {
        self.invoke(["pull"]).await
    }

    /// `up -d <services...>`
    pub async fn up_services(&self, services: &[&str]) -> Result<()> {
        let args = ["up", "-d"].into_iter().chain(services.iter().copied());
        self.invoke(args).await
    }

    /// `up` for the whole topology
    pub async fn up(&self, detached: bool) -> Result<()> {
        let mut args = vec!["up"];
        if detached {
            args.push("-d");
        }
        self.invoke(args).await
    }

    /// `exec -T <service> <command...>`, output captured.
    ///
    /// Returns whether the command exited successfully.
    pub async fn exec_succeeds(&self, service: &str, command: &[&str]) -> Result<bool> {
        let args = ["exec", "-T", service]
            .into_iter()
            .chain(command.iter().copied());
        let spec = self.command(args).await?.captured();
        let output = self.runner.run(&spec).await?;

        if !output.success() {
            tracing::debug!(
                "{} not ready (exit {:?}): {}",
                service,
                output.code,
                output.stderr.trim()
            );
        }
        Ok(output.success())
    }

    /// `run --rm --workdir <workdir> <service> <command...>`
    pub async fn run_once(&self, service: &str, workdir: &str, command: &[&str]) -> Result<()> {
        let args = ["run", "--rm", "--workdir", workdir, service]
            .into_iter()
            .chain(command.iter().copied());
        self.invoke(args).await
    }

    pub async fn ps(&self, env_file: &Path) -> Result<()> {
        self.invoke(env_file_args(env_file, "ps")).await
    }

    /// Stops containers; volumes are kept
    pub async fn stop(&self, env_file: &Path) -> Result<()> {
        self.invoke(env_file_args(env_file, "stop")).await
    }

    pub async fn logs(&self, env_file: &Path, options: &LogsOptions) -> Result<()> {
        let mut args = env_file_args(env_file, "logs");
        if options.follow {
            args.push("--follow".to_string());
        }
        if let Some(tail) = options.tail.filter(|t| *t > 0) {
            args.push("--tail".to_string());
            args.push(tail.to_string());
        }
        args.extend(options.services.iter().cloned());
        self.invoke(args).await
    }
}

fn env_file_args(env_file: &Path, subcommand: &str) -> Vec<String> {
    vec![
        "--env-file".to_string(),
        env_file.to_string_lossy().into_owned(),
        subcommand.to_string(),
    ]
}

//! ローカルスタックのディレクトリ構成とハンドル

use crate::compose::ComposeCli;
use crate::error::{Result, StackError};
use crate::runner::CommandRunner;
use std::path::{Path, PathBuf};

/// 既定のスタックディレクトリ名（ホーム直下）
pub const DEFAULT_DIR_NAME: &str = ".taskforge";
pub const DESCRIPTOR_FILE_NAME: &str = "docker-compose.yml";
pub const ENV_FILE_NAME: &str = ".env";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackPaths {
    pub base_dir: PathBuf,
    pub descriptor: PathBuf,
    pub env_file: PathBuf,
}

impl StackPaths {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        Self {
            descriptor: base_dir.join(DESCRIPTOR_FILE_NAME),
            env_file: base_dir.join(ENV_FILE_NAME),
            base_dir,
        }
    }

    /// `~/.taskforge`
    pub fn default_location() -> Result<Self> {
        let home = dirs::home_dir().ok_or(StackError::HomeDirNotFound)?;
        Ok(Self::new(home.join(DEFAULT_DIR_NAME)))
    }

    /// 明示指定があればそれを、なければ既定の場所を使う
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(dir) => Ok(Self::new(dir)),
            None => Self::default_location(),
        }
    }
}

/// 1つのスタックディレクトリに対する操作
pub struct Stack<R> {
    pub(crate) paths: StackPaths,
    pub(crate) compose: ComposeCli<R>,
}

impl<R: CommandRunner> Stack<R> {
    pub fn new(paths: StackPaths, runner: R) -> Self {
        let compose = ComposeCli::new(runner, &paths.base_dir, &paths.descriptor);
        Self { paths, compose }
    }

    pub fn paths(&self) -> &StackPaths {
        &self.paths
    }

    pub fn compose(&self) -> &ComposeCli<R> {
        &self.compose
    }
}

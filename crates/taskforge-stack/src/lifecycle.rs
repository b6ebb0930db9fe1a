//! 初期化済みスタックに対する status / stop / logs

use crate::compose::LogsOptions;
use crate::error::{Result, StackError};
use crate::runner::CommandRunner;
use crate::stack::Stack;

impl<R: CommandRunner> Stack<R> {
    /// docker-compose.yml と .env が揃っているか確認する
    ///
    /// どちらかが無ければ `NotInitialized`。コマンドは一切実行しない。
    pub fn ensure_initialized(&self) -> Result<()> {
        for path in [&self.paths.descriptor, &self.paths.env_file] {
            match std::fs::metadata(path) {
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    return Err(StackError::NotInitialized {
                        missing: path.clone(),
                    });
                }
                Err(e) => return Err(StackError::file(path, e)),
            }
        }
        Ok(())
    }

    /// サービス一覧（compose ps）
    pub async fn status(&self) -> Result<()> {
        self.ensure_initialized()?;
        self.compose.ps(&self.paths.env_file).await
    }

    /// 全サービスを停止する（ボリュームは残す）
    pub async fn stop(&self) -> Result<()> {
        self.ensure_initialized()?;
        self.compose.stop(&self.paths.env_file).await
    }

    pub async fn logs(&self, options: &LogsOptions) -> Result<()> {
        self.ensure_initialized()?;
        self.compose.logs(&self.paths.env_file, options).await
    }
}

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StackError {
    #[error("ファイル {path} にアクセスできません: {source}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "コマンド '{program}' が見つかりません\n\nヒント:\n  • Docker がインストールされているか確認してください\n  • PATH に {program} が含まれているか確認してください"
    )]
    ToolNotFound { program: String },

    #[error(
        "docker compose が利用できません\n\nヒント:\n  • Docker Desktop / OrbStack をインストールしてください\n  • もしくは docker-compose (v1) をインストールしてください"
    )]
    ComposeNotAvailable,

    #[error("コマンドが失敗しました（終了コード: {}）: {command}", format_code(.code))]
    CommandFailed { command: String, code: Option<i32> },

    #[error(
        "依存サービスの準備完了を待機中にタイムアウトしました（{attempts}回試行）\n\nヒント:\n  • docker compose logs database でエラーを確認してください\n  • 再度 taskforge init を実行すると続きから再開できます"
    )]
    ReadinessTimeout { attempts: u32 },

    #[error("Taskforge が初期化されていません（{missing} がありません）。先に 'taskforge init' を実行してください")]
    NotInitialized { missing: PathBuf },

    #[error("ホームディレクトリが見つかりません。--dir でスタックのディレクトリを指定してください")]
    HomeDirNotFound,

    #[error(transparent)]
    Config(#[from] taskforge_config::ConfigError),

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

fn format_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "シグナルで終了".to_string(), |c| c.to_string())
}

impl StackError {
    pub(crate) fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StackError::FileAccess {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, StackError>;

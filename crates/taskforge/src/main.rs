mod commands;
mod progress;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use taskforge_stack::StackPaths;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "taskforge")]
#[command(about = "Taskforge サーバーをローカルで起動・管理する", long_about = None)]
struct Cli {
    /// CLI設定ファイル（既定: <設定ディレクトリ>/taskforge/config.json）
    #[arg(long, global = true, env = "TASKFORGE_CONFIG")]
    config: Option<PathBuf>,

    /// スタックディレクトリ（既定: ~/.taskforge）
    #[arg(long, global = true, env = "TASKFORGE_HOME")]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// ローカルスタックを初期化して起動
    Init {
        /// .env を作り直し、docker-compose.yml を再生成する（既存のシークレットは失われる）
        #[arg(short, long)]
        force: bool,
        /// 最後の起動をフォアグラウンドで実行
        #[arg(long)]
        foreground: bool,
    },
    /// サービスの状態を表示
    Status,
    /// 全サービスを停止（データは残る）
    Stop,
    /// サービスのログを表示
    Logs {
        /// サービス名（指定しない場合は全サービス）
        services: Vec<String>,
        /// ログをリアルタイムで追跡
        #[arg(short, long)]
        follow: bool,
        /// 末尾から表示する行数（0 で全件）
        #[arg(long, default_value = "200")]
        tail: usize,
    },
    /// バージョン情報を表示
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 進捗は stdout、診断ログは stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    if matches!(cli.command, Commands::Version) {
        println!("taskforge {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let paths = StackPaths::resolve(cli.dir.as_deref())?;
    tracing::debug!("stack directory: {}", paths.base_dir.display());

    match cli.command {
        Commands::Init { force, foreground } => {
            let config_path = taskforge_config::resolve_path(cli.config.as_deref())?;
            commands::init::handle(paths, config_path, force, foreground).await?;
        }
        Commands::Status => {
            commands::status::handle(paths).await?;
        }
        Commands::Stop => {
            commands::stop::handle(paths).await?;
        }
        Commands::Logs {
            services,
            follow,
            tail,
        } => {
            commands::logs::handle(paths, services, follow, tail).await?;
        }
        Commands::Version => {
            unreachable!("Version is handled before resolving the stack directory");
        }
    }

    Ok(())
}

use crate::progress::InitLogger;
use colored::Colorize;
use std::path::PathBuf;
use taskforge_stack::{InitOptions, Stack, StackPaths, SystemRunner};

pub async fn handle(
    paths: StackPaths,
    config_path: PathBuf,
    force: bool,
    foreground: bool,
) -> anyhow::Result<()> {
    println!("{}", "Taskforge をローカルで初期化中...".blue());

    if force {
        println!(
            "{}",
            "⚠ --force: .env を作り直します。既存のトークン・シークレット・追加した変数は失われます"
                .yellow()
                .bold()
        );
    }
    println!();

    let mut options = InitOptions::new(config_path);
    options.reset = force;
    options.force_topology = force;
    options.foreground = foreground;

    let stack = Stack::new(paths, SystemRunner);
    let mut logger = InitLogger::new();
    let result = stack.init(&options, &mut logger).await;
    logger.print_summary();

    let report = result?;

    println!();
    println!("{}", "✓ Taskforge が起動しました".green().bold());
    logger.log_detail(&format!("ディレクトリ: {}", report.paths.base_dir.display()));
    logger.log_detail(&format!("compose: {}", report.paths.descriptor.display()));
    logger.log_detail(&format!("env: {}", report.paths.env_file.display()));
    if report.credential_synced {
        logger.log_detail(&format!(
            "管理者トークンを {} に保存しました",
            options.config_path.display()
        ));
    }

    Ok(())
}

use colored::Colorize;
use taskforge_stack::{LogsOptions, Stack, StackPaths, SystemRunner};

pub async fn handle(
    paths: StackPaths,
    services: Vec<String>,
    follow: bool,
    tail: usize,
) -> anyhow::Result<()> {
    let stack = Stack::new(paths, SystemRunner);
    stack.ensure_initialized()?;

    if services.is_empty() {
        println!("{}", "ログを取得中...".blue());
    } else {
        println!("{} {}", "ログを取得中:".blue(), services.join(", ").cyan());
    }

    let options = LogsOptions {
        services,
        follow,
        tail: Some(tail),
    };
    stack.logs(&options).await?;
    Ok(())
}

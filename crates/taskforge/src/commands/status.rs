use colored::Colorize;
use taskforge_stack::{Stack, StackPaths, SystemRunner};

pub async fn handle(paths: StackPaths) -> anyhow::Result<()> {
    let stack = Stack::new(paths, SystemRunner);
    stack.ensure_initialized()?;

    println!("{}", "サービスの状態:".blue());
    stack.status().await?;
    Ok(())
}

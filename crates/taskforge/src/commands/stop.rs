use colored::Colorize;
use taskforge_stack::{Stack, StackPaths, SystemRunner};

pub async fn handle(paths: StackPaths) -> anyhow::Result<()> {
    let stack = Stack::new(paths, SystemRunner);
    stack.ensure_initialized()?;

    println!("{}", "Taskforge を停止中...".yellow());
    stack.stop().await?;

    println!();
    println!("{}", "✓ 停止しました（データは保持されています）".green().bold());
    Ok(())
}

//! init の進捗表示
//!
//! 各ステージの開始・完了・所要時間をタイムスタンプ付きで出力する。

use chrono::Local;
use colored::Colorize;
use std::time::{Duration, Instant};
use taskforge_stack::{BringupStage, StackError, StageObserver};

/// ステージの実行結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageResult {
    Success { duration: Duration },
    SuccessWithRetry { duration: Duration, retries: u32 },
    Failed { duration: Duration },
}

impl StageResult {
    pub fn duration(&self) -> Duration {
        match self {
            Self::Success { duration }
            | Self::SuccessWithRetry { duration, .. }
            | Self::Failed { duration } => *duration,
        }
    }
}

/// init の進捗ログ出力器
pub struct InitLogger {
    start_time: Instant,
    results: Vec<(BringupStage, StageResult)>,
    current: Option<(BringupStage, Instant)>,
    retries: u32,
}

impl InitLogger {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            results: Vec::new(),
            current: None,
            retries: 0,
        }
    }

    fn timestamp() -> String {
        Local::now().format("%H:%M:%S").to_string()
    }

    /// 詳細メッセージをログ出力
    pub fn log_detail(&self, message: &str) {
        println!("[{}]   → {}", Self::timestamp().dimmed(), message.cyan());
    }

    pub fn results(&self) -> &[(BringupStage, StageResult)] {
        &self.results
    }

    /// サマリーを出力
    pub fn print_summary(&self) {
        let total_duration = self.start_time.elapsed();
        let total_retries: u32 = self
            .results
            .iter()
            .filter_map(|(_, result)| match result {
                StageResult::SuccessWithRetry { retries, .. } => Some(*retries),
                _ => None,
            })
            .sum();
        let error_count = self
            .results
            .iter()
            .filter(|(_, result)| matches!(result, StageResult::Failed { .. }))
            .count();
        let slowest = self
            .results
            .iter()
            .map(|(stage, result)| (stage, result.duration()))
            .max_by_key(|(_, d)| *d);

        println!();
        println!("{}", "═".repeat(44));
        println!("Init Summary");
        println!("{}", "─".repeat(44));
        println!("Total time:    {}", format_duration(total_duration).green());

        if let Some((stage, duration)) = slowest {
            println!(
                "Slowest stage: {} ({})",
                stage.name(),
                format_duration(duration)
            );
        }

        if total_retries > 0 {
            println!("Retries:       {}", total_retries.to_string().yellow());
        } else {
            println!("Retries:       0");
        }

        if error_count > 0 {
            println!("Errors:        {}", error_count.to_string().red().bold());
        } else {
            println!("Errors:        {}", "0".green());
        }
        println!("{}", "═".repeat(44));
    }
}

impl Default for InitLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl StageObserver for InitLogger {
    fn stage_started(&mut self, stage: BringupStage) {
        println!("[{}] {} {}", Self::timestamp().dimmed(), "▶".cyan(), stage.name());
        self.current = Some((stage, Instant::now()));
        self.retries = 0;
    }

    fn stage_completed(&mut self, stage: BringupStage, detail: Option<&str>) {
        let duration = self
            .current
            .take()
            .map(|(_, start)| start.elapsed())
            .unwrap_or_default();
        let duration_str = format_duration(duration);
        let message = detail
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} 完了", stage.name()));

        let result = if self.retries > 0 {
            println!(
                "[{}] {} {} ({}, {} retries)",
                Self::timestamp().dimmed(),
                "✓".green().bold(),
                message,
                duration_str.dimmed(),
                self.retries
            );
            StageResult::SuccessWithRetry {
                duration,
                retries: self.retries,
            }
        } else {
            println!(
                "[{}] {} {} ({})",
                Self::timestamp().dimmed(),
                "✓".green().bold(),
                message,
                duration_str.dimmed()
            );
            StageResult::Success { duration }
        };
        self.results.push((stage, result));
    }

    fn stage_failed(&mut self, stage: BringupStage, error: &StackError) {
        let duration = self
            .current
            .take()
            .map(|(_, start)| start.elapsed())
            .unwrap_or_default();

        println!(
            "[{}] {} {}: {}",
            Self::timestamp().dimmed(),
            "✗".red().bold(),
            stage.name(),
            error.to_string().red()
        );
        self.results.push((stage, StageResult::Failed { duration }));
    }

    fn readiness_retry(&mut self, attempt: u32, max_attempts: u32) {
        self.retries += 1;
        println!(
            "[{}] {} リトライ {}/{}: {}",
            Self::timestamp().dimmed(),
            "⟳".yellow(),
            attempt,
            max_attempts,
            "database / cache が応答しません".dimmed()
        );
    }
}

/// Duration を読みやすい形式にフォーマット
fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if total_secs >= 60 {
        format!("{}m {}s", total_secs / 60, total_secs % 60)
    } else if total_secs >= 1 {
        format!("{}.{}s", total_secs, millis / 100)
    } else {
        format!("{}ms", millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
    }

    #[test]
    fn test_records_retries_on_completion() {
        let mut logger = InitLogger::new();
        logger.stage_started(BringupStage::WaitReady);
        logger.readiness_retry(1, 20);
        logger.readiness_retry(2, 20);
        logger.stage_completed(BringupStage::WaitReady, Some("3 回目で準備完了"));

        match &logger.results()[0] {
            (BringupStage::WaitReady, StageResult::SuccessWithRetry { retries, .. }) => {
                assert_eq!(*retries, 2);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_retry_count_resets_per_stage() {
        let mut logger = InitLogger::new();
        logger.stage_started(BringupStage::WaitReady);
        logger.readiness_retry(1, 20);
        logger.stage_completed(BringupStage::WaitReady, None);
        logger.stage_started(BringupStage::Migrate);
        logger.stage_failed(
            BringupStage::Migrate,
            &StackError::CommandFailed {
                command: "docker compose run".to_string(),
                code: Some(1),
            },
        );

        assert_eq!(logger.results().len(), 2);
        assert!(matches!(
            logger.results()[1],
            (BringupStage::Migrate, StageResult::Failed { .. })
        ));
    }
}

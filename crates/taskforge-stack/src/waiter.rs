//! 依存サービス待機モジュール（固定間隔リトライ）
//!
//! database / cache に対して軽量なコマンドを実行し、すべて成功するまで待機する。

use crate::compose::ComposeCli;
use crate::error::{Result, StackError};
use crate::runner::CommandRunner;
use crate::topology::{CACHE_SERVICE, DATABASE_SERVICE};
use std::time::Duration;
use tokio::time::sleep;

/// 待機設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessConfig {
    /// 最大試行回数
    pub max_attempts: u32,
    /// 試行間の待機時間
    pub interval: Duration,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            interval: Duration::from_secs(2),
        }
    }
}

/// サービスに対する準備完了チェック
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessProbe {
    pub service: &'static str,
    pub command: &'static [&'static str],
}

/// ステートフルな依存サービスのチェック（この順に実行）
pub const STATEFUL_PROBES: [ReadinessProbe; 2] = [
    ReadinessProbe {
        service: DATABASE_SERVICE,
        command: &["pg_isready", "-U", "taskforge", "-d", "taskforge"],
    },
    ReadinessProbe {
        service: CACHE_SERVICE,
        command: &["redis-cli", "ping"],
    },
];

/// 1回の試行: すべてのチェックが成功すれば true（最初の失敗で打ち切り）
async fn check_all<R: CommandRunner>(
    compose: &ComposeCli<R>,
    probes: &[ReadinessProbe],
) -> Result<bool> {
    for probe in probes {
        if !compose.exec_succeeds(probe.service, probe.command).await? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// 依存サービスの準備完了を待機
///
/// # Returns
/// * `Ok(attempts)` - 準備完了までに要した試行回数
/// * `Err(StackError::ReadinessTimeout)` - 最大試行回数に達した
///
/// `on_retry` は失敗した試行ごとに `(attempt, max_attempts)` で呼ばれる（最後の試行を除く）。
pub async fn wait_for_services<R, F>(
    compose: &ComposeCli<R>,
    probes: &[ReadinessProbe],
    config: &ReadinessConfig,
    mut on_retry: F,
) -> Result<u32>
where
    R: CommandRunner,
    F: FnMut(u32, u32),
{
    for attempt in 1..=config.max_attempts {
        if check_all(compose, probes).await? {
            return Ok(attempt);
        }

        // 最後の試行でなければ待機
        if attempt < config.max_attempts {
            on_retry(attempt, config.max_attempts);
            sleep(config.interval).await;
        }
    }

    Err(StackError::ReadinessTimeout {
        attempts: config.max_attempts,
    })
}

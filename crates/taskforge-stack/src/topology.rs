//! docker-compose.yml の生成
//!
//! 初回のみ書き出し、以降は `force` 指定時か旧テンプレートの目印がある場合だけ書き直す。

use crate::error::{Result, StackError};
use crate::fsutil;
use std::path::Path;

/// 生成する docker-compose.yml
pub const CANONICAL_DESCRIPTOR: &str = include_str!("../templates/docker-compose.yml");

/// 旧テンプレート（container_name 固定版）の目印
///
/// 現行テンプレートには含まれないため、一度書き出したファイルは force なしでは変更されない。
pub const LEGACY_MARKER: &str = "container_name: taskforge-";

const DESCRIPTOR_MODE: u32 = 0o644;

/// ステートフルな依存サービス
pub const DATABASE_SERVICE: &str = "database";
pub const CACHE_SERVICE: &str = "cache";
/// アプリケーションサービス
pub const SERVER_SERVICE: &str = "server";
pub const WORKER_SERVICE: &str = "worker";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyDecision {
    /// ファイルがなかったので作成
    Created,
    /// force 指定で上書き
    Forced,
    /// 旧テンプレートを検出して上書き
    LegacyReplaced,
    /// 既存ファイルをそのまま使用
    Kept,
}

impl TopologyDecision {
    pub fn wrote_file(&self) -> bool {
        !matches!(self, Self::Kept)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Created => "作成しました",
            Self::Forced => "--force により再生成しました",
            Self::LegacyReplaced => "旧テンプレートを置き換えました",
            Self::Kept => "既存のファイルを使用します",
        }
    }
}

/// 既存の内容を書き直すべきか
fn is_legacy(existing: &str) -> bool {
    existing.contains(LEGACY_MARKER)
}

pub fn reconcile(path: &Path, force: bool) -> Result<TopologyDecision> {
    let decision = if force {
        TopologyDecision::Forced
    } else {
        match std::fs::read_to_string(path) {
            Ok(existing) if is_legacy(&existing) => TopologyDecision::LegacyReplaced,
            Ok(_) => TopologyDecision::Kept,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => TopologyDecision::Created,
            Err(e) => return Err(StackError::file(path, e)),
        }
    };

    if decision.wrote_file() {
        fsutil::write_atomic(path, CANONICAL_DESCRIPTOR, DESCRIPTOR_MODE)?;
    }
    tracing::info!("topology {}: {:?}", path.display(), decision);

    Ok(decision)
}

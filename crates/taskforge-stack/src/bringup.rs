//! ローカルスタックの初期化（init）
//!
//! 固定順のステージを順に実行する。途中で失敗した場合はそこで中断し、
//! 前のステージの結果は巻き戻さない（再度 init を実行すれば続きから揃う）。

use crate::env;
use crate::error::{Result, StackError};
use crate::fsutil;
use crate::runner::CommandRunner;
use crate::stack::{Stack, StackPaths};
use crate::topology::{self, CACHE_SERVICE, DATABASE_SERVICE, SERVER_SERVICE, TopologyDecision};
use crate::waiter::{self, ReadinessConfig, STATEFUL_PROBES};
use std::path::{Path, PathBuf};

/// マイグレーションを実行するサービスと作業ディレクトリ
pub const MIGRATION_SERVICE: &str = SERVER_SERVICE;
pub const MIGRATION_WORKDIR: &str = "/app/apps/server";
pub const MIGRATION_COMMAND: [&str; 3] = ["node_modules/.bin/prisma", "migrate", "deploy"];

/// init の各ステージ（実行順）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BringupStage {
    /// スタックディレクトリ作成
    EnsureDirectory,
    /// .env の補完
    ReconcileEnv,
    /// docker-compose.yml の生成
    ReconcileTopology,
    /// CLI設定へのトークン反映
    SyncCredentials,
    /// イメージ取得
    Pull,
    /// database / cache 起動
    StartDependencies,
    /// 準備完了待ち
    WaitReady,
    /// マイグレーション
    Migrate,
    /// 全サービス起動
    StartAll,
}

impl BringupStage {
    pub const ALL: [BringupStage; 9] = [
        Self::EnsureDirectory,
        Self::ReconcileEnv,
        Self::ReconcileTopology,
        Self::SyncCredentials,
        Self::Pull,
        Self::StartDependencies,
        Self::WaitReady,
        Self::Migrate,
        Self::StartAll,
    ];

    /// ステージの日本語名
    pub fn name(&self) -> &'static str {
        match self {
            Self::EnsureDirectory => "ディレクトリ作成",
            Self::ReconcileEnv => "環境変数ファイル更新",
            Self::ReconcileTopology => "docker-compose.yml 確認",
            Self::SyncCredentials => "CLI設定の更新",
            Self::Pull => "イメージ取得",
            Self::StartDependencies => "database / cache 起動",
            Self::WaitReady => "準備完了待ち",
            Self::Migrate => "マイグレーション",
            Self::StartAll => "全サービス起動",
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Self::EnsureDirectory => "dir",
            Self::ReconcileEnv => "env",
            Self::ReconcileTopology => "topology",
            Self::SyncCredentials => "credentials",
            Self::Pull => "pull",
            Self::StartDependencies => "deps",
            Self::WaitReady => "ready",
            Self::Migrate => "migrate",
            Self::StartAll => "up",
        }
    }
}

/// init の進捗通知
pub trait StageObserver {
    fn stage_started(&mut self, _stage: BringupStage) {}
    fn stage_completed(&mut self, _stage: BringupStage, _detail: Option<&str>) {}
    fn stage_failed(&mut self, _stage: BringupStage, _error: &StackError) {}
    /// 準備完了待ちの失敗した試行（最後の試行を除く）
    fn readiness_retry(&mut self, _attempt: u32, _max_attempts: u32) {}
}

/// 通知を捨てる
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl StageObserver for NullObserver {}

/// init の実行オプション（呼び出しごとに構築する）
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// .env の既存値（シークレット・追加キー・コメント）をすべて破棄する
    pub reset: bool,
    /// docker-compose.yml を必ず書き直す
    pub force_topology: bool,
    /// 最後の `up` をフォアグラウンドで実行する
    pub foreground: bool,
    pub readiness: ReadinessConfig,
    /// CLI設定ファイル
    pub config_path: PathBuf,
}

impl InitOptions {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            reset: false,
            force_topology: false,
            foreground: false,
            readiness: ReadinessConfig::default(),
            config_path: config_path.into(),
        }
    }
}

/// init の結果
#[derive(Debug, Clone)]
pub struct InitReport {
    pub paths: StackPaths,
    pub created_dir: bool,
    pub topology: TopologyDecision,
    /// 既定値を入れた .env のキー
    pub generated: Vec<&'static str>,
    pub credential_synced: bool,
    pub readiness_attempts: u32,
}

/// CLI設定のトークンが空なら管理者トークンを書き込む
///
/// 書き込んだ場合は true を返す。
pub fn sync_credentials(config_path: &Path, admin_token: &str) -> Result<bool> {
    let config = taskforge_config::load(config_path)?;
    if config.has_token() {
        tracing::debug!("config token already set, leaving {}", config_path.display());
        return Ok(false);
    }

    let token = admin_token.trim();
    if token.is_empty() {
        return Ok(false);
    }

    let mut config = config.with_default_server_url();
    config.token = token.to_string();
    taskforge_config::save(config_path, &config)?;
    tracing::info!("admin token written to {}", config_path.display());
    Ok(true)
}

/// ステージの結果を通知して返す
fn finish<T>(
    observer: &mut dyn StageObserver,
    stage: BringupStage,
    result: Result<T>,
    detail: impl FnOnce(&T) -> Option<String>,
) -> Result<T> {
    match result {
        Ok(value) => {
            observer.stage_completed(stage, detail(&value).as_deref());
            Ok(value)
        }
        Err(e) => {
            tracing::debug!("stage {} failed: {}", stage.id(), e);
            observer.stage_failed(stage, &e);
            Err(e)
        }
    }
}

impl<R: CommandRunner> Stack<R> {
    /// スタックを初期化して起動する
    pub async fn init(
        &self,
        options: &InitOptions,
        observer: &mut dyn StageObserver,
    ) -> Result<InitReport> {
        let paths = &self.paths;

        // 1. ディレクトリ
        observer.stage_started(BringupStage::EnsureDirectory);
        let created_dir = finish(
            observer,
            BringupStage::EnsureDirectory,
            fsutil::ensure_private_dir(&paths.base_dir),
            |created| (!*created).then(|| "既に存在します".to_string()),
        )?;

        // 2. .env
        observer.stage_started(BringupStage::ReconcileEnv);
        let reconciled = finish(
            observer,
            BringupStage::ReconcileEnv,
            env::reconcile(&paths.env_file, options.reset),
            |r| (!r.generated.is_empty()).then(|| format!("生成: {}", r.generated.join(", "))),
        )?;

        // 3. docker-compose.yml
        observer.stage_started(BringupStage::ReconcileTopology);
        let decision = finish(
            observer,
            BringupStage::ReconcileTopology,
            topology::reconcile(&paths.descriptor, options.force_topology),
            |d| Some(d.label().to_string()),
        )?;

        // 4. CLI設定
        observer.stage_started(BringupStage::SyncCredentials);
        let admin_token = reconciled.env.get(env::ADMIN_TOKEN).unwrap_or_default();
        let credential_synced = finish(
            observer,
            BringupStage::SyncCredentials,
            sync_credentials(&options.config_path, admin_token),
            |synced| (!*synced).then(|| "トークン設定済みのため変更なし".to_string()),
        )?;

        // 5. pull
        observer.stage_started(BringupStage::Pull);
        let result = self.compose.pull().await;
        finish(observer, BringupStage::Pull, result, |_| None)?;

        // 6. database / cache
        observer.stage_started(BringupStage::StartDependencies);
        let result = self
            .compose
            .up_services(&[DATABASE_SERVICE, CACHE_SERVICE])
            .await;
        finish(observer, BringupStage::StartDependencies, result, |_| None)?;

        // 7. 準備完了待ち
        observer.stage_started(BringupStage::WaitReady);
        let result = waiter::wait_for_services(
            &self.compose,
            &STATEFUL_PROBES,
            &options.readiness,
            |attempt, max| observer.readiness_retry(attempt, max),
        )
        .await;
        let readiness_attempts = finish(observer, BringupStage::WaitReady, result, |n| {
            Some(format!("{} 回目で準備完了", n))
        })?;

        // 8. マイグレーション（準備完了後のみ）
        observer.stage_started(BringupStage::Migrate);
        let result = self
            .compose
            .run_once(MIGRATION_SERVICE, MIGRATION_WORKDIR, &MIGRATION_COMMAND)
            .await;
        finish(observer, BringupStage::Migrate, result, |_| None)?;

        // 9. 全サービス
        observer.stage_started(BringupStage::StartAll);
        let result = self.compose.up(!options.foreground).await;
        finish(observer, BringupStage::StartAll, result, |_| None)?;

        Ok(InitReport {
            paths: paths.clone(),
            created_dir,
            topology: decision,
            generated: reconciled.generated,
            credential_synced,
            readiness_attempts,
        })
    }
}

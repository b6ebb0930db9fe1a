use async_trait::async_trait;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use taskforge_stack::{
    BringupStage, CommandOutput, CommandRunner, CommandSpec, InitOptions, Stack, StackError,
    StackPaths, StageObserver,
};
use tempfile::TempDir;

/// 実プロセスを起動せずにコマンドを記録する
pub struct FakeRunner {
    plugin_available: bool,
    /// exec が成功し始める回数（None なら常に失敗）
    ready_after: Option<u32>,
    /// この引数を含むコマンドを失敗させる
    fail_on: Option<&'static str>,
    calls: Mutex<Vec<CommandSpec>>,
    execs: AtomicU32,
}

#[allow(dead_code)]
impl FakeRunner {
    pub fn new() -> Self {
        Self {
            plugin_available: true,
            ready_after: Some(1),
            fail_on: None,
            calls: Mutex::new(Vec::new()),
            execs: AtomicU32::new(0),
        }
    }

    pub fn never_ready() -> Self {
        Self {
            ready_after: None,
            ..Self::new()
        }
    }

    pub fn standalone_only() -> Self {
        Self {
            plugin_available: false,
            ..Self::new()
        }
    }

    pub fn failing_on(arg: &'static str) -> Self {
        Self {
            fail_on: Some(arg),
            ..Self::new()
        }
    }

    pub fn specs(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    /// compose のオプション（`-f <path>`）以降の引数。probe はコマンド全体
    pub fn invocations(&self) -> Vec<String> {
        self.specs()
            .iter()
            .map(|spec| match spec.args.iter().position(|a| a == "-f") {
                Some(i) => spec.args[i + 2..].join(" "),
                None => spec.display(),
            })
            .collect()
    }

    pub fn exec_count(&self) -> u32 {
        self.execs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, spec: &CommandSpec) -> taskforge_stack::Result<CommandOutput> {
        self.calls.lock().unwrap().push(spec.clone());

        if spec.program == "docker" && !self.plugin_available {
            return Ok(CommandOutput::with_code(1));
        }

        if spec.args.iter().any(|a| a == "exec") {
            let n = self.execs.fetch_add(1, Ordering::SeqCst) + 1;
            let ready = self.ready_after.is_some_and(|after| n >= after);
            return Ok(CommandOutput::with_code(if ready { 0 } else { 1 }));
        }

        if let Some(arg) = self.fail_on {
            if spec.args.iter().any(|a| a == arg) {
                return Ok(CommandOutput::with_code(1));
            }
        }

        Ok(CommandOutput::with_code(0))
    }
}

/// 受け取った通知を記録する
#[derive(Default)]
pub struct RecordingObserver {
    pub started: Vec<BringupStage>,
    pub completed: Vec<BringupStage>,
    pub failed: Vec<BringupStage>,
    pub retries: Vec<(u32, u32)>,
}

impl StageObserver for RecordingObserver {
    fn stage_started(&mut self, stage: BringupStage) {
        self.started.push(stage);
    }

    fn stage_completed(&mut self, stage: BringupStage, _detail: Option<&str>) {
        self.completed.push(stage);
    }

    fn stage_failed(&mut self, stage: BringupStage, _error: &StackError) {
        self.failed.push(stage);
    }

    fn readiness_retry(&mut self, attempt: u32, max_attempts: u32) {
        self.retries.push((attempt, max_attempts));
    }
}

pub struct TestStack {
    pub root: TempDir,
}

#[allow(dead_code)]
impl TestStack {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        Self { root }
    }

    pub fn paths(&self) -> StackPaths {
        StackPaths::new(self.root.path().join("stack"))
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.path().join("config").join("config.json")
    }

    pub fn options(&self) -> InitOptions {
        InitOptions::new(self.config_path())
    }

    pub fn stack(&self, runner: FakeRunner) -> Stack<FakeRunner> {
        Stack::new(self.paths(), runner)
    }

    pub fn write_env(&self, content: &str) {
        let paths = self.paths();
        fs::create_dir_all(&paths.base_dir).unwrap();
        fs::write(paths.env_file, content).unwrap();
    }

    pub fn write_descriptor(&self, content: &str) {
        let paths = self.paths();
        fs::create_dir_all(&paths.base_dir).unwrap();
        fs::write(paths.descriptor, content).unwrap();
    }

    pub fn read_env(&self) -> String {
        fs::read_to_string(self.paths().env_file).unwrap()
    }

    pub fn read_descriptor(&self) -> String {
        fs::read_to_string(self.paths().descriptor).unwrap()
    }

    /// .env から値を取り出す
    pub fn env_value(&self, key: &str) -> Option<String> {
        let prefix = format!("{}=", key);
        self.read_env()
            .lines()
            .find_map(|line| line.strip_prefix(&prefix).map(str::to_string))
    }

    pub fn config_token(&self) -> String {
        taskforge_config::load(&self.config_path()).unwrap().token
    }
}

//! Taskforge CLI の設定ストア
//!
//! `~/.config/taskforge/config.json` に保存されるサーバーURLとAPIトークンを扱う。
//! ローカルスタックの初期化時には、トークンが空の場合に限り管理者トークンが書き込まれる。

pub mod error;

pub use error::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// サーバーURLの既定値（ローカルスタックの server サービス）
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000/v1/api";

const CONFIG_DIR_NAME: &str = "taskforge";
const CONFIG_FILE_NAME: &str = "config.json";

/// CLIの接続設定
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    #[serde(rename = "serverUrl")]
    pub server_url: String,
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
}

impl CliConfig {
    /// トークンが設定済みか（空白のみは未設定扱い）
    pub fn has_token(&self) -> bool {
        !self.token.trim().is_empty()
    }

    /// サーバーURLが空なら既定値を埋める
    pub fn with_default_server_url(mut self) -> Self {
        if self.server_url.trim().is_empty() {
            self.server_url = DEFAULT_SERVER_URL.to_string();
        }
        self
    }
}

/// Taskforgeの設定ディレクトリ（作成はしない）
pub fn config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join(CONFIG_DIR_NAME))
}

/// 既定の設定ファイルパス
pub fn default_config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// 明示指定があればそれを、なければ既定パスを返す
pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => default_config_path(),
    }
}

/// 設定ファイルを読み込む
///
/// ファイルが存在しない場合は空の設定を返す。
pub fn load(path: &Path) -> Result<CliConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("config file {} not found, using empty config", path.display());
            return Ok(CliConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// 設定ファイルを保存する（所有者のみ読み書き可）
pub fn save(path: &Path, config: &CliConfig) -> Result<()> {
    if config.server_url.trim().is_empty() {
        return Err(ConfigError::MissingServerUrl);
    }

    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_private_dir(parent).map_err(io_err)?;
    }

    let data = serde_json::to_string_pretty(config)?;
    std::fs::write(path, data).map_err(io_err)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).map_err(io_err)?;
    }

    tracing::debug!("saved config to {}", path.display());
    Ok(())
}

fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_missing_file_returns_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = load(&temp_dir.path().join("config.json")).unwrap();
        assert_eq!(config, CliConfig::default());
        assert!(!config.has_token());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.json");

        let config = CliConfig {
            server_url: "http://example.test/v1/api".to_string(),
            token: "abc".to_string(),
            profile: None,
        };
        save(&path, &config).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded, config);

        // profile は None なら出力しない
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"serverUrl\""));
        assert!(!raw.contains("profile"));
    }

    #[cfg(unix)]
    #[test]
    fn test_save_restricts_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.json");
        save(&path, &CliConfig::default().with_default_server_url()).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_save_requires_server_url() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = save(&temp_dir.path().join("config.json"), &CliConfig::default());
        assert!(matches!(result, Err(ConfigError::MissingServerUrl)));
    }

    #[test]
    fn test_load_partial_document() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, r#"{"token": "  "}"#).unwrap();

        let config = load(&path).unwrap();
        assert_eq!(config.server_url, "");
        assert!(!config.has_token());

        let config = config.with_default_server_url();
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
    }

    #[test]
    fn test_load_invalid_json() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();

        match load(&path) {
            Err(ConfigError::Parse { path: p, .. }) => assert_eq!(p, path),
            other => panic!("Expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_path_explicit() {
        let explicit = PathBuf::from("/tmp/custom.json");
        assert_eq!(resolve_path(Some(&explicit)).unwrap(), explicit);
    }

    #[cfg(target_os = "linux")]
    #[test]
    #[serial_test::serial]
    fn test_default_config_path_follows_xdg() {
        let temp_dir = tempfile::tempdir().unwrap();
        temp_env::with_var("XDG_CONFIG_HOME", Some(temp_dir.path()), || {
            let path = default_config_path().unwrap();
            assert_eq!(path, temp_dir.path().join("taskforge").join("config.json"));
            assert!(!path.exists());
        });
    }
}

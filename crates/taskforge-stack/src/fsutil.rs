//! ファイル書き込みユーティリティ

use crate::error::{Result, StackError};
use std::io::Write;
use std::path::Path;

/// 同じディレクトリに一時ファイルを作ってから rename で置き換える
///
/// 途中で失敗しても既存ファイルは壊れない。`mode` は Unix でのみ適用される。
pub fn write_atomic(path: &Path, contents: &str, mode: u32) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| StackError::file(dir, e))?;
    tmp.write_all(contents.as_bytes())
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| StackError::file(tmp.path(), e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(mode))
            .map_err(|e| StackError::file(tmp.path(), e))?;
    }
    #[cfg(not(unix))]
    let _ = mode;

    tmp.persist(path)
        .map_err(|e| StackError::file(path, e.error))?;
    Ok(())
}

/// ディレクトリを作成する（存在しない場合のみ、所有者のみアクセス可）
///
/// 作成した場合は true を返す。
pub fn ensure_private_dir(dir: &Path) -> Result<bool> {
    if dir.is_dir() {
        return Ok(false);
    }

    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(dir).map_err(|e| StackError::file(dir, e))?;
    Ok(true)
}

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use crate::config::AppConfig;

#[derive(Debug, Clone)]
pub struct ResolvedPaths {
    pub logs_dir: PathBuf,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
}

pub fn ensure_directories(config: &AppConfig) -> Result<ResolvedPaths> {
    let logs_dir = ensure_dir(Path::new(&config.directories.logs_dir))?;

    let output_path = PathBuf::from(&config.output_path);
    let output_dir = match output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent)?,
        _ => ensure_dir(Path::new("."))?,
    };

    let marker_file = output_dir.join(".write-test");
    fs::write(&marker_file, b"ok")
        .with_context(|| format!("report directory {} is not writable", output_dir.display()))?;
    fs::remove_file(&marker_file)?;

    Ok(ResolvedPaths {
        logs_dir,
        input_path: PathBuf::from(&config.input_path),
        output_path,
    })
}

fn ensure_dir(dir: &Path) -> Result<PathBuf> {
    if !dir.exists() {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create directory {}", dir.display()))?;
    }
    Ok(dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf()))
}

//! 持久化的播放会话
//!
//! 会话在启动时读取一次，之后所有修改直接写回文件，退出时可以整体清除。
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub struct SessionStore<T> {
    path: PathBuf,
    value: Option<T>,
}

impl<T: Serialize + DeserializeOwned> SessionStore<T> {
    /// 读取已经保存的会话，文件不存在时得到空的会话
    ///
    /// 无法解析的旧会话会被忽略，不影响启动
    pub fn init(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let value = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!("会话文件 {} 无法解析，将被忽略：{e}", path.display());
                    None
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(e).with_context(|| format!("读取会话文件 {} 失败", path.display())),
        };
        Ok(Self { path, value })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn save(&mut self, value: T) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string(&value)?)
            .with_context(|| format!("写入会话文件 {} 失败", self.path.display()))?;
        self.value = Some(value);
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        self.value = None;
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => {
                Err(e).with_context(|| format!("删除会话文件 {} 失败", self.path.display()))
            }
            _ => Ok(()),
        }
    }
}

/// 上次播放到的位置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSession {
    pub position_ms: u64,
    pub saved_at: DateTime<Local>,
}

impl PlaybackSession {
    pub fn new(position: Duration) -> Self {
        Self {
            position_ms: position.as_millis() as u64,
            saved_at: Local::now(),
        }
    }

    pub fn position(&self) -> Duration {
        Duration::from_millis(self.position_ms)
    }
}

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

mod args;

pub use crate::config::args::Args;
use crate::danmaku::{CanvasConfig, DanmakuOption};

pub static CONFIG_DIR: LazyLock<PathBuf> = LazyLock::new(|| {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tale-danmaku")
});

fn default_frame_interval_ms() -> u64 {
    100
}

fn default_session_path() -> PathBuf {
    CONFIG_DIR.join("session.json")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// 渲染快照的间隔
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
    #[serde(default = "default_session_path")]
    pub session_path: PathBuf,
    #[serde(default)]
    pub canvas: CanvasConfig,
    #[serde(default)]
    pub danmaku_option: DanmakuOption,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frame_interval_ms: default_frame_interval_ms(),
            session_path: default_session_path(),
            canvas: CanvasConfig::default(),
            danmaku_option: DanmakuOption::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let config_content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&config_content)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// 配置文件不存在时使用默认配置，并写回配置文件
    pub fn load_or_default(path: &Path) -> Result<Self> {
        info!("开始加载配置文件 {}..", path.display());
        let config = match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                if err
                    .downcast_ref::<std::io::Error>()
                    .is_none_or(|e| e.kind() != std::io::ErrorKind::NotFound)
                {
                    return Err(err.context(format!("加载配置文件 {} 失败", path.display())));
                }
                warn!("配置文件不存在，使用默认配置..");
                let config = Self::default();
                config.save(path).context("保存默认配置时遇到错误")?;
                config
            }
        };
        Ok(config)
    }

    pub fn check(&self) -> Result<()> {
        let mut errors = Vec::new();
        let option = &self.danmaku_option;
        if !(option.duration > 0.0) {
            errors.push("弹幕显示时长必须大于 0");
        }
        if option.font_size == 0 {
            errors.push("弹幕字号必须大于 0");
        }
        if option.lane_size == 0 {
            errors.push("lane 大小必须大于 0");
        }
        if !(option.float_percentage > 0.0 && option.float_percentage <= 1.0) {
            errors.push("滚动弹幕高度百分比应在 (0, 1] 之间");
        }
        if option.max_delay < 0.0 {
            errors.push("最大延迟不能为负数");
        }
        if self.canvas.width == 0 || self.canvas.height == 0 {
            errors.push("画布的宽高必须大于 0");
        }
        if self.frame_interval_ms == 0 {
            errors.push("渲染间隔必须大于 0");
        }
        if !errors.is_empty() {
            bail!(
                errors
                    .into_iter()
                    .map(|e| format!("- {}", e))
                    .collect::<Vec<_>>()
                    .join("\n")
            );
        }
        Ok(())
    }
}

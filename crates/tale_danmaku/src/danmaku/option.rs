use std::time::Duration;

use serde::{Deserialize, Serialize};

/// 滚动方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollDirection {
    #[default]
    RightToLeft,
    LeftToRight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DanmakuOption {
    /// 是否显示弹幕
    pub enabled: bool,
    /// 一条弹幕从出现到消失的时间（秒）
    pub duration: f64,
    pub font: String,
    pub font_size: u32,
    pub width_ratio: f64,
    /// 两条弹幕之间最小的水平距离
    pub horizontal_gap: f64,
    /// lane 大小
    pub lane_size: u32,
    /// 屏幕上滚动弹幕最多高度百分比
    pub float_percentage: f64,
    /// 为了避免碰撞，最多允许将弹幕推迟多久发射（秒）
    pub max_delay: f64,
    pub direction: ScrollDirection,
    /// 透明度（0-255）
    pub opacity: u8,
    pub bold: bool,
    /// 描边
    pub outline: f64,
    /// 时间轴偏移
    pub time_offset: f64,
}

impl Default for DanmakuOption {
    fn default() -> Self {
        Self {
            enabled: true,
            duration: 15.0,
            font: "黑体".to_string(),
            font_size: 25,
            width_ratio: 1.2,
            horizontal_gap: 20.0,
            lane_size: 32,
            float_percentage: 0.5,
            max_delay: 1.0,
            direction: ScrollDirection::RightToLeft,
            opacity: (0.3 * 255.0) as u8,
            bold: true,
            outline: 0.8,
            time_offset: 0.0,
        }
    }
}

impl DanmakuOption {
    /// 非法的时长（负数、NaN）按 0 处理
    pub fn duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.duration).unwrap_or_default()
    }
}

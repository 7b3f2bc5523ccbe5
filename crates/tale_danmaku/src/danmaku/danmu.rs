//! 一条弹幕，但是没有位置信息
use serde::{Deserialize, Serialize};

use crate::danmaku::DanmakuOption;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DanmuType {
    #[default]
    Float,
    Top,
    Bottom,
    Reverse,
}

impl DanmuType {
    /// 未知的 mode（高级弹幕、代码弹幕等）统一按滚动弹幕处理
    pub fn from_num(num: i32) -> Self {
        match num {
            4 => DanmuType::Bottom,
            5 => DanmuType::Top,
            6 => DanmuType::Reverse,
            _ => DanmuType::Float,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Comment {
    /// 弹幕 dmid，同一条弹幕在弹幕层中只会存在一个实例
    pub id: i64,
    pub timeline_s: f64,
    pub content: String,
    pub r#type: DanmuType,
    /// 虽然这里有 fontsize，但是我们实际上使用 DanmakuOption 的 font size，
    /// 否则在调节设置的时候同屏弹幕的大小会参差不齐。
    pub fontsize: u32,
    pub rgb: (u8, u8, u8),
}

impl Comment {
    pub fn new(id: i64, timeline_s: f64, content: impl Into<String>) -> Self {
        Self {
            id,
            timeline_s,
            content: content.into(),
            ..Default::default()
        }
    }

    /// 计算弹幕的“像素长度”，会乘上一个缩放因子
    ///
    /// 汉字算一个全宽，英文算2/3宽
    pub fn length(&self, option: &DanmakuOption) -> f64 {
        let pts = option.font_size
            * self
                .content
                .chars()
                .map(|ch| if ch.is_ascii() { 2 } else { 3 })
                .sum::<u32>()
            / 3;

        pts as f64 * option.width_ratio
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_danmu_type_from_num() {
        assert_eq!(DanmuType::from_num(1), DanmuType::Float);
        assert_eq!(DanmuType::from_num(4), DanmuType::Bottom);
        assert_eq!(DanmuType::from_num(5), DanmuType::Top);
        assert_eq!(DanmuType::from_num(6), DanmuType::Reverse);
        assert_eq!(DanmuType::from_num(7), DanmuType::Float);
    }

    #[test]
    fn test_comment_length() {
        let option = DanmakuOption::default();
        // 25 * (2 + 2 + 3) / 3 = 58，再乘 1.2
        let comment = Comment::new(1, 0.0, "ab中");
        assert!((comment.length(&option) - 69.6).abs() < 1e-9);
        // 与弹幕自带的字号无关
        let comment = Comment {
            fontsize: 64,
            ..comment
        };
        assert!((comment.length(&option) - 69.6).abs() < 1e-9);
        assert_eq!(Comment::new(2, 0.0, "").length(&option), 0.0);
    }
}

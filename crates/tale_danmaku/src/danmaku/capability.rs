//! 弹幕实例依赖的外部能力：测量、定位、挂载到画面，以及时钟与定时器
//!
//! 这些能力全部以 trait object 注入，测试时替换成确定性的实现即可，
//! 不需要关心真实的时间和排版。
use std::sync::Arc;
use std::time::Duration;

use crate::danmaku::timer::{Clock, EntryId, Scheduler};
use crate::danmaku::{Comment, DanmakuOption, ScrollDirection};

/// 弹幕元素实际绘制出来的尺寸
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub width: f64,
    pub height: f64,
}

pub trait LayoutInspector: Send + Sync {
    fn measure(&self, comment: &Comment, option: &DanmakuOption) -> Geometry;
}

/// 没有真实排版时按字符估算宽度
pub struct TextMetrics;

impl LayoutInspector for TextMetrics {
    fn measure(&self, comment: &Comment, option: &DanmakuOption) -> Geometry {
        Geometry {
            width: comment.length(option),
            height: option.font_size as f64,
        }
    }
}

/// 一条弹幕在画面上的运动轨迹，y 在整个过程中保持不变
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    pub start_x: f64,
    pub end_x: f64,
    pub y: f64,
}

impl Motion {
    pub fn new(direction: ScrollDirection, canvas_width: f64, width: f64, y: f64) -> Self {
        match direction {
            // 从右侧完全进入到左侧完全离开
            ScrollDirection::RightToLeft => Self {
                start_x: canvas_width,
                end_x: -width,
                y,
            },
            ScrollDirection::LeftToRight => Self {
                start_x: -width,
                end_x: canvas_width,
                y,
            },
        }
    }
}

pub trait PositionModel: Send + Sync {
    /// progress 是弹幕真正开始移动后经过的（未暂停）时间
    fn pos_x(&self, motion: &Motion, progress: Duration, duration: Duration) -> f64;
}

/// 匀速滚动，恰好在 duration 时到达终点
pub struct LinearScroll;

impl PositionModel for LinearScroll {
    fn pos_x(&self, motion: &Motion, progress: Duration, duration: Duration) -> f64 {
        if progress >= duration {
            return motion.end_x;
        }
        let ratio = progress.as_secs_f64() / duration.as_secs_f64();
        motion.start_x + (motion.end_x - motion.start_x) * ratio
    }
}

/// 弹幕元素的挂载点
pub trait Surface: Send + Sync {
    fn attach(&self, entry: EntryId, comment: &Comment, motion: &Motion);

    fn detach(&self, entry: EntryId);
}

/// 只记录日志的挂载点，真正的绘制由调用方按帧读取快照完成
pub struct TracingSurface;

impl Surface for TracingSurface {
    fn attach(&self, entry: EntryId, comment: &Comment, motion: &Motion) {
        trace!("挂载 {entry}（y = {}）：{}", motion.y, comment.content);
    }

    fn detach(&self, entry: EntryId) {
        trace!("移除 {entry}");
    }
}

/// 创建弹幕实例所需的全部能力
#[derive(Clone)]
pub struct Capabilities {
    pub clock: Arc<dyn Clock>,
    pub scheduler: Arc<dyn Scheduler>,
    pub layout: Arc<dyn LayoutInspector>,
    pub position: Arc<dyn PositionModel>,
    pub surface: Arc<dyn Surface>,
}

impl Capabilities {
    pub fn new(clock: Arc<dyn Clock>, scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            clock,
            scheduler,
            layout: Arc::new(TextMetrics),
            position: Arc::new(LinearScroll),
            surface: Arc::new(TracingSurface),
        }
    }

    pub fn with_layout(self, layout: Arc<dyn LayoutInspector>) -> Self {
        Self { layout, ..self }
    }

    pub fn with_position(self, position: Arc<dyn PositionModel>) -> Self {
        Self { position, ..self }
    }

    pub fn with_surface(self, surface: Arc<dyn Surface>) -> Self {
        Self { surface, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_scroll() {
        let motion = Motion::new(ScrollDirection::RightToLeft, 1000.0, 100.0, 32.0);
        assert_eq!(
            motion,
            Motion {
                start_x: 1000.0,
                end_x: -100.0,
                y: 32.0
            }
        );
        let duration = Duration::from_secs(5);
        let mut last = f64::INFINITY;
        for ms in (0..=5000).step_by(250) {
            let x = LinearScroll.pos_x(&motion, Duration::from_millis(ms), duration);
            assert!(x < last, "position should strictly decrease");
            last = x;
        }
        assert_eq!(LinearScroll.pos_x(&motion, Duration::ZERO, duration), 1000.0);
        assert_eq!(LinearScroll.pos_x(&motion, duration, duration), -100.0);
        assert_eq!(LinearScroll.pos_x(&motion, Duration::from_secs(9), duration), -100.0);
        assert_eq!(LinearScroll.pos_x(&motion, Duration::ZERO, Duration::ZERO), -100.0);
    }

    #[test]
    fn test_left_to_right() {
        let motion = Motion::new(ScrollDirection::LeftToRight, 1000.0, 100.0, 0.0);
        let duration = Duration::from_secs(4);
        assert_eq!(LinearScroll.pos_x(&motion, Duration::ZERO, duration), -100.0);
        assert_eq!(LinearScroll.pos_x(&motion, Duration::from_secs(2), duration), 450.0);
        assert_eq!(LinearScroll.pos_x(&motion, duration, duration), 1000.0);
    }
}

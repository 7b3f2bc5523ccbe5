//! 决定绘画策略
mod lane;

use float_ord::FloatOrd;
use lane::{Collision, Lane};
use serde::{Deserialize, Serialize};

use crate::danmaku::DanmakuOption;

/// 弹幕层的可视区域（像素）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasConfig {
    pub width: u64,
    pub height: u64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

impl CanvasConfig {
    pub fn new(width: u64, height: u64) -> Self {
        Self { width, height }
    }

    pub fn float_lanes_cnt(&self, option: &DanmakuOption) -> usize {
        if option.lane_size == 0 {
            return 0;
        }
        (option.float_percentage * self.height as f64 / option.lane_size as f64) as usize
    }
}

/// 弹幕被分配到的槽位
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub lane: usize,
    pub y: f64,
    /// 为了避免碰撞而推迟发射的时间（秒）
    pub delay: f64,
}

#[derive(Debug, Clone)]
pub struct LaneAllocator {
    float_lanes: Vec<Option<Lane>>,
}

impl LaneAllocator {
    pub fn new(canvas: &CanvasConfig, option: &DanmakuOption) -> Self {
        Self {
            float_lanes: vec![None; canvas.float_lanes_cnt(option)],
        }
    }

    pub fn lanes(&self) -> usize {
        self.float_lanes.len()
    }

    /// 设置变化后调整槽位数量，保留仍然存在的槽位
    pub fn resize(&mut self, canvas: &CanvasConfig, option: &DanmakuOption) {
        self.float_lanes.resize(canvas.float_lanes_cnt(option), None);
    }

    /// 为在 shoot_time 发射的弹幕挑选槽位，找不到时返回 None
    pub fn allocate(
        &mut self,
        shoot_time: f64,
        length: f64,
        canvas: &CanvasConfig,
        option: &DanmakuOption,
    ) -> Option<Placement> {
        let width = canvas.width as f64;
        let mut collisions = Vec::with_capacity(self.float_lanes.len());
        for (idx, lane) in self.float_lanes.iter().enumerate() {
            match lane {
                // 优先画不存在的槽位
                None => {
                    return Some(self.shoot_in_lane(idx, shoot_time, length, 0.0, option));
                }
                Some(l) => match l.available_for(shoot_time, length, width, option) {
                    Collision::Separate | Collision::NotEnoughTime => {
                        return Some(self.shoot_in_lane(idx, shoot_time, length, 0.0, option));
                    }
                    Collision::Collide { time_needed } => {
                        collisions.push((FloatOrd(time_needed), idx));
                    }
                },
            }
        }
        // 允许部分弹幕在延迟后填充
        if let Some(&(FloatOrd(time_needed), lane_idx)) = collisions.iter().min() {
            if time_needed < option.max_delay {
                // 间隔也不要太小了
                let delay = time_needed + 0.01;
                debug!("延迟弹幕 {:.3} 秒", delay);
                return Some(self.shoot_in_lane(lane_idx, shoot_time, length, delay, option));
            }
        }
        None
    }

    fn shoot_in_lane(
        &mut self,
        lane_idx: usize,
        shoot_time: f64,
        length: f64,
        delay: f64,
        option: &DanmakuOption,
    ) -> Placement {
        self.float_lanes[lane_idx] = Some(Lane::shoot(shoot_time + delay, length));
        Placement {
            lane: lane_idx,
            y: (lane_idx as u64 * option.lane_size as u64) as f64,
            delay,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (CanvasConfig, DanmakuOption) {
        let option = DanmakuOption {
            duration: 10.0,
            horizontal_gap: 20.0,
            lane_size: 32,
            float_percentage: 0.5,
            max_delay: 1.0,
            ..Default::default()
        };
        (CanvasConfig::new(1000, 320), option)
    }

    #[test]
    fn test_lanes_cnt() {
        let (canvas, mut option) = setup();
        assert_eq!(canvas.float_lanes_cnt(&option), 5);
        option.lane_size = 0;
        assert_eq!(canvas.float_lanes_cnt(&option), 0);
    }

    #[test]
    fn test_allocate_fills_lanes_in_order() {
        let (canvas, option) = setup();
        let mut allocator = LaneAllocator::new(&canvas, &option);
        for lane in 0..5 {
            let placement = allocator.allocate(0.0, 100.0, &canvas, &option).unwrap();
            assert_eq!(placement.lane, lane);
            assert_eq!(placement.y, lane as f64 * 32.0);
            assert_eq!(placement.delay, 0.0);
        }
        // 所有槽位都需要等待 (20 + 100) / 110 > 1 秒，只能丢弃
        assert_eq!(allocator.allocate(0.0, 100.0, &canvas, &option), None);
        // 稍后发射，第一个槽位只需要等待 (20 - (110 * 0.2 - 100)) / 110 秒
        let placement = allocator.allocate(0.2, 100.0, &canvas, &option).unwrap();
        assert_eq!(placement.lane, 0);
        assert!((placement.delay - (98.0 / 110.0 + 0.01)).abs() < 1e-9);
        // 足够久以后，前面的弹幕已经远离，第一个槽位空闲
        let placement = allocator.allocate(8.0, 100.0, &canvas, &option).unwrap();
        assert_eq!(placement.lane, 0);
        assert_eq!(placement.delay, 0.0);
    }

    #[test]
    fn test_resize() {
        let (canvas, mut option) = setup();
        let mut allocator = LaneAllocator::new(&canvas, &option);
        option.float_percentage = 1.0;
        allocator.resize(&canvas, &option);
        assert_eq!(allocator.lanes(), 10);
        option.lane_size = 64;
        allocator.resize(&canvas, &option);
        assert_eq!(allocator.lanes(), 5);
    }
}

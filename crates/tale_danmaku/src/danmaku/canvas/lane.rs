use crate::danmaku::DanmakuOption;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Collision {
    // 会越来越远
    Separate,
    // 时间够可以追上，但是时间不够
    NotEnoughTime,
    // 需要额外的时间才可以避免碰撞
    Collide { time_needed: f64 },
}

/// 表示一个弹幕槽位
#[derive(Debug, Clone)]
pub struct Lane {
    last_shoot_time: f64,
    last_length: f64,
}

impl Lane {
    pub fn shoot(shoot_time: f64, length: f64) -> Self {
        Lane {
            last_shoot_time: shoot_time,
            last_length: length,
        }
    }

    /// 这个槽位是否可以在 shoot_time 发射一条长度为 length 的弹幕，返回可能的情形
    pub fn available_for(&self, shoot_time: f64, length: f64, width: f64, option: &DanmakuOption) -> Collision {
        #[allow(non_snake_case)]
        let T = option.duration;
        #[allow(non_snake_case)]
        let W = width;
        let gap = option.horizontal_gap;

        // 先计算我的速度
        let t1 = self.last_shoot_time;
        let t2 = shoot_time;
        let l1 = self.last_length;
        let l2 = length;

        let v1 = (W + l1) / T;
        let v2 = (W + l2) / T;

        let delta_t = t2 - t1;
        // 第一条弹幕尾部到出发边缘的距离
        let delta_x = v1 * delta_t - l1;
        // 没有足够的空间，必定碰撞
        if delta_x < gap {
            if l2 <= l1 {
                // l2 比 l1 短，因此比它慢
                // 只需要把 l2 安排在 l1 之后就可以避免碰撞
                Collision::Collide {
                    time_needed: (gap - delta_x) / v1,
                }
            } else {
                // 需要延长额外的时间，使得当第一条消失的时候，第二条也有足够的距离
                // 第一条消失的时间点是 (t1 + T)
                // 这个时候第二条的头部应该在距离出发点 W - gap 处，
                // 第二条已经出发 (W - gap) / v2 时间，因此在 t1 + T - (W - gap) / v2 出发
                let time_needed = (T - (W - gap) / v2) - delta_t;
                Collision::Collide { time_needed }
            }
        } else if l2 <= l1 {
            // 如果 l2 < l1，则它永远追不上前者，可以发射
            Collision::Separate
        } else {
            // 需要算追击问题了，
            // 计算 l1 刚好消失的时刻 t1 + T，
            // l2 的头部应该在距离起点 v2 * (t1 + T - t2) 处
            let pos = v2 * (T - delta_t);
            if pos < (W - gap) {
                Collision::NotEnoughTime
            } else {
                Collision::Collide {
                    time_needed: (pos - (W - gap)) / v2,
                }
            }
        }
    }
}

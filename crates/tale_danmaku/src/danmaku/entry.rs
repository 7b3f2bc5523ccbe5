//! 单条弹幕在画面上的生命周期
use std::sync::Arc;
use std::time::Duration;

use crate::danmaku::capability::{Capabilities, Motion};
use crate::danmaku::canvas::{CanvasConfig, Placement};
use crate::danmaku::timer::{EntryId, Stopwatch, TimerId};
use crate::danmaku::{Comment, DanmakuOption};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum EntryState {
    Live,
    /// 显示时间结束，已经从画面移除
    Expired,
    Disposed,
}

/// 一条正在显示的弹幕
///
/// 位置完全由未暂停状态下经过的时间推导：先在起点停留 launch_delay，
/// 之后在 duration 内从 start_x 移动到 end_x。暂停时内部的计时器停止，
/// 位置也就自然冻结。移除定时器只在运行状态下存在。
pub struct DanmakuEntry {
    id: EntryId,
    comment: Arc<Comment>,
    option: Arc<DanmakuOption>,
    canvas: CanvasConfig,
    placement: Placement,
    motion: Motion,
    duration: Duration,
    launch_delay: Duration,
    stopwatch: Stopwatch,
    timer: Option<TimerId>,
    state: EntryState,
    caps: Capabilities,
}

impl DanmakuEntry {
    pub fn new(
        id: EntryId,
        comment: Arc<Comment>,
        option: Arc<DanmakuOption>,
        canvas: CanvasConfig,
        placement: Placement,
        caps: Capabilities,
        paused: bool,
    ) -> Self {
        let now = caps.clock.now();
        let geometry = caps.layout.measure(&comment, &option);
        let motion = Motion::new(option.direction, canvas.width as f64, geometry.width, placement.y);
        let mut entry = Self {
            id,
            duration: option.duration(),
            launch_delay: Duration::try_from_secs_f64(placement.delay).unwrap_or_default(),
            comment,
            option,
            canvas,
            placement,
            motion,
            stopwatch: if paused { Stopwatch::default() } else { Stopwatch::started(now) },
            timer: None,
            state: EntryState::Live,
            caps,
        };
        entry.caps.surface.attach(entry.id, &entry.comment, &entry.motion);
        if !paused {
            entry.schedule_removal();
        }
        entry
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn comment(&self) -> &Arc<Comment> {
        &self.comment
    }

    pub fn option(&self) -> &Arc<DanmakuOption> {
        &self.option
    }

    pub fn lane(&self) -> usize {
        self.placement.lane
    }

    pub fn motion(&self) -> &Motion {
        &self.motion
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn state(&self) -> EntryState {
        self.state
    }

    pub fn is_live(&self) -> bool {
        self.state == EntryState::Live
    }

    pub fn is_paused(&self) -> bool {
        !self.stopwatch.is_running()
    }

    /// 未暂停状态下经过的时间，包含发射前的延迟
    pub fn elapsed(&self) -> Duration {
        self.stopwatch.elapsed(self.caps.clock.now())
    }

    /// 距离被移除还需要的（未暂停）时间
    pub fn remaining(&self) -> Duration {
        (self.launch_delay + self.duration).saturating_sub(self.elapsed())
    }

    pub fn pos_x_computed(&self) -> f64 {
        let progress = self.elapsed().saturating_sub(self.launch_delay);
        self.caps.position.pos_x(&self.motion, progress, self.duration)
    }

    pub fn pause(&mut self) {
        if self.is_live() && self.stopwatch.pause(self.caps.clock.now()) {
            self.cancel_timer();
        }
    }

    pub fn resume(&mut self) {
        if self.is_live() && self.stopwatch.resume(self.caps.clock.now()) {
            self.schedule_removal();
        }
    }

    /// 应用新的设置，运行中的弹幕会按新的时长重新安排移除时间
    pub fn apply_option(&mut self, option: Arc<DanmakuOption>) {
        if !self.is_live() {
            return;
        }
        let geometry = self.caps.layout.measure(&self.comment, &option);
        self.motion = Motion::new(
            option.direction,
            self.canvas.width as f64,
            geometry.width,
            self.placement.y,
        );
        self.duration = option.duration();
        self.option = option;
        if self.stopwatch.is_running() {
            self.cancel_timer();
            self.schedule_removal();
        }
    }

    /// 处理定时器到期，返回值表示弹幕是否因此被移除
    ///
    /// 已经取消或被替换掉的定时器到期时什么也不做
    pub fn on_timer(&mut self, timer: TimerId) -> bool {
        if !self.is_live() || self.timer != Some(timer) {
            return false;
        }
        self.timer = None;
        self.caps.surface.detach(self.id);
        self.state = EntryState::Expired;
        true
    }

    /// 提前销毁，可以重复调用，返回值表示本次调用是否真正执行了销毁
    pub fn dispose(&mut self) -> bool {
        if self.state != EntryState::Disposed {
            trace!("{} 从 {} 销毁", self.id, self.state);
        }
        match self.state {
            EntryState::Disposed => false,
            EntryState::Expired => {
                self.state = EntryState::Disposed;
                true
            }
            EntryState::Live => {
                // 先取消定时器再移除元素
                self.cancel_timer();
                self.caps.surface.detach(self.id);
                self.state = EntryState::Disposed;
                true
            }
        }
    }

    fn schedule_removal(&mut self) {
        let delay = self.remaining();
        self.timer = Some(self.caps.scheduler.schedule(delay, self.id));
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            self.caps.scheduler.cancel(timer);
        }
    }
}

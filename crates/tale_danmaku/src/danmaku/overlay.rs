//! 弹幕层，管理当前画面上所有的弹幕实例
use std::sync::Arc;

use serde::Serialize;

use crate::danmaku::capability::Capabilities;
use crate::danmaku::canvas::{CanvasConfig, LaneAllocator};
use crate::danmaku::entry::DanmakuEntry;
use crate::danmaku::timer::{EntryId, Stopwatch, TimerFired};
use crate::danmaku::{Comment, DanmakuOption};
use crate::error::DanmakuError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum OverlayState {
    Running,
    Paused,
    Disposed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// 弹幕显示已关闭
    Disabled,
    /// 所有槽位都放不下
    NoLane,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added(EntryId),
    /// 同一条弹幕已经在显示，不做任何改动
    AlreadyActive(EntryId),
    Skipped(SkipReason),
}

/// 某一时刻画面上的一条弹幕
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameItem {
    pub entry: EntryId,
    pub comment_id: i64,
    pub content: String,
    pub x: f64,
    pub y: f64,
    pub rgb: (u8, u8, u8),
}

pub struct DanmakuOverlay {
    canvas: CanvasConfig,
    option: Arc<DanmakuOption>,
    caps: Capabilities,
    state: OverlayState,
    /// 弹幕层自身的时间轴，暂停时不前进，槽位分配基于这个时间
    timeline: Stopwatch,
    lanes: LaneAllocator,
    /// 按加入顺序排列
    entries: Vec<DanmakuEntry>,
    next_id: u64,
}

impl DanmakuOverlay {
    pub fn new(canvas: CanvasConfig, option: Arc<DanmakuOption>, caps: Capabilities) -> Self {
        let lanes = LaneAllocator::new(&canvas, &option);
        debug!("弹幕层挂载，画布 {}x{}，{} 个槽位", canvas.width, canvas.height, lanes.lanes());
        Self {
            timeline: Stopwatch::started(caps.clock.now()),
            canvas,
            option,
            caps,
            state: OverlayState::Running,
            lanes,
            entries: Vec::new(),
            next_id: 0,
        }
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.state == OverlayState::Paused
    }

    pub fn option(&self) -> &Arc<DanmakuOption> {
        &self.option
    }

    pub fn entries(&self) -> &[DanmakuEntry] {
        &self.entries
    }

    pub fn entry(&self, id: EntryId) -> Option<&DanmakuEntry> {
        self.entries.iter().find(|e| e.id() == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn add_comment(&mut self, comment: impl Into<Arc<Comment>>) -> Result<AddOutcome, DanmakuError> {
        self.ensure_alive()?;
        let comment = comment.into();
        if !self.option.enabled {
            return Ok(AddOutcome::Skipped(SkipReason::Disabled));
        }
        if let Some(entry) = self.entries.iter().find(|e| e.comment().id == comment.id) {
            return Ok(AddOutcome::AlreadyActive(entry.id()));
        }
        // 顶部、底部和逆向弹幕都按滚动弹幕处理
        let shoot_time = self.timeline.elapsed(self.caps.clock.now()).as_secs_f64();
        let length = self.caps.layout.measure(&comment, &self.option).width;
        let Some(placement) = self.lanes.allocate(shoot_time, length, &self.canvas, &self.option) else {
            debug!("skipping danmu: {}", comment.content);
            return Ok(AddOutcome::Skipped(SkipReason::NoLane));
        };
        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.entries.push(DanmakuEntry::new(
            id,
            comment,
            self.option.clone(),
            self.canvas,
            placement,
            self.caps.clone(),
            self.is_paused(),
        ));
        Ok(AddOutcome::Added(id))
    }

    pub fn set_paused(&mut self, paused: bool) -> Result<(), DanmakuError> {
        self.ensure_alive()?;
        let now = self.caps.clock.now();
        match (paused, self.state) {
            (true, OverlayState::Running) => {
                self.timeline.pause(now);
                self.entries.iter_mut().for_each(DanmakuEntry::pause);
                self.state = OverlayState::Paused;
            }
            (false, OverlayState::Paused) => {
                self.timeline.resume(now);
                self.entries.iter_mut().for_each(DanmakuEntry::resume);
                self.state = OverlayState::Running;
            }
            _ => return Ok(()),
        }
        debug!("弹幕层切换为 {}", self.state);
        Ok(())
    }

    /// 替换设置，同时作用于已经在显示的弹幕和之后加入的弹幕
    pub fn update_settings(&mut self, option: Arc<DanmakuOption>) -> Result<(), DanmakuError> {
        self.ensure_alive()?;
        self.lanes.resize(&self.canvas, &option);
        self.option = option;
        if !self.option.enabled {
            info!("弹幕已关闭，清空 {} 条弹幕", self.entries.len());
            self.clear();
            return Ok(());
        }
        for entry in self.entries.iter_mut() {
            entry.apply_option(self.option.clone());
        }
        Ok(())
    }

    /// 处理定时器到期，返回值表示是否有弹幕因此被移除
    ///
    /// 找不到对应弹幕（已经被销毁）或定时器已经失效时忽略
    pub fn handle_timer(&mut self, fired: TimerFired) -> bool {
        let Some(idx) = self.entries.iter().position(|e| e.id() == fired.entry) else {
            return false;
        };
        if !self.entries[idx].on_timer(fired.timer) {
            return false;
        }
        let entry = self.entries.remove(idx);
        trace!("{} 显示结束：{}", entry.id(), entry.comment().content);
        true
    }

    /// 当前画面上所有弹幕的位置
    pub fn frame(&self) -> Vec<FrameItem> {
        self.entries
            .iter()
            .map(|entry| FrameItem {
                entry: entry.id(),
                comment_id: entry.comment().id,
                content: entry.comment().content.clone(),
                x: entry.pos_x_computed(),
                y: entry.motion().y,
                rgb: entry.comment().rgb,
            })
            .collect()
    }

    /// 销毁弹幕层与所有弹幕，可以重复调用
    pub fn dispose(&mut self) -> bool {
        if self.state == OverlayState::Disposed {
            return false;
        }
        let cnt = self.clear();
        debug!("弹幕层从 {} 销毁，清理 {} 条弹幕", self.state, cnt);
        self.state = OverlayState::Disposed;
        true
    }

    /// 清空所有弹幕，槽位也随之全部空出
    fn clear(&mut self) -> usize {
        self.lanes = LaneAllocator::new(&self.canvas, &self.option);
        let mut entries = std::mem::take(&mut self.entries);
        entries.iter_mut().map(DanmakuEntry::dispose).filter(|disposed| *disposed).count()
    }

    fn ensure_alive(&self) -> Result<(), DanmakuError> {
        if self.state == OverlayState::Disposed {
            return Err(DanmakuError::Disposed);
        }
        Ok(())
    }
}

impl Drop for DanmakuOverlay {
    fn drop(&mut self) {
        self.dispose();
    }
}

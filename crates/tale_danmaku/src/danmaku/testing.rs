//! 单元测试使用的确定性能力实现
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::danmaku::capability::{Capabilities, Geometry, LayoutInspector, Motion, PositionModel, Surface};
use crate::danmaku::timer::{Clock, EntryId, Scheduler, TimerFired, TimerId};
use crate::danmaku::{Comment, DanmakuOption, DanmakuOverlay};

#[derive(Default)]
pub struct ManualClock {
    nanos: AtomicU64,
}

impl ManualClock {
    pub fn advance(&self, duration: Duration) {
        self.nanos.fetch_add(duration.as_nanos() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}

/// 只有在调用 advance 时才会到期的定时器
pub struct ManualScheduler {
    clock: Arc<ManualClock>,
    next_id: AtomicU64,
    pending: Mutex<BTreeMap<(Duration, TimerId), EntryId>>,
}

impl ManualScheduler {
    pub fn new(clock: Arc<ManualClock>) -> Self {
        Self {
            clock,
            next_id: AtomicU64::new(0),
            pending: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn deadline_of(&self, entry: EntryId) -> Option<Duration> {
        self.pending
            .lock()
            .iter()
            .find(|(_, e)| **e == entry)
            .map(|((deadline, _), _)| *deadline)
    }

    /// 推进时钟，按到期顺序返回所有到期的定时器
    pub fn advance(&self, duration: Duration) -> Vec<TimerFired> {
        self.clock.advance(duration);
        let now = self.clock.now();
        let mut pending = self.pending.lock();
        let due: Vec<_> = pending.range(..=(now, TimerId(u64::MAX))).map(|(k, v)| (*k, *v)).collect();
        due.into_iter()
            .map(|(key, entry)| {
                pending.remove(&key);
                TimerFired { timer: key.1, entry }
            })
            .collect()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, entry: EntryId) -> TimerId {
        let timer = TimerId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.pending
            .lock()
            .insert((self.clock.now() + delay, timer), entry);
        timer
    }

    fn cancel(&self, timer: TimerId) {
        self.pending.lock().retain(|(_, id), _| *id != timer);
    }
}

/// 固定在某个位置的定位实现，用于截图对比
pub struct PinnedPosition(pub f64);

impl PositionModel for PinnedPosition {
    fn pos_x(&self, _: &Motion, _: Duration, _: Duration) -> f64 {
        self.0
    }
}

/// 无论内容是什么，都测量出同样的宽度
pub struct FixedLayout(pub f64);

impl LayoutInspector for FixedLayout {
    fn measure(&self, _: &Comment, option: &DanmakuOption) -> Geometry {
        Geometry {
            width: self.0,
            height: option.font_size as f64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    Attach(EntryId),
    Detach(EntryId),
}

#[derive(Default)]
pub struct RecordingSurface {
    events: Mutex<Vec<SurfaceEvent>>,
}

impl RecordingSurface {
    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.events.lock().clone()
    }

    pub fn detach_count(&self, entry: EntryId) -> usize {
        self.events()
            .into_iter()
            .filter(|e| *e == SurfaceEvent::Detach(entry))
            .count()
    }
}

impl Surface for RecordingSurface {
    fn attach(&self, entry: EntryId, _: &Comment, _: &Motion) {
        self.events.lock().push(SurfaceEvent::Attach(entry));
    }

    fn detach(&self, entry: EntryId) {
        self.events.lock().push(SurfaceEvent::Detach(entry));
    }
}

pub struct Harness {
    pub clock: Arc<ManualClock>,
    pub scheduler: Arc<ManualScheduler>,
    pub surface: Arc<RecordingSurface>,
}

impl Harness {
    pub fn new() -> Self {
        let clock = Arc::new(ManualClock::default());
        Self {
            scheduler: Arc::new(ManualScheduler::new(clock.clone())),
            clock,
            surface: Arc::new(RecordingSurface::default()),
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities::new(self.clock.clone(), self.scheduler.clone()).with_surface(self.surface.clone())
    }

    /// 推进时间并把到期的定时器交给弹幕层，返回被移除的弹幕数量
    pub fn run_for(&self, overlay: &mut DanmakuOverlay, duration: Duration) -> usize {
        self.scheduler
            .advance(duration)
            .into_iter()
            .filter(|fired| overlay.handle_timer(*fired))
            .count()
    }
}

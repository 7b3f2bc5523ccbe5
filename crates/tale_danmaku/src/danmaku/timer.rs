//! 时钟与定时器，弹幕层只通过这里的 trait 感知时间
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entry#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// 某个定时器到期，需要交给弹幕层处理
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFired {
    pub timer: TimerId,
    pub entry: EntryId,
}

pub trait Clock: Send + Sync {
    /// 自某个固定起点以来经过的时间，单调不减
    fn now(&self) -> Duration;
}

pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

pub trait Scheduler: Send + Sync {
    /// 在 delay 之后为 entry 投递一次 TimerFired
    fn schedule(&self, delay: Duration, entry: EntryId) -> TimerId;

    /// 取消尚未到期的定时器，对已到期或未知的定时器什么也不做
    fn cancel(&self, timer: TimerId);
}

/// 基于 tokio 的定时器，到期事件通过 channel 投递给持有弹幕层的任务
pub struct TokioScheduler {
    next_id: AtomicU64,
    pending: Arc<DashMap<TimerId, CancellationToken>>,
    tx: mpsc::UnboundedSender<TimerFired>,
}

impl TokioScheduler {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TimerFired>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                next_id: AtomicU64::new(0),
                pending: Arc::new(DashMap::new()),
                tx,
            },
            rx,
        )
    }

    /// 尚未到期也未被取消的定时器数量
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, entry: EntryId) -> TimerId {
        let timer = TimerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let token = CancellationToken::new();
        self.pending.insert(timer, token.clone());
        let (pending, tx) = (self.pending.clone(), self.tx.clone());
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    // 与 cancel 竞争，谁先从表中移除谁生效
                    if pending.remove(&timer).is_some() {
                        let _ = tx.send(TimerFired { timer, entry });
                    }
                }
            }
        });
        timer
    }

    fn cancel(&self, timer: TimerId) {
        if let Some((_, token)) = self.pending.remove(&timer) {
            token.cancel();
        }
    }
}

/// 可暂停的计时器，只累计运行状态下经过的时间
#[derive(Debug, Clone, Copy, Default)]
pub struct Stopwatch {
    played: Duration,
    resumed_at: Option<Duration>,
}

impl Stopwatch {
    pub fn started(now: Duration) -> Self {
        Self {
            played: Duration::ZERO,
            resumed_at: Some(now),
        }
    }

    pub fn is_running(&self) -> bool {
        self.resumed_at.is_some()
    }

    pub fn elapsed(&self, now: Duration) -> Duration {
        self.played + self.resumed_at.map_or(Duration::ZERO, |at| now.saturating_sub(at))
    }

    /// 返回值表示状态是否发生了变化
    pub fn pause(&mut self, now: Duration) -> bool {
        match self.resumed_at.take() {
            Some(at) => {
                self.played += now.saturating_sub(at);
                true
            }
            None => false,
        }
    }

    pub fn resume(&mut self, now: Duration) -> bool {
        if self.resumed_at.is_some() {
            return false;
        }
        self.resumed_at = Some(now);
        true
    }
}

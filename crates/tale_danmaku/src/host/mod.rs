//! 宿主页面与弹幕层之间的通信
//!
//! 弹幕层只在一个任务中被持有和修改，页面通过 [`OverlayHandle`] 发送命令，
//! 定时器到期事件通过另一个 channel 送达，二者在 [`run_overlay`] 中按到达顺序处理。
mod feed;

use std::sync::Arc;

pub use feed::CommentFeed;
use tokio::sync::{mpsc, oneshot};

use crate::danmaku::{Comment, DanmakuOption, DanmakuOverlay, FrameItem, OverlayState, TimerFired};
use crate::error::DanmakuError;

pub enum OverlayCommand {
    AddComment(Comment),
    SetPaused(bool),
    UpdateSettings(Arc<DanmakuOption>),
    Snapshot(oneshot::Sender<Vec<FrameItem>>),
    Dispose,
}

#[derive(Clone)]
pub struct OverlayHandle {
    tx: mpsc::Sender<OverlayCommand>,
}

impl OverlayHandle {
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<OverlayCommand>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self { tx }, rx)
    }

    pub async fn add_comment(&self, comment: Comment) -> Result<(), DanmakuError> {
        self.send(OverlayCommand::AddComment(comment)).await
    }

    pub async fn set_paused(&self, paused: bool) -> Result<(), DanmakuError> {
        self.send(OverlayCommand::SetPaused(paused)).await
    }

    pub async fn update_settings(&self, option: Arc<DanmakuOption>) -> Result<(), DanmakuError> {
        self.send(OverlayCommand::UpdateSettings(option)).await
    }

    pub async fn snapshot(&self) -> Result<Vec<FrameItem>, DanmakuError> {
        let (tx, rx) = oneshot::channel();
        self.send(OverlayCommand::Snapshot(tx)).await?;
        rx.await.map_err(|_| DanmakuError::ChannelClosed)
    }

    pub async fn dispose(&self) -> Result<(), DanmakuError> {
        self.send(OverlayCommand::Dispose).await
    }

    async fn send(&self, command: OverlayCommand) -> Result<(), DanmakuError> {
        self.tx.send(command).await.map_err(|_| DanmakuError::ChannelClosed)
    }
}

/// 驱动弹幕层，直到收到 Dispose 或者所有 handle 都被丢弃，返回已经销毁的弹幕层
pub async fn run_overlay(
    mut overlay: DanmakuOverlay,
    mut commands: mpsc::Receiver<OverlayCommand>,
    mut timers: mpsc::UnboundedReceiver<TimerFired>,
) -> DanmakuOverlay {
    loop {
        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else {
                    break;
                };
                apply(&mut overlay, command);
                if overlay.state() == OverlayState::Disposed {
                    break;
                }
            }
            Some(fired) = timers.recv() => {
                overlay.handle_timer(fired);
            }
        }
    }
    overlay.dispose();
    overlay
}

fn apply(overlay: &mut DanmakuOverlay, command: OverlayCommand) {
    let res = match command {
        OverlayCommand::AddComment(comment) => overlay.add_comment(comment).map(|outcome| {
            trace!("加入弹幕：{:?}", outcome);
        }),
        OverlayCommand::SetPaused(paused) => overlay.set_paused(paused),
        OverlayCommand::UpdateSettings(option) => overlay.update_settings(option),
        OverlayCommand::Snapshot(tx) => {
            let _ = tx.send(overlay.frame());
            Ok(())
        }
        OverlayCommand::Dispose => {
            overlay.dispose();
            Ok(())
        }
    };
    if let Err(e) = res {
        warn!("处理弹幕层命令失败：{e}");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::danmaku::{Capabilities, CanvasConfig, SystemClock, TokioScheduler};

    fn spawn(duration: f64) -> (OverlayHandle, Arc<TokioScheduler>, tokio::task::JoinHandle<DanmakuOverlay>) {
        let (scheduler, timers) = TokioScheduler::new();
        let scheduler = Arc::new(scheduler);
        let caps = Capabilities::new(Arc::new(SystemClock::new()), scheduler.clone());
        let option = Arc::new(DanmakuOption {
            duration,
            ..Default::default()
        });
        let overlay = DanmakuOverlay::new(CanvasConfig::new(1000, 720), option, caps);
        let (handle, commands) = OverlayHandle::channel(16);
        (handle, scheduler, tokio::spawn(run_overlay(overlay, commands, timers)))
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_overlay() {
        let (handle, scheduler, worker) = spawn(5.0);
        handle.add_comment(Comment::new(1, 0.0, "C1")).await.unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
        handle.set_paused(true).await.unwrap();
        let frozen = handle.snapshot().await.unwrap();
        assert_eq!(frozen.len(), 1);
        assert!(frozen[0].x < 1000.0);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(handle.snapshot().await.unwrap(), frozen);
        handle.set_paused(false).await.unwrap();
        tokio::time::sleep(Duration::from_millis(2900)).await;
        assert_eq!(handle.snapshot().await.unwrap().len(), 1);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(handle.snapshot().await.unwrap().is_empty());
        handle.dispose().await.unwrap();
        let overlay = worker.await.unwrap();
        assert_eq!(overlay.state(), OverlayState::Disposed);
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(handle.add_comment(Comment::new(2, 0.0, "late")).await, Err(DanmakuError::ChannelClosed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_handle_disposes() {
        let (handle, scheduler, worker) = spawn(5.0);
        for id in 0..3 {
            handle.add_comment(Comment::new(id, 0.0, "pending")).await.unwrap();
        }
        assert_eq!(handle.snapshot().await.unwrap().len(), 3);
        assert_eq!(scheduler.pending(), 3);
        drop(handle);
        let overlay = worker.await.unwrap();
        assert!(overlay.is_empty());
        assert_eq!(overlay.state(), OverlayState::Disposed);
        assert_eq!(scheduler.pending(), 0);
    }
}

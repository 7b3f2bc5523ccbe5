use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DanmakuError {
    #[error("danmaku overlay has already been disposed")]
    Disposed,
    #[error("danmaku overlay command channel closed")]
    ChannelClosed,
}

mod canvas;
mod capability;
mod danmu;
mod entry;
mod model;
mod option;
mod overlay;
#[cfg(test)]
pub(crate) mod testing;
mod timer;

pub use canvas::{CanvasConfig, LaneAllocator, Placement};
pub use capability::{
    Capabilities, Geometry, LayoutInspector, LinearScroll, Motion, PositionModel, Surface, TextMetrics, TracingSurface,
};
pub use danmu::{Comment, DanmuType};
pub use entry::{DanmakuEntry, EntryState};
pub use model::{DanmakuElem, DmSegMobileReply};
pub use option::{DanmakuOption, ScrollDirection};
pub use overlay::{AddOutcome, DanmakuOverlay, FrameItem, OverlayState, SkipReason};
pub use timer::{Clock, EntryId, Scheduler, Stopwatch, SystemClock, TimerFired, TimerId, TokioScheduler};

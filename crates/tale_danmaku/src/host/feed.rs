use std::time::Duration;

use float_ord::FloatOrd;

use crate::danmaku::Comment;

/// 按播放进度依次放出弹幕
pub struct CommentFeed {
    comments: Vec<Comment>,
    cursor: usize,
}

impl CommentFeed {
    /// time_offset 会加到每条弹幕的时间上，偏移后早于 0 的弹幕直接丢弃
    pub fn new(comments: impl IntoIterator<Item = Comment>, time_offset: f64) -> Self {
        let mut comments: Vec<_> = comments
            .into_iter()
            .filter_map(|mut comment| {
                comment.timeline_s += time_offset;
                (comment.timeline_s >= 0.0).then_some(comment)
            })
            .collect();
        comments.sort_by_key(|c| FloatOrd(c.timeline_s));
        Self { comments, cursor: 0 }
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.comments.len()
    }

    /// 放出所有时间不晚于 position 且尚未放出的弹幕
    pub fn poll_due(&mut self, position: Duration) -> &[Comment] {
        let position = position.as_secs_f64();
        let start = self.cursor;
        self.cursor += self.comments[start..].partition_point(|c| c.timeline_s <= position);
        &self.comments[start..self.cursor]
    }

    /// 跳转到 position，早于它的弹幕不会再被放出
    pub fn seek(&mut self, position: Duration) {
        let position = position.as_secs_f64();
        self.cursor = self.comments.partition_point(|c| c.timeline_s < position);
    }
}

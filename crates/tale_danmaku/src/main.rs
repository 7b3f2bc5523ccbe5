#[macro_use]
extern crate tracing;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use prost::Message;
use tale_danmaku::config::{Args, CONFIG_DIR, Config};
use tale_danmaku::danmaku::{
    Capabilities, Clock, Comment, DanmakuOverlay, DmSegMobileReply, SystemClock, TokioScheduler,
};
use tale_danmaku::host::{CommentFeed, OverlayHandle, run_overlay};
use tale_danmaku::session::{PlaybackSession, SessionStore};
use tale_danmaku::utils::init_logger;

enum Exit {
    Finished,
    Interrupted,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(&args.log_level);
    let config_path = args.config.clone().unwrap_or_else(|| CONFIG_DIR.join("config.toml"));
    let config = Config::load_or_default(&config_path)?;
    config
        .check()
        .with_context(|| format!("位于 {} 的配置文件不合法", config_path.display()))?;

    let segment = tokio::fs::read(&args.input)
        .await
        .with_context(|| format!("读取弹幕文件 {} 失败", args.input.display()))?;
    let reply = DmSegMobileReply::decode(segment.as_slice()).context("解析弹幕文件失败")?;
    let comments: Vec<Comment> = reply.elems.into_iter().map(Comment::from).collect();
    info!("读取到 {} 条弹幕", comments.len());

    let mut session = SessionStore::<PlaybackSession>::init(&config.session_path)?;
    let start = match args.start {
        Some(secs) => Duration::try_from_secs_f64(secs).context("起始位置不合法")?,
        None => session.get().map(PlaybackSession::position).unwrap_or_default(),
    };
    if !start.is_zero() {
        info!("从 {:.1} 秒处开始播放", start.as_secs_f64());
    }

    let option = Arc::new(config.danmaku_option.clone());
    let mut feed = CommentFeed::new(comments, option.time_offset);
    feed.seek(start);

    let clock = Arc::new(SystemClock::new());
    let (scheduler, timers) = TokioScheduler::new();
    let capabilities = Capabilities::new(clock.clone(), Arc::new(scheduler));
    let overlay = DanmakuOverlay::new(config.canvas, option, capabilities);
    let (handle, commands) = OverlayHandle::channel(256);
    let worker = tokio::spawn(run_overlay(overlay, commands, timers));

    let mut ticker = tokio::time::interval(Duration::from_millis(config.frame_interval_ms));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let exit = loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("收到退出信号，保存播放进度");
                break Exit::Interrupted;
            }
            _ = ticker.tick() => {
                let position = start + clock.now();
                for comment in feed.poll_due(position) {
                    handle.add_comment(comment.clone()).await?;
                }
                let frame = handle.snapshot().await?;
                debug!("{:.1}s 画面上有 {} 条弹幕", position.as_secs_f64(), frame.len());
                for item in &frame {
                    trace!("  ({:>7.1}, {:>5.1}) {}", item.x, item.y, item.content);
                }
                if feed.is_exhausted() && frame.is_empty() {
                    break Exit::Finished;
                }
            }
        }
    };
    let position = start + clock.now();
    handle.dispose().await?;
    worker.await.context("弹幕层任务异常退出")?;
    match exit {
        Exit::Interrupted => session.save(PlaybackSession::new(position))?,
        Exit::Finished => {
            info!("所有弹幕播放完毕");
            session.clear()?;
        }
    }
    Ok(())
}

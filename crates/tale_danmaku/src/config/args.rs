use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// 弹幕分段文件（DmSegMobileReply 的 protobuf 编码）
    #[arg(short, long)]
    pub input: PathBuf,

    /// 配置文件路径，默认位于用户配置目录下
    #[arg(short, long, env = "TALE_DANMAKU_CONFIG")]
    pub config: Option<PathBuf>,

    /// 从指定的播放位置（秒）开始，未指定时从上次保存的会话继续
    #[arg(short, long)]
    pub start: Option<f64>,

    #[arg(short, long, default_value = "None,tale_danmaku=info", env = "RUST_LOG")]
    pub log_level: String,
}

pub mod preprocess;
pub mod sampler;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
    #[error("图像解码失败: {0}")]
    Decode(#[from] image::ImageError),
    #[error("图像尺寸无效")]
    EmptyImage,
    #[error("无法打开视频容器: {0}")]
    Container(String),
    #[error("视频中没有可解码的帧")]
    NoFrames,
    #[error("帧解码失败: {0}")]
    Frame(String),
}

pub use sampler::{FrameSampler, SampledFrames, VideoDecoder, VideoOpener};

//! OCR 前的图像预处理
//!
//! 社交媒体配图上的叠加文字通常小、低对比、带抗锯齿，全局阈值在渐变背景上
//! 会整块丢失，所以最后一步用块状自适应二值化。
//!
//! 流程：解码 → 3 倍平滑放大 → 中值滤波去噪 → 转灰度 → 分块对比度拉伸 →
//! 自适应二值化。

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage};
use imageproc::contrast::adaptive_threshold;
use imageproc::filter::median_filter;
use log::warn;

use super::MediaError;

/// 放大倍数
pub const UPSCALE_FACTOR: u32 = 3;
/// 自适应二值化的块半径（窗口 = 2r+1）
const ADAPTIVE_BLOCK_RADIUS: u32 = 16;
/// 对比度拉伸的网格划分
const CONTRAST_GRID: u32 = 8;

/// 解码任意编码的图像字节并做 OCR 预处理。
/// 解码失败向上返回错误，由调用方降级为空文本。
pub fn prepare_bytes(bytes: &[u8]) -> Result<GrayImage, MediaError> {
    let decoded = image::load_from_memory(bytes)?;
    Ok(prepare_raster(&decoded))
}

/// 对已解码的图像做 OCR 预处理；增强失败时回退到原图灰度
pub fn prepare_raster(decoded: &DynamicImage) -> GrayImage {
    match enhance(decoded) {
        Ok(gray) => gray,
        Err(e) => {
            warn!("⚠️ 预处理失败，回退到原始灰度图: {}", e);
            decoded.to_luma8()
        }
    }
}

fn enhance(img: &DynamicImage) -> Result<GrayImage, MediaError> {
    let (w, h) = (img.width(), img.height());
    if w == 0 || h == 0 {
        return Err(MediaError::EmptyImage);
    }

    let upscaled = img.resize_exact(w * UPSCALE_FACTOR, h * UPSCALE_FACTOR, FilterType::CatmullRom);
    let denoised = median_filter(&upscaled.to_rgba8(), 1, 1);
    let gray = DynamicImage::ImageRgba8(denoised).to_luma8();
    let stretched = local_contrast_stretch(&gray, CONTRAST_GRID);

    Ok(adaptive_threshold(&stretched, ADAPTIVE_BLOCK_RADIUS))
}

/// 分块对比度拉伸：每个网格单元按 2%/98% 分位数线性拉伸，
/// 容忍画面内光照不均
fn local_contrast_stretch(gray: &GrayImage, grid: u32) -> GrayImage {
    let (w, h) = gray.dimensions();
    let mut out = GrayImage::new(w, h);

    let tile_w = (w / grid).max(1);
    let tile_h = (h / grid).max(1);

    let mut ty = 0;
    while ty < h {
        let y_end = if ty + 2 * tile_h > h { h } else { ty + tile_h };
        let mut tx = 0;
        while tx < w {
            let x_end = if tx + 2 * tile_w > w { w } else { tx + tile_w };
            stretch_tile(gray, &mut out, tx, ty, x_end, y_end);
            tx = x_end;
        }
        ty = y_end;
    }

    out
}

fn stretch_tile(src: &GrayImage, dst: &mut GrayImage, x0: u32, y0: u32, x1: u32, y1: u32) {
    let mut hist = [0u32; 256];
    let total = (x1 - x0) as u64 * (y1 - y0) as u64;
    for y in y0..y1 {
        for x in x0..x1 {
            hist[src.get_pixel(x, y).0[0] as usize] += 1;
        }
    }

    let lo_count = (total * 2 / 100) as u32;
    let hi_count = (total * 98 / 100) as u32;

    let mut low = 0u8;
    let mut high = 255u8;
    let mut cumulative = 0u32;
    for (value, &count) in hist.iter().enumerate() {
        let next = cumulative + count;
        if cumulative <= lo_count && next > lo_count {
            low = value as u8;
        }
        if cumulative <= hi_count && next > hi_count {
            high = value as u8;
        }
        cumulative = next;
    }

    let range = high.saturating_sub(low);
    for y in y0..y1 {
        for x in x0..x1 {
            let v = src.get_pixel(x, y).0[0];
            let stretched = if range == 0 {
                v
            } else {
                let clamped = v.clamp(low, high) - low;
                ((clamped as u32 * 255) / range as u32).min(255) as u8
            };
            dst.put_pixel(x, y, image::Luma([stretched]));
        }
    }
}

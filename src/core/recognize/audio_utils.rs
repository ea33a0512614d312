//! WAV 解码与重采样

use std::io::Cursor;

use log::{debug, info};
use rubato::{Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType};

use super::error::RecognizeError;

/// 解码 WAV 字节为单声道 f32（[-1, 1]），返回采样率。
/// 多声道按逐帧平均混合成单声道。
pub fn load_wav_mono_f32(bytes: &[u8]) -> Result<(Vec<f32>, u32), RecognizeError> {
    let mut reader = hound::WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    debug!(
        "📊 WAV spec: {} Hz, {} channels, {} bits",
        spec.sample_rate, spec.channels, spec.bits_per_sample
    );

    if spec.sample_rate == 0 {
        return Err(RecognizeError::Wav(hound::Error::FormatError(
            "invalid sample rate",
        )));
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<_>, _>>()?,
        hound::SampleFormat::Int => reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f32 / i16::MAX as f32))
            .collect::<Result<Vec<_>, _>>()?,
    };

    let mut mono = Vec::with_capacity(interleaved.len() / channels + 1);
    for frame in interleaved.chunks(channels) {
        let sum: f32 = frame.iter().sum();
        mono.push(sum / frame.len() as f32);
    }

    debug!("✓ Loaded {} mono samples", mono.len());
    Ok((mono, spec.sample_rate))
}

/// 重采样到 16 kHz 单声道。整数倍率走均值快速路径，其余走 sinc 插值。
pub fn resample_to_16k_mono(input: &[f32], in_rate: u32) -> Result<Vec<f32>, RecognizeError> {
    if in_rate == 16_000 {
        return Ok(input.to_vec());
    }

    if in_rate % 16_000 == 0 {
        let factor = (in_rate / 16_000) as usize;
        info!("⚡ Fast downsample {} Hz -> 16 kHz (factor {})", in_rate, factor);
        return Ok(downsample_by_factor(input, factor));
    }

    info!("🔧 Resampling {} samples {} Hz -> 16 kHz", input.len(), in_rate);
    let ratio = 16_000.0 / in_rate as f64;
    let params = SincInterpolationParameters {
        sinc_len: 48,
        f_cutoff: 0.90,
        interpolation: SincInterpolationType::Cubic,
        oversampling_factor: 4,
        window: rubato::WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, params, input.len(), 1)
        .map_err(|e| RecognizeError::Resample(e.to_string()))?;

    let mut output = vec![vec![0.0f32; resampler.output_frames_max()]];
    let (_, written) = resampler
        .process_into_buffer(&[input], &mut output, None)
        .map_err(|e| RecognizeError::Resample(e.to_string()))?;

    let mut result = output.swap_remove(0);
    result.truncate(written);
    Ok(result)
}

fn downsample_by_factor(input: &[f32], factor: usize) -> Vec<f32> {
    debug_assert!(factor > 0);
    let mut output = Vec::with_capacity(input.len() / factor + 1);
    for chunk in input.chunks(factor) {
        let sum: f32 = chunk.iter().sum();
        output.push(sum / chunk.len() as f32);
    }
    output
}

/// 逐帧 RMS 能量转分贝后取平均，仅作诊断输出。
/// 无样本时返回 None。
pub fn mean_rms_db(samples: &[f32], frame_len: usize) -> Option<f32> {
    if samples.is_empty() || frame_len == 0 {
        return None;
    }

    let mut total_db = 0.0f32;
    let mut frames = 0u32;
    for frame in samples.chunks(frame_len) {
        let energy: f32 = frame.iter().map(|s| s * s).sum::<f32>() / frame.len() as f32;
        let rms = energy.sqrt().max(1e-10);
        total_db += 20.0 * rms.log10();
        frames += 1;
    }

    Some(total_db / frames as f32)
}

//! # 上传准备流水线
//!
//! ## 设计思路
//!
//! 将“来源字节 → 解码 → 降采样 → PNG 编码”的过程集中管理。
//! 识别请求只需要能分辨条码的分辨率，上传前把图片压到边界内（默认 384），
//! 既降低上行流量也缩短远端处理时间。
//!
//! ## 实现思路
//!
//! 1. 按来源加载原始字节（文件 / Base64），尽早做体积校验
//! 2. 解码并拒绝零尺寸图像
//! 3. `fit_within` 计算目标尺寸（纯函数，只缩不放）
//! 4. `fast_image_resize` 双线性重采样，失败回退 `image::resize_exact`
//! 5. 无损 PNG 编码

use base64::{Engine as _, engine::general_purpose};
use fast_image_resize as fr;
use image::{DynamicImage, GenericImageView, ImageBuffer, ImageFormat, Rgba};
use std::io::Cursor;
use std::path::Path;

use super::config::ClientConfig;
use super::error::BarcodeError;
use super::source::{PreparedUploadImage, RawImageData, ScanSource};

/// 计算保持纵横比的降采样目标尺寸。
///
/// 约定：
/// - 宽图（`w / h > 1`）以宽为受约束轴，竖图与正方形以高为受约束轴；
/// - 受约束轴已在边界内则原样返回，绝不放大；
/// - 另一轴按纵横比缩放后向下取整，最小钳制到 1 像素。
///
/// 调用方保证输入为正；零尺寸输入属于调用方缺陷（解码层已拦截）。
pub fn fit_within(width: u32, height: u32, max_size: u32) -> (u32, u32) {
    let ratio = width as f32 / height as f32;

    if ratio > 1.0 {
        // 宽 > 高，以宽为准
        if width <= max_size {
            return (width, height);
        }
        let new_height = (max_size as f32 / ratio).floor() as u32;
        return (max_size, new_height.max(1));
    }

    // 宽 <= 高（含正方形），以高为准
    if height <= max_size {
        return (width, height);
    }
    let new_width = (max_size as f32 * ratio).floor() as u32;
    (new_width.max(1), max_size)
}

/// 按来源加载图片原始字节。
pub(crate) fn load_scan_source(
    source: ScanSource,
    config: &ClientConfig,
) -> Result<RawImageData, BarcodeError> {
    match source {
        ScanSource::FilePath(path) => load_from_file(&path, config),
        ScanSource::Base64(data) => load_from_base64(&data, config),
    }
}

/// 从本地路径加载图片原始字节。
fn load_from_file(path: &str, config: &ClientConfig) -> Result<RawImageData, BarcodeError> {
    log::info!("📁 开始读取待识别图片 - 路径: {}", path);

    let file_path = Path::new(path);
    if !file_path.exists() {
        return Err(BarcodeError::FileSystem(format!("文件不存在：{}", path)));
    }

    let metadata = std::fs::metadata(file_path)
        .map_err(|e| BarcodeError::FileSystem(format!("无法读取文件信息：{}", e)))?;

    if metadata.len() > config.max_file_size {
        return Err(BarcodeError::ResourceLimit(format!(
            "文件过大：{:.2} MB（限制：{:.2} MB）",
            metadata.len() as f64 / 1024.0 / 1024.0,
            config.max_file_size as f64 / 1024.0 / 1024.0
        )));
    }

    let bytes = std::fs::read(file_path)
        .map_err(|e| BarcodeError::FileSystem(format!("无法读取图片文件：{}", e)))?;

    Ok(RawImageData {
        bytes,
        source_hint: "file",
    })
}

/// 从 Base64 字符串加载图片原始字节。
fn load_from_base64(data: &str, config: &ClientConfig) -> Result<RawImageData, BarcodeError> {
    log::info!("📝 开始处理 base64 待识别图片");

    // Data URL 只取逗号后的载荷部分
    let payload = match data.split_once(',') {
        Some((head, body)) if head.starts_with("data:") => body,
        _ => data,
    };

    let bytes = general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| BarcodeError::InvalidFormat(format!("Base64 解析失败：{}", e)))?;

    if bytes.len() as u64 > config.max_file_size {
        return Err(BarcodeError::ResourceLimit(format!(
            "Base64 解码后体积过大：{:.2} MB（限制：{:.2} MB）",
            bytes.len() as f64 / 1024.0 / 1024.0,
            config.max_file_size as f64 / 1024.0 / 1024.0
        )));
    }

    Ok(RawImageData {
        bytes,
        source_hint: "base64",
    })
}

/// 将原始字节解码、降采样并编码为可上传的 PNG 载荷。
pub(crate) fn decode_and_prepare_upload(
    raw: RawImageData,
    config: &ClientConfig,
) -> Result<PreparedUploadImage, BarcodeError> {
    let decoded = image::load_from_memory(&raw.bytes)
        .map_err(|e| BarcodeError::Decode(format!("图片解码失败：{}", e)))?;

    let (raw_width, raw_height) = decoded.dimensions();
    if raw_width == 0 || raw_height == 0 {
        return Err(BarcodeError::Decode("图片尺寸为零".to_string()));
    }

    let (target_width, target_height) =
        fit_within(raw_width, raw_height, config.max_upload_dimension);

    let resized = if (target_width, target_height) == (raw_width, raw_height) {
        decoded
    } else {
        downscale(decoded, target_width, target_height, config)
    };

    let mut png_bytes = Vec::new();
    resized
        .write_to(&mut Cursor::new(&mut png_bytes), ImageFormat::Png)
        .map_err(|e| BarcodeError::Encode(format!("PNG 编码失败：{}", e)))?;

    log::info!(
        "✅ 上传准备完成 - 来源: {} 原始尺寸: {}x{} 上传尺寸: {}x{} PNG {} bytes",
        raw.source_hint,
        raw_width,
        raw_height,
        target_width,
        target_height,
        png_bytes.len()
    );

    Ok(PreparedUploadImage {
        width: target_width,
        height: target_height,
        png_bytes,
    })
}

/// 执行实际的像素重采样。
///
/// 优先走 `fast_image_resize`，失败时回退到 `image::resize_exact`。
fn downscale(
    image: DynamicImage,
    target_width: u32,
    target_height: u32,
    config: &ClientConfig,
) -> DynamicImage {
    match resize_with_fast_image_resize(&image, target_width, target_height, config.resize_filter)
    {
        Ok(resized) => resized,
        Err(err) => {
            log::warn!("⚠️ fast_image_resize 降采样失败，回退 image::resize_exact：{}", err);
            image.resize_exact(target_width, target_height, config.resize_filter)
        }
    }
}

fn resize_with_fast_image_resize(
    image: &DynamicImage,
    target_width: u32,
    target_height: u32,
    filter: image::imageops::FilterType,
) -> Result<DynamicImage, BarcodeError> {
    let src = image.to_rgba8();
    let (src_width, src_height) = src.dimensions();

    let src_image =
        fr::images::Image::from_vec_u8(src_width, src_height, src.into_raw(), fr::PixelType::U8x4)
            .map_err(|e| BarcodeError::Decode(format!("构建源图像缓冲失败：{}", e)))?;

    let mut dst_image = fr::images::Image::new(target_width, target_height, fr::PixelType::U8x4);

    let mut resizer = fr::Resizer::new();
    let options = fr::ResizeOptions::new()
        .resize_alg(fr::ResizeAlg::Convolution(to_fast_filter(filter)));

    resizer
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(|e| BarcodeError::Decode(format!("fast_image_resize 执行失败：{}", e)))?;

    let rgba = ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(
        target_width,
        target_height,
        dst_image.into_vec(),
    )
    .ok_or_else(|| BarcodeError::Decode("fast_image_resize 输出缓冲长度异常".to_string()))?;

    Ok(DynamicImage::ImageRgba8(rgba))
}

fn to_fast_filter(filter: image::imageops::FilterType) -> fr::FilterType {
    match filter {
        image::imageops::FilterType::Nearest => fr::FilterType::Box,
        image::imageops::FilterType::Triangle => fr::FilterType::Bilinear,
        image::imageops::FilterType::CatmullRom => fr::FilterType::CatmullRom,
        image::imageops::FilterType::Gaussian => fr::FilterType::Mitchell,
        image::imageops::FilterType::Lanczos3 => fr::FilterType::Lanczos3,
    }
}

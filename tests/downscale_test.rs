// 上传降采样 fit_within 的性质与场景测试
use barcode_cloud::barcode::fit_within;
use proptest::prelude::*;

/// 受约束轴：宽图看宽，竖图与正方形看高。
fn constrained_axis(width: u32, height: u32, fitted: (u32, u32)) -> u32 {
    if width > height { fitted.0 } else { fitted.1 }
}

proptest! {
    /// 受约束轴不超界，且两轴都绝不放大。
    #[test]
    fn fit_never_exceeds_bound_nor_enlarges(
        width in 1u32..=10_000,
        height in 1u32..=10_000,
        max_size in 1u32..=4_096,
    ) {
        let (fw, fh) = fit_within(width, height, max_size);

        prop_assert!(fw >= 1 && fh >= 1);
        prop_assert!(fw <= width);
        prop_assert!(fh <= height);
        prop_assert!(constrained_axis(width, height, (fw, fh)) <= max_size);
    }

    /// 幂等：对结果再次应用同一边界不再变化。
    #[test]
    fn fit_is_idempotent(
        width in 1u32..=10_000,
        height in 1u32..=10_000,
        max_size in 1u32..=4_096,
    ) {
        let first = fit_within(width, height, max_size);
        let second = fit_within(first.0, first.1, max_size);
        prop_assert_eq!(first, second);
    }

    /// 缩放分支严格遵循 floor 公式（夹钳到 1 像素的退化轴除外）。
    #[test]
    fn fit_matches_floor_formula(
        width in 1u32..=10_000,
        height in 1u32..=10_000,
        max_size in 1u32..=4_096,
    ) {
        let ratio = width as f32 / height as f32;
        let (fw, fh) = fit_within(width, height, max_size);

        if ratio > 1.0 {
            if width <= max_size {
                prop_assert_eq!((fw, fh), (width, height));
            } else {
                let expected_h = ((max_size as f32 / ratio).floor() as u32).max(1);
                prop_assert_eq!((fw, fh), (max_size, expected_h));
            }
        } else if height <= max_size {
            prop_assert_eq!((fw, fh), (width, height));
        } else {
            let expected_w = ((max_size as f32 * ratio).floor() as u32).max(1);
            prop_assert_eq!((fw, fh), (expected_w, max_size));
        }
    }

    /// 纵横比在一个取整单位内保持不变（退化到 1 像素的情况除外）。
    #[test]
    fn fit_preserves_aspect_ratio_within_rounding_unit(
        width in 2u32..=10_000,
        height in 2u32..=10_000,
        max_size in 16u32..=4_096,
    ) {
        let (fw, fh) = fit_within(width, height, max_size);
        prop_assume!(fw > 1 && fh > 1);

        let original = (width as f32 / height as f32) as f64;
        let fitted = fw as f64 / fh as f64;

        // floor 取整最多让被缩放轴偏差 1 个像素（含 f32 运算余量）
        let unit = if width > height {
            max_size as f64 / (fh as f64 * (fh as f64 - 1.0))
        } else {
            2.0 / fh as f64
        };

        prop_assert!((fitted - original).abs() <= unit + 1e-6);
    }
}

#[test]
fn landscape_image_is_width_constrained() {
    assert_eq!(fit_within(800, 400, 384), (384, 192));
}

#[test]
fn image_within_bound_is_untouched() {
    assert_eq!(fit_within(300, 400, 384), (300, 400));
}

#[test]
fn square_image_is_height_constrained() {
    assert_eq!(fit_within(400, 400, 384), (384, 384));
}

#[test]
fn exact_bound_is_untouched() {
    assert_eq!(fit_within(384, 384, 384), (384, 384));
    assert_eq!(fit_within(384, 100, 384), (384, 100));
}

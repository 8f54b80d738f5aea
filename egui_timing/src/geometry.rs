//! 坐标换算模块
//!
//! 时间（秒）与波形内容坐标（像素）之间的唯一换算入口。
//! 波形、时间尺和区间层都只通过这两个函数换算，避免各层之间出现漂移。

/// 时间 → 像素。`duration` 或 `pixel_width` 为 0（或非有限值）时返回 0。
pub fn time_to_pixel(time_seconds: f64, duration_seconds: f64, pixel_width: f64) -> f64 {
    if !is_usable(duration_seconds) || !is_usable(pixel_width) || !time_seconds.is_finite() {
        return 0.0;
    }
    time_seconds * pixel_width / duration_seconds
}

/// 像素 → 时间。`duration` 或 `pixel_width` 为 0（或非有限值）时返回 0。
pub fn pixel_to_time(pixel_x: f64, duration_seconds: f64, pixel_width: f64) -> f64 {
    if !is_usable(duration_seconds) || !is_usable(pixel_width) || !pixel_x.is_finite() {
        return 0.0;
    }
    pixel_x * duration_seconds / pixel_width
}

fn is_usable(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_width_or_duration_degrades_to_zero() {
        assert_eq!(time_to_pixel(5.0, 0.0, 1000.0), 0.0);
        assert_eq!(time_to_pixel(5.0, 10.0, 0.0), 0.0);
        assert_eq!(pixel_to_time(50.0, 0.0, 1000.0), 0.0);
        assert_eq!(pixel_to_time(50.0, 10.0, 0.0), 0.0);
        assert_eq!(pixel_to_time(f64::NAN, 10.0, 100.0), 0.0);
    }

    #[test]
    fn round_trip_is_identity() {
        let (duration, width) = (187.3, 9365.0);
        for step in 0..=100 {
            let t = duration * step as f64 / 100.0;
            let back = pixel_to_time(time_to_pixel(t, duration, width), duration, width);
            assert!((back - t).abs() < 1e-9, "{t} -> {back}");
        }
    }

    #[test]
    fn linear_mapping() {
        assert_eq!(time_to_pixel(50.0, 100.0, 1000.0), 500.0);
        assert_eq!(pixel_to_time(250.0, 100.0, 1000.0), 25.0);
    }
}

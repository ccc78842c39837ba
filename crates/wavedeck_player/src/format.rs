//! 显示格式化

/// 秒数格式化为 `HH:MM:SS`，小数部分截断，负数和 NaN 视为 0
///
/// 超过 99 小时时小时位会多于两位。
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.trunc() as u64
    } else {
        0
    };

    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

/// 音量的整数百分比
pub fn volume_percent(volume: f32) -> u32 {
    (volume.clamp(0.0, 1.0) * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "00:00:00");
        assert_eq!(format_time(30.0), "00:00:30");
        assert_eq!(format_time(125.0), "00:02:05");
        assert_eq!(format_time(125.9), "00:02:05");
        assert_eq!(format_time(3600.0 * 2.0 + 61.0), "02:01:01");
        assert_eq!(format_time(3600.0 * 100.0), "100:00:00");
    }

    #[test]
    fn test_format_time_invalid() {
        assert_eq!(format_time(-5.0), "00:00:00");
        assert_eq!(format_time(f64::NAN), "00:00:00");
        assert_eq!(format_time(f64::INFINITY), "00:00:00");
    }

    #[test]
    fn test_volume_percent() {
        assert_eq!(volume_percent(0.5), 50);
        assert_eq!(volume_percent(0.0), 0);
        assert_eq!(volume_percent(1.0), 100);
        assert_eq!(volume_percent(0.333), 33);
        assert_eq!(volume_percent(0.6), 60);
    }
}

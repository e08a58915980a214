//! 时间工具
//! Wall-clock helpers

/// 当前时间 (epoch 秒, 微秒精度)
pub fn epoch_seconds() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// epoch 秒 → 可读时间字符串 (日志用, 北京时间)
pub fn format_timestamp(timestamp: f64) -> String {
    let offset = match chrono::FixedOffset::east_opt(8 * 60 * 60) {
        Some(offset) => offset,
        None => return format!("{:.3}", timestamp),
    };
    let micros = (timestamp * 1_000_000.0).round() as i64;
    match chrono::DateTime::<chrono::Utc>::from_timestamp_micros(micros) {
        Some(t) => t
            .with_timezone(&offset)
            .format("%Y-%m-%d %H:%M:%S%.3f")
            .to_string(),
        None => format!("{:.3}", timestamp),
    }
}

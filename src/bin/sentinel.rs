/// 数字卫兵 (Digital Sentinel)
///
/// 行为分析回放工具: 逐行读取检测结果 (JSON Lines), 送入行为跟踪器,
/// 每帧输出一行响应 (detections / count / alerts)
///
/// 输入行格式:
/// 1. 检测数组: `[{"label": "person", "confidence": 0.9, "bbox": [x1, y1, x2, y2]}]`
/// 2. 帧对象:   `{"timestamp": 1700000000.0, "detections": [...], "detect_behavior": true}`
/// 3. 设置更新: `{"settings": {"webhook_url": "https://...", "suspicious_behavior_enabled": true}}`
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sentinel_rs::{parse_detections, BehaviorConfig, BehaviorTracker, FrameReport, SettingsUpdate};

/// 数字卫兵参数
#[derive(Parser, Debug)]
#[command(author, version, about = "数字卫兵 - 可疑行为分析", long_about = None)]
struct Args {
    /// 输入文件 (JSON Lines), `-` 为标准输入
    #[arg(short, long, default_value = "-")]
    input: String,

    /// 配置文件 (不存在时自动创建)
    #[arg(short, long, default_value = "sentinel_config.json")]
    config: String,

    /// 告警推送地址
    #[arg(short, long)]
    webhook: Option<String>,

    /// 关闭行为分析 (只回显检测)
    #[arg(long, default_value_t = false)]
    no_behavior: bool,

    /// 日志级别 (RUST_LOG 优先)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    info!("🚀 数字卫兵系统启动");
    let config = BehaviorConfig::load(&args.config)
        .with_context(|| format!("加载配置失败: {}", args.config))?;
    config.log_summary();

    let tracker = BehaviorTracker::new(config, args.webhook.clone())?;
    if args.no_behavior {
        tracker.update_settings(SettingsUpdate {
            webhook_url: None,
            suspicious_behavior_enabled: Some(false),
        });
    }

    let reader: Box<dyn BufRead> = if args.input == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file =
            File::open(&args.input).with_context(|| format!("无法打开输入: {}", args.input))?;
        Box::new(BufReader::new(file))
    };

    info!("✅ 系统就绪,开始分析...");
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut frames = 0u64;
    let mut alerts = 0usize;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.context("读取输入失败")?;
        if line.trim().is_empty() {
            continue;
        }
        let value: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                warn!("⚠️ 第 {} 行不是合法JSON: {}", line_no + 1, e);
                continue;
            }
        };

        if let Some(settings) = value.get("settings") {
            match serde_json::from_value::<SettingsUpdate>(settings.clone()) {
                Ok(update) => tracker.update_settings(update),
                Err(e) => warn!("⚠️ 第 {} 行设置无效: {}", line_no + 1, e),
            }
            continue;
        }

        let report = run_frame(&tracker, &value);
        alerts += report.alerts.len();
        frames += 1;
        serde_json::to_writer(&mut out, &report)?;
        writeln!(out)?;
    }
    out.flush()?;

    info!("📊 共处理 {} 帧, {} 条告警", frames, alerts);
    tracker.shutdown();
    Ok(())
}

/// 处理一行帧输入
fn run_frame(tracker: &BehaviorTracker, value: &Value) -> FrameReport {
    let default_enabled = tracker.behavior_enabled();
    let (detections, enabled, timestamp) = match value {
        Value::Array(_) => (parse_detections(value), default_enabled, None),
        _ => (
            parse_detections(value.get("detections").unwrap_or(&Value::Null)),
            value
                .get("detect_behavior")
                .and_then(Value::as_bool)
                .unwrap_or(default_enabled),
            value.get("timestamp").and_then(Value::as_f64),
        ),
    };

    match timestamp {
        Some(now) => {
            let alerts = tracker.on_frame_at(&detections, enabled, now);
            FrameReport {
                count: detections.len(),
                detections,
                alerts,
            }
        }
        None => tracker.process(detections, enabled),
    }
}

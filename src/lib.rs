// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
pub mod alert; // 告警冷却与推送
pub mod behavior; // 行为分类规则
pub mod config; // 行为分析配置参数
pub mod detection; // 检测输入
pub mod error; // 错误类型
pub mod sentinel; // 帧更新入口
pub mod tracking; // 目标跟踪
pub mod utils; // 时间工具

pub use crate::behavior::{Alert, AlertDetails, BehaviorType};
pub use crate::config::BehaviorConfig;
pub use crate::detection::{parse_detections, Detection};
pub use crate::error::{ConfigError, DetectionError, DispatchError};
pub use crate::sentinel::{BehaviorTracker, FrameReport, Settings, SettingsUpdate};

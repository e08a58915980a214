//! 行为分析配置 - 通过JSON文件调整参数
//! Behavior thresholds keyed by behavior type

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;

/// 缓冲/队列长度上限, 预分配前即拒绝
pub const MAX_BUFFER_SIZE: usize = 100_000;

/// 盗窃检测参数
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TheftConfig {
    pub objects: Vec<String>,     // 监控物品类别
    pub time_threshold: f64,      // 物品可见时长阈值(秒)
    pub absence_window: f64,      // 刚消失判定窗口(秒), 与淘汰窗口相互独立
    pub proximity_threshold: f32, // 人与物品距离阈值(像素)
}

impl Default for TheftConfig {
    fn default() -> Self {
        Self {
            objects: labels(&["backpack", "handbag", "suitcase", "laptop", "cell phone"]),
            time_threshold: 3.0,
            absence_window: 3.0,
            proximity_threshold: 100.0,
        }
    }
}

/// 打斗检测参数
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FightConfig {
    pub proximity_threshold: f32, // 两人距离阈值(像素)
    pub motion_threshold: f32,    // 运动幅度阈值(像素/帧)
    pub time_threshold: f64,      // 最短跟踪时长(秒)
}

impl Default for FightConfig {
    fn default() -> Self {
        Self {
            proximity_threshold: 100.0,
            motion_threshold: 30.0,
            time_threshold: 2.0,
        }
    }
}

/// 徘徊检测参数
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoiteringConfig {
    pub time_threshold: f64,     // 停留时长阈值(秒)
    pub movement_threshold: f32, // 活动范围阈值(像素)
    pub min_positions: usize,    // 轨迹点数须大于该值
}

impl Default for LoiteringConfig {
    fn default() -> Self {
        Self {
            time_threshold: 10.0,
            movement_threshold: 50.0,
            min_positions: 5,
        }
    }
}

/// 遗留物品检测参数
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UnattendedObjectConfig {
    pub objects: Vec<String>, // 监控物品类别
    pub time_threshold: f64,  // 物品存在时长阈值(秒)
    pub person_distance: f32, // 附近有人的距离阈值(像素)
}

impl Default for UnattendedObjectConfig {
    fn default() -> Self {
        Self {
            objects: labels(&["backpack", "suitcase", "handbag"]),
            time_threshold: 5.0,
            person_distance: 150.0,
        }
    }
}

/// 行为分析总配置
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BehaviorConfig {
    // === 各行为阈值 ===
    pub theft: TheftConfig,
    pub fight: FightConfig,
    pub loitering: LoiteringConfig,
    pub unattended_object: UnattendedObjectConfig,

    // === 全局参数 ===
    pub person_label: String,       // 行人类别名
    pub alert_cooldown: f64,        // 同类告警冷却(秒)
    pub stale_window: f64,          // 目标淘汰窗口(秒)
    pub frame_buffer_size: usize,   // 原始帧环形缓冲长度
    pub dispatch_timeout: f64,      // 告警推送超时(秒)
    pub dispatch_queue_size: usize, // 推送队列容量
    pub alert_history_size: usize,  // 最近告警保留条数
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            theft: TheftConfig::default(),
            fight: FightConfig::default(),
            loitering: LoiteringConfig::default(),
            unattended_object: UnattendedObjectConfig::default(),

            person_label: "person".to_string(),
            alert_cooldown: 30.0,
            stale_window: 5.0,
            frame_buffer_size: 30,
            dispatch_timeout: 5.0,
            dispatch_queue_size: 64,
            alert_history_size: 50,
        }
    }
}

impl BehaviorConfig {
    /// 从JSON文件加载配置
    ///
    /// 文件不存在时写入并返回默认配置; 解析失败或数值非法时返回错误
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            info!("📝 配置文件不存在,创建默认配置: {}", path.display());
            let config = Self::default();
            config.save(path)?;
            return Ok(config);
        }

        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        info!("✅ 配置已从 {} 加载", path.display());
        Ok(config)
    }

    /// 解析并校验JSON配置
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 保存配置到JSON文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        info!("💾 配置已保存到 {}", path.display());
        Ok(())
    }

    /// 校验所有阈值
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_seconds("theft.timeThreshold", self.theft.time_threshold)?;
        check_seconds("theft.absenceWindow", self.theft.absence_window)?;
        check_pixels("theft.proximityThreshold", self.theft.proximity_threshold)?;
        check_labels("theft.objects", &self.theft.objects)?;

        check_pixels("fight.proximityThreshold", self.fight.proximity_threshold)?;
        check_pixels("fight.motionThreshold", self.fight.motion_threshold)?;
        check_seconds("fight.timeThreshold", self.fight.time_threshold)?;

        check_seconds("loitering.timeThreshold", self.loitering.time_threshold)?;
        check_pixels("loitering.movementThreshold", self.loitering.movement_threshold)?;

        check_seconds(
            "unattendedObject.timeThreshold",
            self.unattended_object.time_threshold,
        )?;
        check_pixels(
            "unattendedObject.personDistance",
            self.unattended_object.person_distance,
        )?;
        check_labels("unattendedObject.objects", &self.unattended_object.objects)?;

        if self.person_label.trim().is_empty() {
            return Err(ConfigError::invalid("personLabel", "must not be empty"));
        }
        check_seconds("alertCooldown", self.alert_cooldown)?;
        check_seconds("staleWindow", self.stale_window)?;
        if !(self.dispatch_timeout > 0.0 && self.dispatch_timeout <= 3600.0) {
            return Err(ConfigError::invalid("dispatchTimeout", "must be in (0, 3600]"));
        }
        for (field, size) in [
            ("frameBufferSize", self.frame_buffer_size),
            ("dispatchQueueSize", self.dispatch_queue_size),
            ("alertHistorySize", self.alert_history_size),
        ] {
            if size == 0 || size > MAX_BUFFER_SIZE {
                return Err(ConfigError::invalid(
                    field,
                    format!("must be in 1..={}, got {}", MAX_BUFFER_SIZE, size),
                ));
            }
        }
        Ok(())
    }

    /// 打印当前配置
    pub fn log_summary(&self) {
        info!("🎛️  当前行为分析配置:");
        info!(
            "  盗窃: 物品 {:?}, 可见 > {:.1}s, 消失 < {:.1}s, 距离 < {:.0}px",
            self.theft.objects,
            self.theft.time_threshold,
            self.theft.absence_window,
            self.theft.proximity_threshold
        );
        info!(
            "  打斗: 距离 < {:.0}px, 运动 > {:.0}px/帧, 时长 > {:.1}s",
            self.fight.proximity_threshold, self.fight.motion_threshold, self.fight.time_threshold
        );
        info!(
            "  徘徊: 时长 > {:.1}s, 活动范围 < {:.0}px",
            self.loitering.time_threshold, self.loitering.movement_threshold
        );
        info!(
            "  遗留物品: 物品 {:?}, 时长 > {:.1}s, 无人距离 {:.0}px",
            self.unattended_object.objects,
            self.unattended_object.time_threshold,
            self.unattended_object.person_distance
        );
        info!(
            "  冷却 {:.0}s | 淘汰窗口 {:.1}s | 推送超时 {:.1}s",
            self.alert_cooldown, self.stale_window, self.dispatch_timeout
        );
    }
}

fn labels(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn check_seconds(field: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::invalid(
            field,
            format!("expected a non-negative number, got {}", value),
        ));
    }
    Ok(())
}

fn check_pixels(field: &str, value: f32) -> Result<(), ConfigError> {
    check_seconds(field, value as f64)
}

fn check_labels(field: &str, objects: &[String]) -> Result<(), ConfigError> {
    if objects.is_empty() {
        return Err(ConfigError::invalid(field, "object set must not be empty"));
    }
    if objects.iter().any(|label| label.trim().is_empty()) {
        return Err(ConfigError::invalid(field, "object labels must not be empty"));
    }
    Ok(())
}

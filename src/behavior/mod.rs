//! 行为分析 (Behavior Classification)
//! Rule evaluators over the tracked-object store
//!
//! 每帧按固定顺序运行: 盗窃 → 打斗 → 徘徊 → 遗留物品

pub mod fight;
pub mod loitering;
pub mod theft;
pub mod unattended;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::BehaviorConfig;
use crate::tracking::ObjectStore;

// ========== 告警数据结构 ==========

/// 行为类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BehaviorType {
    Theft,
    Fight,
    Loitering,
    UnattendedObject,
}

impl BehaviorType {
    pub const ALL: [BehaviorType; 4] = [
        BehaviorType::Theft,
        BehaviorType::Fight,
        BehaviorType::Loitering,
        BehaviorType::UnattendedObject,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BehaviorType::Theft => "theft",
            BehaviorType::Fight => "fight",
            BehaviorType::Loitering => "loitering",
            BehaviorType::UnattendedObject => "unattendedObject",
        }
    }
}

impl fmt::Display for BehaviorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TheftDetails {
    pub item: String,
    pub duration_visible: f64,
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FightDetails {
    pub people_count: usize,
    pub movement_speed: f32,
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoiteringDetails {
    pub duration: f64,
    pub movement: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnattendedObjectDetails {
    pub object: String,
    pub duration: f64,
    pub confidence: f32,
}

/// 告警详情 (按行为类型区分字段, 序列化为普通JSON对象)
///
/// 反序列化按变体顺序尝试, 各变体的必填字段互不相同
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AlertDetails {
    Theft(TheftDetails),
    Fight(FightDetails),
    Loitering(LoiteringDetails),
    UnattendedObject(UnattendedObjectDetails),
}

impl AlertDetails {
    pub fn behavior(&self) -> BehaviorType {
        match self {
            AlertDetails::Theft(_) => BehaviorType::Theft,
            AlertDetails::Fight(_) => BehaviorType::Fight,
            AlertDetails::Loitering(_) => BehaviorType::Loitering,
            AlertDetails::UnattendedObject(_) => BehaviorType::UnattendedObject,
        }
    }
}

/// 告警记录
///
/// 线格式: `{"behavior": "fight", "timestamp": 1700000000.5, "details": {...}}`
///
/// 反序列化时 `behavior` 必须与详情字段对应的行为一致
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAlert")]
pub struct Alert {
    pub behavior: BehaviorType,
    pub timestamp: f64,
    pub details: AlertDetails,
}

#[derive(Deserialize)]
struct RawAlert {
    behavior: BehaviorType,
    timestamp: f64,
    details: AlertDetails,
}

impl TryFrom<RawAlert> for Alert {
    type Error = String;

    fn try_from(raw: RawAlert) -> Result<Self, Self::Error> {
        let expected = raw.details.behavior();
        if raw.behavior != expected {
            return Err(format!(
                "behavior `{}` does not match {} details",
                raw.behavior, expected
            ));
        }
        Ok(Self {
            behavior: raw.behavior,
            timestamp: raw.timestamp,
            details: raw.details,
        })
    }
}

impl Alert {
    pub fn new(timestamp: f64, details: AlertDetails) -> Self {
        Self {
            behavior: details.behavior(),
            timestamp,
            details,
        }
    }
}

// ========== 分类入口 ==========

/// 依次运行全部分类器, 返回本帧候选告警
pub fn classify_all(store: &ObjectStore, config: &BehaviorConfig, now: f64) -> Vec<Alert> {
    let person = config.person_label.as_str();
    let mut candidates = Vec::new();
    candidates.extend(theft::classify(store, &config.theft, person, now));
    candidates.extend(fight::classify(store, &config.fight, person, now));
    candidates.extend(loitering::classify(store, &config.loitering, person, now));
    candidates.extend(unattended::classify(
        store,
        &config.unattended_object,
        person,
        now,
    ));
    candidates
}

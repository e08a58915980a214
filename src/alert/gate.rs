//! 告警冷却闸门
//! Per-behavior-type cooldown; the key is the behavior type, not the object

use std::collections::HashMap;

use tracing::{debug, info};

use crate::behavior::{Alert, BehaviorType};
use crate::utils::format_timestamp;

pub struct CooldownGate {
    /// 冷却时长 (秒)
    cooldown: f64,

    /// 各行为最近一次放行时间
    last_fired: HashMap<BehaviorType, f64>,
}

impl CooldownGate {
    pub fn new(cooldown: f64) -> Self {
        Self {
            cooldown,
            last_fired: HashMap::new(),
        }
    }

    /// 过滤候选告警, 返回放行的告警
    ///
    /// 放行即计入冷却, 与后续推送是否成功无关
    pub fn evaluate(&mut self, candidates: Vec<Alert>, now: f64) -> Vec<Alert> {
        let mut accepted = Vec::with_capacity(candidates.len());
        for alert in candidates {
            if let Some(&last) = self.last_fired.get(&alert.behavior) {
                if now - last < self.cooldown {
                    debug!(
                        "⏳ {} 告警冷却中 ({:.1}s / {:.0}s), 丢弃",
                        alert.behavior,
                        now - last,
                        self.cooldown
                    );
                    continue;
                }
            }
            self.last_fired.insert(alert.behavior, now);
            info!(
                "🚨 {} 告警 @ {}: {:?}",
                alert.behavior,
                format_timestamp(now),
                alert.details
            );
            accepted.push(alert);
        }
        accepted
    }

    pub fn last_fired(&self, behavior: BehaviorType) -> Option<f64> {
        self.last_fired.get(&behavior).copied()
    }

    pub fn cooldown(&self) -> f64 {
        self.cooldown
    }
}

//! 盗窃检测
//!
//! 监控物品刚从画面消失, 此前可见足够久, 且消失位置附近有人

use super::{Alert, AlertDetails, TheftDetails};
use crate::config::TheftConfig;
use crate::tracking::geometry::point_distance;
use crate::tracking::ObjectStore;

pub fn classify(store: &ObjectStore, config: &TheftConfig, person: &str, now: f64) -> Vec<Alert> {
    let mut alerts = Vec::new();

    for item in store.iter() {
        if item.label == person || !config.objects.iter().any(|l| *l == item.label) {
            continue;
        }

        // 刚消失 (仍在存储中, 消失时间短于判定窗口)
        let just_vanished = !item.is_present() && now - item.last_seen < config.absence_window;
        if !just_vanished || item.visible_duration() <= config.time_threshold {
            continue;
        }

        let last_known = item.latest();
        let suspect = store
            .with_label(person)
            .find(|p| point_distance(p.latest(), last_known) < config.proximity_threshold);

        if suspect.is_some() {
            alerts.push(Alert::new(
                now,
                AlertDetails::Theft(TheftDetails {
                    item: item.label.clone(),
                    duration_visible: item.visible_duration(),
                    confidence: item.confidence,
                }),
            ));
        }
    }

    alerts
}

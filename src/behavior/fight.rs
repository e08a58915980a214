//! 打斗检测
//!
//! 两名在场人员距离很近, 且都在剧烈运动; 每帧至多一条告警

use super::{Alert, AlertDetails, FightDetails};
use crate::config::FightConfig;
use crate::tracking::geometry::{distance, motion};
use crate::tracking::{ObjectStore, TrackedObject};

pub fn classify(store: &ObjectStore, config: &FightConfig, person: &str, now: f64) -> Vec<Alert> {
    let people: Vec<&TrackedObject> = store
        .with_label(person)
        .filter(|p| p.is_present())
        .collect();
    if people.len() < 2 {
        return Vec::new();
    }

    for (i, a) in people.iter().enumerate() {
        for b in &people[i + 1..] {
            if distance(a, b) >= config.proximity_threshold {
                continue;
            }

            let (motion_a, motion_b) = (motion(a), motion(b));
            let (age_a, age_b) = (a.age(now), b.age(now));
            if motion_a > config.motion_threshold
                && motion_b > config.motion_threshold
                && age_a > config.time_threshold
                && age_b > config.time_threshold
            {
                return vec![Alert::new(
                    now,
                    AlertDetails::Fight(FightDetails {
                        people_count: people.len(),
                        movement_speed: motion_a.max(motion_b),
                        duration: age_a.min(age_b),
                    }),
                )];
            }
        }
    }

    Vec::new()
}

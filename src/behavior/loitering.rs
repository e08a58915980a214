//! 徘徊检测: 长时间停留且活动范围很小的人, 每人一条

use super::{Alert, AlertDetails, LoiteringDetails};
use crate::config::LoiteringConfig;
use crate::tracking::geometry::total_movement;
use crate::tracking::ObjectStore;

pub fn classify(
    store: &ObjectStore,
    config: &LoiteringConfig,
    person: &str,
    now: f64,
) -> Vec<Alert> {
    store
        .with_label(person)
        .filter(|p| p.is_present())
        .filter(|p| p.age(now) > config.time_threshold)
        .filter(|p| p.positions().len() > config.min_positions)
        .filter_map(|p| {
            let movement = total_movement(p);
            (movement < config.movement_threshold).then(|| {
                Alert::new(
                    now,
                    AlertDetails::Loitering(LoiteringDetails {
                        duration: p.age(now),
                        movement,
                    }),
                )
            })
        })
        .collect()
}

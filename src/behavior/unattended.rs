//! 遗留物品检测
//!
//! 监控物品在场足够久, 且附近没有在场人员

use super::{Alert, AlertDetails, UnattendedObjectDetails};
use crate::config::UnattendedObjectConfig;
use crate::tracking::geometry::is_nearby;
use crate::tracking::{ObjectStore, TrackedObject};

pub fn classify(
    store: &ObjectStore,
    config: &UnattendedObjectConfig,
    person: &str,
    now: f64,
) -> Vec<Alert> {
    let people: Vec<&TrackedObject> = store
        .with_label(person)
        .filter(|p| p.is_present())
        .collect();

    let mut alerts = Vec::new();
    for obj in store.iter().filter(|o| o.is_present()) {
        if !config.objects.iter().any(|l| *l == obj.label) {
            continue;
        }
        let duration = obj.age(now);
        if duration <= config.time_threshold {
            continue;
        }

        let attended = people
            .iter()
            .any(|p| is_nearby(p, obj, config.person_distance));
        if !attended {
            alerts.push(Alert::new(
                now,
                AlertDetails::UnattendedObject(UnattendedObjectDetails {
                    object: obj.label.clone(),
                    duration,
                    confidence: obj.confidence,
                }),
            ));
        }
    }
    alerts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backpack(first_seen: f64, now: f64) -> TrackedObject {
        let mut obj = TrackedObject::new("bag", "backpack", (500.0, 400.0).into(), 0.6, first_seen);
        obj.observe((500.0, 400.0).into(), 0.65, now);
        obj
    }

    fn person_at(x: f32, y: f32, now: f64) -> TrackedObject {
        TrackedObject::new("someone", "person", (x, y).into(), 0.9, now)
    }

    fn run(objs: Vec<TrackedObject>, now: f64) -> Vec<Alert> {
        let mut store = ObjectStore::new(5.0);
        for obj in objs {
            store.insert(obj);
        }
        classify(&store, &UnattendedObjectConfig::default(), "person", now)
    }

    #[test]
    fn test_lonely_backpack_triggers() {
        let alerts = run(vec![backpack(0.0, 6.0)], 6.0);
        assert_eq!(alerts.len(), 1);
        match &alerts[0].details {
            AlertDetails::UnattendedObject(d) => {
                assert_eq!(d.object, "backpack");
                assert_eq!(d.duration, 6.0);
                assert_eq!(d.confidence, 0.65);
            }
            other => panic!("unexpected details {other:?}"),
        }
    }

    #[test]
    fn test_owner_nearby_suppresses() {
        assert!(run(vec![backpack(0.0, 6.0), person_at(600.0, 400.0, 6.0)], 6.0).is_empty());
    }

    #[test]
    fn test_distant_person_does_not_suppress() {
        assert_eq!(
            run(vec![backpack(0.0, 6.0), person_at(700.0, 400.0, 6.0)], 6.0).len(),
            1
        );
    }

    #[test]
    fn test_absent_person_does_not_suppress() {
        let mut owner = person_at(520.0, 400.0, 5.0);
        owner.consecutive_detections = 0;
        assert_eq!(run(vec![backpack(0.0, 6.0), owner], 6.0).len(), 1);
    }

    #[test]
    fn test_too_recent() {
        assert!(run(vec![backpack(1.0, 6.0)], 6.0).is_empty());
    }
}

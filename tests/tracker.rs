//! 行为跟踪器端到端测试

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use sentinel_rs::alert::AlertSink;
use sentinel_rs::{
    Alert, AlertDetails, BehaviorConfig, BehaviorTracker, BehaviorType, Detection, DispatchError,
    SettingsUpdate,
};

struct RecordingSink {
    tx: Sender<(String, Alert)>,
    fail: bool,
}

impl AlertSink for RecordingSink {
    fn deliver(&self, endpoint: &str, alert: &Alert) -> Result<(), DispatchError> {
        let _ = self.tx.send((endpoint.to_string(), alert.clone()));
        if self.fail {
            Err(DispatchError::Transport("connection refused".into()))
        } else {
            Ok(())
        }
    }
}

fn tracker_with(
    webhook: Option<&str>,
    fail: bool,
) -> (BehaviorTracker, Receiver<(String, Alert)>) {
    let (tx, rx) = unbounded();
    let tracker = BehaviorTracker::with_sink(
        BehaviorConfig::default(),
        Box::new(RecordingSink { tx, fail }),
        webhook.map(str::to_string),
    )
    .unwrap();
    (tracker, rx)
}

fn tracker() -> BehaviorTracker {
    tracker_with(None, false).0
}

/// 以 (cx, cy) 为中心的检测框
fn det(label: &str, cx: f32, cy: f32) -> Detection {
    Detection::new(label, 0.8, [cx - 10.0, cy - 10.0, cx + 10.0, cy + 10.0])
}

#[test]
fn empty_frames_produce_nothing() {
    let tracker = tracker();
    for t in 0..20 {
        assert!(tracker.on_frame_at(&[], true, t as f64).is_empty());
    }
    assert_eq!(tracker.tracked_count(), 0);
}

#[test]
fn disabled_frames_do_not_track() {
    let tracker = tracker();
    assert!(tracker.on_frame_at(&[det("person", 50.0, 50.0)], false, 0.0).is_empty());
    assert_eq!(tracker.tracked_count(), 0);
}

#[test]
fn absent_object_evicted_strictly_after_stale_window() {
    let tracker = tracker();
    tracker.on_frame_at(&[det("person", 50.0, 50.0)], true, 100.0);

    tracker.on_frame_at(&[], true, 103.0);
    let snapshot = tracker.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].consecutive_detections, 0);

    tracker.on_frame_at(&[], true, 105.0);
    assert_eq!(tracker.tracked_count(), 1);

    tracker.on_frame_at(&[], true, 105.5);
    assert_eq!(tracker.tracked_count(), 0);
}

#[test]
fn malformed_detection_does_not_abort_frame() {
    let tracker = tracker();
    let bad = Detection::new("person", f32::NAN, [0.0, 0.0, 10.0, 10.0]);
    tracker.on_frame_at(&[bad, det("cup", 20.0, 20.0)], true, 0.0);
    let snapshot = tracker.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].label, "cup");
}

#[test]
fn unattended_backpack_triggers_after_five_seconds() {
    let tracker = tracker();
    for t in 0..=5 {
        assert!(tracker.on_frame_at(&[det("backpack", 500.0, 400.0)], true, t as f64).is_empty());
    }
    let alerts = tracker.on_frame_at(&[det("backpack", 500.0, 400.0)], true, 6.0);
    assert_eq!(alerts.len(), 1);
    match &alerts[0].details {
        AlertDetails::UnattendedObject(d) => {
            assert_eq!(d.object, "backpack");
            assert_eq!(d.duration, 6.0);
        }
        other => panic!("unexpected details {other:?}"),
    }
}

#[test]
fn nearby_person_suppresses_unattended_alert() {
    let tracker = tracker();
    for t in 0..5 {
        tracker.on_frame_at(&[det("backpack", 500.0, 400.0)], true, t as f64);
    }
    let frame = [det("backpack", 500.0, 400.0), det("person", 600.0, 400.0)];
    tracker.on_frame_at(&frame, true, 5.0);
    assert!(tracker.on_frame_at(&frame, true, 6.0).is_empty());
}

#[test]
fn cooldown_is_per_behavior_type() {
    let tracker = tracker();
    // 两个相距很远的遗留物品, 同时满足条件
    let frame = [det("backpack", 100.0, 100.0), det("suitcase", 900.0, 600.0)];
    let mut accepted = Vec::new();
    for t in 0..=35 {
        accepted.extend(tracker.on_frame_at(&frame, true, t as f64));
    }

    let stamps: Vec<f64> = accepted.iter().map(|a| a.timestamp).collect();
    assert_eq!(stamps, vec![6.0]);
    assert!(accepted.iter().all(|a| a.behavior == BehaviorType::UnattendedObject));

    let later = tracker.on_frame_at(&frame, true, 36.0);
    assert_eq!(later.len(), 1);
}

#[test]
fn stationary_person_loiters() {
    let tracker = tracker();
    for t in [0.0, 2.0, 4.0, 6.0, 8.0, 10.0] {
        assert!(tracker.on_frame_at(&[det("person", 300.0, 300.0)], true, t).is_empty());
    }
    let alerts = tracker.on_frame_at(&[det("person", 300.0, 300.0)], true, 11.0);
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].behavior, BehaviorType::Loitering);
}

#[test]
fn laptop_vanishing_next_to_person_is_theft() {
    let tracker = tracker();
    let person = det("person", 260.0, 200.0);
    for t in 0..=4 {
        tracker.on_frame_at(&[det("laptop", 200.0, 200.0), person.clone()], true, t as f64);
    }
    let alerts = tracker.on_frame_at(&[person], true, 4.5);
    assert_eq!(alerts.len(), 1);
    match &alerts[0].details {
        AlertDetails::Theft(d) => {
            assert_eq!(d.item, "laptop");
            assert_eq!(d.duration_visible, 4.0);
        }
        other => panic!("unexpected details {other:?}"),
    }
}

#[test]
fn replaying_identical_frame_appends_each_time() {
    let tracker = tracker();
    let frame = [det("person", 40.0, 40.0)];
    tracker.on_frame_at(&frame, true, 7.0);
    tracker.on_frame_at(&frame, true, 7.0);

    let snapshot = tracker.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].positions().len(), 2);
    assert_eq!(snapshot[0].consecutive_detections, 2);
}

#[test]
fn concurrent_frames_do_not_lose_updates() {
    let tracker = Arc::new(tracker());
    let threads = 8;
    let calls = 50;

    let handles: Vec<_> = (0..threads)
        .map(|i| {
            let tracker = Arc::clone(&tracker);
            thread::spawn(move || {
                let frame = [det("person", 100.0 + 50.0 * i as f32, 100.0)];
                for _ in 0..calls {
                    tracker.on_frame_at(&frame, true, 1.0);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let snapshot = tracker.snapshot();
    assert_eq!(snapshot.len(), threads);
    for obj in snapshot {
        assert_eq!(obj.positions().len(), calls);
    }
}

#[test]
fn concurrent_identical_detections_share_one_track() {
    let tracker = Arc::new(tracker());
    let threads = 8;
    let calls = 50;

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let tracker = Arc::clone(&tracker);
            thread::spawn(move || {
                let frame = [det("person", 320.0, 240.0)];
                for _ in 0..calls {
                    tracker.on_frame(&frame, true);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let snapshot = tracker.snapshot();
    assert_eq!(snapshot.len(), 1);
    let obj = &snapshot[0];
    assert_eq!(obj.identity, "person_320_240");
    assert_eq!(obj.positions().len(), threads * calls);
    assert_eq!(obj.consecutive_detections as usize, threads * calls);
    assert!(obj.last_seen >= obj.first_seen);
}

#[test]
fn accepted_alerts_are_delivered() {
    let (tracker, rx) = tracker_with(Some("http://hooks.local/alert"), false);
    for t in 0..=6 {
        tracker.on_frame_at(&[det("suitcase", 500.0, 400.0)], true, t as f64);
    }

    let (url, alert) = rx.recv_timeout(Duration::from_secs(2)).unwrap();
    assert_eq!(url, "http://hooks.local/alert");
    assert_eq!(alert.behavior, BehaviorType::UnattendedObject);
    tracker.shutdown();
}

#[test]
fn failed_delivery_still_counts_for_cooldown() {
    let (tracker, rx) = tracker_with(Some("http://unreachable.local"), true);
    let frame = [det("suitcase", 500.0, 400.0)];
    let mut accepted = 0;
    for t in 0..=20 {
        accepted += tracker.on_frame_at(&frame, true, t as f64).len();
    }
    assert_eq!(accepted, 1);
    assert_eq!(tracker.last_fired(BehaviorType::UnattendedObject), Some(6.0));

    assert!(rx.recv_timeout(Duration::from_secs(2)).is_ok());
    tracker.shutdown();
}

#[test]
fn webhook_can_be_replaced_without_restart() {
    let (tracker, rx) = tracker_with(None, false);
    tracker.update_settings(SettingsUpdate {
        webhook_url: Some("http://hooks.local/new".into()),
        suspicious_behavior_enabled: None,
    });
    for t in 0..=6 {
        tracker.on_frame_at(&[det("handbag", 500.0, 400.0)], true, t as f64);
    }
    let (url, _) = rx.recv_timeout(Duration::from_secs(2)).unwrap();
    assert_eq!(url, "http://hooks.local/new");
    tracker.shutdown();
}

//! 跟踪对象存储
//! Tracked-object store: association by identity key, staleness eviction

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, warn};

use crate::detection::Detection;

// ========== 公共数据结构 ==========

/// 跟踪点 (中心点)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackPoint {
    pub x: f32,
    pub y: f32,
}

impl TrackPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<(f32, f32)> for TrackPoint {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// 跟踪对象
#[derive(Clone, Debug)]
pub struct TrackedObject {
    /// 跟踪标识 (类别 + 取整中心坐标)
    pub identity: String,

    /// 类别名
    pub label: String,

    /// 首次/最近出现时间 (epoch 秒)
    pub first_seen: f64,
    pub last_seen: f64,

    /// 历史轨迹, 非空, 只追加
    positions: Vec<TrackPoint>,

    /// 最近一次检测置信度
    pub confidence: f32,

    /// 连续检测帧数, 缺席一帧即归零
    pub consecutive_detections: u32,
}

impl TrackedObject {
    pub fn new(
        identity: impl Into<String>,
        label: impl Into<String>,
        center: TrackPoint,
        confidence: f32,
        now: f64,
    ) -> Self {
        Self {
            identity: identity.into(),
            label: label.into(),
            first_seen: now,
            last_seen: now,
            positions: vec![center],
            confidence,
            consecutive_detections: 1,
        }
    }

    /// 由检测新建
    pub fn from_detection(det: &Detection, now: f64) -> Self {
        Self::new(
            det.identity(),
            det.label.clone(),
            det.center().into(),
            det.confidence,
            now,
        )
    }

    /// 再次被检测到
    ///
    /// 时间不回退: 乱序到达的帧不会让 `last_seen` 早于已记录的时间
    pub fn observe(&mut self, center: TrackPoint, confidence: f32, now: f64) {
        self.last_seen = self.last_seen.max(now);
        self.positions.push(center);
        self.confidence = confidence;
        self.consecutive_detections += 1;
    }

    pub fn positions(&self) -> &[TrackPoint] {
        &self.positions
    }

    /// 最近位置
    pub fn latest(&self) -> TrackPoint {
        // 构造时即有一个点, 之后只追加
        self.positions[self.positions.len() - 1]
    }

    /// 本帧是否在场
    pub fn is_present(&self) -> bool {
        self.consecutive_detections > 0
    }

    /// 自首次出现起的时长
    pub fn age(&self, now: f64) -> f64 {
        now - self.first_seen
    }

    /// 可见时长 (首次 → 最近)
    pub fn visible_duration(&self) -> f64 {
        self.last_seen - self.first_seen
    }
}

// ========== 存储 ==========

/// 跟踪对象存储 (唯一的修改入口: `update`)
#[derive(Clone, Debug)]
pub struct ObjectStore {
    objects: BTreeMap<String, TrackedObject>,

    /// 缺席超过该时长即淘汰 (秒)
    stale_window: f64,
}

impl ObjectStore {
    pub fn new(stale_window: f64) -> Self {
        Self {
            objects: BTreeMap::new(),
            stale_window,
        }
    }

    /// 用一帧检测更新存储
    ///
    /// 返回本帧被接受的检测数
    pub fn update(&mut self, detections: &[Detection], now: f64) -> usize {
        let mut present = HashSet::with_capacity(detections.len());
        let mut accepted = 0;

        // 1. 关联: 标识相同即同一目标
        for det in detections {
            if let Err(e) = det.validate() {
                warn!("⚠️ 丢弃非法检测 {:?}: {}", det.label, e);
                continue;
            }

            let identity = det.identity();
            match self.objects.get_mut(&identity) {
                Some(obj) => obj.observe(det.center().into(), det.confidence, now),
                None => {
                    debug!("🆕 新目标: {}", identity);
                    self.objects
                        .insert(identity.clone(), TrackedObject::from_detection(det, now));
                }
            }
            present.insert(identity);
            accepted += 1;
        }

        // 2. 缺席目标: 超过淘汰窗口删除, 否则连续计数归零
        let stale_window = self.stale_window;
        self.objects.retain(|identity, obj| {
            if present.contains(identity) {
                return true;
            }
            if now - obj.last_seen > stale_window {
                debug!("🗑️ 淘汰目标: {}", identity);
                false
            } else {
                obj.consecutive_detections = 0;
                true
            }
        });

        accepted
    }

    /// 直接放入一个跟踪对象 (按其标识覆盖)
    pub fn insert(&mut self, obj: TrackedObject) {
        self.objects.insert(obj.identity.clone(), obj);
    }

    pub fn get(&self, identity: &str) -> Option<&TrackedObject> {
        self.objects.get(identity)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedObject> {
        self.objects.values()
    }

    /// 指定类别的跟踪对象
    pub fn with_label<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a TrackedObject> {
        self.iter().filter(move |obj| obj.label == label)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn stale_window(&self) -> f64 {
        self.stale_window
    }
}

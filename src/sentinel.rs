//! 数字卫兵 (Digital Sentinel)
//! 帧更新入口: 检测 → 跟踪存储 → 行为分类 → 冷却闸门 → 异步推送
//!
//! 存储更新、分类与冷却判定在同一把锁内完成; 网络推送在锁外的独立线程

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::alert::{AlertSink, CooldownGate, Dispatcher, WebhookSink};
use crate::behavior::{classify_all, Alert, BehaviorType};
use crate::config::BehaviorConfig;
use crate::detection::Detection;
use crate::error::ConfigError;
use crate::tracking::{FrameBuffer, FrameRecord, ObjectStore, TrackedObject};
use crate::utils::epoch_seconds;

/// 当前运行设置
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Settings {
    pub webhook_url: Option<String>,
    pub suspicious_behavior_enabled: bool,
}

/// 设置更新 (字段缺省即不修改; webhook_url 为空字符串即清除)
///
/// 线格式: `{"webhook_url": "https://...", "suspicious_behavior_enabled": true}`
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct SettingsUpdate {
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default)]
    pub suspicious_behavior_enabled: Option<bool>,
}

/// 单帧处理结果 (与检测接口的响应体同形)
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FrameReport {
    pub detections: Vec<Detection>,
    pub count: usize,
    pub alerts: Vec<Alert>,
}

/// 帧锁保护的全部可变状态
struct TrackerState {
    store: ObjectStore,
    gate: CooldownGate,
    frames: FrameBuffer,
    history: VecDeque<Alert>, // 最近告警, 新的在前
}

/// 行为跟踪器 (进程内单例, 多请求共享)
pub struct BehaviorTracker {
    config: BehaviorConfig,
    state: Mutex<TrackerState>,
    dispatcher: Dispatcher,
    behavior_enabled: AtomicBool,
}

impl BehaviorTracker {
    /// 使用 webhook 推送创建
    pub fn new(config: BehaviorConfig, webhook_url: Option<String>) -> Result<Self, ConfigError> {
        // 先校验, 超时值非法时 from_secs_f64 会 panic
        config.validate()?;
        let sink = WebhookSink::new(Duration::from_secs_f64(config.dispatch_timeout));
        Ok(Self::build(config, Box::new(sink), webhook_url))
    }

    /// 使用自定义投递实现创建
    pub fn with_sink(
        config: BehaviorConfig,
        sink: Box<dyn AlertSink>,
        webhook_url: Option<String>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, sink, webhook_url))
    }

    /// 由已校验的配置创建
    fn build(config: BehaviorConfig, sink: Box<dyn AlertSink>, webhook_url: Option<String>) -> Self {
        let state = TrackerState {
            store: ObjectStore::new(config.stale_window),
            gate: CooldownGate::new(config.alert_cooldown),
            frames: FrameBuffer::new(config.frame_buffer_size),
            history: VecDeque::with_capacity(config.alert_history_size),
        };
        let dispatcher = Dispatcher::spawn(sink, webhook_url, config.dispatch_queue_size);

        Self {
            config,
            state: Mutex::new(state),
            dispatcher,
            behavior_enabled: AtomicBool::new(true),
        }
    }

    /// 处理一帧 (使用当前时间)
    ///
    /// 取锁后再读时钟, 并发调用方按加锁顺序得到递增的时间
    pub fn on_frame(&self, detections: &[Detection], behavior_enabled: bool) -> Vec<Alert> {
        self.apply_frame(detections, behavior_enabled, epoch_seconds)
    }

    /// 处理一帧 (指定时间)
    ///
    /// 未启用行为分析时不触碰跟踪状态, 直接返回空列表.
    /// 返回本帧放行的告警; 推送在后台进行, 不等待完成.
    pub fn on_frame_at(
        &self,
        detections: &[Detection],
        behavior_enabled: bool,
        now: f64,
    ) -> Vec<Alert> {
        self.apply_frame(detections, behavior_enabled, || now)
    }

    fn apply_frame(
        &self,
        detections: &[Detection],
        behavior_enabled: bool,
        clock: impl FnOnce() -> f64,
    ) -> Vec<Alert> {
        if !behavior_enabled {
            return Vec::new();
        }

        let accepted = {
            let mut guard = self.lock();
            let state = &mut *guard;
            let now = clock();

            state.frames.push(now, detections);
            let tracked = state.store.update(detections, now);
            let candidates = classify_all(&state.store, &self.config, now);
            debug!(
                "🎞️ 帧 {:.3}: {} 条检测, {} 个目标, {} 条候选告警",
                now,
                tracked,
                state.store.len(),
                candidates.len()
            );

            let accepted = state.gate.evaluate(candidates, now);
            for alert in &accepted {
                state.history.push_front(alert.clone());
            }
            state.history.truncate(self.config.alert_history_size);
            accepted
        };

        // 锁外推送
        for alert in &accepted {
            self.dispatcher.dispatch(alert.clone());
        }
        accepted
    }

    /// 处理一帧并生成响应体
    pub fn process(&self, detections: Vec<Detection>, behavior_enabled: bool) -> FrameReport {
        let alerts = self.on_frame(&detections, behavior_enabled);
        FrameReport {
            count: detections.len(),
            detections,
            alerts,
        }
    }

    /// 运行中更新设置, 无需重启
    pub fn update_settings(&self, update: SettingsUpdate) {
        if let Some(url) = update.webhook_url {
            self.dispatcher.set_endpoint(Some(url));
        }
        if let Some(enabled) = update.suspicious_behavior_enabled {
            info!("🛡️ 行为分析默认{}", if enabled { "启用" } else { "关闭" });
            self.behavior_enabled.store(enabled, Ordering::SeqCst);
        }
    }

    pub fn settings(&self) -> Settings {
        Settings {
            webhook_url: self.dispatcher.endpoint(),
            suspicious_behavior_enabled: self.behavior_enabled(),
        }
    }

    /// 默认是否启用行为分析 (由设置决定, 供调用方参考)
    pub fn behavior_enabled(&self) -> bool {
        self.behavior_enabled.load(Ordering::SeqCst)
    }

    /// 当前全部跟踪对象的拷贝
    pub fn snapshot(&self) -> Vec<TrackedObject> {
        self.lock().store.iter().cloned().collect()
    }

    pub fn tracked_count(&self) -> usize {
        self.lock().store.len()
    }

    /// 最近原始帧, 从旧到新
    pub fn recent_frames(&self) -> Vec<FrameRecord> {
        self.lock().frames.iter().cloned().collect()
    }

    /// 最近放行的告警, 新的在前
    pub fn recent_alerts(&self) -> Vec<Alert> {
        self.lock().history.iter().cloned().collect()
    }

    pub fn last_fired(&self, behavior: BehaviorType) -> Option<f64> {
        self.lock().gate.last_fired(behavior)
    }

    pub fn config(&self) -> &BehaviorConfig {
        &self.config
    }

    /// 停止推送线程, 等待队列中的告警处理完
    pub fn shutdown(self) {
        self.dispatcher.shutdown();
    }

    fn lock(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

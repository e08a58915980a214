/// 告警系统 (Alert System)
///
/// - CooldownGate: 同类告警冷却去重 (在帧锁内执行)
/// - Dispatcher:   独立推送线程, 不阻塞帧处理
pub mod dispatcher;
pub mod gate;

pub use dispatcher::{AlertSink, Dispatcher, WebhookSink};
pub use gate::CooldownGate;

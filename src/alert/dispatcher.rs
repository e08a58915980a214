//! 告警推送 (Alert Dispatcher)
//! 职责: 接收放行的告警 → 独立线程 → HTTP POST 到 webhook
//!
//! 推送失败只记录日志, 不重试, 不影响帧处理

use std::sync::{Arc, PoisonError, RwLock};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Sender, TrySendError};
use tracing::{debug, info, warn};

use crate::behavior::Alert;
use crate::error::DispatchError;

/// 告警投递接口 (网络边界)
pub trait AlertSink: Send + Sync {
    /// 投递一条告警到指定地址
    fn deliver(&self, endpoint: &str, alert: &Alert) -> Result<(), DispatchError>;
}

/// Webhook 投递 (JSON POST, 带超时)
pub struct WebhookSink {
    agent: ureq::Agent,
}

impl WebhookSink {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { agent }
    }
}

impl AlertSink for WebhookSink {
    fn deliver(&self, endpoint: &str, alert: &Alert) -> Result<(), DispatchError> {
        let body = serde_json::to_string(alert)?;
        self.agent
            .post(endpoint)
            .set("Content-Type", "application/json")
            .send_string(&body)?;
        Ok(())
    }
}

/// 推送线程句柄
pub struct Dispatcher {
    tx: Option<Sender<Alert>>,
    endpoint: Arc<RwLock<Option<String>>>,
    worker: Option<JoinHandle<()>>,
}

impl Dispatcher {
    /// 启动推送线程
    ///
    /// - `capacity`: 队列容量, 满时新告警被丢弃
    pub fn spawn(sink: Box<dyn AlertSink>, endpoint: Option<String>, capacity: usize) -> Self {
        let (tx, rx) = crossbeam_channel::bounded::<Alert>(capacity);
        let endpoint = Arc::new(RwLock::new(normalize(endpoint)));
        let shared = Arc::clone(&endpoint);

        let worker = std::thread::spawn(move || {
            info!("📮 告警推送线程启动");
            for alert in rx.iter() {
                // 投递时读取地址, 运行中修改立即生效
                let target = shared
                    .read()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clone();
                let Some(url) = target else {
                    debug!("📭 未配置 webhook, 跳过 {} 告警", alert.behavior);
                    continue;
                };
                match sink.deliver(&url, &alert) {
                    Ok(()) => debug!("✅ {} 告警已推送到 {}", alert.behavior, url),
                    Err(e) => warn!("❌ {} 告警推送失败 ({}): {}", alert.behavior, url, e),
                }
            }
            info!("📮 告警推送线程退出");
        });

        Self {
            tx: Some(tx),
            endpoint,
            worker: Some(worker),
        }
    }

    /// 提交告警 (不阻塞)
    ///
    /// 返回是否入队
    pub fn dispatch(&self, alert: Alert) -> bool {
        let Some(tx) = self.tx.as_ref() else {
            return false;
        };
        match tx.try_send(alert) {
            Ok(()) => true,
            Err(TrySendError::Full(alert)) => {
                warn!("⚠️ 推送队列已满, 丢弃 {} 告警", alert.behavior);
                false
            }
            Err(TrySendError::Disconnected(alert)) => {
                warn!("⚠️ 推送线程已退出, 丢弃 {} 告警", alert.behavior);
                false
            }
        }
    }

    /// 替换推送地址 (空字符串即清除)
    pub fn set_endpoint(&self, url: Option<String>) {
        let url = normalize(url);
        match &url {
            Some(u) => info!("🔗 webhook 地址更新: {}", u),
            None => info!("🔗 webhook 地址已清除"),
        }
        *self.endpoint.write().unwrap_or_else(PoisonError::into_inner) = url;
    }

    pub fn endpoint(&self) -> Option<String> {
        self.endpoint
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// 关闭队列并等待已入队的告警处理完
    pub fn shutdown(mut self) {
        self.close_and_join();
    }

    fn close_and_join(&mut self) {
        drop(self.tx.take());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("⚠️ 告警推送线程异常退出");
            }
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        // 只关闭队列, 不等待网络请求
        drop(self.tx.take());
    }
}

fn normalize(url: Option<String>) -> Option<String> {
    url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty())
}

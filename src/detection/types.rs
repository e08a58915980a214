//! 检测记录数据结构
//! Data structures for per-frame detections

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::DetectionError;

/// 检测记录 (上游检测器 → 行为分析)
///
/// 线格式: `{"label": "person", "confidence": 0.91, "bbox": [x1, y1, x2, y2]}`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    pub confidence: f32,
    pub bbox: [f32; 4], // [x1, y1, x2, y2] 像素坐标
}

impl Detection {
    pub fn new(label: impl Into<String>, confidence: f32, bbox: [f32; 4]) -> Self {
        Self {
            label: label.into(),
            confidence,
            bbox,
        }
    }

    /// 校验类别、置信度与边界框
    pub fn validate(&self) -> Result<(), DetectionError> {
        if self.label.trim().is_empty() {
            return Err(DetectionError::MissingLabel);
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(DetectionError::InvalidConfidence(self.confidence));
        }
        let [x1, y1, x2, y2] = self.bbox;
        let finite = self.bbox.iter().all(|v| v.is_finite());
        if !finite || x2 < x1 || y2 < y1 {
            return Err(DetectionError::InvalidBbox(
                self.bbox.iter().map(|&v| v as f64).collect(),
            ));
        }
        Ok(())
    }

    /// 边界框中心点
    pub fn center(&self) -> (f32, f32) {
        let [x1, y1, x2, y2] = self.bbox;
        ((x1 + x2) / 2.0, (y1 + y2) / 2.0)
    }

    /// 跟踪标识: 类别 + 取整后的中心坐标
    ///
    /// 目标单帧位移跨过整数像素即产生新标识
    pub fn identity(&self) -> String {
        let (cx, cy) = self.center();
        format!("{}_{}_{}", self.label, cx.floor() as i64, cy.floor() as i64)
    }
}

/// 解析一帧的检测列表 (JSON数组)
///
/// 非法记录单独丢弃并记录警告,不影响同帧其余检测
pub fn parse_detections(value: &Value) -> Vec<Detection> {
    let items = match value.as_array() {
        Some(items) => items,
        None => {
            warn!("⚠️ 检测列表不是数组, 整帧忽略: {}", value);
            return Vec::new();
        }
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(idx, item)| match parse_one(item) {
            Ok(det) => Some(det),
            Err(e) => {
                warn!("⚠️ 丢弃第 {} 条检测: {}", idx, e);
                None
            }
        })
        .collect()
}

fn parse_one(item: &Value) -> Result<Detection, DetectionError> {
    let det: Detection = serde_json::from_value(item.clone())
        .map_err(|e| DetectionError::Malformed(e.to_string()))?;
    det.validate()?;
    Ok(det)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identity_floors_center() {
        let det = Detection::new("person", 0.9, [10.0, 20.0, 31.0, 41.0]);
        assert_eq!(det.center(), (20.5, 30.5));
        assert_eq!(det.identity(), "person_20_30");
    }

    #[test]
    fn test_validate() {
        assert!(Detection::new("cup", 0.5, [0.0, 0.0, 1.0, 1.0]).validate().is_ok());
        assert_eq!(
            Detection::new("", 0.5, [0.0, 0.0, 1.0, 1.0]).validate(),
            Err(DetectionError::MissingLabel)
        );
        assert_eq!(
            Detection::new("cup", 1.5, [0.0, 0.0, 1.0, 1.0]).validate(),
            Err(DetectionError::InvalidConfidence(1.5))
        );
        assert!(Detection::new("cup", 0.5, [5.0, 0.0, 1.0, 1.0]).validate().is_err());
        assert!(Detection::new("cup", 0.5, [f32::NAN, 0.0, 1.0, 1.0]).validate().is_err());
    }

    #[test]
    fn test_parse_skips_malformed_records() {
        let frame = json!([
            {"label": "person", "confidence": 0.8, "bbox": [0, 0, 10, 10]},
            {"label": "person", "confidence": 0.8},
            {"confidence": 0.8, "bbox": [0, 0, 10, 10]},
            {"label": "dog", "confidence": 0.8, "bbox": [0, 0, 10]},
            {"label": "cup", "confidence": 2.0, "bbox": [0, 0, 10, 10]},
            {"label": "backpack", "confidence": 0.6, "bbox": [100, 100, 120, 140]}
        ]);
        let dets = parse_detections(&frame);
        assert_eq!(dets.len(), 2);
        assert_eq!(dets[0].label, "person");
        assert_eq!(dets[1].label, "backpack");
    }

    #[test]
    fn test_parse_non_array() {
        assert!(parse_detections(&json!({"label": "person"})).is_empty());
    }
}

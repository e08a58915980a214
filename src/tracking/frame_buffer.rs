//! 原始帧环形缓冲 (仅供事后查看, 行为分类不读取)

use std::collections::VecDeque;

use crate::detection::Detection;

/// 一帧的检测快照
#[derive(Clone, Debug, PartialEq)]
pub struct FrameRecord {
    pub timestamp: f64,
    pub detections: Vec<Detection>,
}

#[derive(Clone, Debug)]
pub struct FrameBuffer {
    frames: VecDeque<FrameRecord>,
    capacity: usize,
}

impl FrameBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            frames: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// 追加一帧, 超出容量时丢弃最旧的
    pub fn push(&mut self, timestamp: f64, detections: &[Detection]) {
        if self.capacity == 0 {
            return;
        }
        while self.frames.len() >= self.capacity {
            self.frames.pop_front();
        }
        self.frames.push_back(FrameRecord {
            timestamp,
            detections: detections.to_vec(),
        });
    }

    /// 从旧到新
    pub fn iter(&self) -> impl Iterator<Item = &FrameRecord> {
        self.frames.iter()
    }

    pub fn latest(&self) -> Option<&FrameRecord> {
        self.frames.back()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

//! 目标跟踪 (Object Tracking)
//! Identity continuity for detections across frames
//!
//! - geometry:     距离 / 运动幅度 / 活动范围
//! - store:        跟踪对象存储, 关联与淘汰
//! - frame_buffer: 最近原始帧环形缓冲
pub mod frame_buffer;
pub mod geometry;
pub mod store;

pub use frame_buffer::{FrameBuffer, FrameRecord};
pub use store::{ObjectStore, TrackPoint, TrackedObject};

/// 检测输入 (Detection Input)
///
/// 上游检测器每帧产出的 (类别, 置信度, 边界框) 记录
/// - Detection:        单条检测
/// - parse_detections: 逐条容错解析, 丢弃非法记录
pub mod types;

pub use types::{parse_detections, Detection};

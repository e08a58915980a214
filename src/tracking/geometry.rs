//! 几何工具: 距离 / 运动幅度 / 活动范围
//! Pure geometry over tracked-object history

use super::store::{TrackPoint, TrackedObject};

/// 运动幅度取最近的点数
const MOTION_WINDOW: usize = 5;

/// 两点欧氏距离
pub fn point_distance(a: TrackPoint, b: TrackPoint) -> f32 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

/// 两目标最近位置间的距离
pub fn distance(a: &TrackedObject, b: &TrackedObject) -> f32 {
    point_distance(a.latest(), b.latest())
}

pub fn is_nearby(a: &TrackedObject, b: &TrackedObject, threshold: f32) -> bool {
    distance(a, b) < threshold
}

/// 运动幅度: 最近至多4步位移的平均步长 (像素/帧)
pub fn motion(obj: &TrackedObject) -> f32 {
    let positions = obj.positions();
    if positions.len() < 2 {
        return 0.0;
    }

    let recent = &positions[positions.len().saturating_sub(MOTION_WINDOW)..];
    let steps = recent.len() - 1;
    let total: f32 = recent
        .windows(2)
        .map(|w| point_distance(w[0], w[1]))
        .sum();
    total / steps as f32
}

/// 活动范围: 全部轨迹包围盒的最大边长 (不是路径长度)
pub fn total_movement(obj: &TrackedObject) -> f32 {
    let positions = obj.positions();
    let (mut min_x, mut max_x) = (f32::INFINITY, f32::NEG_INFINITY);
    let (mut min_y, mut max_y) = (f32::INFINITY, f32::NEG_INFINITY);
    for p in positions {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }
    (max_x - min_x).max(max_y - min_y)
}

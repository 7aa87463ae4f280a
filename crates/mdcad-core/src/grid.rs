//! 网格吸附
//!
//! 拖动位移与尺寸修改都先吸附到固定网格，再写回实体。

use crate::math::{Point2, Vector2};

/// 网格间距（世界单位）
pub const GRID_SIZE: f64 = 5.0;

/// 尺寸下限，任何 resize 结果不得小于该值
pub const MIN_RESIZE: f64 = 10.0;

/// 将数值吸附到最近的网格倍数
pub fn snap(value: f64) -> f64 {
    (value / GRID_SIZE).round() * GRID_SIZE
}

/// 两点之间的网格吸附位移
///
/// 始终基于手势起点整体计算，避免逐帧累积误差。
pub fn snap_delta(from: Point2, to: Point2) -> Vector2 {
    Vector2::new(snap(to.x - from.x), snap(to.y - from.y))
}

/// 吸附并夹紧尺寸：先取网格倍数，再保证不低于最小尺寸
pub fn snap_dimension(value: f64) -> f64 {
    snap(value).max(MIN_RESIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap() {
        assert_eq!(snap(7.0), 5.0);
        assert_eq!(snap(13.0), 15.0);
        assert_eq!(snap(-3.0), -5.0);
        assert_eq!(snap(2.4), 0.0);
    }

    #[test]
    fn test_snap_delta() {
        // 规格属性：从 (110,110) 拖到 (117,123) → (5,15)
        let d = snap_delta(Point2::new(110.0, 110.0), Point2::new(117.0, 123.0));
        assert_eq!(d, Vector2::new(5.0, 15.0));
    }

    #[test]
    fn test_snap_dimension_clamp() {
        assert_eq!(snap_dimension(3.0), MIN_RESIZE);
        assert_eq!(snap_dimension(-20.0), MIN_RESIZE);
        assert_eq!(snap_dimension(23.0), 25.0);
    }
}

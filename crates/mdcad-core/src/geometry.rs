//! 几何内核
//!
//! 命中测试与旋转所需的纯函数：
//! - 点到线段距离（投影落在线段外时视为"不接近"）
//! - 点在多边形内（奇偶规则射线法）
//! - 绕中心 90° 旋转
//! - 点集包围盒
//!
//! 无状态，所有函数均为纯函数。

use crate::math::{BoundingBox2, Point2};

/// 线段命中默认容差（世界单位）
pub const SEGMENT_TOLERANCE: f64 = 6.0;

/// 射线法中用于避免水平边除零的微小偏移
const POLYGON_NUDGE: f64 = 1e-5;

/// 点到线段的垂直距离
///
/// 仅当 p 在线段 ab 上的投影参数 t ∈ [0,1] 时返回距离；
/// 投影落在线段延长线上时返回 `None` —— 超出线段范围的点
/// 永远不会命中该线段（刻意不回退到端点距离）。
/// 零长度线段退化为到端点的距离。
pub fn point_to_segment_distance(p: Point2, a: Point2, b: Point2) -> Option<f64> {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return Some((p - a).norm());
    }

    let t = ((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq;
    if !(0.0..=1.0).contains(&t) {
        return None;
    }

    let proj = Point2::new(a.x + t * dx, a.y + t * dy);
    Some((p - proj).norm())
}

/// 点是否在线段附近（默认容差见 [`SEGMENT_TOLERANCE`]）
pub fn point_near_segment(p: Point2, a: Point2, b: Point2, tolerance: f64) -> bool {
    matches!(point_to_segment_distance(p, a, b), Some(d) if d <= tolerance)
}

/// 点是否在多边形内（奇偶规则）
///
/// 水平边通过微小偏移避免除零；边界上的点属于实现定义行为。
pub fn point_in_polygon(p: Point2, points: &[Point2]) -> bool {
    let mut inside = false;
    let n = points.len();
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let (xi, yi) = (points[i].x, points[i].y);
        let (xj, yj) = (points[j].x, points[j].y);

        let crosses = (yi > p.y) != (yj > p.y)
            && p.x < (xj - xi) * (p.y - yi) / (yj - yi + POLYGON_NUDGE) + xi;
        if crosses {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// 绕中心逆时针旋转 90°：`(dx,dy) -> (-dy,dx)`
pub fn rotate_point_around_center(p: Point2, center: Point2) -> Point2 {
    let dx = p.x - center.x;
    let dy = p.y - center.y;
    Point2::new(center.x - dy, center.y + dx)
}

/// 点集包围盒
pub fn bounding_box(points: &[Point2]) -> BoundingBox2 {
    BoundingBox2::from_points(points.iter().copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::EPSILON;

    #[test]
    fn test_segment_distance_inside() {
        let d = point_to_segment_distance(
            Point2::new(5.0, 3.0),
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
        );
        assert!((d.unwrap() - 3.0).abs() < EPSILON);
    }

    #[test]
    fn test_segment_distance_beyond_extent() {
        // 投影在线段之外 → 不接近，而不是端点距离
        let d = point_to_segment_distance(
            Point2::new(15.0, 0.0),
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
        );
        assert!(d.is_none());
    }

    #[test]
    fn test_segment_degenerate() {
        let a = Point2::new(3.0, 4.0);
        let d = point_to_segment_distance(Point2::new(0.0, 0.0), a, a);
        assert!((d.unwrap() - 5.0).abs() < EPSILON);
    }

    #[test]
    fn test_point_in_polygon_square() {
        let square = [
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
        ];
        assert!(point_in_polygon(Point2::new(5.0, 5.0), &square));
        assert!(!point_in_polygon(Point2::new(15.0, 5.0), &square));
        assert!(!point_in_polygon(Point2::new(-1.0, 5.0), &square));
    }

    #[test]
    fn test_point_in_polygon_concave() {
        // L 形多边形，凹口处不应命中
        let shape = [
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 4.0),
            Point2::new(4.0, 4.0),
            Point2::new(4.0, 10.0),
            Point2::new(0.0, 10.0),
        ];
        assert!(point_in_polygon(Point2::new(2.0, 8.0), &shape));
        assert!(!point_in_polygon(Point2::new(8.0, 8.0), &shape));
    }

    #[test]
    fn test_rotate_90() {
        let c = Point2::new(10.0, 10.0);
        let p = rotate_point_around_center(Point2::new(15.0, 10.0), c);
        assert!((p.x - 10.0).abs() < EPSILON);
        assert!((p.y - 15.0).abs() < EPSILON);

        // 四次旋转回到原位
        let start = Point2::new(13.0, 7.0);
        let mut q = start;
        for _ in 0..4 {
            q = rotate_point_around_center(q, c);
        }
        assert!((q.x - start.x).abs() < EPSILON);
        assert!((q.y - start.y).abs() < EPSILON);
    }
}

//! 命中测试
//!
//! 把一个世界坐标点解析为（严格优先级）：
//! 1. resize 手柄 —— 绘制矩形右下角附近，自上而下取最先命中者
//! 2. 多边形顶点手柄 —— 任一顶点的固定半径盒内
//! 3. 实体本体 —— 最上层通过形状测试的可见实体
//!
//! 手柄优先于本体，保证手柄与本体重叠时仍可抓取手柄。
//! 未命中返回 `None`，永远不是错误。

use crate::entity::{Entity, EntityId, EntityStore, Shape};
use crate::geometry;
use crate::layer::{self, LayerSet};
use crate::math::Point2;

/// resize 手柄判定尺寸（世界单位）
pub const RESIZE_HANDLE_SIZE: f64 = 2.0;

/// 多边形顶点手柄半径（世界单位）
pub const VERTEX_RADIUS: f64 = 6.0;

/// 命中结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// 命中 resize 手柄
    ResizeHandle(EntityId),
    /// 命中多边形顶点（实体ID + 顶点索引）
    Vertex(EntityId, usize),
    /// 命中实体本体
    Body(EntityId),
}

/// 自上而下（最上层优先）排序的实体引用
///
/// 上下关系 = 图层 Z 顺序，同层内后插入者在上。
fn front_to_back(store: &EntityStore) -> Vec<&Entity> {
    let mut ordered: Vec<(usize, &Entity)> = store.iter().enumerate().collect();
    ordered.sort_by_key(|(idx, e)| std::cmp::Reverse((layer::z_order(&e.layer), *idx)));
    ordered.into_iter().map(|(_, e)| e).collect()
}

/// 解析世界坐标点的命中目标
///
/// 手柄/顶点扫描遍历全部实体；本体测试只针对可见图层。
pub fn hit_test(point: Point2, store: &EntityStore, visible: &LayerSet) -> Option<HitTarget> {
    let ordered = front_to_back(store);

    // 1. resize 手柄（绘制矩形右下角）
    for e in &ordered {
        if let Some(rect) = e.drawn_rect() {
            let br = rect.bottom_right();
            if point.x >= br.x - RESIZE_HANDLE_SIZE
                && point.x <= br.x
                && point.y >= br.y - RESIZE_HANDLE_SIZE
                && point.y <= br.y
            {
                return Some(HitTarget::ResizeHandle(e.id));
            }
        }
    }

    // 2. 多边形顶点手柄
    for e in &ordered {
        if let Shape::Polygon { points } = &e.shape {
            for (i, pt) in points.iter().enumerate() {
                if (point.x - pt.x).abs() <= VERTEX_RADIUS && (point.y - pt.y).abs() <= VERTEX_RADIUS
                {
                    return Some(HitTarget::Vertex(e.id, i));
                }
            }
        }
    }

    // 3. 实体本体（只测可见图层）
    for e in &ordered {
        if !visible.is_visible(&e.layer) {
            continue;
        }
        if body_hit(point, e) {
            return Some(HitTarget::Body(e.id));
        }
    }

    None
}

/// 形状级本体测试
fn body_hit(point: Point2, entity: &Entity) -> bool {
    match &entity.shape {
        Shape::Rect { .. } => entity
            .drawn_rect()
            .map(|r| r.contains(point))
            .unwrap_or(false),
        Shape::Line { start, end, .. } => {
            geometry::point_near_segment(point, *start, *end, geometry::SEGMENT_TOLERANCE)
        }
        Shape::Polygon { points } => {
            if points.len() >= 3 {
                geometry::point_in_polygon(point, points)
            } else if points.len() == 2 {
                // 两点多边形按线段处理
                geometry::point_near_segment(
                    point,
                    points[0],
                    points[1],
                    geometry::SEGMENT_TOLERANCE,
                )
            } else {
                false
            }
        }
    }
}

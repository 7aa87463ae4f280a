//! 组合元件分组与刚体旋转
//!
//! 合并：为当前选择分配一个新生成的组合ID（至少 2 个选中）。
//! 拆分：每个选中实体的组合ID改为自身ID（单元素组）。
//! 旋转：选中成员所在的完整组合组绕组包围盒中心刚体旋转 90°，
//! 连续四次旋转恢复原状。

use crate::entity::{CombinedId, EntityStore, Shape};
use crate::error::EditError;
use crate::geometry::rotate_point_around_center;
use crate::math::{BoundingBox2, Point2};
use crate::selection::Selection;
use std::collections::HashSet;

/// 合并选择为一个组合元件，返回新的组合ID
pub fn merge(store: &mut EntityStore, selection: &Selection) -> Result<CombinedId, EditError> {
    if selection.len() < 2 {
        return Err(EditError::MergeRequiresTwo);
    }
    let combined = CombinedId::new();
    for id in selection.ids() {
        if let Some(e) = store.get_mut(*id) {
            e.combined_id = Some(combined);
        }
    }
    tracing::info!(members = selection.len(), "merged selection into combined element");
    Ok(combined)
}

/// 拆分：选中实体改为各自的单元素组
pub fn split(store: &mut EntityStore, selection: &Selection) {
    for id in selection.ids() {
        if let Some(e) = store.get_mut(*id) {
            e.combined_id = Some(CombinedId::from_entity(*id));
        }
    }
}

/// 旋转选中成员所在的全部组合组，返回被旋转的成员数
///
/// 组范围是完整组合组而非选中子集；没有组合ID的选中实体不参与。
pub fn rotate_combined(store: &mut EntityStore, selection: &Selection) -> usize {
    // 收集涉及的组合ID
    let mut combined_ids: HashSet<CombinedId> = HashSet::new();
    for id in selection.ids() {
        if let Some(cid) = store.get(*id).and_then(|e| e.combined_id) {
            combined_ids.insert(cid);
        }
    }

    let mut rotated = 0;
    for cid in combined_ids {
        let members = store.combined_members(cid);
        if members.is_empty() {
            continue;
        }

        // 组包围盒中心（矩形用逻辑盒，线/多边形用几何包围盒）
        let mut bbox = BoundingBox2::empty();
        for id in &members {
            if let Some(e) = store.get(*id) {
                bbox.union(&logical_bounds(e));
            }
        }
        let center = bbox.center();

        for id in &members {
            if let Some(e) = store.get_mut(*id) {
                match &mut e.shape {
                    Shape::Rect {
                        origin,
                        width,
                        height,
                    } => {
                        let member_center =
                            Point2::new(origin.x + *width / 2.0, origin.y + *height / 2.0);
                        let new_center = rotate_point_around_center(member_center, center);

                        // 宽高不同才互换
                        if *width != *height {
                            std::mem::swap(width, height);
                        }
                        origin.x = new_center.x - *width / 2.0;
                        origin.y = new_center.y - *height / 2.0;
                    }
                    Shape::Line { start, end, .. } => {
                        *start = rotate_point_around_center(*start, center);
                        *end = rotate_point_around_center(*end, center);
                    }
                    Shape::Polygon { points } => {
                        for p in points.iter_mut() {
                            *p = rotate_point_around_center(*p, center);
                        }
                    }
                }
                e.orientation = e.orientation.rotated();
                rotated += 1;
            }
        }
    }
    if rotated > 0 {
        tracing::debug!(members = rotated, "rotated combined elements by 90 degrees");
    }
    rotated
}

/// 旋转用的成员包围盒：矩形取逻辑宽高（与绘制盒无关）
fn logical_bounds(e: &crate::entity::Entity) -> BoundingBox2 {
    match &e.shape {
        Shape::Rect {
            origin,
            width,
            height,
        } => BoundingBox2::new(
            *origin,
            Point2::new(origin.x + *width, origin.y + *height),
        ),
        _ => e.bounding_box(),
    }
}

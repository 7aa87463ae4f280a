//! 选择模型
//!
//! 选中实体ID的有序集合，始终是实体集合的子集。
//! 单个命中会扩展为完整的原子/宏块成员集（"移动组"）。

use crate::entity::{EntityId, EntityStore};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    ids: Vec<EntityId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> &[EntityId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.ids.contains(&id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// 整体替换选择
    pub fn replace(&mut self, ids: Vec<EntityId>) {
        self.ids = ids;
        self.dedup();
    }

    /// 收缩为单个实体
    pub fn select_one(&mut self, id: EntityId) {
        self.ids = vec![id];
    }

    /// 修饰键点击：组整体在选择中 → 移出；否则并入
    pub fn toggle_group(&mut self, group: &[EntityId]) {
        let fully_selected = group.iter().all(|id| self.contains(*id));
        if fully_selected {
            self.ids.retain(|id| !group.contains(id));
        } else {
            for id in group {
                if !self.contains(*id) {
                    self.ids.push(*id);
                }
            }
        }
    }

    /// 剔除已不存在的实体（删除/撤销后调用）
    pub fn prune(&mut self, store: &EntityStore) {
        self.ids.retain(|id| store.contains(*id));
    }

    fn dedup(&mut self) {
        let mut seen = Vec::with_capacity(self.ids.len());
        self.ids.retain(|id| {
            if seen.contains(id) {
                false
            } else {
                seen.push(*id);
                true
            }
        });
    }
}

/// 把单个命中实体扩展为移动组：
/// 组合元件成员优先，其次宏块成员，否则就是实体自身。
pub fn move_group(store: &EntityStore, hit: EntityId) -> Vec<EntityId> {
    let Some(entity) = store.get(hit) else {
        return Vec::new();
    };
    if let Some(cid) = entity.combined_id {
        return store.combined_members(cid);
    }
    if let Some(gid) = entity.group_id {
        return store.group_members(gid);
    }
    vec![hit]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{CombinedId, Entity, GroupId};
    use crate::math::Point2;

    fn rect() -> Entity {
        Entity::new_rect("M1", Point2::new(0.0, 0.0), 10.0, 10.0)
    }

    #[test]
    fn test_move_group_prefers_combined() {
        let mut store = EntityStore::new();
        let cid = CombinedId::new();
        let gid = GroupId::new();

        let mut a = rect().with_combined_id(cid);
        a.group_id = Some(gid);
        let b = rect().with_combined_id(cid);
        let mut c = rect();
        c.group_id = Some(gid);

        let (a_id, b_id) = (a.id, b.id);
        store.insert(a);
        store.insert(b);
        store.insert(c);

        let group = move_group(&store, a_id);
        assert_eq!(group.len(), 2);
        assert!(group.contains(&a_id) && group.contains(&b_id));
    }

    #[test]
    fn test_move_group_falls_back_to_macro_group() {
        let mut store = EntityStore::new();
        let gid = GroupId::new();
        let mut a = rect();
        a.group_id = Some(gid);
        let mut b = rect();
        b.group_id = Some(gid);
        let a_id = a.id;
        store.insert(a);
        store.insert(b);

        assert_eq!(move_group(&store, a_id).len(), 2);
    }

    #[test]
    fn test_move_group_single() {
        let mut store = EntityStore::new();
        let e = rect();
        let id = e.id;
        store.insert(e);
        assert_eq!(move_group(&store, id), vec![id]);
    }

    #[test]
    fn test_toggle_group() {
        let mut sel = Selection::new();
        let group: Vec<EntityId> = (0..3).map(|_| EntityId::new()).collect();

        // 未选中 → 并入
        sel.toggle_group(&group);
        assert_eq!(sel.len(), 3);

        // 整体已选中 → 移出
        sel.toggle_group(&group);
        assert!(sel.is_empty());

        // 部分选中 → 并入缺失成员
        sel.replace(vec![group[0]]);
        sel.toggle_group(&group);
        assert_eq!(sel.len(), 3);
    }

    #[test]
    fn test_prune() {
        let mut store = EntityStore::new();
        let keep = rect();
        let keep_id = keep.id;
        store.insert(keep);

        let mut sel = Selection::new();
        sel.replace(vec![keep_id, EntityId::new()]);
        sel.prune(&store);
        assert_eq!(sel.ids(), &[keep_id]);
    }
}

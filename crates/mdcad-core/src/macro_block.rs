//! 宏块库
//!
//! 把当前选择存为命名宏块，之后可以任意次实例化。
//! 实例化产生全新ID的拷贝：成员共享一个新的宏组ID，
//! 组合ID按"每个旧ID对应一个新ID"一次性重映射，整体偏移放置。

use crate::entity::{CombinedId, Entity, EntityStore, GroupId};
use crate::error::EditError;
use crate::math::Vector2;
use crate::selection::Selection;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 实例化时的放置偏移（世界单位）
pub const INSTANTIATE_OFFSET: f64 = 40.0;

/// 一个命名宏块：成员实体的原样快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroBlock {
    pub name: String,
    pub elements: Vec<Entity>,
}

/// 宏块库，按保存顺序排列，同名保存覆盖旧块
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroLibrary {
    blocks: Vec<MacroBlock>,
}

impl MacroLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocks(&self) -> &[MacroBlock] {
        &self.blocks
    }

    pub fn get(&self, name: &str) -> Option<&MacroBlock> {
        self.blocks.iter().find(|b| b.name == name)
    }

    /// 把当前选择保存为宏块
    ///
    /// 选择为空时报错；同名宏块被整体替换。
    pub fn save_selection(
        &mut self,
        name: impl Into<String>,
        store: &EntityStore,
        selection: &Selection,
    ) -> Result<(), EditError> {
        if selection.is_empty() {
            return Err(EditError::EmptySelection);
        }
        let name = name.into();
        let elements: Vec<Entity> = selection
            .ids()
            .iter()
            .filter_map(|id| store.get(*id).cloned())
            .collect();

        if let Some(existing) = self.blocks.iter_mut().find(|b| b.name == name) {
            tracing::info!(name = %name, "replacing existing macro block");
            existing.elements = elements;
        } else {
            tracing::info!(name = %name, members = elements.len(), "saved macro block");
            self.blocks.push(MacroBlock { name, elements });
        }
        Ok(())
    }

    /// 实例化宏块：全新ID、共享新宏组ID、偏移放置
    pub fn instantiate(&self, name: &str) -> Result<Vec<Entity>, EditError> {
        let block = self
            .get(name)
            .ok_or_else(|| EditError::MacroNotFound(name.to_string()))?;

        let group = GroupId::new();
        let offset = Vector2::new(INSTANTIATE_OFFSET, INSTANTIATE_OFFSET);
        let mut combined_map: HashMap<CombinedId, CombinedId> = HashMap::new();

        let instances = block
            .elements
            .iter()
            .map(|template| {
                let mut e = template.clone();
                e.id = crate::entity::EntityId::new();
                e.group_id = Some(group);
                if let Some(old) = e.combined_id {
                    e.combined_id =
                        Some(*combined_map.entry(old).or_insert_with(CombinedId::new));
                }
                e.translate(offset);
                e
            })
            .collect();
        Ok(instances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Shape;
    use crate::math::Point2;

    fn seeded_store() -> (EntityStore, Selection) {
        let mut store = EntityStore::new();
        let cid = CombinedId::new();
        let a = Entity::new_rect("M1", Point2::new(0.0, 0.0), 10.0, 10.0).with_combined_id(cid);
        let b = Entity::new_rect("M2", Point2::new(20.0, 0.0), 10.0, 10.0).with_combined_id(cid);
        let mut sel = Selection::new();
        sel.replace(vec![a.id, b.id]);
        store.insert(a);
        store.insert(b);
        (store, sel)
    }

    #[test]
    fn test_save_empty_selection_fails() {
        let store = EntityStore::new();
        let mut lib = MacroLibrary::new();
        assert_eq!(
            lib.save_selection("inv", &store, &Selection::new()),
            Err(EditError::EmptySelection)
        );
        assert!(lib.blocks().is_empty());
    }

    #[test]
    fn test_save_replaces_same_name() {
        let (store, sel) = seeded_store();
        let mut lib = MacroLibrary::new();
        lib.save_selection("inv", &store, &sel).unwrap();

        let mut one = Selection::new();
        one.select_one(store.entities()[0].id);
        lib.save_selection("inv", &store, &one).unwrap();

        assert_eq!(lib.blocks().len(), 1);
        assert_eq!(lib.get("inv").unwrap().elements.len(), 1);
    }

    #[test]
    fn test_instantiate_unknown_name() {
        let lib = MacroLibrary::new();
        assert_eq!(
            lib.instantiate("nand").unwrap_err(),
            EditError::MacroNotFound("nand".into())
        );
    }

    #[test]
    fn test_instantiate_fresh_ids_and_offset() {
        let (store, sel) = seeded_store();
        let mut lib = MacroLibrary::new();
        lib.save_selection("inv", &store, &sel).unwrap();

        let instances = lib.instantiate("inv").unwrap();
        assert_eq!(instances.len(), 2);

        let template = &lib.get("inv").unwrap().elements;
        for (inst, tpl) in instances.iter().zip(template.iter()) {
            assert_ne!(inst.id, tpl.id);
            assert_ne!(inst.combined_id, tpl.combined_id);
            let (Shape::Rect { origin: oi, .. }, Shape::Rect { origin: ot, .. }) =
                (&inst.shape, &tpl.shape)
            else {
                panic!("expected rects");
            };
            assert_eq!(oi.x, ot.x + INSTANTIATE_OFFSET);
            assert_eq!(oi.y, ot.y + INSTANTIATE_OFFSET);
        }

        // 实例成员共享一个新宏组ID，组合ID一次性重映射
        assert_eq!(instances[0].group_id, instances[1].group_id);
        assert!(instances[0].group_id.is_some());
        assert_eq!(instances[0].combined_id, instances[1].combined_id);

        // 再次实例化与第一次互不相干
        let second = lib.instantiate("inv").unwrap();
        assert_ne!(second[0].id, instances[0].id);
        assert_ne!(second[0].group_id, instances[0].group_id);
    }
}

//! MDCAD 核心编辑引擎
//!
//! 提供版图元件的数据模型、命中测试、选择/分组和交互编辑状态机。
//!
//! # 架构设计
//!
//! 状态集中在 `EditEngine`：
//! - `EntityStore`: 实体集合（矩形/线段/多边形的标签联合）
//! - `Selection`: 选中ID的有序子集
//! - `History`: 全量快照的撤销/重做栈
//! - 手势状态机: 按下开始、移动更新、抬起提交
//!
//! # 示例
//!
//! ```rust
//! use mdcad_core::prelude::*;
//!
//! // 创建一个金属层矩形并检查命中
//! let rect = Entity::new_rect("M1", Point2::new(100.0, 100.0), 40.0, 20.0);
//! let mut engine = EditEngine::from_entities(vec![rect]);
//!
//! engine.pointer_down(PointerEvent {
//!     position: Point2::new(110.0, 110.0),
//!     button: PointerButton::Left,
//!     modifiers: Modifiers::default(),
//! });
//! assert_eq!(engine.selection().len(), 1);
//! ```

pub mod engine;
pub mod entity;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod grouping;
pub mod history;
pub mod hit;
pub mod layer;
pub mod macro_block;
pub mod math;
pub mod selection;
pub mod transistor;
pub mod viewport;

pub mod prelude {
    //! 常用类型的便捷导入
    pub use crate::engine::{
        DragMode, EditEngine, EditKey, EditingGroup, Modifiers, PointerButton, PointerEvent,
    };
    pub use crate::entity::{
        CombinedId, Entity, EntityId, EntityStore, GroupId, Orientation, Shape,
    };
    pub use crate::error::EditError;
    pub use crate::history::{History, Snapshot, MAX_HISTORY};
    pub use crate::hit::{HitTarget, RESIZE_HANDLE_SIZE, VERTEX_RADIUS};
    pub use crate::layer::LayerSet;
    pub use crate::macro_block::{MacroBlock, MacroLibrary};
    pub use crate::math::{BoundingBox2, Point2, Vector2};
    pub use crate::selection::Selection;
    pub use crate::transistor::{Polarity, TransistorSpec};
    pub use crate::viewport::Viewport;
}

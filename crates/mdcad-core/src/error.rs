//! 核心编辑错误定义
//!
//! 前置条件失败会返回给用户提示，不产生任何状态变更。

use crate::entity::EntityId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    #[error("merge requires at least two selected entities")]
    MergeRequiresTwo,

    #[error("selection is empty")]
    EmptySelection,

    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),

    #[error("macro block '{0}' not found")]
    MacroNotFound(String),

    #[error("polygon capture requires at least two points, got {0}")]
    TooFewPolygonPoints(usize),
}

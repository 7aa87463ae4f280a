//! JSON 交换格式
//!
//! 设计束的导出/导入：导出为带缩进的 JSON 文本；
//! 导入解析失败时整体中止，调用方状态完全保留（无部分变更）。

use crate::document::DesignBundle;
use crate::error::FileError;

/// 导出设计束为 JSON 文本
pub fn export_bundle(bundle: &DesignBundle) -> Result<String, FileError> {
    Ok(serde_json::to_string_pretty(bundle)?)
}

/// 解析 JSON 文本为设计束
///
/// 任何解析错误都使整次导入失败，不产生部分结果。
pub fn import_bundle(text: &str) -> Result<DesignBundle, FileError> {
    let bundle: DesignBundle = serde_json::from_str(text)?;
    tracing::info!(
        entities = bundle.elements.len(),
        macros = bundle.macro_library.blocks().len(),
        "bundle imported from JSON"
    );
    Ok(bundle)
}

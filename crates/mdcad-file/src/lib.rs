//! MDCAD 文件格式处理
//!
//! 支持：
//! - `.mdcad` 原生格式（MessagePack + Zstd）
//! - JSON 设计束导出/导入
//! - 迷你 DSL 与网表风格文本导入

pub mod document;
pub mod dsl;
pub mod error;
pub mod json;
pub mod native;
pub mod netlist;

pub use document::{BundleMetadata, DesignBundle, FileSchemaStore, MemorySchemaStore, SchemaStore};
pub use dsl::parse_dsl;
pub use error::FileError;
pub use json::{export_bundle, import_bundle};
pub use netlist::parse_netlist;

//! 设计束（Bundle）与进程级存储
//!
//! 所有持久化表面共享同一个结构束：
//! 实体列表 + 宏块库 + 图层颜色覆盖。
//! 核心引擎不接触任何存储，外壳通过 `SchemaStore` 能力注入。

use crate::error::FileError;
use chrono::{DateTime, Utc};
use mdcad_core::entity::Entity;
use mdcad_core::macro_block::MacroLibrary;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// 进程级键值存储中的固定键
pub const SCHEMA_KEY: &str = "mdcad-schema";

/// 束元数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleMetadata {
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Default for BundleMetadata {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            title: String::new(),
            created_at: now,
            modified_at: now,
        }
    }
}

/// 设计束：持久化与交换的统一单元
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DesignBundle {
    #[serde(default)]
    pub metadata: BundleMetadata,
    pub elements: Vec<Entity>,
    #[serde(default)]
    pub macro_library: MacroLibrary,
    /// 图层颜色覆盖；缺省图层用内置表
    #[serde(default)]
    pub layer_colors: HashMap<String, String>,
}

impl DesignBundle {
    pub fn new(elements: Vec<Entity>) -> Self {
        Self {
            elements,
            ..Self::default()
        }
    }

    /// 更新修改时间戳
    pub fn touch(&mut self) {
        self.metadata.modified_at = Utc::now();
    }
}

/// 进程级键值存储能力
///
/// `load` 找不到键返回 `Ok(None)`，不是错误。
pub trait SchemaStore {
    fn load(&self) -> Result<Option<DesignBundle>, FileError>;
    fn save(&mut self, bundle: &DesignBundle) -> Result<(), FileError>;
}

/// 以目录为后端的存储：每个键对应一个 JSON 文件
#[derive(Debug)]
pub struct FileSchemaStore {
    root: PathBuf,
}

impl FileSchemaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn key_path(&self) -> PathBuf {
        self.root.join(format!("{SCHEMA_KEY}.json"))
    }
}

impl SchemaStore for FileSchemaStore {
    fn load(&self) -> Result<Option<DesignBundle>, FileError> {
        let path = self.key_path();
        if !path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&path)?;
        let bundle = crate::json::import_bundle(&text)?;
        tracing::info!(
            "Loaded {} entities from schema store at {}",
            bundle.elements.len(),
            path.display()
        );
        Ok(Some(bundle))
    }

    fn save(&mut self, bundle: &DesignBundle) -> Result<(), FileError> {
        std::fs::create_dir_all(&self.root)?;
        let text = crate::json::export_bundle(bundle)?;
        std::fs::write(self.key_path(), text)?;
        Ok(())
    }
}

/// 内存存储（测试用）
#[derive(Debug, Default)]
pub struct MemorySchemaStore {
    slot: Option<String>,
}

impl MemorySchemaStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SchemaStore for MemorySchemaStore {
    fn load(&self) -> Result<Option<DesignBundle>, FileError> {
        match &self.slot {
            Some(text) => Ok(Some(crate::json::import_bundle(text)?)),
            None => Ok(None),
        }
    }

    fn save(&mut self, bundle: &DesignBundle) -> Result<(), FileError> {
        self.slot = Some(crate::json::export_bundle(bundle)?);
        Ok(())
    }
}

//! 图层（工艺层）元数据
//!
//! 实体的 `layer` 标签决定渲染颜色、不透明度与 Z 顺序。
//! 表中未知的标签按默认值处理，不视为错误。

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 工艺层绘制顺序表（索引越大绘制越晚，即越靠上层）
///
/// CSI/POLY/N 不参与颜色表排序，与未知标签一样落在最底层。
pub const LAYER_ORDER: &[&str] = &[
    "CSI", "POLY", "N", "M1", "M2", "TM1", "TM2", "NA", "P", "CNE", "SI", "CPA", "CPE", "SN",
    "CNA", "KP", "KN", "SPK", "CM", "CW", "M3",
];

/// 默认图层颜色（十六进制）
pub fn default_color(layer: &str) -> &'static str {
    match layer {
        "M1" => "#b91c1c",
        "M2" => "#7e22ce",
        "TM1" => "#86efac",
        "TM2" => "#22c55e",
        "NA" => "#facc15",
        "P" => "#ea580c",
        "CNE" => "#db2777",
        "SI" => "#3b82f6",
        "CPA" => "#0d9488",
        "CPE" => "#115e59",
        "SN" => "#84cc16",
        "CNA" => "#0ea5e9",
        "KP" => "#4338ca",
        "KN" => "#06b6d4",
        "SPK" => "#fbbf24",
        "CM" => "#71717a",
        "CW" => "#6b7280",
        "M3" => "#1e3a8a",
        "CSI" => "#9ca3af",
        "POLY" => "#f472b6",
        "N" => "#16a34a",
        _ => "#000000",
    }
}

/// 图层不透明度
pub fn opacity(layer: &str) -> f64 {
    match layer {
        "M1" => 1.0,
        "M2" => 0.9,
        "TM1" | "TM2" => 0.85,
        "NA" | "P" => 0.8,
        "CNE" | "SI" => 0.75,
        "CPA" | "CPE" => 0.7,
        "SN" | "CNA" => 0.65,
        "KP" | "KN" => 0.6,
        "SPK" => 0.55,
        "CM" => 0.5,
        "CW" => 0.45,
        "M3" => 0.4,
        "CSI" => 0.3,
        "POLY" | "N" => 0.2,
        _ => 1.0,
    }
}

/// 图层 Z 顺序；表外标签排在最底层
pub fn z_order(layer: &str) -> usize {
    LAYER_ORDER
        .iter()
        .position(|l| *l == layer)
        .map(|i| i + 1)
        .unwrap_or(0)
}

/// 可见图层集合
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerSet {
    visible: HashSet<String>,
}

impl LayerSet {
    /// 全部图层可见
    pub fn all_visible() -> Self {
        Self {
            visible: LAYER_ORDER.iter().map(|l| l.to_string()).collect(),
        }
    }

    pub fn is_visible(&self, layer: &str) -> bool {
        self.visible.contains(layer)
    }

    /// 切换图层可见性
    pub fn toggle(&mut self, layer: &str) {
        if !self.visible.remove(layer) {
            self.visible.insert(layer.to_string());
        }
    }

    pub fn set_visible(&mut self, layer: &str, visible: bool) {
        if visible {
            self.visible.insert(layer.to_string());
        } else {
            self.visible.remove(layer);
        }
    }
}

impl Default for LayerSet {
    fn default() -> Self {
        Self::all_visible()
    }
}

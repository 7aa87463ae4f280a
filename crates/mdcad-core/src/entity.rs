//! 实体数据模型
//!
//! 实体是带共同标识的标签联合体：
//! - 矩形 (Rect) —— 轴对齐盒，NORTH/SOUTH 朝向时绘制宽高互换
//! - 线段 (Line) —— 两点，width 作为线宽
//! - 多边形 (Polygon) —— 有序点列，长度 ≥ 2
//!
//! 形状互斥由 `Shape` 枚举保证，不存在字段共存的含糊状态。
//! `combined_id` 是纯分组关系：共享同一值的实体一起移动、旋转、删除。

use crate::math::{BoundingBox2, Point2, Vector2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 实体ID，全局唯一且在实体生命周期内稳定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(Uuid);

impl EntityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 宏块分组ID（松散分组，仅影响选择扩展）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(Uuid);

impl GroupId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GroupId {
    fn default() -> Self {
        Self::new()
    }
}

/// 组合元件ID（原子多部件分组，成员一起移动/旋转/删除）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombinedId(Uuid);

impl CombinedId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// 自分组：组合ID等于实体自身ID（"单元素组"，用于拆分）
    pub fn from_entity(id: EntityId) -> Self {
        Self(id.0)
    }
}

impl Default for CombinedId {
    fn default() -> Self {
        Self::new()
    }
}

/// 朝向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Orientation {
    #[default]
    East,
    South,
    West,
    North,
}

impl Orientation {
    /// 循环推进：EAST→SOUTH→WEST→NORTH→EAST
    pub fn rotated(self) -> Self {
        match self {
            Orientation::East => Orientation::South,
            Orientation::South => Orientation::West,
            Orientation::West => Orientation::North,
            Orientation::North => Orientation::East,
        }
    }

    /// 主轴是否水平（EAST/WEST）
    pub fn is_horizontal(self) -> bool {
        matches!(self, Orientation::East | Orientation::West)
    }

    pub fn name(self) -> &'static str {
        match self {
            Orientation::East => "EAST",
            Orientation::South => "SOUTH",
            Orientation::West => "WEST",
            Orientation::North => "NORTH",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "EAST" => Some(Orientation::East),
            "SOUTH" => Some(Orientation::South),
            "WEST" => Some(Orientation::West),
            "NORTH" => Some(Orientation::North),
            _ => None,
        }
    }
}

/// 形状变体（互斥）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Rect {
        origin: Point2,
        width: f64,
        height: f64,
    },
    Line {
        start: Point2,
        end: Point2,
        /// 线宽
        thickness: f64,
    },
    Polygon {
        /// 有序顶点，长度 ≥ 2；索引即位置
        points: Vec<Point2>,
    },
}

/// 绘制矩形：NORTH/SOUTH 朝向下宽高互换后的实际盒子
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawnRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DrawnRect {
    pub fn contains(&self, p: Point2) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    /// 右下角（resize 手柄所在角）
    pub fn bottom_right(&self) -> Point2 {
        Point2::new(self.x + self.width, self.y + self.height)
    }
}

/// 实体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    /// 可选名称（如 TP_BODY、Line）
    pub name: Option<String>,
    /// 工艺层标签，决定颜色/不透明度/Z顺序
    pub layer: String,
    pub orientation: Orientation,
    /// 宏块成员关系
    pub group_id: Option<GroupId>,
    /// 组合元件成员关系
    pub combined_id: Option<CombinedId>,
    pub shape: Shape,
}

impl Entity {
    /// 创建矩形实体
    pub fn new_rect(layer: impl Into<String>, origin: Point2, width: f64, height: f64) -> Self {
        Self {
            id: EntityId::new(),
            name: None,
            layer: layer.into(),
            orientation: Orientation::East,
            group_id: None,
            combined_id: None,
            shape: Shape::Rect {
                origin,
                width,
                height,
            },
        }
    }

    /// 创建线段实体
    pub fn new_line(layer: impl Into<String>, start: Point2, end: Point2, thickness: f64) -> Self {
        Self {
            id: EntityId::new(),
            name: None,
            layer: layer.into(),
            orientation: Orientation::East,
            group_id: None,
            combined_id: None,
            shape: Shape::Line {
                start,
                end,
                thickness,
            },
        }
    }

    /// 创建多边形实体（调用方保证点数 ≥ 2）
    pub fn new_polygon(layer: impl Into<String>, points: Vec<Point2>) -> Self {
        Self {
            id: EntityId::new(),
            name: None,
            layer: layer.into(),
            orientation: Orientation::East,
            group_id: None,
            combined_id: None,
            shape: Shape::Polygon { points },
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_combined_id(mut self, id: CombinedId) -> Self {
        self.combined_id = Some(id);
        self
    }

    /// 矩形的绘制盒子（仅矩形变体有意义）
    pub fn drawn_rect(&self) -> Option<DrawnRect> {
        match &self.shape {
            Shape::Rect {
                origin,
                width,
                height,
            } => {
                let (w, h) = if self.orientation.is_horizontal() {
                    (*width, *height)
                } else {
                    (*height, *width)
                };
                Some(DrawnRect {
                    x: origin.x,
                    y: origin.y,
                    width: w,
                    height: h,
                })
            }
            _ => None,
        }
    }

    /// 实体包围盒（矩形取绘制盒子）
    pub fn bounding_box(&self) -> BoundingBox2 {
        match &self.shape {
            Shape::Rect { .. } => {
                let r = self.drawn_rect().expect("rect variant");
                BoundingBox2::new(
                    Point2::new(r.x, r.y),
                    Point2::new(r.x + r.width, r.y + r.height),
                )
            }
            Shape::Line { start, end, .. } => BoundingBox2::from_points([*start, *end]),
            Shape::Polygon { points } => BoundingBox2::from_points(points.iter().copied()),
        }
    }

    /// 整体平移
    pub fn translate(&mut self, delta: Vector2) {
        match &mut self.shape {
            Shape::Rect { origin, .. } => *origin += delta,
            Shape::Line { start, end, .. } => {
                *start += delta;
                *end += delta;
            }
            Shape::Polygon { points } => {
                for p in points.iter_mut() {
                    *p += delta;
                }
            }
        }
    }
}

/// 实体集合
///
/// 保持插入顺序的可变集合；索引查询（按ID、按分组）为线性扫描，
/// 实体数量小，优先保证契约清晰而不是索引结构。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityStore {
    entities: Vec<Entity>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entities(entities: Vec<Entity>) -> Self {
        let mut store = Self::new();
        store.extend(entities);
        store
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    /// 插入实体；ID 冲突时拒绝并告警（ID 全局唯一不变量）
    pub fn insert(&mut self, entity: Entity) {
        if self.contains(entity.id) {
            tracing::warn!("duplicate entity id {} rejected", entity.id);
            return;
        }
        self.entities.push(entity);
    }

    pub fn extend(&mut self, entities: impl IntoIterator<Item = Entity>) {
        for e in entities {
            self.insert(e);
        }
    }

    /// 删除一组实体，返回实际删除数量
    pub fn remove_ids(&mut self, ids: &[EntityId]) -> usize {
        let before = self.entities.len();
        self.entities.retain(|e| !ids.contains(&e.id));
        before - self.entities.len()
    }

    /// 共享组合元件ID的全部成员
    pub fn combined_members(&self, id: CombinedId) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|e| e.combined_id == Some(id))
            .map(|e| e.id)
            .collect()
    }

    /// 共享宏块ID的全部成员
    pub fn group_members(&self, id: GroupId) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|e| e.group_id == Some(id))
            .map(|e| e.id)
            .collect()
    }

    /// 全量快照（深拷贝，历史记录用）
    pub fn snapshot(&self) -> Vec<Entity> {
        self.entities.clone()
    }

    /// 用快照整体替换当前内容
    pub fn restore(&mut self, snapshot: Vec<Entity>) {
        self.entities = snapshot;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_cycle() {
        let mut o = Orientation::East;
        for _ in 0..4 {
            o = o.rotated();
        }
        assert_eq!(o, Orientation::East);
        assert_eq!(Orientation::East.rotated(), Orientation::South);
    }

    #[test]
    fn test_drawn_rect_swaps_for_north_south() {
        let e = Entity::new_rect("M1", Point2::new(100.0, 100.0), 40.0, 20.0)
            .with_orientation(Orientation::North);
        let r = e.drawn_rect().unwrap();
        assert_eq!((r.width, r.height), (20.0, 40.0));

        let e2 = Entity::new_rect("M1", Point2::new(0.0, 0.0), 40.0, 20.0);
        let r2 = e2.drawn_rect().unwrap();
        assert_eq!((r2.width, r2.height), (40.0, 20.0));
    }

    #[test]
    fn test_store_rejects_duplicate_id() {
        let mut store = EntityStore::new();
        let e = Entity::new_rect("M1", Point2::new(0.0, 0.0), 10.0, 10.0);
        let dup = e.clone();
        store.insert(e);
        store.insert(dup);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_combined_members() {
        let mut store = EntityStore::new();
        let cid = CombinedId::new();
        for _ in 0..3 {
            store.insert(
                Entity::new_rect("M1", Point2::new(0.0, 0.0), 10.0, 10.0).with_combined_id(cid),
            );
        }
        store.insert(Entity::new_rect("M2", Point2::new(0.0, 0.0), 10.0, 10.0));
        assert_eq!(store.combined_members(cid).len(), 3);
    }

    #[test]
    fn test_translate_polygon() {
        let mut e = Entity::new_polygon(
            "M1",
            vec![Point2::new(0.0, 0.0), Point2::new(10.0, 0.0), Point2::new(5.0, 5.0)],
        );
        e.translate(Vector2::new(5.0, -5.0));
        match &e.shape {
            Shape::Polygon { points } => {
                assert_eq!(points[0], Point2::new(5.0, -5.0));
                assert_eq!(points[2], Point2::new(10.0, 0.0));
            }
            _ => panic!("expected polygon"),
        }
    }
}

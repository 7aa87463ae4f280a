//! 交互编辑引擎
//!
//! 把指针/键盘事件流转换为实体集合的状态变迁：
//! 按下开始手势（平移/缩放框/拖动），移动时连续更新几何，
//! 抬起时把整个手势作为一条历史提交。拖动位移始终相对
//! 按下时的原始位置计算，网格吸附不会逐事件累积误差。
//!
//! 外壳（画布层）负责把原生事件翻译成 `PointerEvent`/`EditKey`，
//! 引擎不感知任何渲染细节。

use crate::entity::{CombinedId, Entity, EntityId, EntityStore, Shape};
use crate::error::EditError;
use crate::grid;
use crate::grouping;
use crate::history::{History, Snapshot};
use crate::hit::{self, HitTarget};
use crate::layer::LayerSet;
use crate::math::{Point2, Vector2};
use crate::selection::{self, Selection};
use crate::viewport::Viewport;
use std::collections::HashMap;

/// 粘贴偏移（世界单位）
pub const PASTE_OFFSET: f64 = 20.0;

/// 折线/多边形采集产物的默认图层与线宽
const CAPTURE_LAYER: &str = "M1";
const CAPTURE_LINE_THICKNESS: f64 = 2.0;

/// 新建元件的默认几何
const DEFAULT_ORIGIN: (f64, f64) = (100.0, 100.0);
const DEFAULT_SIZE: (f64, f64) = (40.0, 20.0);

/// 指针按键
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Middle,
}

/// 修饰键状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
}

impl Modifiers {
    /// 是否处于"累加选择"模式
    fn toggles_selection(self) -> bool {
        self.ctrl || self.meta
    }
}

/// 指针按下事件（设备坐标）
#[derive(Debug, Clone, Copy)]
pub struct PointerEvent {
    pub position: Point2,
    pub button: PointerButton,
    pub modifiers: Modifiers,
}

/// 编辑按键命令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKey {
    Copy,
    Paste,
    Delete,
    Rotate,
    Undo,
    Redo,
}

/// 拖动模式：线段可以只拖一个端点，多边形可以只拖一个顶点
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    /// 整体平移
    MoveAll,
    /// 线段起点
    MoveStart,
    /// 线段终点
    MoveEnd,
    /// 多边形单顶点
    MoveVertex(usize),
}

/// 正在编辑的组（状态栏显示用）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditingGroup {
    Combined(CombinedId),
    Single(EntityId),
}

/// 进行中的手势
#[derive(Debug)]
enum Gesture {
    /// 中键平移，记录上一次设备位置
    Panning { last_device: Point2 },
    /// 拖 resize 手柄
    Resizing { id: EntityId, before: Snapshot },
    /// 拖动选中实体
    Dragging {
        mode: DragMode,
        /// 按下时的世界坐标，位移始终相对它计算
        origin_world: Point2,
        /// 按下时各选中实体的形状
        start_shapes: HashMap<EntityId, Shape>,
        before: Snapshot,
    },
}

/// 折线/多边形点采集状态
#[derive(Debug, Clone)]
struct PolygonCapture {
    required: usize,
    points: Vec<Point2>,
}

/// 编辑引擎：实体集合 + 选择 + 历史 + 视口 + 进行中的手势
#[derive(Debug)]
pub struct EditEngine {
    store: EntityStore,
    selection: Selection,
    history: History,
    viewport: Viewport,
    visible_layers: LayerSet,
    gesture: Option<Gesture>,
    capture: Option<PolygonCapture>,
    clipboard: Option<Vec<Entity>>,
    editing_group: Option<EditingGroup>,
}

impl EditEngine {
    pub fn new() -> Self {
        Self::from_entities(Vec::new())
    }

    /// 以一组初始实体创建引擎，初始状态成为历史种子
    pub fn from_entities(entities: Vec<Entity>) -> Self {
        let store = EntityStore::from_entities(entities);
        let history = History::new(store.snapshot());
        Self {
            store,
            selection: Selection::new(),
            history,
            viewport: Viewport::default(),
            visible_layers: LayerSet::all_visible(),
            gesture: None,
            capture: None,
            clipboard: None,
            editing_group: None,
        }
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.viewport.scale = scale;
    }

    pub fn visible_layers(&self) -> &LayerSet {
        &self.visible_layers
    }

    pub fn toggle_layer(&mut self, layer: &str) {
        self.visible_layers.toggle(layer);
    }

    pub fn editing_group(&self) -> Option<EditingGroup> {
        self.editing_group
    }

    pub fn is_capturing(&self) -> bool {
        self.capture.is_some()
    }

    // ------------------------------------------------------------------
    // 指针事件
    // ------------------------------------------------------------------

    pub fn pointer_down(&mut self, event: PointerEvent) {
        if self.gesture.is_some() {
            return;
        }
        let world = self.viewport.to_world(event.position);

        // 采集模式吞掉所有非右键点击
        if self.capture.is_some() {
            self.capture_point(world);
            return;
        }

        match hit::hit_test(world, &self.store, &self.visible_layers) {
            // 手柄优先于一切，包括中键平移
            Some(HitTarget::ResizeHandle(id)) => {
                self.selection.select_one(id);
                self.editing_group = self.editing_group_of(id);
                self.gesture = Some(Gesture::Resizing {
                    id,
                    before: self.store.snapshot(),
                });
            }
            _ if event.button == PointerButton::Middle => {
                self.gesture = Some(Gesture::Panning {
                    last_device: event.position,
                });
            }
            Some(HitTarget::Vertex(id, index)) => {
                self.selection.select_one(id);
                self.editing_group = self.editing_group_of(id);
                self.begin_drag(DragMode::MoveVertex(index), world);
            }
            Some(HitTarget::Body(id)) => {
                let group = selection::move_group(&self.store, id);
                if event.modifiers.toggles_selection() {
                    self.selection.toggle_group(&group);
                } else {
                    self.selection.replace(group);
                }
                self.editing_group = self.editing_group_of(id);

                let mode = self.body_drag_mode(id, world);
                self.begin_drag(mode, world);
            }
            None => {
                self.selection.clear();
                self.editing_group = None;
            }
        }
    }

    pub fn pointer_move(&mut self, device: Point2) {
        match &mut self.gesture {
            None => {}
            Some(Gesture::Panning { last_device }) => {
                let delta = device - *last_device;
                *last_device = device;
                self.viewport.pan_by(delta);
            }
            Some(Gesture::Resizing { id, .. }) => {
                let id = *id;
                let world = self.viewport.to_world(device);
                self.apply_resize(id, world);
            }
            Some(Gesture::Dragging {
                mode,
                origin_world,
                start_shapes,
                ..
            }) => {
                let world = self.viewport.to_world(device);
                let delta = grid::snap_delta(*origin_world, world);
                let mode = *mode;
                // 先取出需要的数据，避免跨借用
                let updates: Vec<(EntityId, Shape)> = self
                    .selection
                    .ids()
                    .iter()
                    .filter_map(|id| {
                        start_shapes
                            .get(id)
                            .map(|shape| (*id, apply_drag(shape, mode, delta)))
                    })
                    .collect();
                for (id, shape) in updates {
                    if let Some(e) = self.store.get_mut(id) {
                        e.shape = shape;
                    }
                }
            }
        }
    }

    /// 结束手势；几何有变化则提交为一条历史
    pub fn pointer_up(&mut self) {
        let Some(gesture) = self.gesture.take() else {
            return;
        };
        let before = match gesture {
            Gesture::Panning { .. } => return,
            Gesture::Resizing { before, .. } => before,
            Gesture::Dragging { before, .. } => before,
        };
        let current = self.store.snapshot();
        if current != before {
            self.history.commit(&current, true);
            tracing::debug!(entities = current.len(), "gesture committed");
        }
    }

    // ------------------------------------------------------------------
    // 键盘命令
    // ------------------------------------------------------------------

    pub fn key_down(&mut self, key: EditKey) {
        match key {
            EditKey::Copy => self.copy_selection(),
            EditKey::Paste => self.paste_clipboard(),
            EditKey::Delete => self.delete_selection(),
            EditKey::Rotate => self.rotate_selection(),
            EditKey::Undo => self.undo(),
            EditKey::Redo => self.redo(),
        }
    }

    /// 复制选中实体到内部剪贴板
    pub fn copy_selection(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        let copied: Vec<Entity> = self
            .selection
            .ids()
            .iter()
            .filter_map(|id| self.store.get(*id).cloned())
            .collect();
        tracing::debug!(count = copied.len(), "selection copied");
        self.clipboard = Some(copied);
    }

    /// 粘贴剪贴板：全新ID、组合ID一次性重映射、整体偏移、选中粘贴结果
    pub fn paste_clipboard(&mut self) {
        let Some(copied) = self.clipboard.clone() else {
            return;
        };
        let offset = Vector2::new(PASTE_OFFSET, PASTE_OFFSET);
        let mut combined_map: HashMap<CombinedId, CombinedId> = HashMap::new();

        let mut pasted_ids = Vec::with_capacity(copied.len());
        for template in &copied {
            let mut e = template.clone();
            e.id = EntityId::new();
            if let Some(old) = e.combined_id {
                e.combined_id = Some(*combined_map.entry(old).or_insert_with(CombinedId::new));
            }
            e.translate(offset);
            pasted_ids.push(e.id);
            self.store.insert(e);
        }
        self.selection.replace(pasted_ids);
        self.history.commit(&self.store.snapshot(), true);
    }

    /// 删除选中实体
    pub fn delete_selection(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        let removed = self.store.remove_ids(&self.selection.ids().to_vec());
        tracing::info!(removed, "deleted selection");
        self.selection.clear();
        self.history.commit(&self.store.snapshot(), false);
    }

    /// 旋转选中成员所在的组合组 90°
    pub fn rotate_selection(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        if grouping::rotate_combined(&mut self.store, &self.selection) > 0 {
            self.history.commit(&self.store.snapshot(), false);
        }
    }

    pub fn undo(&mut self) {
        if let Some(snapshot) = self.history.undo() {
            self.store.restore(snapshot);
            self.selection.prune(&self.store);
        }
    }

    pub fn redo(&mut self) {
        if let Some(snapshot) = self.history.redo() {
            self.store.restore(snapshot);
            self.selection.prune(&self.store);
        }
    }

    // ------------------------------------------------------------------
    // 结构操作
    // ------------------------------------------------------------------

    /// 合并选择为组合元件
    pub fn merge_selected(&mut self) -> Result<CombinedId, EditError> {
        let combined = grouping::merge(&mut self.store, &self.selection)?;
        self.history.commit(&self.store.snapshot(), false);
        Ok(combined)
    }

    /// 拆分选中实体为单元素组
    pub fn split_selected(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        grouping::split(&mut self.store, &self.selection);
        self.history.commit(&self.store.snapshot(), false);
    }

    /// 在默认位置新建一个指定图层的矩形元件
    pub fn add_element(&mut self, layer: &str) -> EntityId {
        let (x, y) = DEFAULT_ORIGIN;
        let (w, h) = DEFAULT_SIZE;
        let e = Entity::new_rect(layer, Point2::new(x, y), w, h);
        let id = e.id;
        self.store.insert(e);
        self.history.commit(&self.store.snapshot(), false);
        id
    }

    /// 整体替换实体集合（导入用）
    pub fn replace_elements(&mut self, entities: Vec<Entity>) {
        self.store = EntityStore::from_entities(entities);
        self.selection.prune(&self.store);
        self.history.commit(&self.store.snapshot(), false);
    }

    /// 并入一批实体（宏块实例化、网表展开用）
    pub fn merge_elements(&mut self, entities: Vec<Entity>) {
        self.store.extend(entities);
        self.history.commit(&self.store.snapshot(), false);
    }

    // ------------------------------------------------------------------
    // 折线/多边形采集
    // ------------------------------------------------------------------

    /// 进入采集模式，左键点击累积点，攒够 `required` 个时落地
    pub fn begin_polygon_capture(&mut self, required: usize) -> Result<(), EditError> {
        if required < 2 {
            return Err(EditError::TooFewPolygonPoints(required));
        }
        self.capture = Some(PolygonCapture {
            required,
            points: Vec::with_capacity(required),
        });
        Ok(())
    }

    pub fn cancel_polygon_capture(&mut self) {
        self.capture = None;
    }

    /// 已采集的点（状态栏显示用）
    pub fn captured_points(&self) -> &[Point2] {
        self.capture.as_ref().map_or(&[], |c| c.points.as_slice())
    }

    fn capture_point(&mut self, world: Point2) {
        let Some(capture) = &mut self.capture else {
            return;
        };
        capture.points.push(world);
        if capture.points.len() < capture.required {
            return;
        }

        let points = self.capture.take().expect("capture active").points;
        // 两点退化为线段，否则成为多边形
        let entity = if points.len() == 2 {
            let line = Entity::new_line(
                CAPTURE_LAYER,
                points[0],
                points[1],
                CAPTURE_LINE_THICKNESS,
            )
            .with_name("Line");
            let cid = CombinedId::from_entity(line.id);
            line.with_combined_id(cid)
        } else {
            Entity::new_polygon(CAPTURE_LAYER, points).with_name("Polygon")
        };
        tracing::info!(kind = entity.name.as_deref().unwrap_or(""), "capture finished");
        self.store.insert(entity);
        self.history.commit(&self.store.snapshot(), true);
    }

    // ------------------------------------------------------------------
    // 内部
    // ------------------------------------------------------------------

    fn editing_group_of(&self, id: EntityId) -> Option<EditingGroup> {
        let e = self.store.get(id)?;
        Some(match e.combined_id {
            Some(cid) => EditingGroup::Combined(cid),
            None => EditingGroup::Single(id),
        })
    }

    fn begin_drag(&mut self, mode: DragMode, origin_world: Point2) {
        let start_shapes = self
            .selection
            .ids()
            .iter()
            .filter_map(|id| self.store.get(*id).map(|e| (*id, e.shape.clone())))
            .collect();
        self.gesture = Some(Gesture::Dragging {
            mode,
            origin_world,
            start_shapes,
            before: self.store.snapshot(),
        });
    }

    /// 线段本体按下时按就近原则决定拖端点还是整体
    fn body_drag_mode(&self, id: EntityId, world: Point2) -> DragMode {
        let Some(Shape::Line { start, end, .. }) = self.store.get(id).map(|e| &e.shape) else {
            return DragMode::MoveAll;
        };
        let d_start = (world - *start).norm();
        let d_end = (world - *end).norm();
        let mid = Point2::new((start.x + end.x) / 2.0, (start.y + end.y) / 2.0);
        let d_mid = (world - mid).norm();

        if d_start <= d_end && d_start <= d_mid {
            DragMode::MoveStart
        } else if d_end <= d_mid {
            DragMode::MoveEnd
        } else {
            DragMode::MoveAll
        }
    }

    /// resize：朝向决定锚定角，尺寸吸附后钳制到最小值
    fn apply_resize(&mut self, id: EntityId, world: Point2) {
        use crate::entity::Orientation;

        let Some(e) = self.store.get_mut(id) else {
            self.gesture = None;
            return;
        };
        let orientation = e.orientation;
        let Shape::Rect {
            origin,
            width,
            height,
        } = &mut e.shape
        else {
            return;
        };

        match orientation {
            // 锚定左上角
            Orientation::East | Orientation::South => {
                *width = grid::snap_dimension(world.x - origin.x);
                *height = grid::snap_dimension(world.y - origin.y);
            }
            // 锚定右边缘，高度仍锚定上边缘
            Orientation::West => {
                let right = origin.x + *width;
                let new_width = grid::snap_dimension(right - world.x);
                origin.x = right - new_width;
                *width = new_width;
                *height = grid::snap_dimension(world.y - origin.y);
            }
            // 锚定下边缘，宽度仍锚定左边缘
            Orientation::North => {
                let bottom = origin.y + *height;
                let new_height = grid::snap_dimension(bottom - world.y);
                origin.y = bottom - new_height;
                *height = new_height;
                *width = grid::snap_dimension(world.x - origin.x);
            }
        }
    }
}

impl Default for EditEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// 从按下时的形状与吸附位移计算新形状
///
/// 模式只对匹配的形状生效：线段响应端点模式，多边形响应顶点模式，
/// 其余一律整体平移。
fn apply_drag(start: &Shape, mode: DragMode, delta: Vector2) -> Shape {
    let mut shape = start.clone();
    match (&mut shape, mode) {
        (Shape::Line { start, .. }, DragMode::MoveStart) => {
            *start += delta;
        }
        (Shape::Line { end, .. }, DragMode::MoveEnd) => {
            *end += delta;
        }
        (Shape::Polygon { points }, DragMode::MoveVertex(index)) => {
            if let Some(p) = points.get_mut(index) {
                *p += delta;
            }
        }
        (Shape::Rect { origin, .. }, _) => *origin += delta,
        (Shape::Line { start, end, .. }, _) => {
            *start += delta;
            *end += delta;
        }
        (Shape::Polygon { points }, _) => {
            for p in points.iter_mut() {
                *p += delta;
            }
        }
    }
    shape
}

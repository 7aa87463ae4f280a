//! 视口坐标变换
//!
//! 设备（像素）坐标与世界坐标之间的映射：
//! `world = (device - offset) / scale`，`to_device` 为其逆。
//! 缩放与平移由编辑器外壳持有，几何代码只读。

use crate::math::{Point2, Vector2};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// 缩放系数（设备像素 / 世界单位）
    pub scale: f64,
    /// 平移偏移（设备像素）
    pub offset: Vector2,
}

impl Viewport {
    pub fn new(scale: f64) -> Self {
        Self {
            scale,
            offset: Vector2::new(0.0, 0.0),
        }
    }

    /// 设备坐标 → 世界坐标
    pub fn to_world(&self, device: Point2) -> Point2 {
        Point2::new(
            (device.x - self.offset.x) / self.scale,
            (device.y - self.offset.y) / self.scale,
        )
    }

    /// 世界坐标 → 设备坐标
    pub fn to_device(&self, world: Point2) -> Point2 {
        Point2::new(
            world.x * self.scale + self.offset.x,
            world.y * self.scale + self.offset.y,
        )
    }

    /// 按原始设备位移平移（不做网格吸附）
    pub fn pan_by(&mut self, device_delta: Vector2) {
        self.offset += device_delta;
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1.0)
    }
}

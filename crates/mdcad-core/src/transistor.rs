//! 晶体管展开
//!
//! 一个晶体管描述（位置、沟道尺寸、朝向、极性）展开为四个矩形实体：
//! 扩散区本体、居中垂直于主轴的 POLY 栅极、主轴两端的源/漏接触。
//! 四个部分共享一个新生成的组合ID，展开后表现为单个刚体。

use crate::entity::{CombinedId, Entity, GroupId, Orientation};
use crate::math::Point2;

/// 栅极与接触条在主轴方向上的固定宽度
pub const GATE_WIDTH: f64 = 2.0;

/// 晶体管极性
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// PMOS：本体在 P 扩散层，接触在 CPA
    P,
    /// NMOS：本体在 N 扩散层，接触在 CNA
    N,
}

impl Polarity {
    fn body_layer(self) -> &'static str {
        match self {
            Polarity::P => "P",
            Polarity::N => "N",
        }
    }

    fn contact_layer(self) -> &'static str {
        match self {
            Polarity::P => "CPA",
            Polarity::N => "CNA",
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            Polarity::P => "TP",
            Polarity::N => "TN",
        }
    }
}

/// 晶体管描述
#[derive(Debug, Clone, Copy)]
pub struct TransistorSpec {
    pub origin: Point2,
    pub width: f64,
    pub height: f64,
    pub orientation: Orientation,
    pub polarity: Polarity,
}

/// 展开为四个共享组合ID的矩形实体
///
/// 水平朝向时主轴为 X：栅极在宽度中点，接触贴左右边缘；
/// 垂直朝向时主轴为 Y，同理。
pub fn expand(spec: &TransistorSpec) -> Vec<Entity> {
    let combined = CombinedId::new();
    let group = GroupId::new();
    let prefix = spec.polarity.prefix();
    let TransistorSpec {
        origin,
        width,
        height,
        orientation,
        ..
    } = *spec;

    let part = |name: &str, layer: &str, origin: Point2, w: f64, h: f64| {
        let mut e = Entity::new_rect(layer, origin, w, h)
            .with_name(format!("{prefix}_{name}"))
            .with_orientation(orientation);
        e.combined_id = Some(combined);
        e.group_id = Some(group);
        e
    };

    let body = part("BODY", spec.polarity.body_layer(), origin, width, height);
    let (gate, src, dst) = if orientation.is_horizontal() {
        (
            part(
                "GATE",
                "POLY",
                Point2::new(origin.x + width / 2.0 - GATE_WIDTH / 2.0, origin.y),
                GATE_WIDTH,
                height,
            ),
            part(
                "SRC",
                spec.polarity.contact_layer(),
                origin,
                GATE_WIDTH,
                height,
            ),
            part(
                "DST",
                spec.polarity.contact_layer(),
                Point2::new(origin.x + width - GATE_WIDTH, origin.y),
                GATE_WIDTH,
                height,
            ),
        )
    } else {
        (
            part(
                "GATE",
                "POLY",
                Point2::new(origin.x, origin.y + height / 2.0 - GATE_WIDTH / 2.0),
                width,
                GATE_WIDTH,
            ),
            part(
                "SRC",
                spec.polarity.contact_layer(),
                origin,
                width,
                GATE_WIDTH,
            ),
            part(
                "DST",
                spec.polarity.contact_layer(),
                Point2::new(origin.x, origin.y + height - GATE_WIDTH),
                width,
                GATE_WIDTH,
            ),
        )
    };

    tracing::debug!(
        polarity = prefix,
        x = origin.x,
        y = origin.y,
        "expanded transistor into four parts"
    );
    vec![body, gate, src, dst]
}

//! 网表风格导入
//!
//! 有状态的行指令流：`W`/`L`/`OR` 设置运行中的宽/长/朝向，
//! 点原语 `<TAG>(x,y)` 按固定比例（×10）落成单个矩形，
//! `TP`/`TN` 展开为四部件晶体管宏，`CEPANE` 产生线段，
//! `W_WIRE` 开启折线链（后续 `X`/`Y` 行各产生一段轴对齐线段）。
//! 无法识别的行跳过，导入永不失败。

use mdcad_core::entity::{Entity, Orientation};
use mdcad_core::math::Point2;
use mdcad_core::transistor::{self, Polarity, TransistorSpec};

/// 网表坐标/尺寸到世界单位的缩放
pub const NETLIST_SCALE: f64 = 10.0;

/// CEPANE 线宽下限
const MIN_CEPANE_THICKNESS: f64 = 2.0;

/// 运行状态：指令流中最近一次 W/L/OR 设定的值
struct RunningState {
    width: f64,
    length: f64,
    orientation: Orientation,
}

impl Default for RunningState {
    fn default() -> Self {
        Self {
            width: 1.0,
            length: 1.0,
            orientation: Orientation::East,
        }
    }
}

/// 进行中的折线链
struct WireChain {
    layer: String,
    thickness: f64,
    last: Point2,
}

/// 解析网表文本为实体列表
pub fn parse_netlist(input: &str) -> Vec<Entity> {
    let mut state = RunningState::default();
    let mut wire: Option<WireChain> = None;
    let mut entities = Vec::new();

    for raw in input.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let Some((name, args, rest)) = parse_call(line) else {
            tracing::debug!(line, "skipped unrecognized netlist line");
            continue;
        };

        match name.as_str() {
            "W" => {
                // 非 X/Y 指令终止折线链
                wire = None;
                if let Some(v) = single_float(&args) {
                    state.width = v;
                }
            }
            "L" => {
                wire = None;
                if let Some(v) = single_float(&args) {
                    state.length = v;
                }
            }
            "OR" => {
                wire = None;
                match args.first().and_then(|a| Orientation::from_name(a)) {
                    Some(o) => state.orientation = o,
                    None => tracing::debug!(line, "skipped OR with unknown orientation"),
                }
            }
            "TP" | "TN" => {
                wire = None;
                let Some((x, y)) = two_floats(&args) else {
                    tracing::debug!(line, "skipped malformed transistor directive");
                    continue;
                };
                let polarity = if name == "TP" { Polarity::P } else { Polarity::N };
                entities.extend(transistor::expand(&TransistorSpec {
                    origin: Point2::new(x * NETLIST_SCALE, y * NETLIST_SCALE),
                    width: state.width * NETLIST_SCALE,
                    height: state.length * NETLIST_SCALE,
                    orientation: state.orientation,
                    polarity,
                }));
            }
            "CEPANE" => {
                wire = None;
                let Some([x1, y1, x2, y2]) = four_floats(&args) else {
                    tracing::debug!(line, "skipped malformed CEPANE directive");
                    continue;
                };
                let thickness = (state.width * NETLIST_SCALE).max(MIN_CEPANE_THICKNESS);
                entities.push(Entity::new_line(
                    "CPE",
                    Point2::new(x1 * NETLIST_SCALE, y1 * NETLIST_SCALE),
                    Point2::new(x2 * NETLIST_SCALE, y2 * NETLIST_SCALE),
                    thickness,
                ));
            }
            "W_WIRE" => {
                wire = None;
                // 同一行内跟随起点原语：W_WIRE(<width>) <TAG>(<x>,<y>)
                let Some(width) = single_float(&args) else {
                    tracing::debug!(line, "skipped W_WIRE without width");
                    continue;
                };
                let Some((tag, start_args, _)) = parse_call(rest.trim()) else {
                    tracing::debug!(line, "skipped W_WIRE without start point");
                    continue;
                };
                let Some((x, y)) = two_floats(&start_args) else {
                    tracing::debug!(line, "skipped W_WIRE with malformed start point");
                    continue;
                };
                wire = Some(WireChain {
                    layer: tag,
                    thickness: width * NETLIST_SCALE,
                    last: Point2::new(x * NETLIST_SCALE, y * NETLIST_SCALE),
                });
            }
            "X" | "Y" => {
                let Some(chain) = &mut wire else {
                    tracing::debug!(line, "skipped axis continuation outside wire chain");
                    continue;
                };
                let Some(v) = single_float(&args) else {
                    tracing::debug!(line, "skipped malformed axis continuation");
                    continue;
                };
                // X 延续保持 y 不变，Y 延续保持 x 不变
                let next = if name == "X" {
                    Point2::new(v * NETLIST_SCALE, chain.last.y)
                } else {
                    Point2::new(chain.last.x, v * NETLIST_SCALE)
                };
                entities.push(Entity::new_line(
                    chain.layer.as_str(),
                    chain.last,
                    next,
                    chain.thickness,
                ));
                chain.last = next;
            }
            tag => {
                wire = None;
                // 通用点原语：运行尺寸的单个矩形
                let Some((x, y)) = two_floats(&args) else {
                    tracing::debug!(line, "skipped unrecognized netlist line");
                    continue;
                };
                entities.push(
                    Entity::new_rect(
                        tag,
                        Point2::new(x * NETLIST_SCALE, y * NETLIST_SCALE),
                        state.width * NETLIST_SCALE,
                        state.length * NETLIST_SCALE,
                    )
                    .with_orientation(state.orientation),
                );
            }
        }
    }

    tracing::info!(count = entities.len(), "netlist import parsed");
    entities
}

/// 解析 `NAME(a, b, ...)` 形式的调用，返回名称、参数与剩余文本
fn parse_call(text: &str) -> Option<(String, Vec<String>, &str)> {
    let open = text.find('(')?;
    let name = &text[..open];
    if name.is_empty()
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return None;
    }
    let close_rel = text[open + 1..].find(')')?;
    let body = &text[open + 1..open + 1 + close_rel];
    let rest = &text[open + 1 + close_rel + 1..];

    let args = if body.trim().is_empty() {
        Vec::new()
    } else {
        body.split(',').map(|a| a.trim().to_string()).collect()
    };
    Some((name.to_string(), args, rest))
}

fn single_float(args: &[String]) -> Option<f64> {
    match args {
        [a] => a.parse().ok(),
        _ => None,
    }
}

fn two_floats(args: &[String]) -> Option<(f64, f64)> {
    match args {
        [a, b] => Some((a.parse().ok()?, b.parse().ok()?)),
        _ => None,
    }
}

fn four_floats(args: &[String]) -> Option<[f64; 4]> {
    match args {
        [a, b, c, d] => Some([
            a.parse().ok()?,
            b.parse().ok()?,
            c.parse().ok()?,
            d.parse().ok()?,
        ]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdcad_core::entity::Shape;

    fn rect_of(e: &Entity) -> (f64, f64, f64, f64) {
        let Shape::Rect {
            origin,
            width,
            height,
        } = e.shape
        else {
            panic!("expected rect");
        };
        (origin.x, origin.y, width, height)
    }

    #[test]
    fn test_stateful_point_primitive() {
        let entities = parse_netlist("W(4)\nL(2)\nM1(10,20)");
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].layer, "M1");
        assert_eq!(rect_of(&entities[0]), (100.0, 200.0, 40.0, 20.0));
    }

    #[test]
    fn test_orientation_directive() {
        let entities = parse_netlist("OR(NORTH)\nM2(0,0)");
        assert_eq!(entities[0].orientation, Orientation::North);
    }

    #[test]
    fn test_transistor_expansion() {
        let entities = parse_netlist("W(4)\nL(2)\nTP(10,20)");
        assert_eq!(entities.len(), 4);
        assert_eq!(entities[0].layer, "P");
        assert_eq!(rect_of(&entities[0]), (100.0, 200.0, 40.0, 20.0));
        assert_eq!(entities[1].layer, "POLY");

        let cid = entities[0].combined_id.expect("combined id set");
        assert!(entities.iter().all(|e| e.combined_id == Some(cid)));
    }

    #[test]
    fn test_cepane_line_with_minimum_thickness() {
        let entities = parse_netlist("W(0.1)\nCEPANE(0,0,10,0)");
        let Shape::Line {
            start,
            end,
            thickness,
        } = &entities[0].shape
        else {
            panic!("expected line");
        };
        assert_eq!(*start, Point2::new(0.0, 0.0));
        assert_eq!(*end, Point2::new(100.0, 0.0));
        // 0.1 * 10 = 1，夹紧到下限 2
        assert_eq!(*thickness, MIN_CEPANE_THICKNESS);
    }

    #[test]
    fn test_wire_chain() {
        let entities = parse_netlist("W_WIRE(2) M2(0,0)\nX(10)\nY(5)");
        assert_eq!(entities.len(), 2);

        let Shape::Line { start, end, thickness } = &entities[0].shape else {
            panic!("expected line");
        };
        assert_eq!((*start, *end), (Point2::new(0.0, 0.0), Point2::new(100.0, 0.0)));
        assert_eq!(*thickness, 20.0);
        assert_eq!(entities[0].layer, "M2");

        // Y 延续保持 x 不变
        let Shape::Line { start, end, .. } = &entities[1].shape else {
            panic!("expected line");
        };
        assert_eq!((*start, *end), (Point2::new(100.0, 0.0), Point2::new(100.0, 50.0)));
    }

    #[test]
    fn test_wire_chain_interrupted() {
        // 任何非 X/Y 指令终止折线链
        let entities = parse_netlist("W_WIRE(1) M1(0,0)\nW(3)\nX(10)");
        assert!(entities.is_empty());
    }

    #[test]
    fn test_garbage_lines_skipped() {
        let entities = parse_netlist("hello world\nM1(1,2)\n???\nM1(bad,args)");
        assert_eq!(entities.len(), 1);
    }
}

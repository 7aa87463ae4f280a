//! 迷你 DSL 导入
//!
//! 逐行解析 `TYPE(x=<int>, y=<int>, w=<int>, h=<int>)` 形式的文本，
//! 每个匹配行产生一个默认朝向的矩形实体。不匹配的行静默跳过，
//! 整次导入永不失败。

use mdcad_core::entity::Entity;
use mdcad_core::math::Point2;

/// 解析 DSL 文本为实体列表
pub fn parse_dsl(input: &str) -> Vec<Entity> {
    let mut entities = Vec::new();
    for raw in input.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        match parse_rect_line(line) {
            Some(e) => entities.push(e),
            None => tracing::debug!(line, "skipped non-matching DSL line"),
        }
    }
    tracing::info!(count = entities.len(), "DSL import parsed");
    entities
}

/// 单行解析：`TYPE(x=.., y=.., w=.., h=..)`，键序固定，值为非负整数
fn parse_rect_line(line: &str) -> Option<Entity> {
    let open = line.find('(')?;
    let layer = &line[..open];
    if layer.is_empty() || !layer.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }

    let body = line[open + 1..].strip_suffix(')')?;
    let parts: Vec<&str> = body.split(',').collect();
    if parts.len() != 4 {
        return None;
    }

    const KEYS: [&str; 4] = ["x", "y", "w", "h"];
    let mut values = [0.0f64; 4];
    for (i, part) in parts.iter().enumerate() {
        let (key, value) = part.trim().split_once('=')?;
        if key != KEYS[i] {
            return None;
        }
        values[i] = value.trim().parse::<u64>().ok()? as f64;
    }

    Some(Entity::new_rect(
        layer,
        Point2::new(values[0], values[1]),
        values[2],
        values[3],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdcad_core::entity::{Orientation, Shape};

    #[test]
    fn test_parse_single_line() {
        let entities = parse_dsl("M1(x=100, y=150, w=40, h=20)");
        assert_eq!(entities.len(), 1);

        let e = &entities[0];
        assert_eq!(e.layer, "M1");
        assert_eq!(e.orientation, Orientation::East);
        let Shape::Rect {
            origin,
            width,
            height,
        } = e.shape
        else {
            panic!("expected rect");
        };
        assert_eq!((origin.x, origin.y), (100.0, 150.0));
        assert_eq!((width, height), (40.0, 20.0));
    }

    #[test]
    fn test_non_matching_lines_skipped() {
        let input = "\
M1(x=0, y=0, w=10, h=10)
this is not a directive
M2(x=5, w=10, h=10)
M2(y=5, x=5, w=10, h=10)
P(x=20, y=20, w=30, h=15)
";
        let entities = parse_dsl(input);
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].layer, "M1");
        assert_eq!(entities[1].layer, "P");
    }

    #[test]
    fn test_negative_values_rejected() {
        assert!(parse_dsl("M1(x=-5, y=0, w=10, h=10)").is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_dsl("").is_empty());
        assert!(parse_dsl("\n  \n").is_empty());
    }
}

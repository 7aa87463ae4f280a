//! 历史管理
//!
//! 基于全量快照的撤销/重做：
//! - 以初始状态（可能为空）作为种子
//! - 每个提交的手势追加一条快照，结构无变化且未强制时不追加
//! - 只保留最近 100 条，超出从最旧处截断
//! - 任何新提交都会清空重做缓冲
//!
//! 不变量：快照栈的最后一条始终等于当前已提交状态。

use crate::entity::Entity;

/// 历史容量上限
pub const MAX_HISTORY: usize = 100;

/// 一次完整的实体集合快照
pub type Snapshot = Vec<Entity>;

#[derive(Debug, Clone, Default)]
pub struct History {
    /// 已提交状态序列，最后一条为当前状态
    entries: Vec<Snapshot>,
    /// 重做缓冲，队首为下一个可重做状态
    future: Vec<Snapshot>,
}

impl History {
    /// 以初始状态作为种子创建历史
    pub fn new(initial: Snapshot) -> Self {
        Self {
            entries: vec![initial],
            future: Vec::new(),
        }
    }

    /// 当前已提交状态
    pub fn current(&self) -> &Snapshot {
        self.entries.last().expect("history is never empty")
    }

    /// 已记录的快照条数（至少为 1）
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn can_undo(&self) -> bool {
        self.entries.len() >= 2
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// 提交新状态
    ///
    /// 与当前状态结构相等且未强制时不做任何事；
    /// 否则追加快照、截断到容量上限并清空重做缓冲。
    /// 返回是否实际提交。
    pub fn commit(&mut self, next: &[Entity], force: bool) -> bool {
        let unchanged = self.current().as_slice() == next;
        if unchanged && !force {
            tracing::debug!("commit skipped: no structural change");
            return false;
        }

        self.entries.push(next.to_vec());
        if self.entries.len() > MAX_HISTORY {
            let overflow = self.entries.len() - MAX_HISTORY;
            self.entries.drain(0..overflow);
        }
        self.future.clear();
        tracing::debug!(entries = self.entries.len(), "state committed to history");
        true
    }

    /// 撤销：当前状态进入重做缓冲队首，返回上一条快照
    ///
    /// 少于 2 条时为空操作。
    pub fn undo(&mut self) -> Option<Snapshot> {
        if self.entries.len() < 2 {
            tracing::warn!("undo ignored: history too short");
            return None;
        }
        let current = self.entries.pop().expect("checked above");
        self.future.insert(0, current);
        Some(self.current().clone())
    }

    /// 重做：取出重做缓冲队首并重新作为当前状态
    ///
    /// 缓冲为空时为空操作。
    pub fn redo(&mut self) -> Option<Snapshot> {
        if self.future.is_empty() {
            tracing::warn!("redo ignored: future is empty");
            return None;
        }
        let next = self.future.remove(0);
        self.entries.push(next.clone());
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::math::{Point2, Vector2};

    fn state(n: usize) -> Snapshot {
        let mut e = Entity::new_rect("M1", Point2::new(0.0, 0.0), 10.0, 10.0);
        e.translate(Vector2::new(n as f64, 0.0));
        vec![e]
    }

    #[test]
    fn test_commit_skips_unchanged() {
        let mut h = History::new(state(0));
        let same = h.current().clone();
        assert!(!h.commit(&same, false));
        assert_eq!(h.len(), 1);

        // 强制提交总是记录
        assert!(h.commit(&same, true));
        assert_eq!(h.len(), 2);
    }

    #[test]
    fn test_undo_redo_inverse_law() {
        let initial = state(0);
        let mut h = History::new(initial.clone());

        let n = 5;
        let mut states = vec![initial];
        for i in 1..=n {
            let s = state(i);
            // 每次提交都以前一个状态为基础派生
            assert!(h.commit(&s, false));
            states.push(s);
        }

        let final_state = h.current().clone();

        for i in (0..n).rev() {
            let s = h.undo().expect("undo available");
            assert_eq!(s, states[i]);
        }
        assert!(h.undo().is_none());

        for i in 1..=n {
            let s = h.redo().expect("redo available");
            assert_eq!(s, states[i]);
        }
        assert!(h.redo().is_none());
        assert_eq!(h.current(), &final_state);
    }

    #[test]
    fn test_history_bound() {
        let mut h = History::new(state(0));
        for i in 1..=101 {
            assert!(h.commit(&state(i), false));
        }
        // 101 次提交 + 种子 = 102，截断后恰好 100 条
        assert_eq!(h.len(), MAX_HISTORY);
        // 最旧的状态已被丢弃
        assert_eq!(h.current(), &state(101));
        assert_eq!(h.entries.first().unwrap(), &state(2));
    }

    #[test]
    fn test_commit_clears_future() {
        let mut h = History::new(state(0));
        h.commit(&state(1), false);
        h.commit(&state(2), false);
        h.undo();
        assert!(h.can_redo());

        h.commit(&state(9), false);
        assert!(!h.can_redo());
        assert!(h.redo().is_none());
    }
}

//! 会话状态
//!
//! 一个对话一个 Session：当前生效意图、跨轮累积的实体、用户最近的动作。
//! 只有 Turn Orchestrator 在每轮结束时整体提交一次，处理失败则保持原状。

mod continuity;
mod merge;

pub use continuity::resolve_intent;
pub use merge::{alias_for_intent, has_both_times, merge, reapply};

use std::collections::BTreeMap;

use crate::nlu::{Action, Intent};

/// 跨轮累积的结构化实体（字段名 → 值）；BTreeMap 保证遍历顺序确定
pub type EntityMap = BTreeMap<String, String>;

/// 实体值是否「有内容」：空白串视为 falsy，不参与覆盖
pub fn truthy(value: &str) -> bool {
    !value.trim().is_empty()
}

/// 单个对话的会话状态
#[derive(Debug, Clone)]
pub struct Session {
    /// 会话 ID（对话维度）
    pub id: String,
    /// 当前生效的意图，跨轮保持直到被显式切换
    pub effective_intent: Option<Intent>,
    /// 累积实体
    pub entities: EntityMap,
    /// 用户对当前待办操作的最近动作
    pub last_action: Option<Action>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: format!("session_{}", uuid::Uuid::new_v4()),
            effective_intent: None,
            entities: EntityMap::new(),
            last_action: None,
        }
    }

    /// 清空待办操作（cancel 或话题重置）；会话本身继续存在
    pub fn reset(&mut self) {
        self.effective_intent = None;
        self.entities.clear();
        self.last_action = None;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

//! Clerk - Rust 对话式 HR 助手
//!
//! 模块地图：
//! - `nlu`：意图 / 动作标签与分类器（关键词快速匹配 + LLM JSON 兜底）
//! - `session`：会话状态、实体合并引擎、意图连续性判定
//! - `resolver`：员工指代消解（id → email → name）
//! - `handlers`：员工 / 考勤 / 报表 / 政策各领域操作
//! - `orchestrator`：每轮固定次序的编排与会话整体提交
//! - `store`：SQLite 员工与考勤存储
//! - `timeutil`：时间 / 日期归一化与工时计算
//! - `policy`：政策知识的关键词检索
//! - `reply`：结构化轮次结果与展示文本
//! - `llm` / `config` / `observability`：外围设施

pub mod config;
pub mod error;
pub mod handlers;
pub mod llm;
pub mod nlu;
pub mod observability;
pub mod orchestrator;
pub mod policy;
pub mod reply;
pub mod resolver;
pub mod session;
pub mod store;
pub mod timeutil;

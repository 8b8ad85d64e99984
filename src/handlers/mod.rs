//! 各领域操作 handler
//!
//! 消费已消解的意图与实体，产出结构化 TurnReply 或向用户索要缺失信息。
//! 员工指代一律走 resolver，不各自为政。

pub mod attendance;
pub mod employee;
pub mod policy;
pub mod report;

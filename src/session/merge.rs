//! 实体合并引擎
//!
//! 把上一轮累积的实体与本轮分类器抽取的实体按规则合并：
//! falsy 不覆盖、时间字段先归一化、身份覆盖（新 name 使旧 employee_id 失效）。
//! 纯函数：相同输入必得相同输出，内部不做任何 I/O 或 LLM 调用。

use tracing::debug;

use crate::nlu::Intent;
use crate::session::{truthy, EntityMap};
use crate::timeutil::{normalize_time_24h, TimePolicy};

/// 需要过 24 小时制归一化的字段
const TIME_FIELDS: [&str; 3] = ["time", "start_time", "end_time"];

/// 合并上一轮实体与本轮新实体
///
/// 规则（顺序固定）：
/// 1. 身份覆盖：本轮出现 truthy 的 `name` 时，先删除旧的 `employee_id` / `id`，
///    防止两轮前解析出的身份悄悄作用到新提到的人身上；
/// 2. 覆盖合并：本轮每个 truthy 值覆盖同名旧值，falsy 值从不抹掉旧值；
/// 3. 时间归一化：time / start_time / end_time 先归一化，失败时保留原文；
/// 4. 意图别名：attendance_start 下有 `time` 而无 `start_time` 时合成
///    `start_time`（attendance_end 对称合成 `end_time`）。
pub fn merge(
    previous: &EntityMap,
    incoming: &EntityMap,
    incoming_intent: Intent,
    policy: &TimePolicy,
) -> EntityMap {
    let mut result = previous.clone();

    // 规则 1：严格在覆盖合并之前执行
    if incoming.get("name").map(|v| truthy(v)).unwrap_or(false) {
        if result.remove("employee_id").is_some() | result.remove("id").is_some() {
            debug!("stale employee id invalidated by fresh name entity");
        }
    }

    for (key, value) in incoming {
        if !truthy(value) {
            continue;
        }
        let value = if TIME_FIELDS.contains(&key.as_str()) {
            match normalize_time_24h(value, policy) {
                Ok(normalized) => normalized,
                Err(_) => value.clone(), // 保留原文，由用户澄清，不丢字段
            }
        } else {
            value.clone()
        };
        result.insert(key.clone(), value);
    }

    alias_for_intent(&mut result, incoming, incoming_intent);

    result
}

/// 规则 4 单独可调用：粘性轮里生效意图在合并之后才确定，
/// 编排器用生效意图再跑一次别名合成。
///
/// 只有本轮真的带了 `time` 才合成，留在会话里的旧 `time` 不会在
/// 后续轮悄悄变成另一个方向的打卡时间。
pub fn alias_for_intent(entities: &mut EntityMap, incoming: &EntityMap, intent: Intent) {
    if !incoming.get("time").map(|v| truthy(v)).unwrap_or(false) {
        return;
    }
    match intent {
        Intent::AttendanceStart => alias_time(entities, "start_time"),
        Intent::AttendanceEnd => alias_time(entities, "end_time"),
        _ => {}
    }
}

fn alias_time(entities: &mut EntityMap, target: &str) {
    if entities.get(target).map(|v| truthy(v)).unwrap_or(false) {
        return;
    }
    if let Some(time) = entities.get("time").filter(|v| truthy(v)).cloned() {
        entities.insert(target.to_string(), time);
    }
}

/// 上下班时间是否同时就位（连续性判定据此把意图升级为 attendance_range）
pub fn has_both_times(entities: &EntityMap) -> bool {
    ["start_time", "end_time"]
        .iter()
        .all(|k| entities.get(*k).map(|v| truthy(v)).unwrap_or(false))
}

/// 确认轮的实体保全：把上一轮实体重新盖回已合并结果之上（上一轮优先）
///
/// 保证一句 "yes" 不会丢掉确认提示出现之前收集到的字段。
pub fn reapply(previous: &EntityMap, merged: &mut EntityMap) {
    for (key, value) in previous {
        if truthy(value) {
            merged.insert(key.clone(), value.clone());
        }
    }
}

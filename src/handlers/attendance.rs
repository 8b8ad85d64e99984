//! 考勤操作状态机
//!
//! 每个 (员工, 日期) 走 NoRecord → Started → Completed；
//! 重复打卡只有在动作为 confirm 时才允许覆盖；未来日期对写操作一律拒绝，
//! 对汇总查询放行（只会得到空结果）。所有前置条件不满足时不改任何状态。

use tracing::info;

use crate::nlu::{missing_fields, Action, Intent};
use crate::reply::TurnReply;
use crate::resolver::{resolve_employee, EmployeeLookup};
use crate::session::{truthy, EntityMap};
use crate::store::{AttendanceStore, Employee, EmployeeStore, StoreError};
use crate::timeutil::{duration_hours, is_future_date, normalize_natural_date, today};

pub fn handle(
    intent: Intent,
    action: Action,
    employees: &EmployeeStore,
    attendance: &AttendanceStore,
    entities: &mut EntityMap,
) -> Result<TurnReply, StoreError> {
    // 日期：实体里有就归一化，没有则取今天
    let date = match entities.get("date").filter(|v| truthy(v)).cloned() {
        Some(raw) => match normalize_natural_date(&raw) {
            Some(iso) => {
                entities.insert("date".into(), iso.clone());
                iso
            }
            None => return Ok(TurnReply::ClarifyDate { raw }),
        },
        None => today(),
    };

    // 汇总是只读查询，未来日期放行
    if intent == Intent::AttendanceSummary {
        return Ok(TurnReply::Summary(attendance.summary_for_date(&date)?));
    }

    // 写操作的前置条件：非未来日期
    if is_future_date(&date) {
        return Ok(TurnReply::FutureDate { date });
    }

    let employee = match resolve_employee(employees, entities)? {
        EmployeeLookup::Resolved(e) => e,
        EmployeeLookup::Ambiguous(candidates) => {
            return Ok(TurnReply::AmbiguousEmployee { candidates })
        }
        EmployeeLookup::NotFound => return Ok(TurnReply::EmployeeNotFound),
        EmployeeLookup::Missing => return Ok(TurnReply::MissingEmployeeRef),
    };
    // 回写已消解的 id，后续轮不再重复消解；新 name 合并时会再次失效
    entities.insert("employee_id".into(), employee.id.to_string());

    match intent {
        Intent::AttendanceStart => start(action, attendance, entities, &employee, &date),
        Intent::AttendanceEnd => end(action, attendance, entities, &employee, &date),
        Intent::AttendanceRange => range(action, attendance, entities, &employee, &date),
        _ => Ok(TurnReply::Unknown),
    }
}

/// 取必填时间字段；合并阶段归一化失败会留原文，这里拦下要求澄清
fn required_time(
    entities: &EntityMap,
    intent: Intent,
    field: &str,
) -> Result<String, Box<TurnReply>> {
    let value = match entities.get(field).filter(|v| truthy(v)) {
        Some(v) => v.clone(),
        None => {
            return Err(Box::new(TurnReply::MissingFields {
                intent,
                fields: missing_fields(intent, entities),
            }))
        }
    };
    if !looks_like_hhmm(&value) {
        return Err(Box::new(TurnReply::ClarifyTime { raw: value }));
    }
    Ok(value)
}

fn looks_like_hhmm(value: &str) -> bool {
    let mut parts = value.splitn(2, ':');
    let hour_ok = parts
        .next()
        .and_then(|h| h.parse::<u32>().ok())
        .map(|h| h < 24)
        .unwrap_or(false);
    let minute_ok = parts
        .next()
        .and_then(|m| m.parse::<u32>().ok())
        .map(|m| m < 60)
        .unwrap_or(false);
    hour_ok && minute_ok
}

fn start(
    action: Action,
    attendance: &AttendanceStore,
    entities: &EntityMap,
    employee: &Employee,
    date: &str,
) -> Result<TurnReply, StoreError> {
    let time = match required_time(entities, Intent::AttendanceStart, "start_time") {
        Ok(t) => t,
        Err(reply) => return Ok(*reply),
    };

    let existing = attendance.get_on_date(employee.id, date)?;
    let has_start = existing.as_ref().and_then(|r| r.start_time.as_ref()).is_some();
    if has_start && action != Action::Confirm {
        return Ok(TurnReply::AlreadyStarted {
            name: employee.name.clone(),
            date: date.to_string(),
        });
    }

    attendance.start(employee.id, date, &time)?;
    info!(employee = employee.id, date, time = %time, updated = has_start, "attendance started");
    Ok(TurnReply::AttendanceStarted {
        name: employee.name.clone(),
        time,
        date: date.to_string(),
        updated: has_start,
    })
}

fn end(
    action: Action,
    attendance: &AttendanceStore,
    entities: &EntityMap,
    employee: &Employee,
    date: &str,
) -> Result<TurnReply, StoreError> {
    let time = match required_time(entities, Intent::AttendanceEnd, "end_time") {
        Ok(t) => t,
        Err(reply) => return Ok(*reply),
    };

    let existing = attendance.get_on_date(employee.id, date)?;
    let start_time = existing.as_ref().and_then(|r| r.start_time.clone());
    // 没开始就不能结束：与「已经结束」是两种不同的拒绝
    let Some(start_time) = start_time else {
        return Ok(TurnReply::NotStartedYet {
            name: employee.name.clone(),
            date: date.to_string(),
        });
    };
    let has_end = existing.as_ref().and_then(|r| r.end_time.as_ref()).is_some();
    if has_end && action != Action::Confirm {
        return Ok(TurnReply::AlreadyEnded {
            name: employee.name.clone(),
            date: date.to_string(),
        });
    }

    attendance.end(employee.id, date, &time)?;
    info!(employee = employee.id, date, time = %time, updated = has_end, "attendance ended");
    Ok(TurnReply::AttendanceEnded {
        name: employee.name.clone(),
        hours: duration_hours(&start_time, &time).ok(),
        time,
        date: date.to_string(),
        updated: has_end,
    })
}

fn range(
    action: Action,
    attendance: &AttendanceStore,
    entities: &EntityMap,
    employee: &Employee,
    date: &str,
) -> Result<TurnReply, StoreError> {
    let start_time = match required_time(entities, Intent::AttendanceRange, "start_time") {
        Ok(t) => t,
        Err(reply) => return Ok(*reply),
    };
    let end_time = match required_time(entities, Intent::AttendanceRange, "end_time") {
        Ok(t) => t,
        Err(reply) => return Ok(*reply),
    };

    // Started 状态下补全区间等价于下班打卡，放行；
    // 已 Completed 的记录要改必须 confirm
    let existing = attendance.get_on_date(employee.id, date)?;
    if existing
        .as_ref()
        .and_then(|r| r.end_time.as_ref())
        .is_some()
        && action != Action::Confirm
    {
        return Ok(TurnReply::AlreadyEnded {
            name: employee.name.clone(),
            date: date.to_string(),
        });
    }

    // 已记录的上班时间只有 confirm 才允许被区间里的新值替换
    let stored_start = existing.as_ref().and_then(|r| r.start_time.clone());
    let start_time = match stored_start {
        Some(stored) if action != Action::Confirm => stored,
        _ => {
            attendance.start(employee.id, date, &start_time)?;
            start_time
        }
    };
    attendance.end(employee.id, date, &end_time)?;
    let hours = duration_hours(&start_time, &end_time).unwrap_or(0.0);
    info!(employee = employee.id, date, hours, "attendance range recorded");
    Ok(TurnReply::RangeRecorded {
        name: employee.name.clone(),
        date: date.to_string(),
        start: start_time,
        end: end_time,
        hours,
    })
}

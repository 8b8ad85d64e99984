//! 结构化轮次结果与展示文本
//!
//! handler 产出结构化 TurnReply，`render` 是纯格式化函数（结构 → 展示文本），
//! 不做任何润色或生成，不属于会话核心逻辑。

use crate::nlu::Intent;
use crate::store::{DailySummary, Employee};

/// 一轮对话的结构化结果
#[derive(Debug, Clone)]
pub enum TurnReply {
    /// 分类器无法产出结构化结果
    CouldNotUnderstand,
    /// 意图无法判定（问候、闲聊等）
    Unknown,
    /// 用户取消了待办操作
    Cancelled,

    /// 还缺必填字段，需要用户补齐
    MissingFields {
        intent: Intent,
        fields: Vec<&'static str>,
    },
    /// 完全没有员工指代字段
    MissingEmployeeRef,
    /// 指代的员工不存在
    EmployeeNotFound,
    /// 重名歧义：带完整候选列表，要求用户改用 id
    AmbiguousEmployee { candidates: Vec<Employee> },

    EmployeeCreated { employee: Employee },
    DuplicateEmail { email: String },
    EmployeeList { employees: Vec<Employee> },

    AttendanceStarted {
        name: String,
        time: String,
        date: String,
        updated: bool,
    },
    AlreadyStarted { name: String, date: String },
    AttendanceEnded {
        name: String,
        time: String,
        date: String,
        hours: Option<f64>,
        updated: bool,
    },
    /// 还没打上班卡就想打下班卡
    NotStartedYet { name: String, date: String },
    AlreadyEnded { name: String, date: String },
    RangeRecorded {
        name: String,
        date: String,
        start: String,
        end: String,
        hours: f64,
    },
    /// 未来日期的打卡被拒绝
    FutureDate { date: String },
    /// 时间字段留着原文但无法归一化，需要澄清
    ClarifyTime { raw: String },
    /// 日期无法识别
    ClarifyDate { raw: String },

    Summary(DailySummary),
    NoAttendance { name: String, date: String },
    StillWorking {
        name: String,
        date: String,
        start: String,
    },
    DailyHours {
        name: String,
        date: String,
        hours: f64,
    },
    MonthlyReport {
        name: String,
        month: u32,
        year: i32,
        days: Vec<(String, Option<f64>)>,
        total: f64,
    },
    NoRecordsForMonth { name: String, month: u32, year: i32 },

    PolicyAnswer { chunks: Vec<String> },
    PolicyNotSpecified,
}

/// 结构化结果 → 展示文本（纯函数）
pub fn render(reply: &TurnReply) -> String {
    match reply {
        TurnReply::CouldNotUnderstand => {
            "Sorry, I could not understand that. Could you rephrase?".to_string()
        }
        TurnReply::Unknown => {
            "I can help with employee registration, attendance, reports and HR policies."
                .to_string()
        }
        TurnReply::Cancelled => "Okay, I've cancelled that.".to_string(),

        TurnReply::MissingFields { intent: _, fields } => {
            format!("Please provide: {}.", fields.join(", "))
        }
        TurnReply::MissingEmployeeRef => {
            "Please provide the employee name, email or ID.".to_string()
        }
        TurnReply::EmployeeNotFound => "No employee found with this reference.".to_string(),
        TurnReply::AmbiguousEmployee { candidates } => {
            let mut out =
                String::from("Multiple employees found with this name. Please specify the ID:\n");
            for e in candidates {
                out.push_str(&format!("- ID {}: {} ({})\n", e.id, e.name, e.role));
            }
            out
        }

        TurnReply::EmployeeCreated { employee } => format!(
            "Employee {} registered with ID {}.",
            employee.name, employee.id
        ),
        TurnReply::DuplicateEmail { email } => {
            format!("An employee with email {} already exists.", email)
        }
        TurnReply::EmployeeList { employees } => {
            if employees.is_empty() {
                return "No employees found.".to_string();
            }
            let mut out = String::from("Here are the employees:\n");
            for e in employees {
                out.push_str(&format!("- ID {}: {} ({}, {})\n", e.id, e.name, e.role, e.email));
            }
            out
        }

        TurnReply::AttendanceStarted {
            name,
            time,
            date,
            updated,
        } => {
            if *updated {
                format!("Start time updated to {} for {} on {}.", time, name, date)
            } else {
                format!("Work started for {} at {} on {}.", name, time, date)
            }
        }
        TurnReply::AlreadyStarted { name, date } => format!(
            "{} already has a start time for {}. Do you want to update it?",
            name, date
        ),
        TurnReply::AttendanceEnded {
            name,
            time,
            date,
            hours,
            updated,
        } => {
            let mut out = if *updated {
                format!("End time updated to {} for {} on {}.", time, name, date)
            } else {
                format!("Work ended for {} at {} on {}.", name, time, date)
            };
            if let Some(h) = hours {
                out.push_str(&format!(" Total: {} hours.", h));
            }
            out
        }
        TurnReply::NotStartedYet { name, date } => {
            format!("{} has not started work yet on {}.", name, date)
        }
        TurnReply::AlreadyEnded { name, date } => format!(
            "{} already has an end time for {}. Do you want to update it?",
            name, date
        ),
        TurnReply::RangeRecorded {
            name,
            date,
            start,
            end,
            hours,
        } => format!(
            "Recorded work for {} on {}: {} - {} ({} hours).",
            name, date, start, end, hours
        ),
        TurnReply::FutureDate { date } => format!(
            "You cannot assign attendance for a future date ({}).",
            date
        ),
        TurnReply::ClarifyTime { raw } => format!(
            "I couldn't read \"{}\" as a time. Please give it as HH:MM.",
            raw
        ),
        TurnReply::ClarifyDate { raw } => format!(
            "I couldn't read \"{}\" as a date. Please give it as YYYY-MM-DD.",
            raw
        ),

        TurnReply::Summary(summary) => format!(
            "On {}, {} of {} employees worked and {} did not start work.",
            summary.date, summary.present, summary.total, summary.absent
        ),
        TurnReply::NoAttendance { name, date } => {
            format!("No attendance found for {} on {}.", name, date)
        }
        TurnReply::StillWorking { name, date, start } => format!(
            "{} started work at {} on {}, but has not ended work yet.",
            name, start, date
        ),
        TurnReply::DailyHours { name, date, hours } => {
            format!("{} worked {} hours on {}.", name, hours, date)
        }
        TurnReply::MonthlyReport {
            name,
            month,
            year,
            days,
            total,
        } => {
            let mut out = format!("Monthly report for {} ({}/{}):\n", name, month, year);
            for (date, hours) in days {
                match hours {
                    Some(h) => out.push_str(&format!("{}: {} hours\n", date, h)),
                    None => out.push_str(&format!("{}: incomplete attendance\n", date)),
                }
            }
            out.push_str(&format!("\nTotal hours: {}", total));
            out
        }
        TurnReply::NoRecordsForMonth { name, month, year } => format!(
            "No attendance records found for {} in {}/{}.",
            name, month, year
        ),

        TurnReply::PolicyAnswer { chunks } => chunks.join("\n\n"),
        TurnReply::PolicyNotSpecified => {
            "This information is not specified in the current company policies.".to_string()
        }
    }
}

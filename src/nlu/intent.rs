//! 意图与动作标签
//!
//! 分类器输出的原始标签先经 from_label 归一化（同义词表），
//! 连续性判定、路由与必填字段计算都基于归一化后的枚举值。

use serde::{Deserialize, Serialize};

use crate::session::{truthy, EntityMap};

/// 归一化后的意图
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// 员工注册
    CreateEmployee,
    /// 查询员工（按 email / id / name / role，无条件时列出全部）
    FindEmployee,
    /// 开始上班打卡
    AttendanceStart,
    /// 下班打卡
    AttendanceEnd,
    /// 同一轮给出上下班时间（"work from 9 to 6"）
    AttendanceRange,
    /// 某日出勤汇总
    AttendanceSummary,
    /// 单日报表
    DailyReport,
    /// 月度报表
    MonthlyReport,
    /// 工时查询
    WorkingHours,
    /// HR 政策问答
    HrPolicy,
    /// 无法判定
    Unknown,
}

/// 用户对当前待办操作的态度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Start,
    Continue,
    Query,
    Confirm,
    Cancel,
}

/// 意图的话题归属（话题切换判定用）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Employee,
    Attendance,
    Report,
    Policy,
    None,
}

impl Intent {
    /// 原始标签归一化：同义词表，连续性比较不受标签漂移影响
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "create_employee" | "register_employee" | "add_employee" | "register" => {
                Self::CreateEmployee
            }
            "find_employee" | "show_employee" | "employee_detail" | "employee_find_all"
            | "employee_find_by_role" | "employee_find_by_name" | "employee_find_last" => {
                Self::FindEmployee
            }
            "attendance_start" | "start_attendance" | "check_in" | "start_work" => {
                Self::AttendanceStart
            }
            "attendance_end" | "end_attendance" | "check_out" | "end_work" => Self::AttendanceEnd,
            "attendance_range" | "attendance_start_end" | "work_range" => Self::AttendanceRange,
            "attendance_summary" | "daily_attendance" => Self::AttendanceSummary,
            "daily_report" | "attendance_daily_report" => Self::DailyReport,
            "monthly_report" | "attendance_monthly_report" => Self::MonthlyReport,
            "working_hours" | "attendance_working_hours" => Self::WorkingHours,
            "hr_policy" | "policy" | "knowledge" => Self::HrPolicy,
            _ => Self::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::CreateEmployee => "create_employee",
            Self::FindEmployee => "find_employee",
            Self::AttendanceStart => "attendance_start",
            Self::AttendanceEnd => "attendance_end",
            Self::AttendanceRange => "attendance_range",
            Self::AttendanceSummary => "attendance_summary",
            Self::DailyReport => "daily_report",
            Self::MonthlyReport => "monthly_report",
            Self::WorkingHours => "working_hours",
            Self::HrPolicy => "hr_policy",
            Self::Unknown => "unknown",
        }
    }

    /// 进行中的考勤意图（粘性话题：低信息后续轮不切换）
    pub fn is_attendance_in_progress(&self) -> bool {
        matches!(
            self,
            Self::AttendanceStart | Self::AttendanceEnd | Self::AttendanceRange | Self::AttendanceSummary
        )
    }

    /// 低信息意图：短后续轮（"11:00"、"yes"、"smith"）常被误判为这些
    pub fn is_low_information(&self) -> bool {
        matches!(self, Self::Unknown | Self::FindEmployee | Self::HrPolicy)
    }

    pub fn topic(&self) -> Topic {
        match self {
            Self::CreateEmployee | Self::FindEmployee => Topic::Employee,
            Self::AttendanceStart
            | Self::AttendanceEnd
            | Self::AttendanceRange
            | Self::AttendanceSummary => Topic::Attendance,
            Self::DailyReport | Self::MonthlyReport | Self::WorkingHours => Topic::Report,
            Self::HrPolicy => Topic::Policy,
            Self::Unknown => Topic::None,
        }
    }

    /// 意图的必填实体字段（员工指代由 resolver 单独处理）
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            Self::CreateEmployee => &["name", "email", "role"],
            Self::AttendanceStart => &["start_time"],
            Self::AttendanceEnd => &["end_time"],
            Self::AttendanceRange => &["start_time", "end_time"],
            Self::DailyReport | Self::WorkingHours => &["date"],
            // 年份缺省按当前年，不算必填
            Self::MonthlyReport => &["month"],
            _ => &[],
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Action {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "start" => Self::Start,
            "continue" => Self::Continue,
            "confirm" | "yes" | "update" | "ok" => Self::Confirm,
            "cancel" | "stop" | "abort" => Self::Cancel,
            _ => Self::Query,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Continue => "continue",
            Self::Query => "query",
            Self::Confirm => "confirm",
            Self::Cancel => "cancel",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// 每轮重新计算缺失字段：required_fields(intent) − truthy keys(entities)
///
/// 不缓存结果，上一轮补齐的字段在这一轮即视为已满足。
pub fn missing_fields(intent: Intent, entities: &EntityMap) -> Vec<&'static str> {
    intent
        .required_fields()
        .iter()
        .filter(|f| !entities.get(**f).map(|v| truthy(v)).unwrap_or(false))
        .copied()
        .collect()
}

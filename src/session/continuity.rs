//! 意图连续性判定
//!
//! 短后续轮（"11:00"、"yes"、"smith"）常被分类器误判为泛化意图，
//! 这里根据上一轮生效意图决定本轮是延续还是切换。三输入纯函数，不做任何 I/O。

use crate::nlu::{Action, Intent};

/// 计算本轮生效意图
///
/// - 粘性话题：上一轮是进行中的考勤意图，且本轮是低信息意图或动作为 confirm，
///   则维持上一轮意图不变；
/// - 区间升级：归一化后上下班时间同时就位时，把考勤类 / 未判定意图强制升级为
///   attendance_range，纠正分类器的误标；
/// - 其余情况：原样接受本轮意图（允许用户中途切换话题）。
pub fn resolve_intent(
    raw: Intent,
    action: Action,
    previous: Option<Intent>,
    has_both_times: bool,
) -> Intent {
    let mut effective = match previous {
        Some(prev)
            if prev.is_attendance_in_progress()
                && (raw.is_low_information() || action == Action::Confirm) =>
        {
            prev
        }
        _ => raw,
    };

    if has_both_times
        && matches!(
            effective,
            Intent::AttendanceStart | Intent::AttendanceEnd | Intent::Unknown
        )
    {
        effective = Intent::AttendanceRange;
    }

    effective
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sticky_on_low_information_intent() {
        let resolved = resolve_intent(
            Intent::Unknown,
            Action::Query,
            Some(Intent::AttendanceStart),
            false,
        );
        assert_eq!(resolved, Intent::AttendanceStart);

        let resolved = resolve_intent(
            Intent::FindEmployee,
            Action::Query,
            Some(Intent::AttendanceEnd),
            false,
        );
        assert_eq!(resolved, Intent::AttendanceEnd);

        let resolved = resolve_intent(
            Intent::HrPolicy,
            Action::Query,
            Some(Intent::AttendanceSummary),
            false,
        );
        assert_eq!(resolved, Intent::AttendanceSummary);
    }

    #[test]
    fn test_sticky_on_confirm() {
        let resolved = resolve_intent(
            Intent::AttendanceEnd,
            Action::Confirm,
            Some(Intent::AttendanceStart),
            false,
        );
        assert_eq!(resolved, Intent::AttendanceStart);
    }

    #[test]
    fn test_explicit_topic_change_honored() {
        let resolved = resolve_intent(
            Intent::CreateEmployee,
            Action::Start,
            Some(Intent::AttendanceStart),
            false,
        );
        assert_eq!(resolved, Intent::CreateEmployee);
    }

    #[test]
    fn test_no_previous_intent() {
        let resolved = resolve_intent(Intent::Unknown, Action::Query, None, false);
        assert_eq!(resolved, Intent::Unknown);
    }

    #[test]
    fn test_range_upgrade() {
        // 分类器误标为 start，但两个时间都在 → 升级为 range
        let resolved = resolve_intent(Intent::AttendanceStart, Action::Start, None, true);
        assert_eq!(resolved, Intent::AttendanceRange);

        // 非考勤意图不受影响
        let resolved = resolve_intent(Intent::MonthlyReport, Action::Query, None, true);
        assert_eq!(resolved, Intent::MonthlyReport);
    }
}

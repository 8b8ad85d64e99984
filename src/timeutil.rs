//! 时间与日期解析
//!
//! 所有对用户输入的时间 / 日期解释都集中在这里：24 小时制归一化、
//! 自然语言日期、月份区间与工时计算。裸小时数（"7"）按可配置的
//! 启发式规则解释，归一化失败一律报错而不猜。

use std::sync::OnceLock;

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveTime};
use regex::Regex;
use thiserror::Error;

/// 时间文本无法解释
#[derive(Error, Debug, Clone)]
#[error("Could not parse \"{0}\" as a time")]
pub struct TimeParseError(pub String);

/// 裸小时数的解释策略
///
/// 用户说 "7" 通常指晚上七点（下班），说 "9" 通常指早上九点（上班）。
/// 小于 cutoff 的裸小时按晚间（+12）解释，其余按原样。
#[derive(Debug, Clone)]
pub struct TimePolicy {
    pub bare_hour_evening_cutoff: u32,
}

impl Default for TimePolicy {
    fn default() -> Self {
        Self {
            bare_hour_evening_cutoff: 8,
        }
    }
}

fn time_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d{1,2})(?::(\d{2}))?(?::\d{2})?\s*(am|pm|a\.m\.|p\.m\.)?$").unwrap()
    })
}

/// 今天（本地时区）的 ISO 日期
pub fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// 当前年份（报表缺省年份用）
pub fn current_year() -> i32 {
    Local::now().year()
}

/// 任意时间文本 → "HH:MM"（24 小时制）
///
/// 接受 "19:30"、"7 am"、"7:30 pm"、"09:00:00"、裸小时 "7"。
/// 裸小时无上下午标记时按 [`TimePolicy`] 的启发式解释。
pub fn normalize_time_24h(text: &str, policy: &TimePolicy) -> Result<String, TimeParseError> {
    let lower = text.trim().to_lowercase();
    let caps = time_regex()
        .captures(&lower)
        .ok_or_else(|| TimeParseError(text.to_string()))?;

    let mut hour: u32 = caps[1]
        .parse()
        .map_err(|_| TimeParseError(text.to_string()))?;
    let minute: u32 = caps
        .get(2)
        .map(|m| m.as_str().parse())
        .transpose()
        .map_err(|_| TimeParseError(text.to_string()))?
        .unwrap_or(0);
    if hour > 23 || minute > 59 {
        return Err(TimeParseError(text.to_string()));
    }

    match caps.get(3).map(|m| m.as_str()) {
        Some("pm") | Some("p.m.") => {
            if hour > 12 {
                return Err(TimeParseError(text.to_string()));
            }
            if hour < 12 {
                hour += 12;
            }
        }
        Some("am") | Some("a.m.") => {
            if hour > 12 {
                return Err(TimeParseError(text.to_string()));
            }
            if hour == 12 {
                hour = 0;
            }
        }
        _ => {
            // 裸小时（无分钟、无上下午）走启发式
            if caps.get(2).is_none() && (1..=12).contains(&hour)
                && hour < policy.bare_hour_evening_cutoff
            {
                hour += 12;
            }
        }
    }

    Ok(format!("{:02}:{:02}", hour, minute))
}

/// 自然语言日期 → ISO 日期；无法识别返回 None
///
/// 接受 today / yesterday / tomorrow、"2026-01-10"、"10/01/2026"。
pub fn normalize_natural_date(text: &str) -> Option<String> {
    let lower = text.trim().to_lowercase();
    let today = Local::now().date_naive();

    let date = match lower.as_str() {
        "today" => today,
        "yesterday" => today - Duration::days(1),
        "tomorrow" => today + Duration::days(1),
        _ => NaiveDate::parse_from_str(&lower, "%Y-%m-%d")
            .or_else(|_| NaiveDate::parse_from_str(&lower, "%d/%m/%Y"))
            .ok()?,
    };
    Some(date.format("%Y-%m-%d").to_string())
}

/// ISO 日期是否在今天之后；无法解析按「非未来」处理
pub fn is_future_date(iso: &str) -> bool {
    NaiveDate::parse_from_str(iso, "%Y-%m-%d")
        .map(|d| d > Local::now().date_naive())
        .unwrap_or(false)
}

/// 某年某月的 [首日, 末日] ISO 日期区间
pub fn month_range(year: i32, month: u32) -> Option<(String, String)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let last = next_month - Duration::days(1);
    Some((
        first.format("%Y-%m-%d").to_string(),
        last.format("%Y-%m-%d").to_string(),
    ))
}

/// 月份名或数字 → 1..=12
pub fn parse_month(text: &str) -> Option<u32> {
    let lower = text.trim().to_lowercase();
    if let Ok(n) = lower.parse::<u32>() {
        return (1..=12).contains(&n).then_some(n);
    }
    if lower.len() < 3 {
        return None;
    }
    const MONTHS: [&str; 12] = [
        "january", "february", "march", "april", "may", "june", "july", "august", "september",
        "october", "november", "december",
    ];
    MONTHS
        .iter()
        .position(|m| m.starts_with(&lower))
        .map(|i| (i + 1) as u32)
}

/// "HH:MM" 起止时间之间的小时数（两位小数）
pub fn duration_hours(start: &str, end: &str) -> Result<f64, TimeParseError> {
    let parse = |s: &str| {
        NaiveTime::parse_from_str(s, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
            .map_err(|_| TimeParseError(s.to_string()))
    };
    let start = parse(start)?;
    let end = parse(end)?;
    let minutes = (end - start).num_minutes() as f64;
    Ok((minutes / 60.0 * 100.0).round() / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_24h_passthrough() {
        let policy = TimePolicy::default();
        assert_eq!(normalize_time_24h("19:30", &policy).unwrap(), "19:30");
        assert_eq!(normalize_time_24h("09:00:00", &policy).unwrap(), "09:00");
        assert_eq!(normalize_time_24h(" 8:05 ", &policy).unwrap(), "08:05");
    }

    #[test]
    fn test_normalize_meridiem() {
        let policy = TimePolicy::default();
        assert_eq!(normalize_time_24h("7 am", &policy).unwrap(), "07:00");
        assert_eq!(normalize_time_24h("7:30 pm", &policy).unwrap(), "19:30");
        assert_eq!(normalize_time_24h("12 am", &policy).unwrap(), "00:00");
        assert_eq!(normalize_time_24h("12 pm", &policy).unwrap(), "12:00");
    }

    #[test]
    fn test_bare_hour_heuristic() {
        let policy = TimePolicy::default();
        // "7" 按晚间解释，"9" 按上午解释（cutoff = 8）
        assert_eq!(normalize_time_24h("7", &policy).unwrap(), "19:00");
        assert_eq!(normalize_time_24h("9", &policy).unwrap(), "09:00");

        let strict = TimePolicy {
            bare_hour_evening_cutoff: 6,
        };
        assert_eq!(normalize_time_24h("7", &strict).unwrap(), "07:00");
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        let policy = TimePolicy::default();
        assert!(normalize_time_24h("noon-ish", &policy).is_err());
        assert!(normalize_time_24h("25:00", &policy).is_err());
        assert!(normalize_time_24h("10:75", &policy).is_err());
        assert!(normalize_time_24h("", &policy).is_err());
    }

    #[test]
    fn test_natural_dates() {
        assert_eq!(
            normalize_natural_date("2026-01-10").unwrap(),
            "2026-01-10"
        );
        assert_eq!(
            normalize_natural_date("10/01/2026").unwrap(),
            "2026-01-10"
        );
        assert_eq!(normalize_natural_date("today").unwrap(), today());
        assert!(normalize_natural_date("someday").is_none());
    }

    #[test]
    fn test_future_date() {
        assert!(is_future_date("2999-01-01"));
        assert!(!is_future_date("2020-01-01"));
        assert!(!is_future_date(&today()));
        assert!(!is_future_date("not-a-date"));
    }

    #[test]
    fn test_month_range() {
        assert_eq!(
            month_range(2026, 2).unwrap(),
            ("2026-02-01".to_string(), "2026-02-28".to_string())
        );
        assert_eq!(
            month_range(2026, 12).unwrap(),
            ("2026-12-01".to_string(), "2026-12-31".to_string())
        );
        assert!(month_range(2026, 13).is_none());
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("january"), Some(1));
        assert_eq!(parse_month("Jan"), Some(1));
        assert_eq!(parse_month("6"), Some(6));
        assert_eq!(parse_month("13"), None);
        assert_eq!(parse_month("ja"), None);
    }

    #[test]
    fn test_duration_hours() {
        assert_eq!(duration_hours("09:00", "18:00").unwrap(), 9.0);
        assert_eq!(duration_hours("09:30", "18:00").unwrap(), 8.5);
        assert!(duration_hours("nine", "18:00").is_err());
    }
}

//! 报表：单日工时、月度汇总

use crate::nlu::{missing_fields, Intent};
use crate::reply::TurnReply;
use crate::resolver::{resolve_employee, EmployeeLookup};
use crate::session::{truthy, EntityMap};
use crate::store::{AttendanceStore, EmployeeStore, StoreError};
use crate::timeutil::{current_year, duration_hours, month_range, normalize_natural_date, parse_month};

pub fn handle(
    intent: Intent,
    employees: &EmployeeStore,
    attendance: &AttendanceStore,
    entities: &mut EntityMap,
) -> Result<TurnReply, StoreError> {
    let employee = match resolve_employee(employees, entities)? {
        EmployeeLookup::Resolved(e) => e,
        EmployeeLookup::Ambiguous(candidates) => {
            return Ok(TurnReply::AmbiguousEmployee { candidates })
        }
        EmployeeLookup::NotFound => return Ok(TurnReply::EmployeeNotFound),
        EmployeeLookup::Missing => return Ok(TurnReply::MissingEmployeeRef),
    };
    entities.insert("employee_id".into(), employee.id.to_string());

    match intent {
        Intent::DailyReport | Intent::WorkingHours => {
            let raw = match entities.get("date").filter(|v| truthy(v)).cloned() {
                Some(d) => d,
                None => {
                    return Ok(TurnReply::MissingFields {
                        intent,
                        fields: missing_fields(intent, entities),
                    })
                }
            };
            let date = match normalize_natural_date(&raw) {
                Some(iso) => {
                    entities.insert("date".into(), iso.clone());
                    iso
                }
                None => return Ok(TurnReply::ClarifyDate { raw }),
            };

            let record = attendance.get_on_date(employee.id, &date)?;
            let reply = match record {
                None => TurnReply::NoAttendance {
                    name: employee.name,
                    date,
                },
                Some(r) => match (r.start_time, r.end_time) {
                    (None, _) => TurnReply::NoAttendance {
                        name: employee.name,
                        date,
                    },
                    (Some(start), None) => TurnReply::StillWorking {
                        name: employee.name,
                        date,
                        start,
                    },
                    (Some(start), Some(end)) => TurnReply::DailyHours {
                        name: employee.name,
                        date,
                        hours: duration_hours(&start, &end).unwrap_or(0.0),
                    },
                },
            };
            Ok(reply)
        }

        Intent::MonthlyReport => {
            let Some(month) = entities
                .get("month")
                .filter(|v| truthy(v))
                .and_then(|m| parse_month(m))
            else {
                return Ok(TurnReply::MissingFields {
                    intent,
                    fields: vec!["month"],
                });
            };
            // 没给年份按当前年解释
            let year = entities
                .get("year")
                .filter(|v| truthy(v))
                .and_then(|y| y.trim().parse::<i32>().ok())
                .unwrap_or_else(current_year);
            let Some((from, to)) = month_range(year, month) else {
                return Ok(TurnReply::MissingFields {
                    intent,
                    fields: vec!["month"],
                });
            };

            let mut days = Vec::new();
            let mut total = 0.0;
            for record in attendance.for_employee(employee.id)? {
                if record.date < from || record.date > to {
                    continue;
                }
                match (&record.start_time, &record.end_time) {
                    (Some(start), Some(end)) => {
                        let hours = duration_hours(start, end).unwrap_or(0.0);
                        total += hours;
                        days.push((record.date, Some(hours)));
                    }
                    // 不完整的考勤照常列出，由展示层标注
                    _ => days.push((record.date, None)),
                }
            }

            if days.is_empty() {
                return Ok(TurnReply::NoRecordsForMonth {
                    name: employee.name,
                    month,
                    year,
                });
            }
            Ok(TurnReply::MonthlyReport {
                name: employee.name,
                month,
                year,
                days,
                total: (total * 100.0).round() / 100.0,
            })
        }

        _ => Ok(TurnReply::Unknown),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::open;

    fn setup() -> (EmployeeStore, AttendanceStore) {
        let conn = open(None).unwrap();
        let employees = EmployeeStore::new(conn.clone());
        let attendance = AttendanceStore::new(conn);
        let id = employees.create("Smith", "smith@x.com", "dev").unwrap();
        attendance.start(id, "2026-01-10", "09:00").unwrap();
        attendance.end(id, "2026-01-10", "18:00").unwrap();
        attendance.start(id, "2026-01-12", "10:00").unwrap(); // 未打下班卡
        attendance.start(id, "2026-02-01", "09:00").unwrap();
        attendance.end(id, "2026-02-01", "17:00").unwrap();
        (employees, attendance)
    }

    fn entities(pairs: &[(&str, &str)]) -> EntityMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_daily_report_variants() {
        let (employees, attendance) = setup();

        let mut e = entities(&[("name", "smith"), ("date", "2026-01-10")]);
        let reply = handle(Intent::DailyReport, &employees, &attendance, &mut e).unwrap();
        match reply {
            TurnReply::DailyHours { hours, .. } => assert_eq!(hours, 9.0),
            other => panic!("expected hours, got {:?}", other),
        }

        let mut e = entities(&[("name", "smith"), ("date", "2026-01-12")]);
        let reply = handle(Intent::WorkingHours, &employees, &attendance, &mut e).unwrap();
        assert!(matches!(reply, TurnReply::StillWorking { .. }));

        let mut e = entities(&[("name", "smith"), ("date", "2026-03-01")]);
        let reply = handle(Intent::DailyReport, &employees, &attendance, &mut e).unwrap();
        assert!(matches!(reply, TurnReply::NoAttendance { .. }));
    }

    #[test]
    fn test_daily_report_requires_date() {
        let (employees, attendance) = setup();
        let mut e = entities(&[("name", "smith")]);
        let reply = handle(Intent::DailyReport, &employees, &attendance, &mut e).unwrap();
        match reply {
            TurnReply::MissingFields { fields, .. } => assert_eq!(fields, vec!["date"]),
            other => panic!("expected missing date, got {:?}", other),
        }
    }

    #[test]
    fn test_monthly_report_aggregates_and_flags_incomplete() {
        let (employees, attendance) = setup();
        let mut e = entities(&[("name", "smith"), ("month", "january"), ("year", "2026")]);
        let reply = handle(Intent::MonthlyReport, &employees, &attendance, &mut e).unwrap();
        match reply {
            TurnReply::MonthlyReport { days, total, .. } => {
                assert_eq!(days.len(), 2); // 一月两条，二月的不算
                assert_eq!(total, 9.0);
                assert!(days.iter().any(|(_, h)| h.is_none())); // 不完整考勤被标出
            }
            other => panic!("expected monthly report, got {:?}", other),
        }
    }

    #[test]
    fn test_monthly_report_requires_month() {
        let (employees, attendance) = setup();
        let mut e = entities(&[("name", "smith"), ("year", "2026")]);
        let reply = handle(Intent::MonthlyReport, &employees, &attendance, &mut e).unwrap();
        match reply {
            TurnReply::MissingFields { fields, .. } => assert_eq!(fields, vec!["month"]),
            other => panic!("expected missing month, got {:?}", other),
        }
    }

    #[test]
    fn test_monthly_report_defaults_to_current_year() {
        let (employees, attendance) = setup();
        let date = format!("{}-01-15", current_year());
        attendance.start(1, &date, "09:00").unwrap();
        attendance.end(1, &date, "17:00").unwrap();

        let mut e = entities(&[("name", "smith"), ("month", "january")]);
        let reply = handle(Intent::MonthlyReport, &employees, &attendance, &mut e).unwrap();
        match reply {
            TurnReply::MonthlyReport { year, days, .. } => {
                assert_eq!(year, current_year());
                assert!(days.iter().any(|(d, _)| d == &date));
            }
            other => panic!("expected monthly report, got {:?}", other),
        }
    }

    #[test]
    fn test_no_records_for_month() {
        let (employees, attendance) = setup();
        let mut e = entities(&[("name", "smith"), ("month", "6"), ("year", "2026")]);
        let reply = handle(Intent::MonthlyReport, &employees, &attendance, &mut e).unwrap();
        assert!(matches!(reply, TurnReply::NoRecordsForMonth { .. }));
    }
}

//! 考勤存储
//!
//! 每个 (employee_id, date) 至多一行，由 UNIQUE 约束保证；
//! 并发写同一行时由 SQLite 串行化，读改写在单轮内视为原子。

use rusqlite::{params, OptionalExtension};
use serde::Serialize;

use crate::store::{lock, SharedConnection, StoreError};

/// 某员工某天的考勤记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceRecord {
    pub date: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

/// 某日的组织级出勤汇总
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailySummary {
    pub date: String,
    pub total: i64,
    pub present: i64,
    pub absent: i64,
}

/// 考勤表读写操作
#[derive(Clone)]
pub struct AttendanceStore {
    conn: SharedConnection,
}

impl AttendanceStore {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    pub fn get_on_date(
        &self,
        employee_id: i64,
        date: &str,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        let conn = lock(&self.conn)?;
        let record = conn
            .query_row(
                "SELECT date, start_time, end_time FROM attendance
                 WHERE employee_id = ?1 AND date = ?2",
                params![employee_id, date],
                |row| {
                    Ok(AttendanceRecord {
                        date: row.get(0)?,
                        start_time: row.get(1)?,
                        end_time: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    /// 记录上班时间；同日已有记录时覆盖 start_time（确认重试路径）
    pub fn start(&self, employee_id: i64, date: &str, time: &str) -> Result<(), StoreError> {
        let conn = lock(&self.conn)?;
        conn.execute(
            "INSERT INTO attendance (employee_id, date, start_time) VALUES (?1, ?2, ?3)
             ON CONFLICT(employee_id, date) DO UPDATE SET start_time = excluded.start_time",
            params![employee_id, date, time],
        )?;
        Ok(())
    }

    /// 记录下班时间；要求该日已有行（是否已开始由调用方先检查）
    pub fn end(&self, employee_id: i64, date: &str, time: &str) -> Result<(), StoreError> {
        let conn = lock(&self.conn)?;
        conn.execute(
            "UPDATE attendance SET end_time = ?1 WHERE employee_id = ?2 AND date = ?3",
            params![time, employee_id, date],
        )?;
        Ok(())
    }

    pub fn for_employee(&self, employee_id: i64) -> Result<Vec<AttendanceRecord>, StoreError> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(
            "SELECT date, start_time, end_time FROM attendance
             WHERE employee_id = ?1 ORDER BY date",
        )?;
        let rows = stmt.query_map(params![employee_id], |row| {
            Ok(AttendanceRecord {
                date: row.get(0)?,
                start_time: row.get(1)?,
                end_time: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// 某日汇总：总人数 / 已打卡 / 未打卡
    pub fn summary_for_date(&self, date: &str) -> Result<DailySummary, StoreError> {
        let conn = lock(&self.conn)?;
        let total: i64 = conn.query_row("SELECT COUNT(*) FROM employees", [], |r| r.get(0))?;
        let present: i64 = conn.query_row(
            "SELECT COUNT(DISTINCT employee_id) FROM attendance WHERE date = ?1",
            params![date],
            |r| r.get(0),
        )?;
        Ok(DailySummary {
            date: date.to_string(),
            total,
            present,
            absent: total - present,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{open, EmployeeStore};

    fn stores() -> (EmployeeStore, AttendanceStore) {
        let conn = open(None).unwrap();
        (
            EmployeeStore::new(conn.clone()),
            AttendanceStore::new(conn),
        )
    }

    #[test]
    fn test_start_end_roundtrip() {
        let (employees, attendance) = stores();
        let id = employees.create("Smith", "s@x.com", "dev").unwrap();

        attendance.start(id, "2026-01-10", "09:00").unwrap();
        let record = attendance.get_on_date(id, "2026-01-10").unwrap().unwrap();
        assert_eq!(record.start_time.as_deref(), Some("09:00"));
        assert!(record.end_time.is_none());

        attendance.end(id, "2026-01-10", "18:00").unwrap();
        let record = attendance.get_on_date(id, "2026-01-10").unwrap().unwrap();
        assert_eq!(record.end_time.as_deref(), Some("18:00"));
    }

    #[test]
    fn test_start_overwrite_keeps_single_row() {
        let (employees, attendance) = stores();
        let id = employees.create("Smith", "s@x.com", "dev").unwrap();

        attendance.start(id, "2026-01-10", "09:00").unwrap();
        attendance.start(id, "2026-01-10", "11:00").unwrap();

        let records = attendance.for_employee(id).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].start_time.as_deref(), Some("11:00"));
    }

    #[test]
    fn test_summary_counts() {
        let (employees, attendance) = stores();
        let a = employees.create("A", "a@x.com", "dev").unwrap();
        employees.create("B", "b@x.com", "qa").unwrap();

        attendance.start(a, "2026-01-10", "09:00").unwrap();

        let summary = attendance.summary_for_date("2026-01-10").unwrap();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.present, 1);
        assert_eq!(summary.absent, 1);

        // 未来日期允许查询，返回空结果
        let future = attendance.summary_for_date("2099-01-01").unwrap();
        assert_eq!(future.present, 0);
        assert_eq!(future.absent, 2);
    }
}

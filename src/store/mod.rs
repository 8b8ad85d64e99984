//! SQLite 持久化层
//!
//! 员工与考勤两个存储共享同一个连接（Arc<Mutex<Connection>>）。
//! 连接由启动方显式创建并传入，不做模块级全局句柄。

mod attendance;
mod employee;

pub use attendance::{AttendanceRecord, AttendanceStore, DailySummary};
pub use employee::{Employee, EmployeeStore};

use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use thiserror::Error;

/// 存储层错误：不在本层重试，向上作为终止性错误传播
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Store lock poisoned")]
    Poisoned,
}

pub type SharedConnection = Arc<Mutex<Connection>>;

/// 打开数据库连接并初始化表结构；path 为 None 时使用内存库（测试 / 演示）
pub fn open(path: Option<&Path>) -> Result<SharedConnection, StoreError> {
    let conn = match path {
        Some(p) => Connection::open(p)?,
        None => Connection::open_in_memory()?,
    };
    init_schema(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

fn init_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS employees (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            name       TEXT NOT NULL,
            email      TEXT NOT NULL UNIQUE,
            role       TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE TABLE IF NOT EXISTS attendance (
            employee_id INTEGER NOT NULL REFERENCES employees(id),
            date        TEXT NOT NULL,
            start_time  TEXT,
            end_time    TEXT,
            UNIQUE(employee_id, date)
        );",
    )?;
    Ok(())
}

pub(crate) fn lock(
    conn: &SharedConnection,
) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
    conn.lock().map_err(|_| StoreError::Poisoned)
}

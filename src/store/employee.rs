//! 员工目录存储

use rusqlite::{params, OptionalExtension, Row};
use serde::Serialize;

use crate::store::{lock, SharedConnection, StoreError};

/// 一名员工；id 为稳定主键，email 唯一
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl Employee {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            role: row.get(3)?,
        })
    }
}

const SELECT: &str = "SELECT id, name, email, role FROM employees";

/// 员工目录的读写操作
#[derive(Clone)]
pub struct EmployeeStore {
    conn: SharedConnection,
}

impl EmployeeStore {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    pub fn create(&self, name: &str, email: &str, role: &str) -> Result<i64, StoreError> {
        let conn = lock(&self.conn)?;
        conn.execute(
            "INSERT INTO employees (name, email, role) VALUES (?1, ?2, ?3)",
            params![name, email, role],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn by_id(&self, id: i64) -> Result<Option<Employee>, StoreError> {
        let conn = lock(&self.conn)?;
        let employee = conn
            .query_row(
                &format!("{SELECT} WHERE id = ?1"),
                params![id],
                Employee::from_row,
            )
            .optional()?;
        Ok(employee)
    }

    /// 精确匹配（大小写敏感，与存储值一致）
    pub fn by_email(&self, email: &str) -> Result<Option<Employee>, StoreError> {
        let conn = lock(&self.conn)?;
        let employee = conn
            .query_row(
                &format!("{SELECT} WHERE email = ?1"),
                params![email],
                Employee::from_row,
            )
            .optional()?;
        Ok(employee)
    }

    /// 大小写不敏感的重名查询，可能返回多条
    pub fn by_name(&self, name: &str) -> Result<Vec<Employee>, StoreError> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(&format!("{SELECT} WHERE LOWER(name) = LOWER(?1)"))?;
        let rows = stmt.query_map(params![name], Employee::from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn by_role(&self, role: &str) -> Result<Vec<Employee>, StoreError> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(&format!("{SELECT} WHERE role = ?1"))?;
        let rows = stmt.query_map(params![role], Employee::from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn all(&self) -> Result<Vec<Employee>, StoreError> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(&format!("{SELECT} ORDER BY id"))?;
        let rows = stmt.query_map([], Employee::from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

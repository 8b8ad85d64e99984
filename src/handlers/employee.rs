//! 员工登记与查询

use tracing::info;

use crate::nlu::{missing_fields, Intent};
use crate::reply::TurnReply;
use crate::session::{truthy, EntityMap};
use crate::store::{Employee, EmployeeStore, StoreError};

/// 注册新员工：字段齐全才写库，email 重复直接拒绝
pub fn create(store: &EmployeeStore, entities: &mut EntityMap) -> Result<TurnReply, StoreError> {
    let missing = missing_fields(Intent::CreateEmployee, entities);
    if !missing.is_empty() {
        return Ok(TurnReply::MissingFields {
            intent: Intent::CreateEmployee,
            fields: missing,
        });
    }

    // missing_fields 为空保证三个字段都 truthy
    let name = entities.get("name").cloned().unwrap_or_default();
    let email = entities.get("email").cloned().unwrap_or_default();
    let role = entities.get("role").cloned().unwrap_or_default();

    if store.by_email(&email)?.is_some() {
        return Ok(TurnReply::DuplicateEmail { email });
    }

    let id = store.create(&name, &email, &role)?;
    info!(employee = id, "employee registered");
    entities.insert("employee_id".into(), id.to_string());
    Ok(TurnReply::EmployeeCreated {
        employee: Employee {
            id,
            name,
            email,
            role,
        },
    })
}

/// 查询员工：email → id → name → role，均无则列出全部
pub fn find(store: &EmployeeStore, entities: &EntityMap) -> Result<TurnReply, StoreError> {
    let get = |key: &str| entities.get(key).filter(|v| truthy(v)).cloned();

    let employees = if let Some(email) = get("email") {
        store.by_email(email.trim())?.into_iter().collect()
    } else if let Some(raw_id) = get("employee_id").or_else(|| get("id")) {
        match raw_id.trim().parse::<i64>() {
            Ok(id) => store.by_id(id)?.into_iter().collect(),
            Err(_) => Vec::new(),
        }
    } else if let Some(name) = get("name") {
        store.by_name(name.trim())?
    } else if let Some(role) = get("role") {
        store.by_role(role.trim())?
    } else {
        store.all()?
    };

    Ok(TurnReply::EmployeeList { employees })
}

//! 员工指代消解
//!
//! 所有需要确定「说的是谁」的 handler 共用同一套查找流程，
//! 保证相同实体在不同 handler 下指向同一个人。歧义时从不猜测。

use crate::session::{truthy, EntityMap};
use crate::store::{Employee, EmployeeStore, StoreError};

/// 消解结果：命中 / 歧义（带候选列表）/ 查无此人 / 缺少指代字段
#[derive(Debug, Clone)]
pub enum EmployeeLookup {
    Resolved(Employee),
    Ambiguous(Vec<Employee>),
    NotFound,
    Missing,
}

/// 按固定优先级消解员工指代：数字 id → email 精确匹配 → name（大小写不敏感）
///
/// 首个命中的字段生效，之后的字段不再参与；重名返回完整候选列表，由调用方
/// 要求用户改用 id 重试。
pub fn resolve_employee(
    store: &EmployeeStore,
    entities: &EntityMap,
) -> Result<EmployeeLookup, StoreError> {
    let id_field = entities
        .get("employee_id")
        .or_else(|| entities.get("id"))
        .filter(|v| truthy(v));
    if let Some(raw_id) = id_field {
        if let Ok(id) = raw_id.trim().parse::<i64>() {
            return Ok(match store.by_id(id)? {
                Some(employee) => EmployeeLookup::Resolved(employee),
                None => EmployeeLookup::NotFound,
            });
        }
    }

    if let Some(email) = entities.get("email").filter(|v| truthy(v)) {
        return Ok(match store.by_email(email.trim())? {
            Some(employee) => EmployeeLookup::Resolved(employee),
            None => EmployeeLookup::NotFound,
        });
    }

    if let Some(name) = entities.get("name").filter(|v| truthy(v)) {
        let mut matches = store.by_name(name.trim())?;
        return Ok(match matches.len() {
            0 => EmployeeLookup::NotFound,
            1 => EmployeeLookup::Resolved(matches.remove(0)),
            _ => EmployeeLookup::Ambiguous(matches),
        });
    }

    Ok(EmployeeLookup::Missing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::open;

    fn seeded() -> EmployeeStore {
        let store = EmployeeStore::new(open(None).unwrap());
        store.create("Alice", "alice@x.com", "dev").unwrap();
        store.create("Smith", "smith1@x.com", "dev").unwrap();
        store.create("smith", "smith2@x.com", "qa").unwrap();
        store
    }

    fn entities(pairs: &[(&str, &str)]) -> EntityMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_id_takes_precedence_over_name() {
        let store = seeded();
        let lookup =
            resolve_employee(&store, &entities(&[("employee_id", "1"), ("name", "smith")]))
                .unwrap();
        match lookup {
            EmployeeLookup::Resolved(e) => assert_eq!(e.id, 1),
            other => panic!("expected resolved, got {:?}", other),
        }
    }

    #[test]
    fn test_email_before_name() {
        let store = seeded();
        let lookup = resolve_employee(
            &store,
            &entities(&[("email", "alice@x.com"), ("name", "smith")]),
        )
        .unwrap();
        match lookup {
            EmployeeLookup::Resolved(e) => assert_eq!(e.name, "Alice"),
            other => panic!("expected resolved, got {:?}", other),
        }
    }

    #[test]
    fn test_ambiguous_name_never_guesses() {
        let store = seeded();
        let lookup = resolve_employee(&store, &entities(&[("name", "smith")])).unwrap();
        match lookup {
            EmployeeLookup::Ambiguous(candidates) => assert_eq!(candidates.len(), 2),
            other => panic!("expected ambiguous, got {:?}", other),
        }
    }

    #[test]
    fn test_not_found_and_missing() {
        let store = seeded();
        assert!(matches!(
            resolve_employee(&store, &entities(&[("name", "bob")])).unwrap(),
            EmployeeLookup::NotFound
        ));
        assert!(matches!(
            resolve_employee(&store, &entities(&[("date", "today")])).unwrap(),
            EmployeeLookup::Missing
        ));
        // id 字段存在但查无此人 → NotFound，而不是落到 name
        assert!(matches!(
            resolve_employee(&store, &entities(&[("employee_id", "99"), ("name", "smith")]))
                .unwrap(),
            EmployeeLookup::NotFound
        ));
    }
}

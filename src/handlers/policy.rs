//! HR 政策问答

use std::sync::Arc;

use tracing::debug;

use crate::policy::PolicyIndex;
use crate::reply::TurnReply;
use crate::session::{truthy, EntityMap};

/// 检索政策片段；实体里没有 query 时退回用户原文
pub fn handle(
    index: &Arc<dyn PolicyIndex>,
    top_k: usize,
    entities: &EntityMap,
    raw_input: &str,
) -> TurnReply {
    let query = entities
        .get("query")
        .filter(|v| truthy(v))
        .map(String::as_str)
        .unwrap_or(raw_input);

    let chunks = index.search(query, top_k);
    debug!(hits = chunks.len(), "policy search");
    if chunks.is_empty() {
        TurnReply::PolicyNotSpecified
    } else {
        TurnReply::PolicyAnswer { chunks }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::KeywordPolicyIndex;

    fn index() -> Arc<dyn PolicyIndex> {
        Arc::new(KeywordPolicyIndex::from_chunks(vec![
            "Employees are entitled to 18 paid leave days per year.".to_string(),
        ]))
    }

    #[test]
    fn test_answer_from_entities_query() {
        let mut entities = EntityMap::new();
        entities.insert("query".into(), "how many leave days".into());
        let reply = handle(&index(), 4, &entities, "unused");
        assert!(matches!(reply, TurnReply::PolicyAnswer { .. }));
    }

    #[test]
    fn test_falls_back_to_raw_input() {
        let reply = handle(&index(), 4, &EntityMap::new(), "paid leave days?");
        assert!(matches!(reply, TurnReply::PolicyAnswer { .. }));
    }

    #[test]
    fn test_not_specified_when_no_hits() {
        let reply = handle(&index(), 4, &EntityMap::new(), "quarterly revenue");
        assert!(matches!(reply, TurnReply::PolicyNotSpecified));
    }
}

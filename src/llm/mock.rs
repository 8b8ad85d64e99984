//! Mock LLM 客户端（用于测试与无 Key 运行）
//!
//! 始终返回一个「无法判定」的分类 JSON，使上层流程可以在本地跑通。

use async_trait::async_trait;

use crate::llm::{LlmClient, Message};

/// Mock 客户端：返回固定的 unknown 分类结果
#[derive(Debug, Default)]
pub struct MockLlmClient;

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, _messages: &[Message]) -> Result<String, String> {
        Ok(r#"{"intent": "unknown", "action": "query", "entities": {}, "confidence": 0.0}"#
            .to_string())
    }
}

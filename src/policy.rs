//! 政策知识检索
//!
//! 外部协作方的最小实现：把 knowledge 目录下的 Markdown 切块，
//! 按关键词重合度打分取 top-k。向量检索质量不在本 crate 范围内，
//! 接口保持可替换（PolicyIndex trait）。

use std::collections::HashSet;
use std::path::Path;

use tracing::{info, warn};
use walkdir::WalkDir;

/// 政策检索接口：返回与问题相关的文档片段
pub trait PolicyIndex: Send + Sync {
    fn search(&self, query: &str, top_k: usize) -> Vec<String>;
}

/// 关键词重合度检索：无外部依赖，块级打分，低于阈值的不返回
pub struct KeywordPolicyIndex {
    chunks: Vec<String>,
}

impl KeywordPolicyIndex {
    /// 读取目录下全部 .md / .txt，按空行与二级标题切块
    pub fn load_dir(dir: &Path) -> Self {
        let mut chunks = Vec::new();
        if dir.exists() {
            for entry in WalkDir::new(dir)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
            {
                let is_doc = entry
                    .path()
                    .extension()
                    .map(|ext| ext == "md" || ext == "txt")
                    .unwrap_or(false);
                if !is_doc {
                    continue;
                }
                match std::fs::read_to_string(entry.path()) {
                    Ok(text) => chunks.extend(split_chunks(&text)),
                    Err(e) => warn!("Failed to read policy file {:?}: {}", entry.path(), e),
                }
            }
        }
        info!("Policy index loaded: {} chunks", chunks.len());
        Self { chunks }
    }

    pub fn from_chunks(chunks: Vec<String>) -> Self {
        Self { chunks }
    }
}

fn split_chunks(text: &str) -> Vec<String> {
    text.split("\n## ")
        .flat_map(|section| section.split("\n\n"))
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect()
}

fn tokenize(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 2)
        .map(String::from)
        .collect()
}

impl PolicyIndex for KeywordPolicyIndex {
    fn search(&self, query: &str, top_k: usize) -> Vec<String> {
        let query_tokens = tokenize(query);
        if query_tokens.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(usize, &String)> = self
            .chunks
            .iter()
            .map(|chunk| {
                let overlap = tokenize(chunk).intersection(&query_tokens).count();
                (overlap, chunk)
            })
            .filter(|(score, _)| *score > 0)
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored
            .into_iter()
            .take(top_k)
            .map(|(_, chunk)| chunk.clone())
            .collect()
    }
}

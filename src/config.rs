//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `CLERK__*` 覆盖
//! （双下划线表示嵌套，如 `CLERK__LLM__PROVIDER=openai`）。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub time: TimeSection,
    #[serde(default)]
    pub policy: PolicySection,
}

/// [app] 段：应用名与数据库位置
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppSection {
    pub name: Option<String>,
    /// SQLite 文件路径，未设置时用内存库
    pub db_path: Option<PathBuf>,
}

/// [llm] 段：分类器后端选择
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSection {
    /// 后端：openai / mock；没有 API Key 时自动退到 mock
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    pub base_url: Option<String>,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            base_url: None,
        }
    }
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

/// [time] 段：裸小时数的解释策略
#[derive(Debug, Clone, Deserialize)]
pub struct TimeSection {
    #[serde(default = "default_bare_hour_evening_cutoff")]
    pub bare_hour_evening_cutoff: u32,
}

impl Default for TimeSection {
    fn default() -> Self {
        Self {
            bare_hour_evening_cutoff: default_bare_hour_evening_cutoff(),
        }
    }
}

fn default_bare_hour_evening_cutoff() -> u32 {
    8
}

/// [policy] 段：知识目录与检索条数
#[derive(Debug, Clone, Deserialize)]
pub struct PolicySection {
    #[serde(default = "default_knowledge_dir")]
    pub knowledge_dir: PathBuf,
    #[serde(default = "default_search_top_k")]
    pub search_top_k: usize,
}

impl Default for PolicySection {
    fn default() -> Self {
        Self {
            knowledge_dir: default_knowledge_dir(),
            search_top_k: default_search_top_k(),
        }
    }
}

fn default_knowledge_dir() -> PathBuf {
    PathBuf::from("knowledge")
}

fn default_search_top_k() -> usize {
    4
}

/// 从 config 目录加载配置，环境变量 CLERK__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 CLERK__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("CLERK")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.llm.provider, "openai");
        assert_eq!(cfg.time.bare_hour_evening_cutoff, 8);
        assert_eq!(cfg.policy.search_top_k, 4);
        assert!(cfg.app.db_path.is_none());
    }
}

//! 意图分类适配层
//!
//! 对外是一个黑盒函数：文本进，(intent, action, entities, confidence) 出。
//! LlmClassifier 先走关键词快速匹配（不调用 LLM），拿不准再让 LLM 输出严格 JSON。
//! 分类器视为不可靠，其误判由会话层的合并 / 连续性规则兜底。

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::debug;

use crate::llm::{LlmClient, Message};
use crate::nlu::{Action, Intent};
use crate::session::EntityMap;

/// 分类器无法产出结构化结果
#[derive(Error, Debug, Clone)]
#[error("Classification failed: {0}")]
pub struct ClassificationError(pub String);

/// 单轮分类结果（即用即弃，不跨轮保留）
#[derive(Debug, Clone)]
pub struct ClassifierResult {
    pub intent: Intent,
    pub action: Action,
    pub entities: EntityMap,
    pub confidence: f32,
}

impl ClassifierResult {
    pub fn new(intent: Intent, action: Action) -> Self {
        Self {
            intent,
            action,
            entities: EntityMap::new(),
            confidence: 1.0,
        }
    }

    pub fn with_entities(mut self, pairs: &[(&str, &str)]) -> Self {
        for (k, v) in pairs {
            self.entities.insert(k.to_string(), v.to_string());
        }
        self
    }
}

/// 分类器接口
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<ClassifierResult, ClassificationError>;
}

const CLASSIFY_PROMPT: &str = r#"You are an intent classifier for an HR assistant.
Analyze the user's input and output ONLY a JSON object, no explanation, no markdown fence:

{"intent": "<intent>", "action": "<action>", "entities": {...}, "confidence": <0.0-1.0>}

Intents:
- create_employee: registering a new employee
- find_employee: looking up employee details
- attendance_start: starting work / checking in
- attendance_end: ending work / checking out
- attendance_range: start and end time given together
- attendance_summary: who worked / attendance overview for a date
- daily_report: report for one day
- monthly_report: report for a month
- working_hours: hours worked question
- hr_policy: company policy / rules / leave question
- unknown: anything else (greetings, chit-chat, bare follow-up values)

Actions: start (new request), continue (supplying more details), query (question),
confirm (yes / agree to update), cancel (abort the pending operation).

Entity keys (only when present in the text): name, email, role, employee_id, date,
time, start_time, end_time, month, year. Times verbatim as the user wrote them."#;

/// 关键词 + LLM 两级分类器
pub struct LlmClassifier {
    llm: Arc<dyn LlmClient>,
    /// 启用快速规则匹配（不调用 LLM）
    enable_fast_match: bool,
}

#[derive(Debug, Deserialize)]
struct RawOutput {
    intent: String,
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    entities: Option<std::collections::HashMap<String, serde_json::Value>>,
    #[serde(default)]
    confidence: Option<f32>,
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap())
}

fn range_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"from\s+(\d{1,2}(?::\d{2})?\s*(?:am|pm)?)\s+to\s+(\d{1,2}(?::\d{2})?\s*(?:am|pm)?)")
            .unwrap()
    })
}

fn at_time_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bat\s+(\d{1,2}(?::\d{2})?\s*(?:am|pm)?)").unwrap())
}

fn iso_date_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(\d{4}-\d{2}-\d{2})\b").unwrap())
}

fn year_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(19|20)\d{2}\b").unwrap())
}

impl LlmClassifier {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            enable_fast_match: true,
        }
    }

    /// 快速规则匹配（不调用 LLM）；拿不准时返回 None 交给 LLM
    fn fast_match(&self, input: &str) -> Option<ClassifierResult> {
        let lower = input.trim().to_lowercase();
        if lower.is_empty() {
            return None;
        }

        // 裸确认 / 取消
        if matches!(
            lower.trim_end_matches(['.', '!']),
            "yes" | "yeah" | "ok" | "okay" | "sure" | "confirm" | "yes update it" | "update it"
                | "yes please"
        ) {
            return Some(ClassifierResult {
                intent: Intent::Unknown,
                action: Action::Confirm,
                entities: EntityMap::new(),
                confidence: 0.9,
            });
        }
        if matches!(
            lower.trim_end_matches(['.', '!']),
            "no" | "cancel" | "stop" | "never mind" | "forget it"
        ) {
            return Some(ClassifierResult {
                intent: Intent::Unknown,
                action: Action::Cancel,
                entities: EntityMap::new(),
                confidence: 0.9,
            });
        }

        let intent = if ["register", "add employee", "create employee"]
            .iter()
            .any(|w| lower.contains(w))
        {
            Intent::CreateEmployee
        } else if ["find employee", "employee detail", "show employee"]
            .iter()
            .any(|w| lower.contains(w))
        {
            Intent::FindEmployee
        } else if ["start work", "start day", "check in"].iter().any(|w| lower.contains(w)) {
            Intent::AttendanceStart
        } else if ["end work", "end day", "check out"].iter().any(|w| lower.contains(w)) {
            Intent::AttendanceEnd
        } else if lower.contains("attendance summary")
            || lower.contains("how many employees worked")
            || lower.contains("who has not started")
        {
            Intent::AttendanceSummary
        } else if lower.contains("monthly")
            && ["record", "report", "working"].iter().any(|w| lower.contains(w))
        {
            Intent::MonthlyReport
        } else if lower.contains("daily") && ["report", "attendance"].iter().any(|w| lower.contains(w))
        {
            Intent::DailyReport
        } else if lower.contains("working hours") || lower.contains("how many hours") {
            Intent::WorkingHours
        } else if ["policy", "rule", "leave", "hr"].iter().any(|w| lower.contains(w)) {
            Intent::HrPolicy
        } else {
            return None;
        };

        let action = match intent {
            Intent::FindEmployee
            | Intent::AttendanceSummary
            | Intent::DailyReport
            | Intent::MonthlyReport
            | Intent::WorkingHours
            | Intent::HrPolicy => Action::Query,
            _ => Action::Start,
        };

        let mut result = ClassifierResult {
            intent,
            action,
            entities: extract_entities(input, &lower, intent),
            confidence: 0.9,
        };
        // 政策问答把原文带给检索层
        if intent == Intent::HrPolicy {
            result.entities.insert("query".into(), input.trim().to_string());
        }
        Some(result)
    }

    async fn llm_classify(&self, input: &str) -> Result<ClassifierResult, ClassificationError> {
        let messages = vec![
            Message::system(CLASSIFY_PROMPT),
            Message::user(format!("User input: {}", input)),
        ];

        let response = self
            .llm
            .complete(&messages)
            .await
            .map_err(ClassificationError)?;

        parse_llm_output(&response)
    }
}

/// 从 LLM 输出中解析分类 JSON；容忍 markdown 代码栅栏
fn parse_llm_output(response: &str) -> Result<ClassifierResult, ClassificationError> {
    let body = response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let raw: RawOutput = serde_json::from_str(body)
        .map_err(|e| ClassificationError(format!("invalid classifier JSON: {}", e)))?;

    let mut entities = EntityMap::new();
    for (key, value) in raw.entities.unwrap_or_default() {
        let text = match value {
            serde_json::Value::String(s) => s,
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Null => continue,
            other => other.to_string(),
        };
        entities.insert(key, text);
    }

    Ok(ClassifierResult {
        intent: Intent::from_label(&raw.intent),
        action: raw
            .action
            .as_deref()
            .map(Action::from_label)
            .unwrap_or(Action::Query),
        entities,
        confidence: raw.confidence.unwrap_or(0.5).clamp(0.0, 1.0),
    })
}

/// 正则实体抽取：邮箱、时间、日期、人名启发式
///
/// 邮箱从原文抽取（大小写保持原样，与存储侧的精确匹配对应），其余从小写文本抽取。
fn extract_entities(original: &str, lower: &str, intent: Intent) -> EntityMap {
    let mut entities = EntityMap::new();

    if let Some(m) = email_regex().find(original) {
        entities.insert("email".into(), m.as_str().to_string());
    }
    if let Some(caps) = range_regex().captures(lower) {
        entities.insert("start_time".into(), caps[1].trim().to_string());
        entities.insert("end_time".into(), caps[2].trim().to_string());
    } else if let Some(caps) = at_time_regex().captures(lower) {
        entities.insert("time".into(), caps[1].trim().to_string());
    }
    if let Some(caps) = iso_date_regex().captures(lower) {
        entities.insert("date".into(), caps[1].to_string());
    } else {
        for word in ["yesterday", "tomorrow", "today"] {
            if lower.split_whitespace().any(|w| w == word) {
                entities.insert("date".into(), word.to_string());
                break;
            }
        }
    }

    match intent {
        Intent::AttendanceStart | Intent::AttendanceEnd => {
            // 「smith start work at 10:00」：首词若是普通词则视为人名
            if let Some(first) = lower.split_whitespace().next() {
                if first.chars().all(|c| c.is_ascii_alphabetic()) && !is_stopword(first) {
                    entities.insert("name".into(), first.to_string());
                }
            }
        }
        Intent::CreateEmployee => {
            // 「register smith smith@x.com dev」：register 后首个非邮箱词视为人名
            let mut words = lower.split_whitespace().skip_while(|w| *w != "register");
            words.next();
            if let Some(name) = words.find(|w| !w.contains('@') && !is_stopword(w)) {
                entities.insert("name".into(), name.to_string());
            }
        }
        Intent::MonthlyReport => {
            if let Some(m) = year_regex().find(lower) {
                entities.insert("year".into(), m.as_str().to_string());
            }
            for (i, month) in [
                "january", "february", "march", "april", "may", "june", "july", "august",
                "september", "october", "november", "december",
            ]
            .iter()
            .enumerate()
            {
                if lower.contains(month) {
                    entities.insert("month".into(), (i + 1).to_string());
                    break;
                }
            }
        }
        _ => {}
    }

    entities
}

fn is_stopword(word: &str) -> bool {
    matches!(
        word,
        "start" | "end" | "work" | "day" | "check" | "in" | "out" | "please" | "attendance"
            | "my" | "i" | "the" | "a" | "an" | "register" | "employee" | "new"
    )
}

#[async_trait]
impl Classifier for LlmClassifier {
    async fn classify(&self, text: &str) -> Result<ClassifierResult, ClassificationError> {
        if text.trim().is_empty() {
            return Err(ClassificationError("empty input".into()));
        }

        if self.enable_fast_match {
            if let Some(result) = self.fast_match(text) {
                debug!(intent = %result.intent, "fast-match classification");
                return Ok(result);
            }
        }

        self.llm_classify(text).await
    }
}

/// 脚本化分类器（测试用）：按入队顺序返回预设结果
#[derive(Default)]
pub struct ScriptedClassifier {
    script: Mutex<VecDeque<Result<ClassifierResult, ClassificationError>>>,
}

impl ScriptedClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, result: ClassifierResult) {
        self.script.lock().unwrap().push_back(Ok(result));
    }

    pub fn push_err(&self, message: &str) {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(ClassificationError(message.to_string())));
    }
}

#[async_trait]
impl Classifier for ScriptedClassifier {
    async fn classify(&self, _text: &str) -> Result<ClassifierResult, ClassificationError> {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ClassificationError("script exhausted".into())))
    }
}

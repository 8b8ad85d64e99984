//! Clerk - 对话式 HR 助手
//!
//! 入口：初始化日志与配置，装配编排器，跑一个逐行读入的对话循环。

use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::Context;
use clerk::config::load_config;
use clerk::llm::create_llm_from_config;
use clerk::nlu::LlmClassifier;
use clerk::orchestrator::TurnOrchestrator;
use clerk::policy::KeywordPolicyIndex;
use clerk::reply::render;
use clerk::session::Session;
use clerk::store::{open, AttendanceStore, EmployeeStore};
use clerk::timeutil::TimePolicy;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    clerk::observability::init();

    let cfg = load_config(None).context("Failed to load config")?;

    let conn = open(cfg.app.db_path.as_deref()).context("Failed to open database")?;
    let employees = EmployeeStore::new(conn.clone());
    let attendance = AttendanceStore::new(conn);

    let llm = create_llm_from_config(&cfg);
    let classifier = Arc::new(LlmClassifier::new(llm));
    let policy_index = Arc::new(KeywordPolicyIndex::load_dir(&cfg.policy.knowledge_dir));

    let orchestrator = TurnOrchestrator::new(classifier, employees, attendance, policy_index)
        .with_time_policy(TimePolicy {
            bare_hour_evening_cutoff: cfg.time.bare_hour_evening_cutoff,
        })
        .with_policy_top_k(cfg.policy.search_top_k);

    let mut session = Session::new();
    println!(
        "{} - type 'exit' to quit.",
        cfg.app.name.as_deref().unwrap_or("Clerk HR assistant")
    );

    let stdin = std::io::stdin();
    loop {
        print!("You: ");
        std::io::stdout().flush().context("Failed to flush stdout")?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).context("Failed to read input")? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input, "exit" | "quit") {
            break;
        }

        match orchestrator.handle_turn(&mut session, input).await {
            Ok(reply) => println!("Clerk: {}", render(&reply)),
            // 存储故障不终止对话，会话保持原状可重试
            Err(e) => {
                tracing::error!("turn failed: {}", e);
                println!("Clerk: Something went wrong on my side, please try again.");
            }
        }
    }

    Ok(())
}

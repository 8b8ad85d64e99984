//! 轮次编排器
//!
//! 每轮固定次序：分类 → 合并实体 → 连续性判定 → 路由到 handler → 整体提交。
//! 会话状态只在 handler 成功返回后一次性提交；存储错误直接冒泡，
//! 会话保持上一轮的样子，用户重试即可。

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::TurnError;
use crate::handlers;
use crate::nlu::{Action, Classifier, Intent};
use crate::policy::PolicyIndex;
use crate::reply::TurnReply;
use crate::session::{
    alias_for_intent, has_both_times, merge, reapply, resolve_intent, EntityMap, Session,
};
use crate::store::{AttendanceStore, EmployeeStore};
use crate::timeutil::TimePolicy;

pub struct TurnOrchestrator {
    classifier: Arc<dyn Classifier>,
    employees: EmployeeStore,
    attendance: AttendanceStore,
    policy_index: Arc<dyn PolicyIndex>,
    time_policy: TimePolicy,
    policy_top_k: usize,
}

impl TurnOrchestrator {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        employees: EmployeeStore,
        attendance: AttendanceStore,
        policy_index: Arc<dyn PolicyIndex>,
    ) -> Self {
        Self {
            classifier,
            employees,
            attendance,
            policy_index,
            time_policy: TimePolicy::default(),
            policy_top_k: 4,
        }
    }

    pub fn with_time_policy(mut self, policy: TimePolicy) -> Self {
        self.time_policy = policy;
        self
    }

    pub fn with_policy_top_k(mut self, top_k: usize) -> Self {
        self.policy_top_k = top_k;
        self
    }

    /// 处理一轮用户输入
    ///
    /// 分类失败不是错误：回一句听不懂，会话原样保留。
    pub async fn handle_turn(
        &self,
        session: &mut Session,
        input: &str,
    ) -> Result<TurnReply, TurnError> {
        let classified = match self.classifier.classify(input).await {
            Ok(c) => c,
            Err(e) => {
                warn!(session = %session.id, "classification failed: {}", e);
                return Ok(TurnReply::CouldNotUnderstand);
            }
        };
        let raw_intent = classified.intent;
        let action = classified.action;
        debug!(
            raw = %raw_intent,
            action = %action,
            confidence = classified.confidence,
            "classified"
        );

        if action == Action::Cancel {
            session.reset();
            return Ok(TurnReply::Cancelled);
        }

        // 候选实体：先合并，提交与否等 handler 说了算
        let mut entities = merge(
            &session.entities,
            &classified.entities,
            raw_intent,
            &self.time_policy,
        );
        let effective = resolve_intent(
            raw_intent,
            action,
            session.effective_intent,
            has_both_times(&entities),
        );

        // 确认轮：一句 "yes" 不能丢掉之前收集到的字段
        let prev_in_progress = session
            .effective_intent
            .map(|i| i.is_attendance_in_progress())
            .unwrap_or(false);
        if action == Action::Confirm && prev_in_progress {
            reapply(&session.entities, &mut entities);
        }

        // 显式话题切换：旧话题的实体不带入新话题
        if let Some(prev) = session.effective_intent {
            if effective != Intent::Unknown && prev.topic() != effective.topic() {
                entities = merge(
                    &EntityMap::new(),
                    &classified.entities,
                    raw_intent,
                    &self.time_policy,
                );
            }
        }

        // 粘性轮的生效意图在合并之后才定下来，别名合成按它补一遍
        alias_for_intent(&mut entities, &classified.entities, effective);

        info!(
            session = %session.id,
            raw = %raw_intent,
            effective = %effective,
            action = %action,
            "turn resolved"
        );

        let reply = match effective {
            Intent::CreateEmployee => handlers::employee::create(&self.employees, &mut entities)?,
            Intent::FindEmployee => handlers::employee::find(&self.employees, &entities)?,
            Intent::AttendanceStart
            | Intent::AttendanceEnd
            | Intent::AttendanceRange
            | Intent::AttendanceSummary => handlers::attendance::handle(
                effective,
                action,
                &self.employees,
                &self.attendance,
                &mut entities,
            )?,
            Intent::DailyReport | Intent::MonthlyReport | Intent::WorkingHours => {
                handlers::report::handle(effective, &self.employees, &self.attendance, &mut entities)?
            }
            Intent::HrPolicy => {
                handlers::policy::handle(&self.policy_index, self.policy_top_k, &entities, input)
            }
            Intent::Unknown => TurnReply::Unknown,
        };

        // 整体提交：走到这里 handler 一定成功了。
        // unknown 不是显式话题切换，不覆盖进行中的意图，
        // 否则下一轮会被误判为话题切换而丢掉已累积的实体
        if effective != Intent::Unknown {
            session.effective_intent = Some(effective);
        }
        session.entities = entities;
        session.last_action = Some(action);
        Ok(reply)
    }
}

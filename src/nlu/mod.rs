//! 自然语言理解层
//!
//! 意图 / 动作标签与分类器适配：标签归一化在此完成，下游只见枚举值。

mod classifier;
mod intent;

pub use classifier::{
    ClassificationError, Classifier, ClassifierResult, LlmClassifier, ScriptedClassifier,
};
pub use intent::{missing_fields, Action, Intent, Topic};

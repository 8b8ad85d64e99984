//! 轮次级错误
//!
//! 只有基础设施故障（存储）会成为 TurnError；分类失败、实体缺失等
//! 业务性问题都走 TurnReply，不算错误。

use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum TurnError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

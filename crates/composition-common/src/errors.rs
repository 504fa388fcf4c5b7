//! 错误类型定义

use thiserror::Error;

/// 组合核心错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompositionError {
    #[error("支撑类型已被目录中另一个部件占用: {type_name}")]
    DuplicatePartType { type_name: String },

    #[error("泛型实参数量不匹配: {contract_name}, 期望 {expected}, 实际 {actual}")]
    GenericArityMismatch {
        contract_name: String,
        expected: usize,
        actual: usize,
    },

    #[error("类型不是开放泛型，无法闭合: {type_name}")]
    NotOpenGeneric { type_name: String },

    #[error("元数据视图不兼容: {view_type}, 原因: {reason}")]
    MetadataViewIncompatible { view_type: String, reason: String },

    #[error("延迟值类型不匹配: 期望 {expected_type}")]
    ValueTypeMismatch { expected_type: String },
}

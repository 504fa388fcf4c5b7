//! 部件发现结果记录
//!
//! 发现过程本身在本层之外进行，这里只建模其结果：
//! 一组部件定义与伴随的发现诊断信息，可按序合并

use crate::PartDefinition;
use std::sync::Arc;

/// 单条部件发现诊断
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartDiscoveryError {
    /// 出错部件的名称
    pub part_name: String,
    /// 诊断信息
    pub message: String,
}

impl PartDiscoveryError {
    /// 创建发现诊断
    pub fn new(part_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            part_name: part_name.into(),
            message: message.into(),
        }
    }
}

/// 部件发现结果
///
/// 将发现到的部件与发现诊断捆绑在一起；诊断只是来源侧信道，
/// 不参与目录相等性比较
#[derive(Debug, Clone, Default)]
pub struct DiscoveredParts {
    /// 发现到的部件
    parts: Vec<Arc<PartDefinition>>,
    /// 发现诊断，保持产生顺序
    errors: Vec<PartDiscoveryError>,
}

impl DiscoveredParts {
    /// 创建空结果
    pub fn empty() -> Self {
        Self::default()
    }

    /// 创建发现结果
    pub fn new(parts: Vec<Arc<PartDefinition>>, errors: Vec<PartDiscoveryError>) -> Self {
        Self { parts, errors }
    }

    /// 发现到的部件
    pub fn parts(&self) -> &[Arc<PartDefinition>] {
        &self.parts
    }

    /// 发现诊断
    pub fn errors(&self) -> &[PartDiscoveryError] {
        &self.errors
    }

    /// 按序合并两个发现结果
    ///
    /// 简单保序拼接，满足结合律
    pub fn merge(&self, other: &DiscoveredParts) -> DiscoveredParts {
        let mut parts = self.parts.clone();
        parts.extend(other.parts.iter().cloned());
        let mut errors = self.errors.clone();
        errors.extend(other.errors.iter().cloned());
        DiscoveredParts { parts, errors }
    }
}

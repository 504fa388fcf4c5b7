//! 元数据模型
//!
//! 定义导出/导入声明携带的类型化元数据及约定键名

use crate::TypeRef;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 开放泛型请求的合约名称键
///
/// 导入元数据中携带该键时，值为开放泛型合约的名称
pub const GENERIC_CONTRACT_METADATA_NAME: &str = "composition.generic_contract";

/// 开放泛型请求的类型实参键
///
/// 导入元数据中携带该键时，值为按序排列的具体类型实参
pub const GENERIC_PARAMETERS_METADATA_NAME: &str = "composition.generic_parameters";

/// 类型化元数据值
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetadataValue {
    /// 字符串值
    String(String),
    /// 布尔值
    Bool(bool),
    /// 整数值
    Integer(i64),
    /// 类型引用
    Type(TypeRef),
    /// 按序排列的类型引用列表
    TypeList(Vec<TypeRef>),
}

impl MetadataValue {
    /// 读取字符串值
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// 读取布尔值
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MetadataValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// 读取整数值
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            MetadataValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// 读取类型引用
    pub fn as_type(&self) -> Option<&TypeRef> {
        match self {
            MetadataValue::Type(t) => Some(t),
            _ => None,
        }
    }

    /// 读取类型引用列表
    pub fn as_type_list(&self) -> Option<&[TypeRef]> {
        match self {
            MetadataValue::TypeList(l) => Some(l),
            _ => None,
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::String(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::String(value)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        MetadataValue::Bool(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        MetadataValue::Integer(value)
    }
}

/// 元数据映射
///
/// 使用有序映射保证声明对象的哈希与相等性确定
pub type MetadataMap = BTreeMap<String, MetadataValue>;

//! # Composition Common
//!
//! 组合引擎的声明层，定义部件、导出、导入等不可变值对象。
//!
//! ## 核心类型
//!
//! - [`PartDefinition`] - 部件定义
//! - [`ExportDefinition`] - 导出定义
//! - [`ImportDefinition`] - 导入定义
//! - [`TypeRef`] - 符号化类型引用
//! - [`DiscoveredParts`] - 部件发现结果记录
//!
//! ## 设计原则
//!
//! - 所有声明对象创建后不可变
//! - 符号化类型标识，不要求类型已被加载
//! - 结构化相等性，支持目录级集合语义

pub mod discovery;
pub mod errors;
pub mod metadata;
pub mod part;
pub mod type_ref;

pub use discovery::*;
pub use errors::*;
pub use metadata::*;
pub use part::*;
pub use type_ref::*;

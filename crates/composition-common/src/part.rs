//! 部件、导出与导入定义
//!
//! 组合引擎的核心声明对象，全部为创建后不可变的值对象

use crate::{
    MetadataMap, MetadataValue, ModuleId, ModuleRef, MemberRef, TypeRef,
    GENERIC_CONTRACT_METADATA_NAME, GENERIC_PARAMETERS_METADATA_NAME,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// 导出定义
///
/// 部件对外提供的具名能力：合约名称 + 元数据
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExportDefinition {
    /// 合约名称
    contract_name: String,
    /// 导出元数据，可包含泛型合约标记
    metadata: MetadataMap,
}

impl ExportDefinition {
    /// 创建导出定义
    pub fn new(contract_name: impl Into<String>) -> Self {
        Self {
            contract_name: contract_name.into(),
            metadata: MetadataMap::new(),
        }
    }

    /// 附加元数据项
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// 替换整个元数据映射
    pub fn with_metadata_map(mut self, metadata: MetadataMap) -> Self {
        self.metadata = metadata;
        self
    }

    /// 合约名称
    pub fn contract_name(&self) -> &str {
        &self.contract_name
    }

    /// 导出元数据
    pub fn metadata(&self) -> &MetadataMap {
        &self.metadata
    }
}

/// 导出约束
///
/// 针对导出定义元数据求值的谓词，导入的所有约束必须同时成立
pub trait ExportConstraint: Send + Sync + std::fmt::Debug {
    /// 判断导出定义是否满足约束
    fn is_satisfied_by(&self, export: &ExportDefinition) -> bool;
}

/// 基于元数据精确匹配的约束
///
/// 要求导出元数据中存在全部给定键值对
#[derive(Debug, Clone, Default)]
pub struct MetadataConstraint {
    /// 必须存在的键值对
    required: MetadataMap,
}

impl MetadataConstraint {
    /// 创建空约束（恒满足）
    pub fn new() -> Self {
        Self::default()
    }

    /// 要求某键值对存在
    pub fn require(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.required.insert(key.into(), value.into());
        self
    }
}

impl ExportConstraint for MetadataConstraint {
    fn is_satisfied_by(&self, export: &ExportDefinition) -> bool {
        self.required
            .iter()
            .all(|(key, value)| export.metadata().get(key) == Some(value))
    }
}

/// 导入定义
///
/// 描述一次导入请求：合约名称、元数据与合取式导出约束。
/// 元数据同时携带两个泛型标记键时，视为对开放泛型合约的请求
#[derive(Debug, Clone)]
pub struct ImportDefinition {
    /// 合约名称
    contract_name: String,
    /// 导入元数据
    metadata: MetadataMap,
    /// 导出约束，全部成立才保留候选
    constraints: Vec<Arc<dyn ExportConstraint>>,
}

impl ImportDefinition {
    /// 创建导入定义
    pub fn new(contract_name: impl Into<String>) -> Self {
        Self {
            contract_name: contract_name.into(),
            metadata: MetadataMap::new(),
            constraints: Vec::new(),
        }
    }

    /// 附加元数据项
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// 附加导出约束
    pub fn with_constraint(mut self, constraint: Arc<dyn ExportConstraint>) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// 标记为对开放泛型合约的请求
    pub fn with_generic_request(self, open_contract: impl Into<String>, args: Vec<TypeRef>) -> Self {
        self.with_metadata(
            GENERIC_CONTRACT_METADATA_NAME,
            MetadataValue::String(open_contract.into()),
        )
        .with_metadata(
            GENERIC_PARAMETERS_METADATA_NAME,
            MetadataValue::TypeList(args),
        )
    }

    /// 合约名称
    pub fn contract_name(&self) -> &str {
        &self.contract_name
    }

    /// 导入元数据
    pub fn metadata(&self) -> &MetadataMap {
        &self.metadata
    }

    /// 导出约束
    pub fn constraints(&self) -> &[Arc<dyn ExportConstraint>] {
        &self.constraints
    }

    /// 检测开放泛型请求
    ///
    /// 仅当两个标记键同时存在且取值形态正确时返回 `Some`；
    /// 只出现其一视为普通请求而非错误
    pub fn open_generic_request(&self) -> Option<(&str, &[TypeRef])> {
        let contract = self
            .metadata
            .get(GENERIC_CONTRACT_METADATA_NAME)?
            .as_str()?;
        let args = self
            .metadata
            .get(GENERIC_PARAMETERS_METADATA_NAME)?
            .as_type_list()?;
        Some((contract, args))
    }
}

/// 部件定义
///
/// 标识一个支撑类型及其类型级/成员级导出与元数据。
/// 目录内以支撑类型为唯一身份：同一支撑类型不允许出现两个不同的部件定义
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartDefinition {
    /// 支撑类型
    type_ref: TypeRef,
    /// 类型级导出
    exported_types: Vec<ExportDefinition>,
    /// 成员级导出，保持声明顺序
    exporting_members: Vec<(MemberRef, Vec<ExportDefinition>)>,
    /// 部件元数据
    metadata: MetadataMap,
}

impl PartDefinition {
    /// 创建部件定义
    pub fn new(type_ref: TypeRef) -> Self {
        Self {
            type_ref,
            exported_types: Vec::new(),
            exporting_members: Vec::new(),
            metadata: MetadataMap::new(),
        }
    }

    /// 附加类型级导出
    pub fn with_type_export(mut self, export: ExportDefinition) -> Self {
        self.exported_types.push(export);
        self
    }

    /// 附加成员级导出
    pub fn with_member_export(mut self, member: MemberRef, export: ExportDefinition) -> Self {
        if let Some((_, exports)) = self
            .exporting_members
            .iter_mut()
            .find(|(m, _)| *m == member)
        {
            exports.push(export);
        } else {
            self.exporting_members.push((member, vec![export]));
        }
        self
    }

    /// 附加部件元数据项
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// 支撑类型
    pub fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    /// 类型级导出
    pub fn exported_types(&self) -> &[ExportDefinition] {
        &self.exported_types
    }

    /// 成员级导出
    pub fn exporting_members(&self) -> &[(MemberRef, Vec<ExportDefinition>)] {
        &self.exporting_members
    }

    /// 部件元数据
    pub fn metadata(&self) -> &MetadataMap {
        &self.metadata
    }

    /// 收集部件引用的所有模块身份
    ///
    /// 身份解析开销较大，由调用方通过 `resolve` 提供带缓存的查找
    pub fn collect_input_modules(
        &self,
        out: &mut HashSet<ModuleId>,
        resolve: &mut dyn FnMut(&ModuleRef) -> ModuleId,
    ) {
        let mut refs: Vec<&ModuleRef> = Vec::new();
        self.type_ref.collect_module_refs(&mut refs);
        for (member, _) in &self.exporting_members {
            member.declaring_type.collect_module_refs(&mut refs);
        }
        for value in self.metadata.values() {
            if let Some(type_ref) = value.as_type() {
                type_ref.collect_module_refs(&mut refs);
            }
            if let Some(list) = value.as_type_list() {
                for type_ref in list {
                    type_ref.collect_module_refs(&mut refs);
                }
            }
        }
        for module_ref in refs {
            out.insert(resolve(module_ref));
        }
    }
}

//! 导出绑定
//!
//! 将导出定义与其所属部件（及可选的产出成员）绑定在一起，
//! 并提供开放泛型导出的闭合运算

use composition_common::{
    close_generic_name, CompositionError, ExportDefinition, MemberRef, MetadataValue,
    PartDefinition, TypeRef, GENERIC_CONTRACT_METADATA_NAME, GENERIC_PARAMETERS_METADATA_NAME,
};
use std::sync::Arc;

/// 导出绑定
///
/// (导出定义, 所属部件, 可选产出成员) 三元组；
/// 成员为空表示导出即部件类型本身。相等性遵循三个分量的结构相等
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExportBinding {
    /// 导出定义
    export_definition: ExportDefinition,
    /// 所属部件定义
    part_definition: Arc<PartDefinition>,
    /// 产出导出的成员，类型级导出为空
    member: Option<MemberRef>,
}

impl ExportBinding {
    /// 创建导出绑定
    pub fn new(
        export_definition: ExportDefinition,
        part_definition: Arc<PartDefinition>,
        member: Option<MemberRef>,
    ) -> Self {
        Self {
            export_definition,
            part_definition,
            member,
        }
    }

    /// 导出定义
    pub fn export_definition(&self) -> &ExportDefinition {
        &self.export_definition
    }

    /// 所属部件定义
    pub fn part_definition(&self) -> &Arc<PartDefinition> {
        &self.part_definition
    }

    /// 产出导出的成员
    pub fn member(&self) -> Option<&MemberRef> {
        self.member.as_ref()
    }

    /// 以具体类型实参闭合开放泛型导出
    ///
    /// 纯变换：产生描述特化合约身份的全新绑定，原绑定与目录不受影响。
    /// 实参数量与声明元数不符时在此处失败，不做静默吞咽
    pub fn close_generic(&self, type_args: &[TypeRef]) -> Result<ExportBinding, CompositionError> {
        let open_contract = self.export_definition.contract_name();
        let closed_contract = close_generic_name(open_contract, type_args)?;

        let mut metadata = self.export_definition.metadata().clone();
        metadata.insert(
            GENERIC_CONTRACT_METADATA_NAME.to_string(),
            MetadataValue::String(open_contract.to_string()),
        );
        metadata.insert(
            GENERIC_PARAMETERS_METADATA_NAME.to_string(),
            MetadataValue::TypeList(type_args.to_vec()),
        );

        Ok(ExportBinding {
            export_definition: ExportDefinition::new(closed_contract).with_metadata_map(metadata),
            part_definition: Arc::clone(&self.part_definition),
            member: self.member.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use composition_common::ModuleRef;

    fn open_binding() -> ExportBinding {
        let module = ModuleRef::new("demo", "1.0.0");
        let part = Arc::new(
            PartDefinition::new(TypeRef::new(module, "ContainerPart"))
                .with_type_export(ExportDefinition::new("Container<>")),
        );
        let export = part.exported_types()[0].clone();
        ExportBinding::new(export, part, None)
    }

    #[test]
    fn closing_specializes_contract_and_records_markers() {
        let binding = open_binding();
        let int = TypeRef::new(ModuleRef::new("demo", "1.0.0"), "Int");
        let closed = binding.close_generic(std::slice::from_ref(&int)).unwrap();

        assert_eq!(closed.export_definition().contract_name(), "Container<Int>");
        let markers = closed.export_definition().metadata();
        assert_eq!(
            markers.get(GENERIC_CONTRACT_METADATA_NAME),
            Some(&MetadataValue::String("Container<>".to_string()))
        );
        assert_eq!(
            markers.get(GENERIC_PARAMETERS_METADATA_NAME),
            Some(&MetadataValue::TypeList(vec![int]))
        );
        // 原绑定保持开放
        assert_eq!(binding.export_definition().contract_name(), "Container<>");
    }

    #[test]
    fn closing_with_wrong_arity_is_an_error() {
        let binding = open_binding();
        let module = ModuleRef::new("demo", "1.0.0");
        let args = [
            TypeRef::new(module.clone(), "Int"),
            TypeRef::new(module, "String"),
        ];
        assert!(matches!(
            binding.close_generic(&args),
            Err(CompositionError::GenericArityMismatch { expected: 1, actual: 2, .. })
        ));
    }
}

//! 声明层值对象的集成测试

use composition_common::{
    DiscoveredParts, ExportConstraint, ExportDefinition, ImportDefinition, MemberRef,
    MetadataConstraint, MetadataValue, ModuleRef, PartDefinition, PartDiscoveryError, TypeRef,
};
use std::collections::HashSet;
use std::sync::Arc;

fn module() -> ModuleRef {
    ModuleRef::new("demo", "1.0.0")
}

#[test]
fn part_definitions_compare_structurally() {
    let make = || {
        PartDefinition::new(TypeRef::new(module(), "FooPart"))
            .with_type_export(ExportDefinition::new("Foo").with_metadata("color", "red"))
    };
    assert_eq!(make(), make());

    let different = make().with_metadata("priority", 1i64);
    assert_ne!(make(), different);
}

#[test]
fn open_generic_request_needs_both_marker_keys() {
    let int = TypeRef::new(module(), "Int");
    let full = ImportDefinition::new("Container<Int>")
        .with_generic_request("Container<>", vec![int.clone()]);
    let (contract, args) = full.open_generic_request().unwrap();
    assert_eq!(contract, "Container<>");
    assert_eq!(args, std::slice::from_ref(&int));

    // 只带其一视为普通请求
    let only_contract = ImportDefinition::new("Container<Int>").with_metadata(
        composition_common::GENERIC_CONTRACT_METADATA_NAME,
        "Container<>",
    );
    assert!(only_contract.open_generic_request().is_none());

    let only_args = ImportDefinition::new("Container<Int>").with_metadata(
        composition_common::GENERIC_PARAMETERS_METADATA_NAME,
        MetadataValue::TypeList(vec![TypeRef::new(module(), "Int")]),
    );
    assert!(only_args.open_generic_request().is_none());

    // 取值形态不对同样视为普通请求
    let wrong_shape = ImportDefinition::new("Container<Int>")
        .with_metadata(composition_common::GENERIC_CONTRACT_METADATA_NAME, true)
        .with_metadata(
            composition_common::GENERIC_PARAMETERS_METADATA_NAME,
            MetadataValue::TypeList(Vec::new()),
        );
    assert!(wrong_shape.open_generic_request().is_none());
}

#[test]
fn metadata_constraint_requires_every_pair() {
    let export = ExportDefinition::new("Widget")
        .with_metadata("color", "red")
        .with_metadata("size", 3i64);

    let satisfied = MetadataConstraint::new().require("color", "red").require("size", 3i64);
    assert!(satisfied.is_satisfied_by(&export));

    let unsatisfied = MetadataConstraint::new().require("color", "red").require("size", 4i64);
    assert!(!unsatisfied.is_satisfied_by(&export));

    // 空约束恒满足
    assert!(MetadataConstraint::new().is_satisfied_by(&export));
}

#[test]
fn discovered_parts_merge_is_associative_and_ordered() {
    let part = |name: &str| {
        Arc::new(
            PartDefinition::new(TypeRef::new(module(), name))
                .with_type_export(ExportDefinition::new(name)),
        )
    };
    let a = DiscoveredParts::new(vec![part("A")], vec![PartDiscoveryError::new("A", "一")]);
    let b = DiscoveredParts::new(vec![part("B")], vec![PartDiscoveryError::new("B", "二")]);
    let c = DiscoveredParts::new(vec![part("C")], vec![PartDiscoveryError::new("C", "三")]);

    let left = a.merge(&b).merge(&c);
    let right = a.merge(&b.merge(&c));

    assert_eq!(left.parts(), right.parts());
    assert_eq!(left.errors(), right.errors());
    let order: Vec<&str> = left.errors().iter().map(|e| e.part_name.as_str()).collect();
    assert_eq!(order, ["A", "B", "C"]);
}

#[test]
fn part_definitions_survive_json_serialization() {
    // 发现过程产出的声明对象可序列化传递，反序列化后保持结构相等
    let part = PartDefinition::new(TypeRef::new(module(), "ProviderPart"))
        .with_type_export(ExportDefinition::new("Provider").with_metadata("color", "red"))
        .with_member_export(
            MemberRef::new(TypeRef::new(module(), "ProviderPart"), "make_widget"),
            ExportDefinition::new("Widget"),
        )
        .with_metadata("priority", 1i64);

    let json = serde_json::to_string(&part).unwrap();
    let restored: PartDefinition = serde_json::from_str(&json).unwrap();
    assert_eq!(part, restored);
}

#[test]
fn input_modules_resolve_through_the_supplied_cache() {
    let other = ModuleRef::new("other", "2.0.0");
    let part = PartDefinition::new(TypeRef::new(module(), "FooPart")).with_metadata(
        "related",
        MetadataValue::Type(TypeRef::new(other.clone(), "Helper")),
    );

    let mut resolutions = 0usize;
    let mut modules = HashSet::new();
    part.collect_input_modules(&mut modules, &mut |module_ref| {
        resolutions += 1;
        module_ref.resolve_identity()
    });

    assert_eq!(modules.len(), 2);
    assert!(modules.contains(&other.resolve_identity()));
    assert_eq!(resolutions, 2);
}

//! 可组合目录
//!
//! 索引部件导出、支持写时复制式增量合并，并按导入定义
//! 解析候选导出绑定（含开放泛型闭合）

use crate::{ExportBinding, NonSharingHashSet, Resolver};
use composition_common::{
    CompositionError, DiscoveredParts, ExportDefinition, ImportDefinition, MemberRef, ModuleId,
    ModuleRef, PartDefinition, TypeRef,
};
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::debug;

/// 可组合目录
///
/// 不可变快照：{部件集合, 合约名 → 有序导出绑定列表, 已占用的支撑类型集合}。
/// 所有"变更"操作都产生新快照，原快照可被任意线程无同步并发读取。
/// 两个目录相等当且仅当其部件集合相等，合并历史与发现诊断不参与比较
#[derive(Clone)]
pub struct ComposableCatalog {
    /// 目录中的部件，请勿变更
    parts: HashSet<Arc<PartDefinition>>,
    /// 按合约名索引的导出绑定，桶以 Arc 共享，请勿变更
    exports_by_contract: HashMap<String, Arc<Vec<ExportBinding>>>,
    /// 已被部件占用的支撑类型，请勿变更
    types_backing_parts: HashSet<Arc<TypeRef>>,
    /// 附着的发现记录
    discovered: DiscoveredParts,
    /// 解析器上下文
    resolver: Resolver,
}

impl ComposableCatalog {
    /// 创建绑定到给定解析器上下文的空目录
    pub fn create(resolver: Resolver) -> Self {
        Self {
            parts: HashSet::new(),
            exports_by_contract: HashMap::new(),
            types_backing_parts: HashSet::new(),
            discovered: DiscoveredParts::empty(),
            resolver,
        }
    }

    /// 解析器上下文
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// 目录中的部件快照
    pub fn parts(&self) -> NonSharingHashSet<Arc<PartDefinition>> {
        self.parts.iter().cloned().collect()
    }

    /// 附着的发现记录
    pub fn discovered_parts(&self) -> &DiscoveredParts {
        &self.discovered
    }

    /// 加入单个部件，返回新目录
    pub fn add_part(&self, part: Arc<PartDefinition>) -> Result<Self, CompositionError> {
        self.add_parts([part])
    }

    /// 加入一批部件，返回新目录
    ///
    /// 结构相等的已有部件被静默跳过（幂等）；支撑类型已被其他部件
    /// 占用时以配置错误失败，调用方目录不受任何部分影响。
    /// 写时复制：只有收到新绑定的合约桶会被复制，其余桶按引用共享
    pub fn add_parts<I>(&self, parts: I) -> Result<Self, CompositionError>
    where
        I: IntoIterator<Item = Arc<PartDefinition>>,
    {
        let _guard = self.resolver.metrics().begin_add_parts();

        let mut new_parts = self.parts.clone();
        let mut new_types = self.types_backing_parts.clone();
        // 本次调用触及的合约桶；未触及的桶保持与旧快照共享
        let mut touched: HashMap<String, Vec<ExportBinding>> = HashMap::new();
        let mut added = 0usize;

        for part in parts {
            if new_parts.contains(&part) {
                // 部件已在目录中
                continue;
            }

            let backing = self.resolver.intern(part.type_ref().clone());
            if new_types.contains(&backing) {
                return Err(CompositionError::DuplicatePartType {
                    type_name: part.type_ref().full_name().to_string(),
                });
            }

            Self::add_export_bindings(
                part.exported_types(),
                &part,
                None,
                &self.exports_by_contract,
                &mut touched,
            );
            for (member, exports) in part.exporting_members() {
                Self::add_export_bindings(
                    exports,
                    &part,
                    Some(member),
                    &self.exports_by_contract,
                    &mut touched,
                );
            }

            new_parts.insert(part);
            new_types.insert(backing);
            added += 1;
        }

        let mut new_exports = self.exports_by_contract.clone();
        for (contract, bucket) in touched {
            new_exports.insert(contract, Arc::new(bucket));
        }

        debug!(added, total = new_parts.len(), "目录加入部件");

        Ok(Self {
            parts: new_parts,
            exports_by_contract: new_exports,
            types_backing_parts: new_types,
            discovered: self.discovered.clone(),
            resolver: self.resolver.clone(),
        })
    }

    fn add_export_bindings(
        exports: &[ExportDefinition],
        part: &Arc<PartDefinition>,
        member: Option<&MemberRef>,
        existing: &HashMap<String, Arc<Vec<ExportBinding>>>,
        touched: &mut HashMap<String, Vec<ExportBinding>>,
    ) {
        for export in exports {
            let binding = ExportBinding::new(export.clone(), Arc::clone(part), member.cloned());
            touched
                .entry(export.contract_name().to_string())
                .or_insert_with(|| {
                    // 首次触及该合约：复制既有桶作为新桶的起点
                    existing
                        .get(export.contract_name())
                        .map(|bucket| bucket.as_ref().clone())
                        .unwrap_or_default()
                })
                .push(binding);
        }
    }

    /// 折叠发现结果：加入其中的部件并合并发现记录
    pub fn add_discovered(&self, discovered: &DiscoveredParts) -> Result<Self, CompositionError> {
        let mut catalog = self.add_parts(discovered.parts().iter().cloned())?;
        catalog.discovered = self.discovered.merge(discovered);
        Ok(catalog)
    }

    /// 目录并集：加入另一目录的全部部件并合并发现记录
    pub fn add_catalog(&self, other: &ComposableCatalog) -> Result<Self, CompositionError> {
        let mut catalog = self.add_parts(other.parts.iter().cloned())?;
        catalog.discovered = self.discovered.merge(&other.discovered);
        Ok(catalog)
    }

    /// 多目录并集，从左到右折叠
    pub fn add_catalogs<'a, I>(&self, others: I) -> Result<Self, CompositionError>
    where
        I: IntoIterator<Item = &'a ComposableCatalog>,
    {
        others
            .into_iter()
            .try_fold(self.clone(), |catalog, other| catalog.add_catalog(other))
    }

    /// 目录内所有部件引用的模块身份，按身份去重
    ///
    /// 身份解析开销较大，本次调用内以模块引用为键做一次性缓存
    pub fn input_modules(&self) -> HashSet<ModuleId> {
        let mut cache: HashMap<ModuleRef, ModuleId> = HashMap::new();
        let mut modules = HashSet::new();
        for part in &self.parts {
            part.collect_input_modules(&mut modules, &mut |module_ref| {
                cache
                    .entry(module_ref.clone())
                    .or_insert_with(|| module_ref.resolve_identity())
                    .clone()
            });
        }
        modules
    }

    /// 解析导入请求，返回候选导出绑定的有序列表
    ///
    /// 1. 取合约名对应的直接桶（缺失视为空列表，无匹配不是错误）；
    /// 2. 元数据同时携带两个泛型标记键时视为开放泛型请求；
    /// 3. 对开放合约桶中的每个绑定做闭合，元数不符的闭合失败向外传播；
    /// 4. 直接绑定在前、闭合绑定在后，各自保持插入顺序；
    /// 5. 以导入的全部约束做合取过滤；
    /// 6. 不做唯一性与基数裁决，交由下游激活引擎
    pub fn get_exports(
        &self,
        import: &ImportDefinition,
    ) -> Result<Vec<ExportBinding>, CompositionError> {
        let mut exports: Vec<ExportBinding> = self
            .exports_by_contract
            .get(import.contract_name())
            .map(|bucket| bucket.as_ref().clone())
            .unwrap_or_default();

        if let Some((open_contract, type_args)) = import.open_generic_request() {
            if let Some(open_bucket) = self.exports_by_contract.get(open_contract) {
                // 针对请求的类型实参合成闭合导出
                for binding in open_bucket.iter() {
                    exports.push(binding.close_generic(type_args)?);
                }
            }
        }

        let filtered: Vec<ExportBinding> = exports
            .into_iter()
            .filter(|binding| {
                import
                    .constraints()
                    .iter()
                    .all(|constraint| constraint.is_satisfied_by(binding.export_definition()))
            })
            .collect();

        debug!(
            contract = import.contract_name(),
            candidates = filtered.len(),
            "解析导入请求"
        );
        Ok(filtered)
    }
}

impl PartialEq for ComposableCatalog {
    fn eq(&self, other: &Self) -> bool {
        // 目录就是部件之和，其余都是发现方式的副作用，不参与等价比较
        self.parts == other.parts
    }
}

impl Eq for ComposableCatalog {}

impl Hash for ComposableCatalog {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // 部件数量加上各部件哈希的顺序无关求和，与集合相等性一致
        let mut combined = self.parts.len() as u64;
        for part in &self.parts {
            let mut hasher = DefaultHasher::new();
            part.hash(&mut hasher);
            combined = combined.wrapping_add(hasher.finish());
        }
        state.write_u64(combined);
    }
}

impl fmt::Debug for ComposableCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComposableCatalog")
            .field("parts", &self.parts.len())
            .field("contracts", &self.exports_by_contract.len())
            .finish()
    }
}

impl fmt::Display for ComposableCatalog {
    /// 渲染缩进的部件树，仅用于诊断
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            writeln!(f, "Part: {}", part.type_ref().full_name())?;
            for export in part.exported_types() {
                writeln!(f, "    Export: {}", export.contract_name())?;
            }
            for (member, exports) in part.exporting_members() {
                for export in exports {
                    writeln!(
                        f,
                        "    Export ({}): {}",
                        member.name,
                        export.contract_name()
                    )?;
                }
            }
        }
        Ok(())
    }
}

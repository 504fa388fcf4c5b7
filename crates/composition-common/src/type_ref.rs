//! 符号化类型引用
//!
//! 提供不依赖已加载类型的类型标识，支持开放泛型的闭合运算

use crate::CompositionError;
use serde::{Deserialize, Serialize};

/// 代码模块引用
///
/// 指向部件来源模块的轻量引用，解析为规范身份的开销较大，
/// 调用方应在单次查询内做记忆化缓存
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleRef {
    /// 模块名称
    pub name: String,
    /// 模块版本
    pub version: String,
}

impl ModuleRef {
    /// 创建模块引用
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// 解析模块的规范身份
    ///
    /// 对应于从已加载引用计算完整身份的昂贵操作，单次查询内应缓存结果
    pub fn resolve_identity(&self) -> ModuleId {
        ModuleId {
            name: self.name.clone(),
            version: self.version.clone(),
        }
    }
}

/// 模块的规范身份
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleId {
    /// 模块名称
    pub name: String,
    /// 模块版本
    pub version: String,
}

/// 符号化类型引用
///
/// 以"名称 + 泛型元数 + 已应用的泛型实参"描述类型标识，
/// 闭合运算是纯函数，不要求类型已被加载
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    /// 所属模块
    module: ModuleRef,
    /// 完整类型名称，开放泛型以 `<>` / `<,>` 等后缀标记元数
    full_name: String,
    /// 泛型元数
    generic_arity: usize,
    /// 已应用的泛型实参，开放泛型为空
    generic_type_arguments: Vec<TypeRef>,
}

impl TypeRef {
    /// 创建类型引用，元数从名称后缀解析
    pub fn new(module: ModuleRef, full_name: impl Into<String>) -> Self {
        let full_name = full_name.into();
        let generic_arity = generic_arity_of(&full_name);
        Self {
            module,
            full_name,
            generic_arity,
            generic_type_arguments: Vec::new(),
        }
    }

    /// 所属模块
    pub fn module(&self) -> &ModuleRef {
        &self.module
    }

    /// 完整类型名称
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// 不含元数后缀与已应用实参的基础名称
    ///
    /// 开放形式（`Container<>`）与闭合形式（`Container<Int>`）
    /// 的基础名称一致，符号化形状测试依赖这一点
    pub fn base_name(&self) -> &str {
        if !self.generic_type_arguments.is_empty() {
            if let Some(start) = self.full_name.find('<') {
                return &self.full_name[..start];
            }
        }
        base_name_of(&self.full_name)
    }

    /// 不含模块路径的简短名称
    pub fn short_name(&self) -> &str {
        self.base_name()
            .rsplit("::")
            .next()
            .unwrap_or_else(|| self.base_name())
    }

    /// 泛型元数
    pub fn generic_arity(&self) -> usize {
        self.generic_arity
    }

    /// 已应用的泛型实参
    pub fn generic_type_arguments(&self) -> &[TypeRef] {
        &self.generic_type_arguments
    }

    /// 是否为尚未应用实参的开放泛型
    pub fn is_open_generic(&self) -> bool {
        self.generic_arity > 0 && self.generic_type_arguments.is_empty()
    }

    /// 以具体实参闭合开放泛型，产生新的类型引用
    ///
    /// 非开放泛型或实参数量与元数不符时失败，原引用不受影响
    pub fn close(&self, args: &[TypeRef]) -> Result<TypeRef, CompositionError> {
        if !self.is_open_generic() {
            return Err(CompositionError::NotOpenGeneric {
                type_name: self.full_name.clone(),
            });
        }
        if args.len() != self.generic_arity {
            return Err(CompositionError::GenericArityMismatch {
                contract_name: self.full_name.clone(),
                expected: self.generic_arity,
                actual: args.len(),
            });
        }

        Ok(TypeRef {
            module: self.module.clone(),
            full_name: render_closed_name(base_name_of(&self.full_name), args),
            generic_arity: self.generic_arity,
            generic_type_arguments: args.to_vec(),
        })
    }

    /// 收集该类型引用（含泛型实参）涉及的所有模块引用
    pub fn collect_module_refs<'a>(&'a self, out: &mut Vec<&'a ModuleRef>) {
        out.push(&self.module);
        for arg in &self.generic_type_arguments {
            arg.collect_module_refs(out);
        }
    }
}

/// 从名称后缀解析泛型元数
///
/// `Container<>` 元数为 1，`Map<,>` 元数为 2，无后缀为非泛型；
/// 已闭合的名称（如 `Container<Int>`）不再计入元数标记
pub fn generic_arity_of(full_name: &str) -> usize {
    if let Some(start) = full_name.rfind('<') {
        if full_name.ends_with('>') {
            let inner = &full_name[start + 1..full_name.len() - 1];
            if inner.chars().all(|c| c == ',') {
                return inner.matches(',').count() + 1;
            }
        }
    }
    0
}

/// 不含元数后缀的基础名称
pub fn base_name_of(full_name: &str) -> &str {
    if generic_arity_of(full_name) > 0 {
        if let Some(start) = full_name.rfind('<') {
            return &full_name[..start];
        }
    }
    full_name
}

/// 以具体实参闭合开放泛型合约名称
///
/// `Container<>` + `[Int]` 得到 `Container<Int>`
pub fn close_generic_name(
    open_name: &str,
    args: &[TypeRef],
) -> Result<String, CompositionError> {
    let arity = generic_arity_of(open_name);
    if arity == 0 {
        return Err(CompositionError::NotOpenGeneric {
            type_name: open_name.to_string(),
        });
    }
    if args.len() != arity {
        return Err(CompositionError::GenericArityMismatch {
            contract_name: open_name.to_string(),
            expected: arity,
            actual: args.len(),
        });
    }
    Ok(render_closed_name(base_name_of(open_name), args))
}

fn render_closed_name(base: &str, args: &[TypeRef]) -> String {
    let rendered: Vec<&str> = args.iter().map(|a| a.full_name()).collect();
    format!("{}<{}>", base, rendered.join(", "))
}

/// 导出成员引用
///
/// 标识产生导出的具体成员，导出为部件类型本身时不存在
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberRef {
    /// 声明该成员的类型
    pub declaring_type: TypeRef,
    /// 成员名称
    pub name: String,
}

impl MemberRef {
    /// 创建成员引用
    pub fn new(declaring_type: TypeRef, name: impl Into<String>) -> Self {
        Self {
            declaring_type,
            name: name.into(),
        }
    }
}

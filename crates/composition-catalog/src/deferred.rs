//! 延迟值供应机制
//!
//! 在"零参擦除工厂 + 未类型化元数据"与导入声明的精确静态类型之间
//! 架桥：制造强类型的延迟值句柄，并在句柄与普通工厂之间转换

use composition_common::{CompositionError, MetadataMap, ModuleId, TypeRef};
use dashmap::DashMap;
use once_cell::sync::{Lazy, OnceCell};
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// 零参擦除工厂：产出未指明类型的值
pub type ErasedFactory = Box<dyn Fn() -> Box<dyn Any + Send + Sync> + Send + Sync>;

/// 擦除形式的延迟值构造器
///
/// 输入 (来源模块, 擦除工厂, 元数据载荷)，产出装箱的强类型延迟值句柄。
/// 元数据视图转换失败在调用该构造器时暴露，而非构建构造器时
pub type ErasedDeferredCtor = Arc<
    dyn Fn(
            Option<ModuleId>,
            ErasedFactory,
            &MetadataMap,
        ) -> Result<Box<dyn Any + Send + Sync>, CompositionError>
        + Send
        + Sync,
>;

/// 元数据视图
///
/// 由未类型化的元数据载荷构造强类型视图；
/// 不兼容时以 [`CompositionError::MetadataViewIncompatible`] 失败
pub trait MetadataView: Send + Sync + Sized + 'static {
    /// 从元数据载荷构造视图
    fn from_metadata(metadata: &MetadataMap) -> Result<Self, CompositionError>;
}

/// 默认视图：字符串键元数据映射本身
impl MetadataView for MetadataMap {
    fn from_metadata(metadata: &MetadataMap) -> Result<Self, CompositionError> {
        Ok(metadata.clone())
    }
}

/// 无元数据视图
impl MetadataView for () {
    fn from_metadata(_metadata: &MetadataMap) -> Result<Self, CompositionError> {
        Ok(())
    }
}

struct DeferredCore<T: Send + Sync + 'static> {
    /// 至多构造一次的值单元
    cell: OnceCell<Result<Arc<T>, CompositionError>>,
    /// 擦除工厂，from_value 构造的句柄没有工厂间接层
    factory: Option<ErasedFactory>,
}

impl<T: Send + Sync + 'static> DeferredCore<T> {
    fn force(&self) -> Result<Arc<T>, CompositionError> {
        if let Some(done) = self.cell.get() {
            return done.clone();
        }
        let result = match &self.factory {
            Some(factory) => match factory().downcast::<T>() {
                Ok(value) => Ok(Arc::from(value)),
                Err(_) => Err(CompositionError::ValueTypeMismatch {
                    expected_type: std::any::type_name::<T>().to_string(),
                }),
            },
            // 构造函数保证：无工厂的句柄必然已预置值单元
            None => Err(CompositionError::ValueTypeMismatch {
                expected_type: std::any::type_name::<T>().to_string(),
            }),
        };
        // 并发强制允许重复构造，以先发布者为准
        self.cell.get_or_init(|| result).clone()
    }
}

/// 延迟值句柄
///
/// 包装零参工厂与可选的强类型元数据 `M`，值在首次强制时构造。
/// 值类型不匹配在强制时暴露，符合契约的延迟性质
pub struct DeferredValue<T: Send + Sync + 'static, M = ()> {
    inner: Arc<DeferredCore<T>>,
    /// 强类型元数据
    metadata: M,
    /// 产出该值的来源模块，仅用于诊断
    origin: Option<ModuleId>,
}

impl<T: Send + Sync + 'static, M> DeferredValue<T, M> {
    /// 创建延迟值句柄
    pub fn new(origin: Option<ModuleId>, factory: ErasedFactory, metadata: M) -> Self {
        Self {
            inner: Arc::new(DeferredCore {
                cell: OnceCell::new(),
                factory: Some(factory),
            }),
            metadata,
            origin,
        }
    }

    /// 强制求值
    ///
    /// 每个句柄至多运行一次工厂；工厂产物无法转为 `T` 时
    /// 以 [`CompositionError::ValueTypeMismatch`] 失败
    pub fn force(&self) -> Result<Arc<T>, CompositionError> {
        self.inner.force()
    }

    /// 是否已完成求值
    pub fn is_resolved(&self) -> bool {
        self.inner.cell.get().is_some()
    }

    /// 强类型元数据
    pub fn metadata(&self) -> &M {
        &self.metadata
    }

    /// 来源模块
    pub fn origin(&self) -> Option<&ModuleId> {
        self.origin.as_ref()
    }

    /// 适配为零参工厂
    ///
    /// 直接捕获共享内核，不经过特征对象的间接分发；
    /// 该转换位于激活阶段的热路径上
    pub fn to_factory(&self) -> impl Fn() -> Result<Arc<T>, CompositionError> + Send + Sync {
        let core = Arc::clone(&self.inner);
        move || core.force()
    }
}

impl<T: Send + Sync + 'static> DeferredValue<T, ()> {
    /// 由已物化的值创建句柄
    ///
    /// 快速路径：没有工厂间接层，强制求值近乎零开销
    pub fn from_value(value: T) -> Self {
        let cell = OnceCell::new();
        let _ = cell.set(Ok(Arc::new(value)));
        Self {
            inner: Arc::new(DeferredCore {
                cell,
                factory: None,
            }),
            metadata: (),
            origin: None,
        }
    }
}

impl<T: Send + Sync + 'static, M: Clone> Clone for DeferredValue<T, M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            metadata: self.metadata.clone(),
            origin: self.origin.clone(),
        }
    }
}

impl<T: Send + Sync + 'static, M: fmt::Debug> fmt::Debug for DeferredValue<T, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredValue")
            .field("resolved", &self.is_resolved())
            .field("metadata", &self.metadata)
            .field("origin", &self.origin)
            .finish()
    }
}

/// 延迟形状的符号名称
pub const DEFERRED_VALUE_TYPE_NAME: &str = "DeferredValue";

/// 运行时类型的延迟形状测试
///
/// 判断具体类型是否为值型或值+元数据型的延迟句柄
pub fn is_deferred_value_type<T: 'static>() -> bool {
    std::any::type_name::<T>().starts_with(concat!(module_path!(), "::DeferredValue<"))
}

/// 符号类型引用的延迟形状测试
///
/// 不要求类型已被加载；凡两者都可计算时，
/// 与 [`is_deferred_value_type`] 的判定一致
pub fn is_deferred_type_ref(type_ref: &TypeRef) -> bool {
    matches!(type_ref.generic_arity(), 1 | 2)
        && type_ref.short_name() == DEFERRED_VALUE_TYPE_NAME
}

/// 擦除对象：导入未指明值类型时的回退载体
pub struct ErasedObject(pub Box<dyn Any + Send + Sync>);

impl fmt::Debug for ErasedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ErasedObject")
    }
}

/// (值类型, 元数据视图类型) → 擦除构造器的进程级缓存
static TYPED_FACTORY_CACHE: Lazy<DashMap<(TypeId, TypeId), ErasedDeferredCtor>> =
    Lazy::new(DashMap::new);

/// 获取指定类型对的强类型延迟值构造器
///
/// 每个 `(T, M)` 对只构建一次并缓存复用；并发请求同一类型对
/// 允许竞争构建，重复构造无害，最终以先插入者为准
pub fn typed_deferred_factory<T, M>() -> ErasedDeferredCtor
where
    T: Send + Sync + 'static,
    M: MetadataView,
{
    let key = (TypeId::of::<T>(), TypeId::of::<M>());
    if let Some(cached) = TYPED_FACTORY_CACHE.get(&key) {
        return cached.clone();
    }

    let ctor: ErasedDeferredCtor = Arc::new(|origin, factory, metadata: &MetadataMap| {
        // 视图转换失败在调用构造器时暴露
        let view = M::from_metadata(metadata)?;
        Ok(Box::new(DeferredValue::<T, M>::new(origin, factory, view))
            as Box<dyn Any + Send + Sync>)
    });
    TYPED_FACTORY_CACHE.entry(key).or_insert(ctor).value().clone()
}

static DEFAULT_DEFERRED_CTOR: Lazy<ErasedDeferredCtor> = Lazy::new(|| {
    Arc::new(|origin, factory, metadata: &MetadataMap| {
        let view = MetadataMap::from_metadata(metadata)?;
        let wrapped: ErasedFactory =
            Box::new(move || Box::new(ErasedObject(factory())) as Box<dyn Any + Send + Sync>);
        Ok(
            Box::new(DeferredValue::<ErasedObject, MetadataMap>::new(
                origin, wrapped, view,
            )) as Box<dyn Any + Send + Sync>,
        )
    })
});

/// 导入未完整声明类型时的默认构造器
///
/// 值类型回退为擦除对象，元数据视图回退为字符串键映射
pub fn default_deferred_factory() -> ErasedDeferredCtor {
    DEFAULT_DEFERRED_CTOR.clone()
}

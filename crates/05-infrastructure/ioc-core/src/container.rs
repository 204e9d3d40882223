//! Bean 容器
//!
//! 进程级单例存储：按角色过滤扫描结果，为每个类型创建唯一实例，
//! 并提供按类型、按角色、按父类型（接口）的查询

use crate::scanner::{CatalogScanner, TypeScanner};
use dashmap::DashMap;
use ioc_common::{
    BeanRef, ContainerConfig, ContainerError, ContainerResult, Introspect, LookupError,
    LookupResult, Role, TypeDescriptor, TypeKey,
};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 进程级 bean 容器
static GLOBAL_BEAN_CONTAINER: Lazy<BeanContainer> = Lazy::new(BeanContainer::new);

/// 容器中的一条 bean 登记
#[derive(Clone)]
pub struct BeanEntry {
    descriptor: Arc<TypeDescriptor>,
    instance: BeanRef,
}

impl BeanEntry {
    /// 类型描述符
    pub const fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    /// bean 实例
    pub const fn instance(&self) -> &BeanRef {
        &self.instance
    }
}

impl fmt::Debug for BeanEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanEntry")
            .field("type", &self.descriptor.name())
            .finish_non_exhaustive()
    }
}

/// 加载结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// 本次调用完成了加载
    Loaded {
        /// 注册的 bean 数量
        registered: usize,
    },
    /// 命名空间下没有任何类型，容器已标记为加载但为空
    Empty,
    /// 容器之前已经加载过，本次调用没有任何效果
    AlreadyLoaded,
}

/// Bean 容器
///
/// 生命周期为 `unloaded -> loaded`，只转换一次
pub struct BeanContainer {
    /// 存放所有被角色标记的目标对象
    beans: DashMap<TypeKey, BeanEntry>,
    /// 容器是否已经加载过 bean
    loaded: AtomicBool,
    /// 加载过程的临界区
    load_lock: Mutex<()>,
    scanner: Box<dyn TypeScanner>,
}

impl BeanContainer {
    /// 获取进程级容器实例
    pub fn global() -> &'static Self {
        &GLOBAL_BEAN_CONTAINER
    }

    /// 创建扫描全局类型目录的容器
    pub fn new() -> Self {
        Self::with_scanner(CatalogScanner::global())
    }

    /// 使用指定扫描器创建容器
    pub fn with_scanner(scanner: impl TypeScanner + 'static) -> Self {
        Self {
            beans: DashMap::new(),
            loaded: AtomicBool::new(false),
            load_lock: Mutex::new(()),
            scanner: Box::new(scanner),
        }
    }

    /// 按配置创建容器，扫描选项作用于全局类型目录
    pub fn from_config(config: &ContainerConfig) -> Self {
        Self::with_scanner(CatalogScanner::global().with_options(config.scan.clone()))
    }

    /// 容器是否已经加载过 bean
    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    /// 扫描加载所有 bean
    ///
    /// 整个加载过程在同一个临界区中执行，并发调用时最多只有一个线程真正加载。
    /// 扫描或实例化失败时容器保持未加载状态，不会注册任何 bean。
    pub fn load_beans(&self, namespace: &str) -> ContainerResult<LoadOutcome> {
        let _guard = self.load_lock.lock();
        if self.is_loaded() {
            warn!("BeanContainer 已经被加载过");
            return Ok(LoadOutcome::AlreadyLoaded);
        }

        debug!("使用扫描器 {} 加载命名空间: {}", self.scanner.name(), namespace);
        let descriptors = self.scanner.scan(namespace)?;
        if descriptors.is_empty() {
            warn!("从命名空间下获取不到任何类型: {}", namespace);
            self.loaded.store(true, Ordering::Release);
            return Ok(LoadOutcome::Empty);
        }

        let mut staged = Vec::new();
        for descriptor in descriptors.into_iter().filter(|d| d.is_bean()) {
            let instance = descriptor.instantiate().ok_or_else(|| {
                tracing::error!("初始化类实例异常: {}", descriptor.name());
                ContainerError::Instantiation {
                    type_name: descriptor.name().to_string(),
                }
            })?;
            debug!("创建 bean: {} {:?}", descriptor.name(), descriptor.roles());
            staged.push(BeanEntry {
                descriptor,
                instance,
            });
        }

        let registered = staged.len();
        for entry in staged {
            self.beans.insert(*entry.descriptor.key(), entry);
        }
        self.loaded.store(true, Ordering::Release);

        info!("命名空间 {} 加载完成，注册了 {} 个 bean", namespace, registered);
        Ok(LoadOutcome::Loaded { registered })
    }

    /// 添加 bean，返回被替换的旧实例
    pub fn add<T: Introspect>(&self, instance: Arc<T>) -> Option<BeanRef> {
        let entry = BeanEntry {
            descriptor: Arc::new(T::type_descriptor()),
            instance,
        };
        self.beans
            .insert(TypeKey::of::<T>(), entry)
            .map(|previous| previous.instance)
    }

    /// 以描述符添加 bean，实例必须属于描述符的类型
    pub fn add_entry(
        &self,
        descriptor: Arc<TypeDescriptor>,
        instance: BeanRef,
    ) -> ContainerResult<Option<BeanRef>> {
        if !descriptor.is_instance(instance.as_ref()) {
            return Err(ContainerError::InstanceMismatch {
                type_name: descriptor.name().to_string(),
            });
        }
        let key = *descriptor.key();
        Ok(self
            .beans
            .insert(key, BeanEntry { descriptor, instance })
            .map(|previous| previous.instance))
    }

    /// 移除 bean
    pub fn remove<T: Any>(&self) -> Option<BeanRef> {
        self.remove_by_key(&TypeKey::of::<T>())
    }

    /// 按类型标识移除 bean
    pub fn remove_by_key(&self, key: &TypeKey) -> Option<BeanRef> {
        self.beans.remove(key).map(|(_, entry)| entry.instance)
    }

    /// 获取 bean
    pub fn get<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.get_by_key(&TypeKey::of::<T>())
            .and_then(|instance| instance.downcast::<T>().ok())
    }

    /// 按类型标识获取 bean
    pub fn get_by_key(&self, key: &TypeKey) -> Option<BeanRef> {
        self.beans.get(key).map(|entry| entry.instance.clone())
    }

    /// 按类型标识获取 bean 登记
    pub fn entry(&self, key: &TypeKey) -> Option<BeanEntry> {
        self.beans.get(key).map(|entry| entry.clone())
    }

    /// 所有 bean 登记，按类型名称排序
    pub fn entries(&self) -> Vec<BeanEntry> {
        let mut entries = self
            .beans
            .iter()
            .map(|entry| entry.value().clone())
            .collect::<Vec<_>>();
        entries.sort_by(|a, b| a.descriptor.name().cmp(b.descriptor.name()));
        entries
    }

    /// 所有 bean 的类型，按类型名称排序
    pub fn types(&self) -> Vec<Arc<TypeDescriptor>> {
        self.entries()
            .into_iter()
            .map(|entry| entry.descriptor)
            .collect()
    }

    /// 所有 bean 实例，按实例身份去重
    pub fn beans(&self) -> Vec<BeanRef> {
        let mut seen = HashSet::new();
        self.entries()
            .into_iter()
            .map(|entry| entry.instance)
            .filter(|instance| seen.insert(Arc::as_ptr(instance).cast::<()>() as usize))
            .collect()
    }

    /// 获取被指定角色标记的类型
    pub fn types_by_role(&self, role: Role) -> LookupResult<Vec<Arc<TypeDescriptor>>> {
        self.select(role.as_str(), |descriptor| descriptor.has_role(role))
    }

    /// 获取接口或父类型的所有实现类型，不包括该类型本身
    pub fn types_by_supertype(&self, super_type: &TypeKey) -> LookupResult<Vec<Arc<TypeDescriptor>>> {
        self.select(super_type.name(), |descriptor| {
            descriptor.key() != super_type && descriptor.is_assignable_to(super_type)
        })
    }

    /// 获取 `S` 的所有实现类型
    pub fn types_by_supertype_of<S: ?Sized + 'static>(&self) -> LookupResult<Vec<Arc<TypeDescriptor>>> {
        self.types_by_supertype(&TypeKey::of::<S>())
    }

    fn select(
        &self,
        query: &str,
        predicate: impl Fn(&TypeDescriptor) -> bool,
    ) -> LookupResult<Vec<Arc<TypeDescriptor>>> {
        if self.beans.is_empty() {
            warn!("容器中没有 bean 实例");
            return Err(LookupError::EmptyRegistry);
        }
        let selected = self
            .types()
            .into_iter()
            .filter(|descriptor| predicate(descriptor))
            .collect::<Vec<_>>();
        if selected.is_empty() {
            return Err(LookupError::no_match(query));
        }
        Ok(selected)
    }

    /// bean 数量
    pub fn size(&self) -> usize {
        self.beans.len()
    }

    /// 容器是否为空
    pub fn is_empty(&self) -> bool {
        self.beans.is_empty()
    }
}

impl Default for BeanContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BeanContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanContainer")
            .field("loaded", &self.is_loaded())
            .field(
                "beans",
                &self
                    .entries()
                    .iter()
                    .map(|entry| entry.descriptor.name())
                    .collect::<Vec<_>>(),
            )
            .field("scanner", &self.scanner.name())
            .finish()
    }
}

//! 类型目录
//!
//! 进程内所有可自省类型在程序启动时登记到目录中（由组件宏生成的 `ctor` 函数完成），
//! 目录按全限定名称把它们组织成命名空间树，相当于类加载器所见的 classpath。
//! 类型描述符在第一次加载时生成并缓存。

use crate::component::Introspect;
use crate::errors::{TypeLoadError, TypeLoadResult};
use crate::metadata::{TypeDescriptor, TypeKey};
use once_cell::sync::{Lazy, OnceCell};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, trace};

/// 命名空间路径分隔符
pub const NAMESPACE_SEPARATOR: &str = "::";

/// 全局类型目录
static GLOBAL_TYPE_CATALOG: Lazy<TypeCatalog> = Lazy::new(TypeCatalog::new);

/// 获取全局类型目录
pub fn global_catalog() -> TypeCatalog {
    GLOBAL_TYPE_CATALOG.clone()
}

/// 规范化命名空间路径
///
/// 接受 `a.b.c`、`a/b/c` 和 `a::b::c` 三种写法
pub fn normalize_namespace(path: &str) -> String {
    path.trim()
        .replace(['.', '/'], NAMESPACE_SEPARATOR)
        .split(NAMESPACE_SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(NAMESPACE_SEPARATOR)
}

/// 目录中的一条类型登记
struct TypeRegistration {
    key: TypeKey,
    loader: fn() -> TypeDescriptor,
    descriptor: OnceCell<Arc<TypeDescriptor>>,
}

impl TypeRegistration {
    fn load(&self, name: &str) -> TypeLoadResult<Arc<TypeDescriptor>> {
        let descriptor = self.descriptor.get_or_init(|| {
            trace!("生成类型描述符: {}", name);
            Arc::new((self.loader)())
        });

        if descriptor.name() != name || descriptor.key() != &self.key {
            return Err(TypeLoadError::DescriptorMismatch {
                expected: name.to_string(),
                actual: descriptor.name().to_string(),
            });
        }
        Ok(descriptor.clone())
    }
}

/// 命名空间树节点
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceNode {
    path: String,
    units: BTreeSet<String>,
    children: BTreeMap<String, NamespaceNode>,
}

impl NamespaceNode {
    fn new(path: String) -> Self {
        Self {
            path,
            ..Self::default()
        }
    }

    /// 节点的完整路径
    pub fn path(&self) -> &str {
        &self.path
    }

    /// 直接位于该命名空间下的类型简短名称
    pub fn units(&self) -> impl Iterator<Item = &str> {
        self.units.iter().map(String::as_str)
    }

    /// 子命名空间
    pub fn children(&self) -> impl Iterator<Item = &NamespaceNode> {
        self.children.values()
    }

    /// 由简短名称推导全限定名称
    pub fn qualified_name(&self, unit: &str) -> String {
        format!("{}{NAMESPACE_SEPARATOR}{unit}", self.path)
    }

    fn insert(&mut self, relative: &[&str]) {
        match relative {
            [] => {}
            [unit] => {
                self.units.insert((*unit).to_string());
            }
            [child, rest @ ..] => {
                let path = self.qualified_name(child);
                self.children
                    .entry((*child).to_string())
                    .or_insert_with(|| Self::new(path))
                    .insert(rest);
            }
        }
    }
}

/// 类型目录
///
/// 克隆得到的是同一份目录的句柄
#[derive(Clone, Default)]
pub struct TypeCatalog {
    entries: Arc<RwLock<BTreeMap<String, Vec<Arc<TypeRegistration>>>>>,
}

impl TypeCatalog {
    /// 创建空目录
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记可自省类型
    pub fn register<T: Introspect>(&self) {
        self.register_with(T::TYPE_NAME, TypeKey::of::<T>(), T::type_descriptor);
    }

    /// 以全限定名称登记类型及其描述符加载函数
    ///
    /// 同一类型重复登记会被忽略；不同类型使用同一名称会在加载时报告冲突
    pub fn register_with(&self, name: &str, key: TypeKey, loader: fn() -> TypeDescriptor) {
        let name = normalize_namespace(name);
        let mut entries = self.entries.write();
        let registrations = entries.entry(name.clone()).or_default();
        if registrations.iter().any(|r| r.key == key) {
            debug!("类型已登记，忽略重复登记: {}", name);
            return;
        }
        trace!("登记类型: {}", name);
        registrations.push(Arc::new(TypeRegistration {
            key,
            loader,
            descriptor: OnceCell::new(),
        }));
    }

    /// 解析命名空间，返回命名空间树的根节点
    ///
    /// 命名空间下没有任何类型时返回 `None`
    pub fn resolve_namespace(&self, path: &str) -> Option<NamespaceNode> {
        let root_path = normalize_namespace(path);
        if root_path.is_empty() {
            return None;
        }
        let prefix = format!("{root_path}{NAMESPACE_SEPARATOR}");

        let entries = self.entries.read();
        let mut root = NamespaceNode::new(root_path);
        let mut found = false;
        for name in entries.range(prefix.clone()..).map(|(name, _)| name) {
            let Some(relative) = name.strip_prefix(&prefix) else {
                break;
            };
            let segments = relative.split(NAMESPACE_SEPARATOR).collect::<Vec<_>>();
            root.insert(&segments);
            found = true;
        }

        found.then_some(root)
    }

    /// 按全限定名称加载类型描述符
    pub fn load(&self, name: &str) -> TypeLoadResult<Arc<TypeDescriptor>> {
        let name = normalize_namespace(name);
        let registration = {
            let entries = self.entries.read();
            match entries.get(&name).map(Vec::as_slice) {
                None | Some([]) => return Err(TypeLoadError::NotFound { name }),
                Some([registration]) => registration.clone(),
                Some(registrations) => {
                    return Err(TypeLoadError::Conflict {
                        count: registrations.len(),
                        name,
                    })
                }
            }
        };
        registration.load(&name)
    }

    /// 登记的全限定名称，按字典序排列
    pub fn names(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    /// 登记的名称数量
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// 目录是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl std::fmt::Debug for TypeCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeCatalog")
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Role;

    #[derive(Default)]
    struct Alpha;

    #[derive(Default)]
    struct Beta;

    fn alpha() -> TypeDescriptor {
        TypeDescriptor::builder::<Alpha>("app::Alpha")
            .role(Role::Component)
            .default_constructor()
            .build()
    }

    fn beta() -> TypeDescriptor {
        TypeDescriptor::builder::<Beta>("app::service::Beta")
            .role(Role::Service)
            .default_constructor()
            .build()
    }

    fn beta_misnamed() -> TypeDescriptor {
        TypeDescriptor::builder::<Beta>("app::service::Gamma").build()
    }

    fn catalog() -> TypeCatalog {
        let catalog = TypeCatalog::new();
        catalog.register_with("app::Alpha", TypeKey::of::<Alpha>(), alpha);
        catalog.register_with("app::service::Beta", TypeKey::of::<Beta>(), beta);
        catalog
    }

    #[test]
    fn test_normalize_namespace() {
        assert_eq!(normalize_namespace("app.service"), "app::service");
        assert_eq!(normalize_namespace("app/service/"), "app::service");
        assert_eq!(normalize_namespace(" app::service "), "app::service");
        assert_eq!(normalize_namespace(""), "");
    }

    #[test]
    fn test_resolve_namespace_builds_tree() {
        let catalog = catalog();
        let root = catalog.resolve_namespace("app").unwrap();

        assert_eq!(root.path(), "app");
        assert_eq!(root.units().collect::<Vec<_>>(), vec!["Alpha"]);
        let children = root.children().collect::<Vec<_>>();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].path(), "app::service");
        assert_eq!(children[0].qualified_name("Beta"), "app::service::Beta");
    }

    #[test]
    fn test_resolve_namespace_respects_segment_boundary() {
        let catalog = catalog();
        catalog.register_with("application::Other", TypeKey::of::<u8>(), alpha);

        let root = catalog.resolve_namespace("app").unwrap();
        assert_eq!(root.units().count(), 1);
        assert!(catalog.resolve_namespace("ap").is_none());
        assert!(catalog.resolve_namespace("empty.pkg").is_none());
        assert!(catalog.resolve_namespace("").is_none());
    }

    #[test]
    fn test_load_caches_descriptor() {
        let catalog = catalog();
        let first = catalog.load("app.service.Beta").unwrap();
        let second = catalog.load("app::service::Beta").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.name(), "app::service::Beta");
    }

    #[test]
    fn test_load_failures() {
        let catalog = catalog();
        assert_eq!(
            catalog.load("app::Missing").unwrap_err(),
            TypeLoadError::NotFound {
                name: "app::Missing".to_string()
            }
        );

        catalog.register_with("app::Alpha", TypeKey::of::<Beta>(), beta);
        assert!(matches!(
            catalog.load("app::Alpha").unwrap_err(),
            TypeLoadError::Conflict { count: 2, .. }
        ));

        catalog.register_with("app::Gamma", TypeKey::of::<Beta>(), beta_misnamed);
        assert!(matches!(
            catalog.load("app::Gamma").unwrap_err(),
            TypeLoadError::DescriptorMismatch { .. }
        ));
    }

    #[test]
    fn test_duplicate_registration_is_ignored() {
        let catalog = catalog();
        catalog.register_with("app::Alpha", TypeKey::of::<Alpha>(), alpha);

        assert_eq!(catalog.len(), 2);
        assert!(catalog.load("app::Alpha").is_ok());
    }
}

//! 类型扫描器
//!
//! 遍历命名空间（包括所有子命名空间），返回其中全部可自省类型的描述符

use ioc_common::{
    global_catalog, normalize_namespace, NamespaceNode, ScanError, ScanOptions, ScanResult,
    TypeCatalog, TypeDescriptor,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 类型扫描器 trait
pub trait TypeScanner: Send + Sync {
    /// 扫描命名空间中的类型
    ///
    /// 命名空间解析不到任何资源时返回空结果，不是错误
    fn scan(&self, namespace: &str) -> ScanResult<Vec<Arc<TypeDescriptor>>>;

    /// 获取扫描器名称
    fn name(&self) -> &str;
}

/// 基于类型目录的扫描器
#[derive(Debug, Clone)]
pub struct CatalogScanner {
    catalog: TypeCatalog,
    options: ScanOptions,
}

impl CatalogScanner {
    /// 创建扫描器
    pub fn new(catalog: TypeCatalog) -> Self {
        Self {
            catalog,
            options: ScanOptions::default(),
        }
    }

    /// 扫描全局类型目录
    pub fn global() -> Self {
        Self::new(global_catalog())
    }

    /// 设置扫描选项
    #[must_use]
    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    /// 扫描选项
    pub const fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// 递归提取命名空间下的类型
    fn extract(
        &self,
        node: &NamespaceNode,
        namespace: &str,
        found: &mut BTreeMap<&'static str, Arc<TypeDescriptor>>,
    ) -> ScanResult<()> {
        if self.options.is_excluded(node.path()) {
            debug!("跳过被排除的命名空间: {}", node.path());
            return Ok(());
        }

        for unit in node.units() {
            let type_name = node.qualified_name(unit);
            let descriptor = self.catalog.load(&type_name).map_err(|source| {
                tracing::error!("类型加载异常: {}", source);
                ScanError::TypeLoad {
                    namespace: namespace.to_string(),
                    source,
                }
            })?;
            found.insert(descriptor.name(), descriptor);
        }

        if self.options.recursive {
            for child in node.children() {
                self.extract(child, namespace, found)?;
            }
        }
        Ok(())
    }
}

impl Default for CatalogScanner {
    fn default() -> Self {
        Self::global()
    }
}

impl TypeScanner for CatalogScanner {
    fn scan(&self, namespace: &str) -> ScanResult<Vec<Arc<TypeDescriptor>>> {
        let namespace = normalize_namespace(namespace);
        debug!("开始扫描命名空间: {}", namespace);

        let Some(root) = self.catalog.resolve_namespace(&namespace) else {
            warn!("从命名空间下面获取不到任何资源: {}", namespace);
            return Ok(Vec::new());
        };

        let mut found = BTreeMap::new();
        self.extract(&root, &namespace, &mut found)?;

        info!("扫描命名空间 {} 完成，发现 {} 个类型", namespace, found.len());
        Ok(found.into_values().collect())
    }

    fn name(&self) -> &str {
        "catalog"
    }
}

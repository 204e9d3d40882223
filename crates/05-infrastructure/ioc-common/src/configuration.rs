//! 配置相关定义

use crate::discovery::{normalize_namespace, NAMESPACE_SEPARATOR};
use serde::{Deserialize, Serialize};

/// 扫描选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// 是否递归扫描子命名空间
    pub recursive: bool,
    /// 排除的命名空间（连同其子命名空间）
    pub exclude: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            recursive: true,
            exclude: Vec::new(),
        }
    }
}

impl ScanOptions {
    /// 只扫描根命名空间本身
    #[must_use]
    pub fn non_recursive(mut self) -> Self {
        self.recursive = false;
        self
    }

    /// 添加排除的命名空间
    #[must_use]
    pub fn excluding(mut self, namespace: impl Into<String>) -> Self {
        self.exclude.push(namespace.into());
        self
    }

    /// 命名空间是否被排除
    pub fn is_excluded(&self, namespace: &str) -> bool {
        let namespace = normalize_namespace(namespace);
        self.exclude.iter().map(|e| normalize_namespace(e)).any(|excluded| {
            !excluded.is_empty()
                && (namespace == excluded
                    || namespace.starts_with(&format!("{excluded}{NAMESPACE_SEPARATOR}")))
        })
    }
}

/// 容器配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// 扫描的根命名空间
    pub base_package: String,
    /// 扫描选项
    pub scan: ScanOptions,
}

impl ContainerConfig {
    /// 创建新的容器配置
    pub fn new(base_package: impl Into<String>) -> Self {
        Self {
            base_package: base_package.into(),
            scan: ScanOptions::default(),
        }
    }

    /// 设置扫描选项
    #[must_use]
    pub fn with_scan(mut self, scan: ScanOptions) -> Self {
        self.scan = scan;
        self
    }
}

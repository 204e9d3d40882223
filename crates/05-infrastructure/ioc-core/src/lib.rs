//! # IoC Core
//!
//! Simple IoC 运行时：类型扫描、bean 容器和字段注入
//!
//! ## 使用流程
//!
//! 1. 组件类型通过 `#[component]`、`#[service]` 等宏在启动时登记到全局类型目录
//! 2. [`BeanContainer::load_beans`] 扫描命名空间，为带角色的类型各创建一个实例
//! 3. [`DependencyInjector::do_ioc`] 为所有 `Autowired` 字段写入依赖
//!
//! [`bootstrap`] 把第 2、3 步合并为一次调用。

pub mod container;
pub mod injector;
pub mod scanner;

pub use container::{BeanContainer, BeanEntry, LoadOutcome};
pub use injector::{DependencyInjector, InjectionTarget};
pub use scanner::{CatalogScanner, TypeScanner};

pub use ioc_common::*;

use tracing::info;

/// 宏生成代码使用的依赖，不属于公开 API
#[doc(hidden)]
pub mod __private {
    pub use ctor;
}

/// 加载命名空间下的 bean 并执行依赖注入
///
/// 容器已经加载过时只重新执行注入
pub fn bootstrap(container: &BeanContainer, namespace: &str) -> IocResult<LoadOutcome> {
    let outcome = container.load_beans(namespace)?;
    DependencyInjector::new(container).do_ioc()?;
    info!("IoC 启动完成: {} 个 bean", container.size());
    Ok(outcome)
}

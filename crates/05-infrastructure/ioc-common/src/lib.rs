//! # IoC Common
//!
//! 这个 crate 提供了 Simple IoC 运行时的公共类型。
//!
//! ## 核心组件
//!
//! - [`TypeDescriptor`] - 可自省类型的描述符
//! - [`Role`] - 组件角色标记
//! - [`Autowired`] - 可注入字段
//! - [`TypeCatalog`] - 进程内类型目录
//!
//! ## 设计原则
//!
//! - 类型信息在登记时只记录加载函数，描述符首次加载时生成并缓存
//! - 角色是封闭集合，只作为过滤条件使用
//! - 字段写入只开放给依赖解析器

pub mod component;
pub mod configuration;
pub mod discovery;
pub mod errors;
pub mod metadata;

pub use component::*;
pub use configuration::*;
pub use discovery::*;
pub use errors::*;
pub use metadata::*;

//! # IoC Macros
//!
//! 这个 crate 提供了把结构体登记到 Simple IoC 类型目录的过程宏。
//!
//! ## 核心宏
//!
//! - [`component`]、[`controller`]、[`service`]、[`repository`] - 带角色登记，容器会为其创建 bean
//! - [`discoverable`] - 只登记类型，不创建 bean
//!
//! 字段上的 `#[autowired]` 声明注入点，字段类型必须是 `Autowired<T>`。
//! `#[autowired("Name")]` 或 `#[autowired(name = "Name")]` 按实现类型的简短名称选择实现。
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use ioc_core::Autowired;
//! use ioc_macros::{controller, service};
//!
//! pub trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! #[derive(Default)]
//! #[service(implements(dyn Greeter))]
//! pub struct EnglishGreeter;
//!
//! #[derive(Default)]
//! #[controller]
//! pub struct HelloController {
//!     #[autowired]
//!     greeter: Autowired<dyn Greeter>,
//! }
//! ```
//!
//! 生成的代码引用 `::ioc_core`，使用方需要依赖 `ioc-core`。

use proc_macro::TokenStream;

mod component;
mod utils;

use component::RoleKind;

fn expand(role: Option<RoleKind>, args: TokenStream, input: TokenStream) -> TokenStream {
    component::expand(role, args.into(), input.into())
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// 通用组件
///
/// # 参数
///
/// - `implements(dyn Trait, ...)` - 声明实现的接口，可以按接口注入
///
/// 带角色的结构体需要实现 `Default`，容器通过它创建实例。
#[proc_macro_attribute]
pub fn component(args: TokenStream, input: TokenStream) -> TokenStream {
    expand(Some(RoleKind::Component), args, input)
}

/// 控制器组件，参数同 [`component`]
#[proc_macro_attribute]
pub fn controller(args: TokenStream, input: TokenStream) -> TokenStream {
    expand(Some(RoleKind::Controller), args, input)
}

/// 服务组件，参数同 [`component`]
#[proc_macro_attribute]
pub fn service(args: TokenStream, input: TokenStream) -> TokenStream {
    expand(Some(RoleKind::Service), args, input)
}

/// 仓储组件，参数同 [`component`]
#[proc_macro_attribute]
pub fn repository(args: TokenStream, input: TokenStream) -> TokenStream {
    expand(Some(RoleKind::Repository), args, input)
}

/// 只登记到类型目录，扫描可见但不会成为 bean
#[proc_macro_attribute]
pub fn discoverable(args: TokenStream, input: TokenStream) -> TokenStream {
    expand(None, args, input)
}

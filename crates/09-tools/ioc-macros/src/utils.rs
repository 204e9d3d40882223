//! 宏工具函数

use proc_macro2::Span;
use syn::{Attribute, GenericArgument, Ident, PathArguments, Type};

/// 组件角色属性名称
pub const ROLE_ATTRIBUTES: [&str; 4] = ["component", "controller", "service", "repository"];

/// 只登记类型、不带角色的属性名称
pub const DISCOVERABLE_ATTRIBUTE: &str = "discoverable";

/// 注入字段属性名称
pub const AUTOWIRED_ATTRIBUTE: &str = "autowired";

/// 属性路径的最后一段，`#[ioc_macros::service]` 和 `#[service]` 都得到 `service`
pub fn attribute_name(attr: &Attribute) -> Option<String> {
    attr.path()
        .segments
        .last()
        .map(|segment| segment.ident.to_string())
}

/// 是否为本 crate 提供的类型级属性
pub fn is_type_attribute(attr: &Attribute) -> bool {
    attribute_name(attr).is_some_and(|name| {
        name == DISCOVERABLE_ATTRIBUTE || ROLE_ATTRIBUTES.contains(&name.as_str())
    })
}

/// 是否为 `#[autowired]` 属性
pub fn is_autowired_attribute(attr: &Attribute) -> bool {
    attribute_name(attr).is_some_and(|name| name == AUTOWIRED_ATTRIBUTE)
}

/// 从 `Autowired<T>` 中提取 `T`
pub fn extract_autowired_type(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Autowired" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    if args.args.len() != 1 {
        return None;
    }
    match args.args.first() {
        Some(GenericArgument::Type(inner)) => Some(inner),
        _ => None,
    }
}

/// 生成登记函数名
///
/// 直接拼接原始类型名，同一模块内的类型名互不相同，登记函数名也不会冲突
pub fn registration_fn_name(struct_name: &Ident) -> Ident {
    Ident::new(&format!("__ioc_register_{struct_name}"), Span::call_site())
}

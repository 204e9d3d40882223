//! 组件登记宏实现

use crate::utils::{
    attribute_name, extract_autowired_type, is_autowired_attribute, is_type_attribute,
    registration_fn_name,
};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    Attribute, Fields, Ident, ItemStruct, LitStr, Meta, Result, Token, Type,
};

/// 组件角色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleKind {
    Component,
    Controller,
    Service,
    Repository,
}

impl RoleKind {
    /// 从属性名称解析角色
    pub fn from_attribute(name: &str) -> Option<Self> {
        match name {
            "component" => Some(Self::Component),
            "controller" => Some(Self::Controller),
            "service" => Some(Self::Service),
            "repository" => Some(Self::Repository),
            _ => None,
        }
    }

    fn to_variant(self) -> TokenStream {
        match self {
            Self::Component => quote! { ::ioc_core::Role::Component },
            Self::Controller => quote! { ::ioc_core::Role::Controller },
            Self::Service => quote! { ::ioc_core::Role::Service },
            Self::Repository => quote! { ::ioc_core::Role::Repository },
        }
    }
}

/// 类型级属性参数
#[derive(Default)]
pub struct TypeArgs {
    /// 实现的接口（`dyn Trait`）
    pub interfaces: Vec<Type>,
}

impl Parse for TypeArgs {
    fn parse(input: ParseStream<'_>) -> Result<Self> {
        let mut args = Self::default();

        let parsed = Punctuated::<Meta, Token![,]>::parse_terminated(input)?;
        for meta in parsed {
            match meta {
                Meta::List(list) if list.path.is_ident("implements") => {
                    let interfaces =
                        list.parse_args_with(Punctuated::<Type, Token![,]>::parse_terminated)?;
                    args.interfaces.extend(interfaces);
                }
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "不支持的参数，只能使用 implements(dyn Trait, ...)",
                    ));
                }
            }
        }

        Ok(args)
    }
}

/// `#[autowired]` 参数
#[derive(Default)]
struct AutowiredArgs {
    qualifier: Option<LitStr>,
}

impl Parse for AutowiredArgs {
    fn parse(input: ParseStream<'_>) -> Result<Self> {
        if input.is_empty() {
            return Ok(Self::default());
        }
        if input.peek(LitStr) {
            return Ok(Self {
                qualifier: Some(input.parse()?),
            });
        }

        let key: Ident = input.parse()?;
        if key != "name" {
            return Err(syn::Error::new_spanned(key, "只支持 name = \"...\" 参数"));
        }
        input.parse::<Token![=]>()?;
        Ok(Self {
            qualifier: Some(input.parse()?),
        })
    }
}

/// 一个注入字段
struct AutowiredField {
    ident: Ident,
    inner: Type,
    qualifier: Option<LitStr>,
}

/// 类型级属性合并后的结果
struct TypeAttributes {
    roles: Vec<RoleKind>,
    interfaces: Vec<Type>,
}

impl TypeAttributes {
    fn add_role(&mut self, role: RoleKind) {
        if !self.roles.contains(&role) {
            self.roles.push(role);
        }
    }
}

/// 展开类型级属性
///
/// `role` 为 `None` 时对应 `#[discoverable]`。同一结构体上的其他角色属性会被合并，
/// 只生成一次实现。
pub fn expand(role: Option<RoleKind>, args: TokenStream, input: TokenStream) -> Result<TokenStream> {
    let args: TypeArgs = syn::parse2(args)?;
    let mut item: ItemStruct = syn::parse2(input)?;

    if !item.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &item.generics,
            "组件类型不支持泛型参数",
        ));
    }

    let mut attributes = TypeAttributes {
        roles: Vec::new(),
        interfaces: args.interfaces,
    };
    if let Some(role) = role {
        attributes.add_role(role);
    }
    merge_sibling_attributes(&mut item.attrs, &mut attributes)?;

    let fields = take_autowired_fields(&mut item.fields)?;
    let introspect = generate_introspect(&item.ident, &attributes, &fields);
    let registration = generate_registration_code(&item.ident);

    Ok(quote! {
        #item

        #introspect

        #registration
    })
}

/// 合并并移除同一结构体上的其他类型级属性
fn merge_sibling_attributes(
    attrs: &mut Vec<Attribute>,
    attributes: &mut TypeAttributes,
) -> Result<()> {
    let mut kept = Vec::with_capacity(attrs.len());
    for attr in attrs.drain(..) {
        if !is_type_attribute(&attr) {
            kept.push(attr);
            continue;
        }

        if let Some(role) = attribute_name(&attr).as_deref().and_then(RoleKind::from_attribute) {
            attributes.add_role(role);
        }
        if matches!(attr.meta, Meta::List(_)) {
            let sibling: TypeArgs = attr.parse_args()?;
            attributes.interfaces.extend(sibling.interfaces);
        }
    }
    *attrs = kept;
    Ok(())
}

/// 收集带 `#[autowired]` 的字段并移除该属性
fn take_autowired_fields(fields: &mut Fields) -> Result<Vec<AutowiredField>> {
    let named = match fields {
        Fields::Named(named) => named,
        Fields::Unit => return Ok(Vec::new()),
        Fields::Unnamed(unnamed) => {
            if unnamed
                .unnamed
                .iter()
                .any(|field| field.attrs.iter().any(is_autowired_attribute))
            {
                return Err(syn::Error::new_spanned(
                    unnamed,
                    "#[autowired] 只能用于具名字段",
                ));
            }
            return Ok(Vec::new());
        }
    };

    let mut autowired = Vec::new();
    for field in &mut named.named {
        let Some(position) = field.attrs.iter().position(is_autowired_attribute) else {
            continue;
        };
        let attr = field.attrs.remove(position);
        if field.attrs.iter().any(is_autowired_attribute) {
            return Err(syn::Error::new_spanned(attr, "#[autowired] 重复声明"));
        }

        let args: AutowiredArgs = match &attr.meta {
            Meta::Path(_) => AutowiredArgs::default(),
            Meta::List(_) => attr.parse_args()?,
            Meta::NameValue(_) => {
                return Err(syn::Error::new_spanned(
                    attr,
                    "请使用 #[autowired] 或 #[autowired(\"Name\")]",
                ));
            }
        };
        let inner = extract_autowired_type(&field.ty).cloned().ok_or_else(|| {
            syn::Error::new_spanned(&field.ty, "#[autowired] 字段类型必须是 Autowired<T>")
        })?;
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| syn::Error::new_spanned(&field.ty, "#[autowired] 只能用于具名字段"))?;

        autowired.push(AutowiredField {
            ident,
            inner,
            qualifier: args.qualifier.filter(|q| !q.value().is_empty()),
        });
    }

    Ok(autowired)
}

/// 生成 `Introspect` 实现
fn generate_introspect(
    struct_name: &Ident,
    attributes: &TypeAttributes,
    fields: &[AutowiredField],
) -> TokenStream {
    let name = struct_name.to_string();
    let roles = attributes.roles.iter().map(|role| {
        let variant = role.to_variant();
        quote! { .role(#variant) }
    });
    // 没有角色的类型不会被实例化，不要求实现 Default
    let constructor = if attributes.roles.is_empty() {
        TokenStream::new()
    } else {
        quote! { .default_constructor() }
    };
    let fields = fields.iter().map(|field| {
        let ident = &field.ident;
        let field_name = ident.to_string();
        let inner = &field.inner;
        let qualifier = match &field.qualifier {
            Some(q) => quote! { ::core::option::Option::Some(#q) },
            None => quote! { ::core::option::Option::None },
        };
        quote! {
            .field(::ioc_core::FieldDescriptor::autowired::<Self, #inner>(
                #field_name,
                #qualifier,
                |owner| &owner.#ident,
            ))
        }
    });
    let interfaces = attributes.interfaces.iter().map(|interface| {
        quote! {
            .implements::<#interface>(|bean| {
                let bean: ::std::sync::Arc<Self> = bean.downcast().ok()?;
                let upcast: ::std::sync::Arc<#interface> = bean;
                ::core::option::Option::Some(::ioc_core::Injected::new(upcast))
            })
        }
    });

    quote! {
        impl ::ioc_core::Introspect for #struct_name {
            const TYPE_NAME: &'static str =
                ::core::concat!(::core::module_path!(), "::", #name);

            fn type_descriptor() -> ::ioc_core::TypeDescriptor {
                ::ioc_core::TypeDescriptor::builder::<Self>(Self::TYPE_NAME)
                    #(#roles)*
                    #constructor
                    #(#fields)*
                    #(#interfaces)*
                    .build()
            }
        }
    }
}

/// 生成启动时登记代码
fn generate_registration_code(struct_name: &Ident) -> TokenStream {
    let registration_fn_name = registration_fn_name(struct_name);

    quote! {
        #[allow(non_snake_case)]
        #[::ioc_core::__private::ctor::ctor]
        fn #registration_fn_name() {
            ::ioc_core::global_catalog().register::<#struct_name>();
        }
    }
}

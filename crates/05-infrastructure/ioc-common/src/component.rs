//! 组件基础接口定义
//!
//! 角色标记、可自省类型 trait 以及注入字段的承载类型

use crate::metadata::{TypeDescriptor, TypeKey};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// 容器中保存的 bean 实例
pub type BeanRef = Arc<dyn Any + Send + Sync>;

/// 组件角色标记
///
/// 封闭集合，带有任意一个角色的类型都会被容器注册
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// 通用组件
    Component,
    /// 控制器
    Controller,
    /// 服务
    Service,
    /// 仓储
    Repository,
}

impl Role {
    /// 全部角色
    pub const ALL: [Self; 4] = [
        Self::Component,
        Self::Controller,
        Self::Service,
        Self::Repository,
    ];

    /// 角色名称
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Component => "component",
            Self::Controller => "controller",
            Self::Service => "service",
            Self::Repository => "repository",
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Self::Component => 1,
            Self::Controller => 1 << 1,
            Self::Service => 1 << 2,
            Self::Repository => 1 << 3,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 一个类型携带的角色集合
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RoleSet(u8);

impl RoleSet {
    /// 空集合
    pub const fn empty() -> Self {
        Self(0)
    }

    /// 添加角色
    #[must_use]
    pub const fn with(self, role: Role) -> Self {
        Self(self.0 | role.bit())
    }

    /// 添加角色
    pub fn insert(&mut self, role: Role) {
        self.0 |= role.bit();
    }

    /// 是否携带指定角色
    pub const fn contains(self, role: Role) -> bool {
        self.0 & role.bit() != 0
    }

    /// 是否没有任何角色
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// 按声明顺序遍历携带的角色
    pub fn iter(self) -> impl Iterator<Item = Role> {
        Role::ALL.into_iter().filter(move |role| self.contains(*role))
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

impl fmt::Debug for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// 可自省类型 trait
///
/// 通常由 `#[component]`、`#[service]` 等宏生成，也可以手动实现
pub trait Introspect: Any + Send + Sync {
    /// 全限定类型名称（模块路径 + 类型名）
    const TYPE_NAME: &'static str;

    /// 构建类型描述符
    fn type_descriptor() -> TypeDescriptor
    where
        Self: Sized;
}

/// 待写入字段的依赖实例
///
/// 内部保存 `Arc<T>`，`T` 可以是具体类型也可以是 `dyn Trait`
pub struct Injected {
    key: TypeKey,
    address: usize,
    value: Box<dyn Any + Send + Sync>,
}

impl Injected {
    /// 包装依赖实例
    pub fn new<T>(instance: Arc<T>) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        Self {
            key: TypeKey::of::<T>(),
            address: Arc::as_ptr(&instance).cast::<()>() as usize,
            value: Box::new(instance),
        }
    }

    /// 实例的声明类型
    pub const fn key(&self) -> &TypeKey {
        &self.key
    }

    /// 实例地址，用于按身份比较
    pub const fn address(&self) -> usize {
        self.address
    }

    /// 取出 `Arc<T>`，类型不符时返回 `None`
    pub fn into_arc<T>(self) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.value.downcast::<Arc<T>>().ok().map(|boxed| *boxed)
    }
}

impl fmt::Debug for Injected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injected")
            .field("key", &self.key)
            .field("address", &format_args!("{:#x}", self.address))
            .finish()
    }
}

/// 可注入字段
///
/// 字段只能由依赖解析器经 [`FieldDescriptor`](crate::FieldDescriptor) 写入，
/// 组件自身只读
pub struct Autowired<T: ?Sized> {
    slot: RwLock<Option<Arc<T>>>,
}

impl<T: ?Sized> Autowired<T> {
    /// 创建尚未注入的字段
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }

    /// 获取注入的实例
    pub fn get(&self) -> Option<Arc<T>> {
        self.slot.read().clone()
    }

    /// 是否已经注入
    pub fn is_wired(&self) -> bool {
        self.slot.read().is_some()
    }

    pub(crate) fn set(&self, instance: Arc<T>) {
        *self.slot.write() = Some(instance);
    }
}

impl<T: ?Sized> Default for Autowired<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Autowired<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.is_wired() { "wired" } else { "unwired" };
        f.debug_tuple("Autowired")
            .field(&format_args!("{}: {state}", std::any::type_name::<T>()))
            .finish()
    }
}

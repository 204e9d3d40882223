//! 元数据定义
//!
//! 提供类型标识、类型描述符和注入字段描述符。描述符由 [`TypeCatalog`](crate::TypeCatalog)
//! 按需生成一次并缓存，之后不可变。

use crate::component::{Autowired, BeanRef, Injected, Role, RoleSet};
use crate::errors::{InjectError, InjectResult};
use std::any::{Any, TypeId};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// 类型标识
///
/// 具体类型和 `dyn Trait` 都可以作为类型标识
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// 从类型获取类型标识
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// 类型ID
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// 完整类型名称
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// 获取简短的类型名称（不包含模块路径和泛型参数）
    pub fn simple_name(&self) -> &'static str {
        simple_name(self.name)
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for TypeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(other.name)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// 从全限定名称中截取简短名称
pub fn simple_name(full_name: &str) -> &str {
    let name = full_name.strip_prefix("dyn ").unwrap_or(full_name);
    let name = name.split('<').next().unwrap_or(name);
    let name = name.split(" + ").next().unwrap_or(name);
    name.rsplit("::").next().unwrap_or(name)
}

type FieldSetter = Box<dyn Fn(&(dyn Any + Send + Sync), Injected) -> bool + Send + Sync>;
type OwnerCheck = fn(&(dyn Any + Send + Sync)) -> bool;
type Upcast = fn(BeanRef) -> Option<Injected>;

/// 注入字段描述符
pub struct FieldDescriptor {
    name: &'static str,
    declared_type: TypeKey,
    qualifier: Option<&'static str>,
    owner_check: OwnerCheck,
    setter: FieldSetter,
}

impl FieldDescriptor {
    /// 描述类型 `O` 上声明为 `Autowired<D>` 的字段
    pub fn autowired<O, D>(
        name: &'static str,
        qualifier: Option<&'static str>,
        accessor: fn(&O) -> &Autowired<D>,
    ) -> Self
    where
        O: Any + Send + Sync,
        D: ?Sized + Send + Sync + 'static,
    {
        let setter: FieldSetter = Box::new(move |owner: &(dyn Any + Send + Sync), value: Injected| {
            let Some(owner) = owner.downcast_ref::<O>() else {
                return false;
            };
            let Some(dependency) = value.into_arc::<D>() else {
                return false;
            };
            accessor(owner).set(dependency);
            true
        });

        Self {
            name,
            declared_type: TypeKey::of::<D>(),
            qualifier: qualifier.filter(|q| !q.is_empty()),
            owner_check: |owner| owner.is::<O>(),
            setter,
        }
    }

    /// 字段名称
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// 字段声明类型
    pub const fn declared_type(&self) -> &TypeKey {
        &self.declared_type
    }

    /// 限定名
    pub const fn qualifier(&self) -> Option<&'static str> {
        self.qualifier
    }

    /// `owner` 是否声明了该字段
    pub fn accepts(&self, owner: &(dyn Any + Send + Sync)) -> bool {
        (self.owner_check)(owner)
    }

    /// 检查依赖能否写入 `owner` 的该字段，不产生任何写入
    ///
    /// 检查通过后 [`inject`](Self::inject) 不会失败
    pub fn check(
        &self,
        owner_type: &str,
        owner: &(dyn Any + Send + Sync),
        value: &Injected,
    ) -> InjectResult<()> {
        if value.key() != &self.declared_type {
            return Err(InjectError::TypeMismatch {
                field_type: self.declared_type.name().to_string(),
                actual: value.key().name().to_string(),
                owner: owner_type.to_string(),
                field: self.name.to_string(),
            });
        }
        if !self.accepts(owner) {
            return Err(InjectError::FieldAccess {
                field_type: self.declared_type.name().to_string(),
                owner: owner_type.to_string(),
                field: self.name.to_string(),
            });
        }
        Ok(())
    }

    /// 将依赖写入 `owner` 的该字段，绕过字段的只读可见性
    ///
    /// 只有依赖解析器应该调用这个方法
    pub fn inject(
        &self,
        owner_type: &str,
        owner: &(dyn Any + Send + Sync),
        value: Injected,
    ) -> InjectResult<()> {
        self.check(owner_type, owner, &value)?;
        if (self.setter)(owner, value) {
            Ok(())
        } else {
            Err(InjectError::FieldAccess {
                field_type: self.declared_type.name().to_string(),
                owner: owner_type.to_string(),
                field: self.name.to_string(),
            })
        }
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("declared_type", &self.declared_type)
            .field("qualifier", &self.qualifier)
            .finish_non_exhaustive()
    }
}

/// 类型实现的接口
struct InterfaceImpl {
    key: TypeKey,
    upcast: Upcast,
}

/// 类型描述符
pub struct TypeDescriptor {
    name: &'static str,
    key: TypeKey,
    roles: RoleSet,
    fields: Vec<FieldDescriptor>,
    interfaces: Vec<InterfaceImpl>,
    constructor: Option<fn() -> BeanRef>,
    is_instance: fn(&(dyn Any + Send + Sync)) -> bool,
    as_self: Upcast,
}

impl TypeDescriptor {
    /// 为类型 `T` 创建描述符构建器
    pub fn builder<T: Any + Send + Sync>(name: &'static str) -> TypeDescriptorBuilder<T> {
        TypeDescriptorBuilder::new(name)
    }

    /// 全限定类型名称
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// 简短类型名称，用于匹配限定名
    pub fn simple_name(&self) -> &'static str {
        simple_name(self.name)
    }

    /// 类型标识
    pub const fn key(&self) -> &TypeKey {
        &self.key
    }

    /// 携带的角色
    pub const fn roles(&self) -> RoleSet {
        self.roles
    }

    /// 是否携带指定角色
    pub const fn has_role(&self, role: Role) -> bool {
        self.roles.contains(role)
    }

    /// 是否应该被注册为 bean
    pub const fn is_bean(&self) -> bool {
        !self.roles.is_empty()
    }

    /// 声明的注入字段
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// 实现的接口
    pub fn interfaces(&self) -> impl Iterator<Item = &TypeKey> {
        self.interfaces.iter().map(|interface| &interface.key)
    }

    /// 该类型能否赋值给 `super_type`（自身或其实现的接口）
    pub fn is_assignable_to(&self, super_type: &TypeKey) -> bool {
        &self.key == super_type || self.interfaces.iter().any(|i| &i.key == super_type)
    }

    /// 通过无参构造器创建实例
    pub fn instantiate(&self) -> Option<BeanRef> {
        self.constructor.map(|constructor| constructor())
    }

    /// 实例是否属于该类型
    pub fn is_instance(&self, instance: &(dyn Any + Send + Sync)) -> bool {
        (self.is_instance)(instance)
    }

    /// 将实例转换为 `target` 类型的注入值
    pub fn cast(&self, instance: BeanRef, target: &TypeKey) -> Option<Injected> {
        if &self.key == target {
            return (self.as_self)(instance);
        }
        self.interfaces
            .iter()
            .find(|interface| &interface.key == target)
            .and_then(|interface| (interface.upcast)(instance))
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("roles", &self.roles)
            .field("fields", &self.fields)
            .field(
                "interfaces",
                &self.interfaces.iter().map(|i| i.key).collect::<Vec<_>>(),
            )
            .field("constructible", &self.constructor.is_some())
            .finish()
    }
}

/// 类型描述符构建器
pub struct TypeDescriptorBuilder<T> {
    descriptor: TypeDescriptor,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> TypeDescriptorBuilder<T> {
    fn new(name: &'static str) -> Self {
        Self {
            descriptor: TypeDescriptor {
                name,
                key: TypeKey::of::<T>(),
                roles: RoleSet::empty(),
                fields: Vec::new(),
                interfaces: Vec::new(),
                constructor: None,
                is_instance: |instance| instance.is::<T>(),
                as_self: |instance| instance.downcast::<T>().ok().map(Injected::new),
            },
            _marker: std::marker::PhantomData,
        }
    }

    /// 添加角色
    #[must_use]
    pub fn role(mut self, role: Role) -> Self {
        self.descriptor.roles.insert(role);
        self
    }

    /// 设置无参构造器
    #[must_use]
    pub fn constructor(mut self, constructor: fn() -> BeanRef) -> Self {
        self.descriptor.constructor = Some(constructor);
        self
    }

    /// 使用 `Default` 作为无参构造器
    #[must_use]
    pub fn default_constructor(self) -> Self
    where
        T: Default,
    {
        self.constructor(|| Arc::new(T::default()))
    }

    /// 添加注入字段
    #[must_use]
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.descriptor.fields.push(field);
        self
    }

    /// 声明实现的接口 `I`，`upcast` 负责把 `Arc<T>` 转换为 `Arc<I>`
    #[must_use]
    pub fn implements<I: ?Sized + 'static>(mut self, upcast: Upcast) -> Self {
        let key = TypeKey::of::<I>();
        if !self.descriptor.interfaces.iter().any(|i| i.key == key) {
            self.descriptor.interfaces.push(InterfaceImpl { key, upcast });
        }
        self
    }

    /// 完成构建
    pub fn build(self) -> TypeDescriptor {
        self.descriptor
    }
}

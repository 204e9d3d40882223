//! 依赖注入器
//!
//! 遍历容器中所有 bean 的注入字段，为每个字段解析出唯一实例并写入。
//! 先为全部字段制定注入计划并检查类型，计划成功后才统一写入，任一字段失败时不写入任何字段。

use crate::container::{BeanContainer, BeanEntry};
use ioc_common::{
    FieldDescriptor, InjectError, InjectResult, Injected, LookupError, TypeDescriptor, TypeKey,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 注入目标：某个 bean 上需要注入的字段
#[derive(Debug, Clone, Copy)]
pub struct InjectionTarget<'a> {
    owner: &'a TypeDescriptor,
    field: &'a FieldDescriptor,
}

impl<'a> InjectionTarget<'a> {
    /// 所属类型
    pub const fn owner(&self) -> &'a TypeDescriptor {
        self.owner
    }

    /// 字段名称
    pub const fn field_name(&self) -> &'static str {
        self.field.name()
    }

    /// 字段声明类型
    pub const fn field_type(&self) -> &'a TypeKey {
        self.field.declared_type()
    }

    /// 限定名
    pub const fn qualifier(&self) -> Option<&'static str> {
        self.field.qualifier()
    }

    fn unresolvable(&self) -> InjectError {
        InjectError::Unresolvable {
            field_type: self.field_type().name().to_string(),
            owner: self.owner().name().to_string(),
            field: self.field_name().to_string(),
        }
    }
}

/// 一次待执行的字段写入
struct PlannedInjection<'a> {
    entry: &'a BeanEntry,
    field: &'a FieldDescriptor,
    value: Injected,
}

/// 依赖注入器
#[derive(Debug, Clone, Copy)]
pub struct DependencyInjector<'c> {
    container: &'c BeanContainer,
}

impl<'c> DependencyInjector<'c> {
    /// 为容器创建注入器
    pub const fn new(container: &'c BeanContainer) -> Self {
        Self { container }
    }

    /// 为进程级容器创建注入器
    pub fn global() -> DependencyInjector<'static> {
        DependencyInjector::new(BeanContainer::global())
    }

    /// 执行 IoC
    ///
    /// 容器为空时记录警告并直接返回
    pub fn do_ioc(&self) -> InjectResult<()> {
        if self.container.is_empty() {
            warn!("BeanContainer 中没有 bean 实例");
            return Ok(());
        }
        if !self.container.is_loaded() {
            debug!("BeanContainer 尚未执行扫描加载，只注入手动添加的 bean");
        }

        let snapshot = self.container.entries();
        let mut plan = Vec::new();
        for entry in &snapshot {
            for field in entry.descriptor().fields() {
                let target = InjectionTarget {
                    owner: entry.descriptor(),
                    field,
                };
                let value = self.resolve(&target)?;
                field.check(target.owner().name(), entry.instance().as_ref(), &value)?;
                debug!(
                    "计划注入 {}.{} <- {}",
                    target.owner().name(),
                    target.field_name(),
                    value.key()
                );
                plan.push(PlannedInjection {
                    entry,
                    field,
                    value,
                });
            }
        }

        // 计划中的每个值都已通过检查，写入不会失败
        let injected = plan.len();
        for planned in plan {
            planned.field.inject(
                planned.entry.descriptor().name(),
                planned.entry.instance().as_ref(),
                planned.value,
            )?;
        }

        info!("依赖注入完成，共注入 {} 个字段", injected);
        Ok(())
    }

    /// 解析注入目标对应的实例
    fn resolve(&self, target: &InjectionTarget<'_>) -> InjectResult<Injected> {
        let field_type = target.field_type();

        if let Some(entry) = self.container.entry(field_type) {
            return entry
                .descriptor()
                .cast(entry.instance().clone(), field_type)
                .ok_or_else(|| target.unresolvable());
        }

        let implementation = self.implementation_for(target)?;
        let instance = self
            .container
            .get_by_key(implementation.key())
            .ok_or_else(|| target.unresolvable())?;
        implementation
            .cast(instance, field_type)
            .ok_or_else(|| target.unresolvable())
    }

    /// 获取接口的实现类型
    fn implementation_for(&self, target: &InjectionTarget<'_>) -> InjectResult<Arc<TypeDescriptor>> {
        let candidates = match self.container.types_by_supertype(target.field_type()) {
            Ok(candidates) => candidates,
            Err(LookupError::EmptyRegistry | LookupError::NoMatch { .. }) => {
                return Err(target.unresolvable());
            }
        };

        match target.qualifier() {
            None if candidates.len() == 1 => candidates
                .into_iter()
                .next()
                .ok_or_else(|| target.unresolvable()),
            None => Err(InjectError::Ambiguous {
                field_type: target.field_type().name().to_string(),
                owner: target.owner().name().to_string(),
                field: target.field_name().to_string(),
                candidates: candidates.iter().map(|c| c.name().to_string()).collect(),
            }),
            Some(qualifier) => candidates
                .into_iter()
                .find(|candidate| candidate.simple_name() == qualifier)
                .ok_or_else(|| InjectError::QualifierNotMatched {
                    field_type: target.field_type().name().to_string(),
                    qualifier: qualifier.to_string(),
                    owner: target.owner().name().to_string(),
                    field: target.field_name().to_string(),
                }),
        }
    }
}

//! 错误类型定义

use thiserror::Error;

/// 类型加载错误
///
/// 相当于类加载器的 "class not found"，属于致命的配置错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeLoadError {
    #[error("类型不存在: {name}")]
    NotFound { name: String },

    #[error("类型名称冲突: {name} 被 {count} 个不同的类型注册")]
    Conflict { name: String, count: usize },

    #[error("类型描述符不一致: 期望 {expected}, 实际 {actual}")]
    DescriptorMismatch { expected: String, actual: String },
}

/// 类型扫描错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("扫描命名空间 {namespace} 时加载类型失败: {source}")]
    TypeLoad {
        namespace: String,
        #[source]
        source: TypeLoadError,
    },
}

/// Bean 容器错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContainerError {
    #[error("组件扫描失败: {source}")]
    Scan {
        #[from]
        source: ScanError,
    },

    #[error("初始化类实例失败: {type_name} 没有无参构造器")]
    Instantiation { type_name: String },

    #[error("实例类型与描述符不匹配: {type_name}")]
    InstanceMismatch { type_name: String },
}

/// 容器查询未命中
///
/// 区分 "容器为空" 与 "没有匹配的类型"，便于诊断
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("容器中没有 bean 实例")]
    EmptyRegistry,

    #[error("容器中没有匹配 {query} 的类型")]
    NoMatch { query: String },
}

impl LookupError {
    /// 创建未匹配错误
    pub fn no_match(query: impl Into<String>) -> Self {
        Self::NoMatch {
            query: query.into(),
        }
    }
}

/// 依赖注入错误
///
/// 所有变体都带有字段声明类型，足以定位问题
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InjectError {
    #[error(
        "没有找到唯一的 {field_type} 实现类实例 ({owner}.{field}), 候选: {candidates:?}, 请为 #[autowired] 设置限定名"
    )]
    Ambiguous {
        field_type: String,
        owner: String,
        field: String,
        candidates: Vec<String>,
    },

    #[error("{field_type} 的实现类中没有名为 {qualifier} 的类型 ({owner}.{field})")]
    QualifierNotMatched {
        field_type: String,
        qualifier: String,
        owner: String,
        field: String,
    },

    #[error("获取对象类型失败: {field_type} ({owner}.{field})")]
    Unresolvable {
        field_type: String,
        owner: String,
        field: String,
    },

    #[error("注入值类型不匹配: 字段 {owner}.{field} 声明为 {field_type}, 实际为 {actual}")]
    TypeMismatch {
        field_type: String,
        actual: String,
        owner: String,
        field: String,
    },

    #[error("设置属性失败: {owner}.{field} ({field_type})")]
    FieldAccess {
        field_type: String,
        owner: String,
        field: String,
    },
}

impl InjectError {
    /// 出错字段的声明类型
    pub fn field_type(&self) -> &str {
        match self {
            Self::Ambiguous { field_type, .. }
            | Self::QualifierNotMatched { field_type, .. }
            | Self::Unresolvable { field_type, .. }
            | Self::TypeMismatch { field_type, .. }
            | Self::FieldAccess { field_type, .. } => field_type,
        }
    }
}

/// IoC 运行时错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IocError {
    #[error("容器错误: {source}")]
    Container {
        #[from]
        source: ContainerError,
    },

    #[error("依赖注入错误: {source}")]
    Inject {
        #[from]
        source: InjectError,
    },
}

/// 结果类型别名
pub type TypeLoadResult<T> = Result<T, TypeLoadError>;
pub type ScanResult<T> = Result<T, ScanError>;
pub type ContainerResult<T> = Result<T, ContainerError>;
pub type LookupResult<T> = Result<T, LookupError>;
pub type InjectResult<T> = Result<T, InjectError>;
pub type IocResult<T> = Result<T, IocError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inject_error_names_field_type() {
        let error = InjectError::Unresolvable {
            field_type: "dyn app::Greeter".to_string(),
            owner: "app::Alpha".to_string(),
            field: "greeter".to_string(),
        };

        assert_eq!(error.field_type(), "dyn app::Greeter");
        assert!(error.to_string().contains("dyn app::Greeter"));
    }

    #[test]
    fn test_scan_error_converts_into_container_error() {
        let scan = ScanError::TypeLoad {
            namespace: "app::web".to_string(),
            source: TypeLoadError::NotFound {
                name: "app::web::Missing".to_string(),
            },
        };

        let error: ContainerError = scan.into();
        let message = error.to_string();
        assert!(message.contains("app::web"));
        assert!(message.contains("app::web::Missing"));
    }
}

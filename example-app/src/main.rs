//! # 示例应用程序
//!
//! 演示如何使用 Simple IoC 扫描命名空间、创建 bean 并注入依赖

mod demo;

use anyhow::Context;
use clap::Parser;
use ioc_core::{bootstrap, BeanContainer, ContainerConfig, Role};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// 默认扫描的命名空间
const DEFAULT_NAMESPACE: &str = "example_app.demo";

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "example-app")]
#[command(about = "Simple IoC 示例应用")]
struct Args {
    /// JSON 配置文件路径
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 扫描的命名空间，覆盖配置文件中的 base_package
    #[arg(short, long)]
    namespace: Option<String>,

    /// 日志级别
    #[arg(long, default_value = "info")]
    log_level: String,

    /// 以 JSON 格式输出日志
    #[arg(long)]
    json_logs: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level, args.json_logs);

    info!("启动 Simple IoC 示例应用");

    let config = load_config(&args)?;
    let container = BeanContainer::from_config(&config);
    let outcome = bootstrap(&container, &config.base_package)
        .with_context(|| format!("初始化命名空间 {} 失败", config.base_package))?;
    info!("容器加载结果: {:?}", outcome);

    demonstrate_lookup(&container);
    demonstrate_request(&container)?;

    info!("应用已退出");
    Ok(())
}

/// 初始化日志，`RUST_LOG` 优先于命令行参数
fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// 读取配置
fn load_config(args: &Args) -> anyhow::Result<ContainerConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
            serde_json::from_str::<ContainerConfig>(&content)
                .with_context(|| format!("解析配置文件失败: {}", path.display()))?
        }
        None => ContainerConfig::new(DEFAULT_NAMESPACE),
    };

    if let Some(namespace) = &args.namespace {
        config.base_package.clone_from(namespace);
    }
    if config.base_package.is_empty() {
        warn!("配置中没有 base_package，使用默认命名空间");
        config.base_package = DEFAULT_NAMESPACE.to_string();
    }
    Ok(config)
}

/// 演示按角色查询
fn demonstrate_lookup(container: &BeanContainer) {
    for role in Role::ALL {
        match container.types_by_role(role) {
            Ok(types) => {
                let names: Vec<_> = types.iter().map(|t| t.simple_name()).collect();
                info!("{} 类型: {:?}", role, names);
            }
            Err(e) => info!("{} 类型: {}", role, e),
        }
    }
}

/// 演示调用注入完成的控制器
fn demonstrate_request(container: &BeanContainer) -> anyhow::Result<()> {
    let Some(controller) = container.get::<demo::web::OrderController>() else {
        warn!("容器中没有 OrderController，跳过请求演示");
        return Ok(());
    };

    let order = controller.place("alice", 3)?;
    info!("下单成功: {}", order);
    info!("订单总数: {}", controller.count()?);
    Ok(())
}

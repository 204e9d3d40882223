//! 示例组件：控制器 -> 服务 -> 仓储

pub mod repo;
pub mod service;
pub mod web;

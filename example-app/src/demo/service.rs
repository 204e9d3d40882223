//! 订单服务

use super::repo::{Order, OrderStore};
use anyhow::Context;
use ioc_core::Autowired;
use ioc_macros::service;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// 订单号生成器
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> u64;
}

/// 自增订单号
#[derive(Default)]
#[service(implements(dyn IdGenerator))]
pub struct SequentialIds {
    next: AtomicU64,
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// 带固定前缀的订单号
#[derive(Default)]
#[service(implements(dyn IdGenerator))]
pub struct PrefixedIds {
    next: AtomicU64,
}

impl IdGenerator for PrefixedIds {
    fn next_id(&self) -> u64 {
        9_000_000 + self.next.fetch_add(1, Ordering::Relaxed)
    }
}

/// 订单服务
#[derive(Default)]
#[service]
pub struct OrderService {
    #[autowired]
    store: Autowired<dyn OrderStore>,
    #[autowired("SequentialIds")]
    ids: Autowired<dyn IdGenerator>,
}

impl OrderService {
    /// 创建订单
    pub fn create(&self, customer: &str, quantity: u32) -> anyhow::Result<Order> {
        let store = self.store.get().context("OrderStore 尚未注入")?;
        let ids = self.ids.get().context("IdGenerator 尚未注入")?;

        let order = Order {
            id: ids.next_id(),
            customer: customer.to_string(),
            quantity,
        };
        debug!("保存订单: {}", order);
        store.save(order.clone());
        Ok(order)
    }

    /// 订单总数
    pub fn count(&self) -> anyhow::Result<usize> {
        Ok(self.store.get().context("OrderStore 尚未注入")?.count())
    }
}

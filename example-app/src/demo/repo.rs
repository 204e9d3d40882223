//! 订单仓储

use ioc_macros::repository;
use parking_lot::RwLock;

/// 订单
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: u64,
    pub customer: String,
    pub quantity: u32,
}

impl std::fmt::Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} {} x{}", self.id, self.customer, self.quantity)
    }
}

/// 订单存储接口
pub trait OrderStore: Send + Sync {
    fn save(&self, order: Order);
    fn count(&self) -> usize;
}

/// 内存订单存储
#[derive(Default)]
#[repository(implements(dyn OrderStore))]
pub struct InMemoryOrderStore {
    orders: RwLock<Vec<Order>>,
}

impl OrderStore for InMemoryOrderStore {
    fn save(&self, order: Order) {
        self.orders.write().push(order);
    }

    fn count(&self) -> usize {
        self.orders.read().len()
    }
}

//! 订单控制器

use super::repo::Order;
use super::service::OrderService;
use ioc_core::Autowired;
use ioc_macros::controller;

#[derive(Default)]
#[controller]
pub struct OrderController {
    #[autowired]
    service: Autowired<OrderService>,
}

impl OrderController {
    pub fn place(&self, customer: &str, quantity: u32) -> anyhow::Result<Order> {
        anyhow::ensure!(quantity > 0, "数量必须大于 0");
        self.service()?.create(customer, quantity)
    }

    pub fn count(&self) -> anyhow::Result<usize> {
        self.service()?.count()
    }

    fn service(&self) -> anyhow::Result<std::sync::Arc<OrderService>> {
        self.service
            .get()
            .ok_or_else(|| anyhow::anyhow!("OrderService 尚未注入"))
    }
}

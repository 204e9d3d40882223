use ioc_core::{bootstrap, Autowired, BeanContainer, Introspect, LoadOutcome};
use ioc_macros::{controller, service};

pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

#[derive(Default)]
#[service(implements(dyn Clock))]
pub struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        42
    }
}

#[derive(Default)]
#[controller]
pub struct TimeController {
    #[autowired]
    clock: Autowired<dyn Clock>,
}

fn main() {
    assert_eq!(
        TimeController::TYPE_NAME,
        concat!(module_path!(), "::TimeController")
    );

    let container = BeanContainer::new();
    let outcome = bootstrap(&container, module_path!()).unwrap();
    assert_eq!(outcome, LoadOutcome::Loaded { registered: 2 });

    let controller = container.get::<TimeController>().unwrap();
    assert_eq!(controller.clock.get().unwrap().now(), 42);
}

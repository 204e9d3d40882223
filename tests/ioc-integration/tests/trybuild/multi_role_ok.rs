use ioc_core::{Introspect, Role};
use ioc_macros::{discoverable, repository, service};

#[derive(Default)]
#[ioc_macros::component]
#[service]
#[repository]
pub struct Everything;

#[discoverable]
pub struct Plain {
    pub value: u32,
}

fn main() {
    let descriptor = Everything::type_descriptor();
    assert!(descriptor.has_role(Role::Component));
    assert!(descriptor.has_role(Role::Service));
    assert!(descriptor.has_role(Role::Repository));
    assert!(!descriptor.has_role(Role::Controller));

    let plain = Plain::type_descriptor();
    assert!(!plain.is_bean());
    assert_eq!(Plain { value: 1 }.value, 1);
}

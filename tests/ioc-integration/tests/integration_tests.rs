//! 组件宏与容器的集成测试
//!
//! 测试类型由宏在启动时登记到全局类型目录，每个测试使用独立的容器和命名空间

use ioc_core::{
    bootstrap, global_catalog, BeanContainer, ContainerConfig, DependencyInjector,
    InjectError, IocError, LoadOutcome, LookupError, Role, TypeKey,
};
use std::sync::Arc;

mod shop {
    pub mod repo {
        use ioc_macros::repository;

        pub trait UserStore: Send + Sync {
            fn find(&self, id: u32) -> Option<String>;
        }

        #[derive(Default)]
        #[repository(implements(dyn UserStore))]
        pub struct MemoryUserStore;

        impl UserStore for MemoryUserStore {
            fn find(&self, id: u32) -> Option<String> {
                (id == 1).then(|| "alice".to_string())
            }
        }
    }

    pub mod service {
        use super::repo::UserStore;
        use ioc_core::Autowired;
        use ioc_macros::{discoverable, service};

        #[derive(Default)]
        #[service]
        pub struct UserService {
            #[autowired]
            pub store: Autowired<dyn UserStore>,
        }

        impl UserService {
            pub fn name_of(&self, id: u32) -> Option<String> {
                self.store.get()?.find(id)
            }
        }

        /// 只登记不实例化
        #[discoverable]
        pub struct NameFormatter {
            pub prefix: &'static str,
        }
    }

    pub mod web {
        use super::service::UserService;
        use ioc_core::Autowired;
        use ioc_macros::controller;

        #[derive(Default)]
        #[controller]
        pub struct UserController {
            #[autowired]
            pub service: Autowired<UserService>,
            pub requests: u64,
        }
    }

    /// 未加任何属性的类型对扫描不可见
    #[allow(dead_code)]
    pub struct Untracked;
}

mod greeting {
    use ioc_core::Autowired;
    use ioc_macros::{component, controller, service};

    pub trait Greeter: Send + Sync {
        fn greet(&self, name: &str) -> String;
    }

    #[derive(Default)]
    #[service(implements(dyn Greeter))]
    pub struct EnglishGreeter;

    impl Greeter for EnglishGreeter {
        fn greet(&self, name: &str) -> String {
            format!("Hello, {name}")
        }
    }

    #[derive(Default)]
    #[service(implements(dyn Greeter))]
    pub struct ChineseGreeter;

    impl Greeter for ChineseGreeter {
        fn greet(&self, name: &str) -> String {
            format!("你好, {name}")
        }
    }

    #[derive(Default)]
    #[controller]
    pub struct GreetingController {
        #[autowired("ChineseGreeter")]
        pub greeter: Autowired<dyn Greeter>,
        #[autowired(name = "EnglishGreeter")]
        pub fallback: Autowired<dyn Greeter>,
        #[autowired]
        pub english: Autowired<EnglishGreeter>,
    }

    #[derive(Default)]
    #[component]
    pub struct Undecided {
        #[autowired]
        pub greeter: Autowired<dyn Greeter>,
    }
}

mod roles {
    use ioc_macros::{repository, service};

    #[derive(Default)]
    #[service]
    #[repository]
    pub struct AuditLog;
}

#[test]
fn test_round_trip_wires_controller_service_repository() {
    let container = BeanContainer::new();
    let outcome = bootstrap(&container, "integration_tests::shop").unwrap();

    assert_eq!(outcome, LoadOutcome::Loaded { registered: 3 });
    assert_eq!(container.size(), 3);

    let controller = container.get::<shop::web::UserController>().unwrap();
    let service = container.get::<shop::service::UserService>().unwrap();
    let store = container.get::<shop::repo::MemoryUserStore>().unwrap();

    let wired_service = controller.service.get().unwrap();
    assert!(Arc::ptr_eq(&wired_service, &service));
    assert_eq!(wired_service.name_of(1).as_deref(), Some("alice"));
    assert_eq!(wired_service.name_of(2), None);

    let wired_store = service.store.get().unwrap();
    assert_eq!(
        Arc::as_ptr(&wired_store).cast::<()>(),
        Arc::as_ptr(&store).cast::<()>()
    );
    assert_eq!(controller.requests, 0);
}

#[test]
fn test_namespace_accepts_dotted_path() {
    let container = BeanContainer::new();
    container.load_beans("integration_tests.shop.repo").unwrap();

    assert_eq!(container.size(), 1);
    assert!(container.get::<shop::repo::MemoryUserStore>().is_some());
}

#[test]
fn test_discoverable_type_is_scanned_but_not_registered() {
    let catalog = global_catalog();
    let descriptor = catalog
        .load("integration_tests::shop::service::NameFormatter")
        .unwrap();
    assert!(!descriptor.is_bean());
    assert!(descriptor.instantiate().is_none());

    let container = BeanContainer::new();
    container.load_beans("integration_tests::shop::service").unwrap();
    assert_eq!(container.size(), 1);
    assert!(container
        .get_by_key(&TypeKey::of::<shop::service::NameFormatter>())
        .is_none());
    assert!(catalog
        .names()
        .iter()
        .all(|name| !name.ends_with("::Untracked")));
}

#[test]
fn test_lookup_by_role_and_supertype() {
    let container = BeanContainer::new();
    container.load_beans("integration_tests::shop").unwrap();

    let controllers = container.types_by_role(Role::Controller).unwrap();
    assert_eq!(controllers.len(), 1);
    assert_eq!(controllers[0].simple_name(), "UserController");

    let stores = container
        .types_by_supertype_of::<dyn shop::repo::UserStore>()
        .unwrap();
    assert_eq!(stores.len(), 1);
    assert_eq!(stores[0].simple_name(), "MemoryUserStore");

    assert!(matches!(
        container.types_by_role(Role::Component),
        Err(LookupError::NoMatch { .. })
    ));
    assert_eq!(container.beans().len(), 3);
    assert_eq!(container.types().len(), 3);
}

#[test]
fn test_qualifier_and_concrete_injection() {
    let container = BeanContainer::new();
    container.load_beans("integration_tests::greeting").unwrap();
    container.remove::<greeting::Undecided>();

    DependencyInjector::new(&container).do_ioc().unwrap();

    let controller = container.get::<greeting::GreetingController>().unwrap();
    assert_eq!(controller.greeter.get().unwrap().greet("Li"), "你好, Li");
    assert_eq!(controller.fallback.get().unwrap().greet("Li"), "Hello, Li");
    assert!(Arc::ptr_eq(
        &controller.english.get().unwrap(),
        &container.get::<greeting::EnglishGreeter>().unwrap()
    ));
}

#[test]
fn test_ambiguous_dependency_is_reported() {
    let container = BeanContainer::new();
    let error = bootstrap(&container, "integration_tests::greeting").unwrap_err();

    match error {
        IocError::Inject {
            source:
                InjectError::Ambiguous {
                    owner, candidates, ..
                },
        } => {
            assert_eq!(owner, "integration_tests::greeting::Undecided");
            assert_eq!(candidates.len(), 2);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let undecided = container.get::<greeting::Undecided>().unwrap();
    assert!(!undecided.greeter.is_wired());
    let controller = container.get::<greeting::GreetingController>().unwrap();
    assert!(!controller.greeter.is_wired());
}

#[test]
fn test_type_with_several_roles_registers_once() {
    let container = BeanContainer::new();
    container.load_beans("integration_tests::roles").unwrap();

    assert_eq!(container.size(), 1);
    let services = container.types_by_role(Role::Service).unwrap();
    let repositories = container.types_by_role(Role::Repository).unwrap();
    assert_eq!(services.len(), 1);
    assert_eq!(repositories.len(), 1);
    assert!(Arc::ptr_eq(&services[0], &repositories[0]));
}

#[test]
fn test_empty_namespace() {
    let container = BeanContainer::new();
    let outcome = bootstrap(&container, "integration_tests::nothing_here").unwrap();

    assert_eq!(outcome, LoadOutcome::Empty);
    assert!(container.is_loaded());
    assert_eq!(container.size(), 0);
    assert_eq!(
        container.types_by_role(Role::Service).unwrap_err(),
        LookupError::EmptyRegistry
    );
}

#[test]
fn test_container_from_json_config() {
    let config: ContainerConfig = serde_json::from_str(
        r#"{ "base_package": "integration_tests.shop", "scan": { "exclude": ["integration_tests.shop.web"] } }"#,
    )
    .unwrap();
    let container = BeanContainer::from_config(&config);

    bootstrap(&container, &config.base_package).unwrap();
    assert_eq!(container.size(), 2);
    assert!(container.get::<shop::web::UserController>().is_none());
}

#[test]
fn test_manual_bean_outside_scan_is_wired() {
    let container = BeanContainer::new();
    container.load_beans("integration_tests::shop::repo").unwrap();
    container.add(Arc::new(shop::service::UserService::default()));

    DependencyInjector::new(&container).do_ioc().unwrap();

    let service = container.get::<shop::service::UserService>().unwrap();
    assert_eq!(service.name_of(1).as_deref(), Some("alice"));
}

#[test]
fn test_global_container_loads_once() {
    let container = BeanContainer::global();
    let first = container.load_beans("integration_tests::shop").unwrap();
    let second = container.load_beans("integration_tests::shop").unwrap();

    assert_eq!(first, LoadOutcome::Loaded { registered: 3 });
    assert_eq!(second, LoadOutcome::AlreadyLoaded);
    DependencyInjector::global().do_ioc().unwrap();
    assert!(container
        .get::<shop::web::UserController>()
        .unwrap()
        .service
        .is_wired());
}

//! trybuild compile-time tests for ioc_macros

#[test]
fn ui_ioc_macros() {
    let t = trybuild::TestCases::new();
    t.pass("tests/trybuild/component_ok.rs");
    t.pass("tests/trybuild/multi_role_ok.rs");
}

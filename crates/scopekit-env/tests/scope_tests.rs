//! Entering and leaving the test scope against on-disk installations

use std::fs;
use std::panic::{self, AssertUnwindSafe};

use pretty_assertions::assert_eq;
use scopekit_config::{ConfigNode, ConfigOptions};
use scopekit_env::{
    AppConfig, Bootstrap, Environment, ModuleDirectory, ScopeError, ScopeHolder, StaticDbConfig,
    TestScope,
};
use scopekit_test_utils::{sample_live_tree, FailingSetup, InstallFixture, RecordingSetup};
use serde_json::json;

fn live_holder(options: ConfigOptions) -> ScopeHolder {
    let mut config = AppConfig::new(options);
    config.load_base().unwrap();
    let mut live = Environment::live(config);
    live.registry_mut().register("live_marker", "live", false).unwrap();
    ScopeHolder::new(live)
}

fn live_snapshot(holder: &ScopeHolder) -> (ConfigNode, ConfigOptions, bool) {
    let env = holder.current();
    (
        env.config().document().root().clone(),
        env.config().options().clone(),
        env.application().events_enabled(),
    )
}

#[test]
fn test_enter_leave_restores_live_exactly() {
    let fixture = InstallFixture::new()
        .with_local_xml("shop", true)
        .with_test_xml("shop_test");
    let mut holder = live_holder(fixture.options());
    let before = live_snapshot(&holder);

    let mut scope = TestScope::enter(&mut holder, fixture.options(), &mut Bootstrap::new()).unwrap();
    assert!(scope.env().is_test());
    assert_eq!(scope.env().config().db_name(), "shop_test");
    scope.set_event_dispatch_enabled(false);
    scope
        .env_mut()
        .config_mut()
        .set_node("default/general/locale/code", "de_DE")
        .unwrap();
    let test = scope.leave();

    assert!(test.is_test());
    assert!(!holder.current().is_test());
    assert_eq!(live_snapshot(&holder), before);
    assert_eq!(holder.current().config().db_name(), "shop");
    assert!(holder.current().registry().contains("live_marker"));
}

#[test]
fn test_missing_override_file_changes_nothing() {
    let fixture = InstallFixture::new().with_local_xml("shop", true);
    let mut holder = live_holder(fixture.options());
    let before = live_snapshot(&holder);

    let err = TestScope::enter(&mut holder, fixture.options(), &mut Bootstrap::new()).unwrap_err();

    assert!(err.is_configuration_missing());
    assert!(err.to_string().contains("local.xml.phpunit"));
    assert!(!holder.current().is_test());
    assert_eq!(live_snapshot(&holder), before);
    assert!(!fixture.base_dir().join("var/phpunit.cache").exists());
}

#[test]
fn test_failed_enter_keeps_existing_test_cache() {
    let cases = [
        InstallFixture::new().with_local_xml("shop", true),
        InstallFixture::new()
            .with_local_xml("shop", true)
            .with_test_xml("shop"),
    ];

    for fixture in cases {
        let cache_dir = fixture.base_dir().join("var/phpunit.cache");
        fs::create_dir_all(&cache_dir).unwrap();
        fs::write(cache_dir.join("eav--entity_types"), "cached").unwrap();
        let mut holder = live_holder(fixture.options());

        let err = TestScope::enter(&mut holder, fixture.options(), &mut Bootstrap::new()).unwrap_err();

        assert!(err.is_configuration_missing() || err.is_unsafe());
        assert!(err.is_fatal());
        assert_eq!(
            fs::read_to_string(cache_dir.join("eav--entity_types")).unwrap(),
            "cached"
        );
        assert!(!holder.current().is_test());
    }
}

#[test]
fn test_failing_upgrade_leaves_holder_untouched() {
    let fixture = InstallFixture::new()
        .with_local_xml("shop", true)
        .with_test_xml("shop_test");
    let mut bootstrap = Bootstrap::new().with_setup(FailingSetup::new("schema upgrade aborted"));
    let mut holder = live_holder(fixture.options());
    let before = live_snapshot(&holder);

    let err = TestScope::enter(&mut holder, fixture.options(), &mut bootstrap).unwrap_err();

    assert!(matches!(err, ScopeError::Setup(ref msg) if msg == "schema upgrade aborted"));
    assert!(!err.is_fatal());
    assert!(!holder.current().is_test());
    assert_eq!(live_snapshot(&holder), before);
}

#[test]
fn test_override_naming_live_database_is_refused() {
    let fixture = InstallFixture::new()
        .with_local_xml("shop", true)
        .with_test_xml("shop");
    let mut holder = live_holder(fixture.options());

    let err = TestScope::enter(&mut holder, fixture.options(), &mut Bootstrap::new()).unwrap_err();

    assert!(err.is_unsafe());
    assert!(!holder.current().is_test());
}

#[test]
fn test_override_without_database_name_is_refused() {
    let fixture = InstallFixture::new()
        .with_local_xml("shop", true)
        .with_test_xml_raw("<config><global><cache><prefix>t_</prefix></cache></global></config>");
    let mut holder = live_holder(fixture.options());

    let err = TestScope::enter(&mut holder, fixture.options(), &mut Bootstrap::new()).unwrap_err();
    assert!(err.is_unsafe());
}

#[test]
fn test_cache_and_session_are_redirected() {
    let fixture = InstallFixture::new()
        .with_local_xml("shop", true)
        .with_test_xml("shop_test");
    let stale = fixture.base_dir().join("var/phpunit.cache");
    fs::create_dir_all(&stale).unwrap();
    fs::write(stale.join("layout--old"), "stale").unwrap();
    let mut holder = live_holder(fixture.options());

    let scope = TestScope::enter(&mut holder, fixture.options(), &mut Bootstrap::new()).unwrap();
    let env = scope.env();
    let options = env.config().options();

    assert_eq!(options.cache_dir, fixture.base_dir().join("var/phpunit.cache"));
    assert_eq!(options.session_dir, fixture.base_dir().join("var/phpunit.session"));
    assert_eq!(
        env.config().node("global/cache/backend").unwrap().map(ConfigNode::text),
        Some("file")
    );
    assert!(!stale.join("layout--old").exists());

    let cache = env.application().cache().unwrap();
    assert!(cache.save("eav", "entity_types", b"[]").unwrap());
    assert!(!cache.save("block_html", "footer", b"<div/>").unwrap());
    drop(scope);

    assert_eq!(
        holder.current().config().options().cache_dir,
        fixture.base_dir().join("var/cache")
    );
}

#[test]
fn test_disabled_events_are_not_dispatched() {
    let fixture = InstallFixture::new()
        .with_local_xml("shop", true)
        .with_test_xml("shop_test");
    let mut holder = live_holder(fixture.options());

    let mut scope = TestScope::enter(&mut holder, fixture.options(), &mut Bootstrap::new()).unwrap();
    scope
        .env_mut()
        .events_mut()
        .subscribe("catalog_product_save_after", "reindex", |_| {});

    assert_eq!(
        scope.env_mut().dispatch_event("catalog_product_save_after", json!({"id": 1})),
        1
    );
    scope.set_event_dispatch_enabled(false);
    assert_eq!(
        scope.env_mut().dispatch_event("catalog_product_save_after", json!({"id": 1})),
        0
    );
    scope.set_event_dispatch_enabled(true);
    assert_eq!(
        scope.env_mut().dispatch_event("CATALOG_PRODUCT_SAVE_AFTER", json!({"id": 1})),
        1
    );
}

#[test]
fn test_snapshot_taken_before_database_configuration() {
    let base = ConfigNode::new("config").with_child(sample_live_tree().child("default").unwrap().clone());
    let fixture = InstallFixture::new()
        .with_base_xml(&scopekit_config::xml::to_string(&base).unwrap())
        .with_local_xml("shop", true)
        .with_test_xml("shop_test");
    let db = StaticDbConfig(
        ConfigNode::new("config")
            .with_child(
                ConfigNode::new("default")
                    .with_child(ConfigNode::new("cache").with_child(ConfigNode::leaf("backend", "apc"))),
            )
            .with_child(ConfigNode::new("stores").with_child(ConfigNode::new("french"))),
    );
    let mut bootstrap = Bootstrap::new().with_db(db);
    let mut holder = live_holder(fixture.options());

    let mut scope = TestScope::enter(&mut holder, fixture.options(), &mut bootstrap).unwrap();
    let config = scope.env().config();
    assert_eq!(config.node("default/cache/backend").unwrap().unwrap().text(), "apc");
    let sections: Vec<&str> = config.scope_snapshot().unwrap().sections().collect();
    assert_eq!(sections, vec!["default", "websites", "stores"]);

    scope.restore_scope_snapshot().unwrap();
    let config = scope.env().config();
    assert_eq!(config.node("default/cache/backend").unwrap().unwrap().text(), "database");
    assert!(config.node("stores/french").unwrap().is_none());
    assert!(config.node("stores").unwrap().is_some());
}

#[test]
fn test_restore_without_snapshot_is_invalid_state() {
    let fixture = InstallFixture::new().with_test_xml("shop_test");
    let mut holder = live_holder(fixture.options());

    let mut scope = TestScope::enter(&mut holder, fixture.options(), &mut Bootstrap::new()).unwrap();
    let err = scope.restore_scope_snapshot().unwrap_err();
    assert!(err.is_invalid_state());
}

#[test]
fn test_upgrades_run_only_with_local_config() {
    let fixture = InstallFixture::new()
        .with_local_xml("shop", true)
        .with_test_xml("shop_test");
    let (setup, calls) = RecordingSetup::new();
    let mut bootstrap = Bootstrap::new().with_setup(setup);
    let mut holder = live_holder(fixture.options());

    let scope = TestScope::enter(&mut holder, fixture.options(), &mut bootstrap).unwrap();
    assert_eq!(calls.updates.get(), 1);
    assert_eq!(calls.data_updates.get(), 1);
    assert_eq!(scope.env().application().current_store().unwrap().code, "admin");
    scope.leave();

    let bare = InstallFixture::new().with_test_xml("shop_test");
    let (setup, calls) = RecordingSetup::new();
    let mut bootstrap = Bootstrap::new().with_setup(setup);
    let mut holder = live_holder(bare.options());
    let scope = TestScope::enter(&mut holder, bare.options(), &mut bootstrap).unwrap();
    assert_eq!(calls.updates.get(), 0);
    assert_eq!(calls.data_updates.get(), 0);
    assert!(scope.env().application().current_store().is_none());
}

#[test]
fn test_local_config_wins_over_modules_and_override_wins_over_local() {
    let fixture = InstallFixture::new()
        .with_module(
            "Shop_Catalog",
            "<config><global><resources><default_setup><connection>\
             <host>module.host</host><dbname>module_db</dbname>\
             </connection></default_setup></resources></global>\
             <modules><Shop_Catalog><active>true</active></Shop_Catalog></modules></config>",
        )
        .with_local_xml("shop", true)
        .with_test_xml("shop_test");
    let mut bootstrap = Bootstrap::new().with_modules(ModuleDirectory::new());
    let mut holder = live_holder(fixture.options());

    let scope = TestScope::enter(&mut holder, fixture.options(), &mut bootstrap).unwrap();
    let config = scope.env().config();

    assert_eq!(config.db_name(), "shop_test");
    assert_eq!(
        config
            .node("global/resources/default_setup/connection/host")
            .unwrap()
            .unwrap()
            .text(),
        "localhost"
    );
    assert_eq!(
        config.node("modules/Shop_Catalog/active").unwrap().unwrap().text(),
        "true"
    );
}

#[test]
fn test_panic_inside_scope_restores_live() {
    let fixture = InstallFixture::new()
        .with_local_xml("shop", true)
        .with_test_xml("shop_test");
    let mut holder = live_holder(fixture.options());
    let before = live_snapshot(&holder);

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        let scope = TestScope::enter(&mut holder, fixture.options(), &mut Bootstrap::new()).unwrap();
        assert!(scope.env().is_test());
        panic!("test body failed");
    }));

    assert!(result.is_err());
    assert!(!holder.current().is_test());
    assert_eq!(live_snapshot(&holder), before);
}

#[test]
fn test_scope_can_be_entered_again_after_leaving() {
    let fixture = InstallFixture::new()
        .with_local_xml("shop", true)
        .with_test_xml("shop_test");
    let mut holder = live_holder(fixture.options());

    for _ in 0..3 {
        let scope = TestScope::enter(&mut holder, fixture.options(), &mut Bootstrap::new()).unwrap();
        assert!(scope.env().is_test());
        scope.leave();
        assert!(!holder.current().is_test());
    }
}

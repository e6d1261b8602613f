//! Testing utilities for the scopekit workspace
//!
//! On-disk installation fixtures and sample configuration trees.

#![allow(missing_docs)]

use std::cell::Cell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use scopekit_config::{ConfigNode, ConfigOptions};
use scopekit_env::{AppConfig, ScopeError, SetupRunner};
use tempfile::TempDir;

/// Connection block naming `db`
fn connection_xml(db: &str) -> String {
    format!(
        "<global><resources><default_setup><connection>\
         <host>localhost</host><dbname>{db}</dbname>\
         </connection></default_setup></resources></global>"
    )
}

/// `local.xml` content with the live database and, optionally, an
/// installation date
pub fn local_xml(db: &str, installed: bool) -> String {
    let install = if installed {
        "<install><date>Mon, 01 Jan 2024 00:00:00 +0000</date></install>"
    } else {
        ""
    };
    let connection = connection_xml(db).replace("</global>", &format!("{install}</global>"));
    format!("<config>{connection}</config>")
}

/// `local.xml.phpunit` content naming the test database
pub fn test_xml(db: &str) -> String {
    format!("<config>{}</config>", connection_xml(db))
}

/// Live `default`, `websites` and `stores` sections plus a `global` block
pub fn sample_live_tree() -> ConfigNode {
    ConfigNode::new("config")
        .with_child(
            ConfigNode::new("default")
                .with_child(ConfigNode::new("cache").with_child(ConfigNode::leaf("backend", "database")))
                .with_child(
                    ConfigNode::new("general")
                        .with_child(ConfigNode::new("locale").with_child(ConfigNode::leaf("code", "en_US"))),
                ),
        )
        .with_child(
            ConfigNode::new("websites").with_child(
                ConfigNode::new("base")
                    .with_child(ConfigNode::new("web").with_child(ConfigNode::leaf("secure", "1"))),
            ),
        )
        .with_child(
            ConfigNode::new("stores").with_child(
                ConfigNode::new("default")
                    .with_child(ConfigNode::new("design").with_child(ConfigNode::leaf("theme", "default"))),
            ),
        )
        .with_child(
            ConfigNode::new("global").with_child(ConfigNode::new("cache").with_child(ConfigNode::leaf("prefix", "shop_"))),
        )
}

/// Temporary installation tree
pub struct InstallFixture {
    dir: TempDir,
    options: ConfigOptions,
}

impl InstallFixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let options = ConfigOptions::new(dir.path());
        fs::create_dir_all(&options.etc_dir).unwrap();
        Self { dir, options }
    }

    fn write_etc(self, file: &str, content: &str) -> Self {
        fs::write(self.options.etc_dir.join(file), content).unwrap();
        self
    }

    pub fn with_base_xml(self, xml: &str) -> Self {
        self.write_etc("config.xml", xml)
    }

    pub fn with_local_xml(self, db: &str, installed: bool) -> Self {
        self.write_etc("local.xml", &local_xml(db, installed))
    }

    pub fn with_test_xml(self, db: &str) -> Self {
        self.write_etc("local.xml.phpunit", &test_xml(db))
    }

    pub fn with_test_xml_raw(self, xml: &str) -> Self {
        self.write_etc("local.xml.phpunit", xml)
    }

    pub fn with_module(self, name: &str, xml: &str) -> Self {
        let modules = self.options.etc_dir.join("modules");
        fs::create_dir_all(&modules).unwrap();
        fs::write(modules.join(format!("{name}.xml")), xml).unwrap();
        self
    }

    pub fn options(&self) -> ConfigOptions {
        self.options.clone()
    }

    pub fn base_dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn etc_dir(&self) -> &Path {
        &self.options.etc_dir
    }
}

impl Default for InstallFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Call counters shared with a [`RecordingSetup`]
#[derive(Debug, Clone, Default)]
pub struct SetupCalls {
    pub updates: Rc<Cell<usize>>,
    pub data_updates: Rc<Cell<usize>>,
}

/// Setup runner that only counts its invocations
#[derive(Debug, Clone, Default)]
pub struct RecordingSetup {
    calls: SetupCalls,
}

impl RecordingSetup {
    pub fn new() -> (Self, SetupCalls) {
        let calls = SetupCalls::default();
        (
            Self {
                calls: calls.clone(),
            },
            calls,
        )
    }
}

impl SetupRunner for RecordingSetup {
    fn apply_all_updates(&mut self, _config: &AppConfig) -> Result<(), ScopeError> {
        self.calls.updates.set(self.calls.updates.get() + 1);
        Ok(())
    }

    fn apply_all_data_updates(&mut self, _config: &AppConfig) -> Result<(), ScopeError> {
        self.calls.data_updates.set(self.calls.data_updates.get() + 1);
        Ok(())
    }
}

/// Setup runner whose schema upgrade fails
#[derive(Debug, Clone)]
pub struct FailingSetup {
    message: String,
}

impl FailingSetup {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

impl SetupRunner for FailingSetup {
    fn apply_all_updates(&mut self, _config: &AppConfig) -> Result<(), ScopeError> {
        Err(ScopeError::Setup(self.message.clone()))
    }

    fn apply_all_data_updates(&mut self, _config: &AppConfig) -> Result<(), ScopeError> {
        Ok(())
    }
}

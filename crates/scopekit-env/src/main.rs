//! `scopekit` command line: inspect the test environment of an installation

use std::path::PathBuf;

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use scopekit_config::{xml, ConfigOptions};
use scopekit_env::{init_tracing, Bootstrap, Environment, ModuleDirectory};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct CheckReport {
    base_dir: PathBuf,
    test_config: PathBuf,
    db_name: String,
    cache_dir: PathBuf,
    session_dir: PathBuf,
    local_config_loaded: bool,
    installed: bool,
    snapshot_sections: Vec<String>,
}

impl CheckReport {
    fn from_env(env: &Environment) -> Self {
        let config = env.config();
        let options = config.options();
        Self {
            base_dir: options.base_dir.clone(),
            test_config: config.test_config_path(),
            db_name: config.db_name().to_string(),
            cache_dir: options.cache_dir.clone(),
            session_dir: options.session_dir.clone(),
            local_config_loaded: config.is_local_config_loaded(),
            installed: config.is_installed(),
            snapshot_sections: config
                .scope_snapshot()
                .map(|s| s.sections().map(str::to_string).collect())
                .unwrap_or_default(),
        }
    }

    fn generate_text(&self) -> String {
        let sections = if self.snapshot_sections.is_empty() {
            "(none)".to_string()
        } else {
            self.snapshot_sections.join(", ")
        };
        format!(
            "Test Environment Report\n\
             =======================\n\
             Base Directory:  {}\n\
             Test Config:     {}\n\
             Test Database:   {}\n\
             Cache Directory: {}\n\
             Session Dir:     {}\n\
             Local Config:    {}\n\
             Installed:       {}\n\
             Snapshot:        {}",
            self.base_dir.display(),
            self.test_config.display(),
            self.db_name,
            self.cache_dir.display(),
            self.session_dir.display(),
            self.local_config_loaded,
            self.installed,
            sections,
        )
    }
}

fn cli() -> Command {
    Command::new("scopekit")
        .version(scopekit_env::VERSION)
        .about("Inspect the isolated test environment of an installation")
        .subcommand_required(true)
        .arg(
            Arg::new("base-dir")
                .long("base-dir")
                .global(true)
                .default_value(".")
                .value_parser(value_parser!(PathBuf))
                .help("Installation root"),
        )
        .arg(
            Arg::new("etc-dir")
                .long("etc-dir")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Configuration directory (default: <base-dir>/app/etc)"),
        )
        .arg(
            Arg::new("var-dir")
                .long("var-dir")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Runtime data directory (default: <base-dir>/var)"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("check")
                .about("Build the test environment and report what it resolved")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("dump")
                .about("Print the merged test configuration as XML")
                .arg(
                    Arg::new("path")
                        .long("path")
                        .help("Only print the node at this path (e.g. global/cache)"),
                ),
        )
}

fn options_from(args: &ArgMatches) -> ConfigOptions {
    let base_dir = args
        .get_one::<PathBuf>("base-dir")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."));
    let mut options = ConfigOptions::new(base_dir);
    if let Some(etc_dir) = args.get_one::<PathBuf>("etc-dir") {
        options = options.with_etc_dir(etc_dir);
    }
    if let Some(var_dir) = args.get_one::<PathBuf>("var-dir") {
        options = options.with_var_dir(var_dir);
    }
    options
}

fn build_env(args: &ArgMatches) -> anyhow::Result<Environment> {
    let options = options_from(args);
    let mut bootstrap = Bootstrap::new().with_modules(ModuleDirectory::new());
    Environment::test(options, &mut bootstrap).context("failed to build test environment")
}

fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    match matches.subcommand() {
        Some(("check", args)) => {
            let env = build_env(args)?;
            let report = CheckReport::from_env(&env);
            if args.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report.generate_text());
            }
        }
        Some(("dump", args)) => {
            let env = build_env(args)?;
            let output = match args.get_one::<String>("path") {
                Some(path) => {
                    let node = env
                        .config()
                        .node(path)?
                        .with_context(|| format!("no configuration node at {path}"))?;
                    xml::to_string(node)?
                }
                None => env.config().document().to_xml_string()?,
            };
            println!("{output}");
        }
        _ => {}
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("log-json"))?;
    run(&matches)
}

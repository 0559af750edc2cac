use clap::Parser;

use super::*;
use crate::domain::routing::RoutingContext;

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.public_port = Some(4000);
    raw.logging.level = Some("info".to_string());

    let overrides = ServeOverrides {
        public_port: Some(4321),
        log_level: Some("debug".to_string()),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.public_addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn defaults_are_usable_without_any_file() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.server.public_addr.port(), DEFAULT_PUBLIC_PORT);
    assert_eq!(settings.server.admin_addr.port(), DEFAULT_ADMIN_PORT);
    assert_eq!(settings.site.base_url, "");
    assert_eq!(settings.site.asset_base_url(), "/static/pageless");
    assert_eq!(settings.options.namespace, "pageless");
    assert!(settings.options.file.is_none());
    assert_eq!(settings.registry.capacity.get(), DEFAULT_REGISTRY_CAPACITY);
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn base_url_loses_trailing_slash() {
    let mut raw = RawSettings::default();
    raw.site.base_url = Some("https://blog.example/".into());
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.site.base_url, "https://blog.example");
    assert_eq!(
        settings.site.asset_base_url(),
        "https://blog.example/static/pageless"
    );
}

#[test]
fn invalid_values_name_their_key() {
    let mut raw = RawSettings::default();
    raw.site.base_url = Some("ftp://blog.example".into());
    let err = Settings::from_raw(raw).expect_err("bad scheme");
    assert!(matches!(err, LoadError::Invalid { key: "site.base_url", .. }));

    let mut raw = RawSettings::default();
    raw.registry.capacity = Some(0);
    let err = Settings::from_raw(raw).expect_err("zero capacity");
    assert!(matches!(err, LoadError::Invalid { key: "registry.capacity", .. }));

    let mut raw = RawSettings::default();
    raw.options.namespace = Some("has space".into());
    let err = Settings::from_raw(raw).expect_err("bad namespace");
    assert!(matches!(err, LoadError::Invalid { key: "options.namespace", .. }));

    let mut raw = RawSettings::default();
    raw.server.admin_port = Some(DEFAULT_PUBLIC_PORT);
    let err = Settings::from_raw(raw).expect_err("shared address");
    assert!(matches!(err, LoadError::Invalid { key: "server.admin_port", .. }));
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["pageless"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_serve_overrides() {
    let args = CliArgs::parse_from([
        "pageless",
        "serve",
        "--server-host",
        "0.0.0.0",
        "--options-file",
        "/tmp/options.toml",
        "--registry-capacity",
        "16",
    ]);

    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            assert_eq!(serve.overrides.server_host.as_deref(), Some("0.0.0.0"));
            assert_eq!(
                serve.overrides.store.options_file.as_deref(),
                Some(std::path::Path::new("/tmp/options.toml"))
            );
            assert_eq!(serve.overrides.registry_capacity, Some(16));
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_script_filters() {
    let args = CliArgs::parse_from(["pageless", "script", "--date", "2024/5"]);
    match args.command.expect("script command") {
        Command::Script(script) => {
            assert_eq!(
                script.routing_context().expect("context"),
                RoutingContext::Date {
                    year: 2024,
                    month: Some(5),
                    day: None
                }
            );
        }
        _ => panic!("wrong command parsed"),
    }

    let args = CliArgs::parse_from(["pageless", "hash"]);
    match args.command.expect("hash command") {
        Command::Hash(hash) => {
            assert_eq!(hash.routing_context().expect("context"), RoutingContext::None)
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn script_filters_are_exclusive() {
    let result = CliArgs::try_parse_from(["pageless", "script", "--tag", "news", "--search", "x"]);
    assert!(result.is_err());
}

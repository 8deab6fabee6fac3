use serial_test::serial;

use super::*;

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.public_port = Some(4000);
    raw.logging.level = Some("info".to_string());
    raw.feed.page_size = Some(25);

    let overrides = ServeOverrides {
        public_port: Some(4321),
        log_level: Some("debug".to_string()),
        feed_page_size: Some(5),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.public_addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert_eq!(settings.feed.page_size.get(), 5);
}

#[test]
fn defaults_match_documented_values() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.feed.page_size.get(), 10);
    assert!(settings.cache.enabled);
    assert_eq!(settings.cache.ttl_seconds, 20);
    assert_eq!(settings.cache.capacity, 64);
    assert_eq!(settings.auth.identity_header.as_str(), "x-inkwell-author-id");
    assert_eq!(settings.database.max_connections.get(), 8);
    assert!(settings.database.url.is_none());
    assert!(matches!(settings.logging.format, LogFormat::Compact));
}

#[test]
fn zero_page_size_is_rejected() {
    let mut raw = RawSettings::default();
    raw.feed.page_size = Some(0);

    let err = Settings::from_raw(raw).expect_err("zero page size");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "feed.page_size",
            ..
        }
    ));
}

#[test]
fn zero_cache_capacity_is_rejected() {
    let mut raw = RawSettings::default();
    raw.cache.capacity = Some(0);

    let err = Settings::from_raw(raw).expect_err("zero capacity");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "cache.capacity",
            ..
        }
    ));
}

#[test]
fn invalid_identity_header_is_rejected() {
    let mut raw = RawSettings::default();
    raw.auth.identity_header = Some("not a header".to_string());

    let err = Settings::from_raw(raw).expect_err("invalid header");
    assert!(err.to_string().contains("auth.identity_header"));
}

#[test]
fn blank_database_url_is_treated_as_missing() {
    let mut raw = RawSettings::default();
    raw.database.url = Some("   ".to_string());

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.database.url.is_none());
}

#[test]
fn admin_listener_cannot_share_public_address() {
    let mut raw = RawSettings::default();
    raw.server.public_port = Some(3005);
    raw.server.admin_port = Some(3005);

    let err = Settings::from_raw(raw).expect_err("shared address");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "server.admin_port",
            ..
        }
    ));
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
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["inkwell"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_serve_overrides() {
    let args = CliArgs::parse_from([
        "inkwell",
        "serve",
        "--database-url",
        "postgres://example",
        "--feed-page-size",
        "3",
        "--cache-enabled",
        "false",
        "--cache-ttl-seconds",
        "0",
    ]);

    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            let overrides = &serve.overrides;
            assert_eq!(
                overrides.database.database_url.as_deref(),
                Some("postgres://example")
            );
            assert_eq!(overrides.feed_page_size, Some(3));
            assert_eq!(overrides.cache_enabled, Some(false));
            assert_eq!(overrides.cache_ttl_seconds, Some(0));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parse_migrate_arguments() {
    let args = CliArgs::parse_from(["inkwell", "migrate", "--database-url", "postgres://db"]);

    match args.command.expect("migrate command") {
        Command::Migrate(migrate) => {
            assert_eq!(
                migrate.database.database_url.as_deref(),
                Some("postgres://db")
            );
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
#[serial]
fn environment_overrides_file_values() {
    const KEY: &str = "INKWELL__AUTH__IDENTITY_HEADER";

    // SAFETY: serialised with the other environment-mutating tests.
    unsafe { std::env::set_var(KEY, "x-forwarded-user-id") };
    let result = load(&CliArgs::parse_from(["inkwell", "serve"]));
    unsafe { std::env::remove_var(KEY) };

    let settings = result.expect("valid settings");
    assert_eq!(
        settings.auth.identity_header.as_str(),
        "x-forwarded-user-id"
    );
}

#[test]
fn cache_ttl_above_one_day_is_rejected() {
    let mut raw = RawSettings::default();
    raw.cache.ttl_seconds = Some(u64::MAX);

    let err = Settings::from_raw(raw).expect_err("ttl too large");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "cache.ttl_seconds",
            ..
        }
    ));

    let mut raw = RawSettings::default();
    raw.cache.ttl_seconds = Some(86_400);
    let settings = Settings::from_raw(raw).expect("one day is allowed");
    assert_eq!(settings.cache.ttl_seconds, 86_400);
}

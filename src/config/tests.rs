use super::*;

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(4000);
    raw.logging.level = Some("info".to_string());

    let overrides = ServeOverrides {
        server_port: Some(4321),
        log_level: Some("debug".to_string()),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn defaults_fill_every_section() {
    let raw = RawSettings::default();
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.port(), DEFAULT_PORT);
    assert_eq!(
        settings.server.graceful_shutdown,
        Duration::from_secs(DEFAULT_GRACEFUL_SHUTDOWN_SECS)
    );
    assert_eq!(settings.logging.level, LevelFilter::INFO);
    assert!(matches!(settings.logging.format, LogFormat::Compact));
    assert_eq!(settings.database.url, None);
    assert_eq!(
        settings.database.max_connections.get(),
        DEFAULT_DB_MAX_CONNECTIONS
    );
}

#[test]
fn cache_settings_use_correct_defaults() {
    let raw = RawSettings::default();
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(settings.cache.enable_object_cache);
    assert!(settings.cache.enable_view_cache);
    assert_eq!(settings.cache.default_ttl_secs, DEFAULT_CACHE_TTL_SECS);
    assert_eq!(settings.cache.view_ttl_secs, DEFAULT_CACHE_TTL_SECS);
}

#[test]
fn cache_settings_can_be_overridden_via_cli() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        cache_objects: Some(false),
        cache_view_ttl_seconds: Some(60),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(!settings.cache.enable_object_cache);
    assert!(settings.cache.enable_view_cache);
    assert_eq!(settings.cache.view_ttl_secs, 60);
    // Other fields should still use defaults
    assert_eq!(settings.cache.default_ttl_secs, DEFAULT_CACHE_TTL_SECS);
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
    let args = CliArgs::parse_from(["kontur"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_serve_overrides() {
    let args = CliArgs::parse_from([
        "kontur",
        "serve",
        "--server-host",
        "0.0.0.0",
        "--database-url",
        "postgres://override",
        "--cache-views=false",
        "--cache-default-ttl-seconds",
        "120",
    ]);

    let Some(Command::Serve(serve)) = args.command else {
        panic!("wrong command parsed");
    };
    assert_eq!(serve.overrides.server_host.as_deref(), Some("0.0.0.0"));
    assert_eq!(
        serve.overrides.database_url.as_deref(),
        Some("postgres://override")
    );
    assert_eq!(serve.overrides.cache_views, Some(false));
    assert_eq!(serve.overrides.cache_default_ttl_seconds, Some(120));
}

#[test]
#[serial_test::serial]
fn environment_variables_override_file_values() {
    unsafe {
        std::env::set_var("KONTUR__SERVER__PORT", "4555");
    }

    let cli = CliArgs::parse_from(["kontur"]);
    let settings = load(&cli);

    unsafe {
        std::env::remove_var("KONTUR__SERVER__PORT");
    }

    assert_eq!(settings.expect("valid settings").server.addr.port(), 4555);
}

#[test]
fn blank_database_url_is_treated_as_unset() {
    let mut raw = RawSettings::default();
    raw.database.url = Some("   ".to_string());

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.database.url, None);
}

#[test]
fn zero_ttl_is_rejected() {
    let mut raw = RawSettings::default();
    raw.cache.view_ttl_secs = Some(0);

    let err = Settings::from_raw(raw).expect_err("zero ttl");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "cache.view_ttl_secs",
            ..
        }
    ));
}

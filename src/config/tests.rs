use super::*;
use serial_test::serial;
use std::env;
use std::net::IpAddr;
use std::path::PathBuf;

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, _) in vars {
        unsafe { env::remove_var(key) };
    }

    result
}

fn clear_assetrec_env() {
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    unsafe {
        env::remove_var("ASSETREC_PORT");
        env::remove_var("ASSETREC_BIND_ADDR");
        env::remove_var("ASSETREC_CHECKPOINT_PATH");
        env::remove_var("ASSETREC_ASSETS_PATH");
        env::remove_var("ASSETREC_NAME_OVERRIDES_PATH");
        env::remove_var("ASSETREC_DEFAULT_TOP_K");
        env::remove_var("ASSETREC_MAX_TOP_K");
        env::remove_var("ASSETREC_REQUEST_TIMEOUT_MS");
        env::remove_var("ASSETREC_SCORING_BATCH_SIZE");
        env::remove_var("ASSETREC_SCORING_SHARDS");
    }
}

fn manifest_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn valid_config() -> Config {
    Config {
        checkpoint_path: Some(manifest_dir().join("src")),
        ..Default::default()
    }
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.port, 8080);
    assert_eq!(
        config.bind_addr,
        IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1))
    );
    assert!(config.checkpoint_path.is_none());
    assert!(config.assets_path.is_none());
    assert_eq!(config.default_top_k, 10);
    assert_eq!(config.max_top_k, 100);
    assert_eq!(config.request_timeout_ms, 2_000);
    assert_eq!(config.scoring_shards, 1);
}

#[test]
fn test_socket_addr() {
    let config = Config::default();
    assert_eq!(config.socket_addr(), "127.0.0.1:8080");

    let config = Config {
        port: 3000,
        bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(0, 0, 0, 0)),
        ..Default::default()
    };
    assert_eq!(config.socket_addr(), "0.0.0.0:3000");
}

#[test]
fn test_rank_options_follow_scoring_settings() {
    let config = Config {
        scoring_batch_size: 64,
        scoring_shards: 4,
        ..Default::default()
    };

    let options = config.rank_options();
    assert_eq!(options.batch_size, 64);
    assert_eq!(options.shards, 4);
    assert!(options.deadline.is_none());
}

#[test]
#[serial]
fn test_from_env_with_defaults() {
    clear_assetrec_env();

    let config = Config::from_env().expect("should parse with defaults");

    assert_eq!(config.port, 8080);
    assert!(config.checkpoint_path.is_none());
    assert_eq!(config.scoring_batch_size, 4096);
}

#[test]
#[serial]
fn test_from_env_custom_port() {
    clear_assetrec_env();

    with_env_vars(&[("ASSETREC_PORT", "3000")], || {
        let config = Config::from_env().expect("should parse");
        assert_eq!(config.port, 3000);
    });
}

#[test]
#[serial]
fn test_from_env_ipv6_bind_addr() {
    clear_assetrec_env();

    with_env_vars(&[("ASSETREC_BIND_ADDR", "::1")], || {
        let config = Config::from_env().expect("should parse");
        assert_eq!(
            config.bind_addr,
            IpAddr::V6(std::net::Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 1))
        );
    });
}

#[test]
#[serial]
fn test_from_env_paths_are_trimmed_and_blank_is_none() {
    clear_assetrec_env();

    with_env_vars(
        &[
            ("ASSETREC_CHECKPOINT_PATH", "  /models/neumf  "),
            ("ASSETREC_ASSETS_PATH", "   "),
        ],
        || {
            let config = Config::from_env().expect("should parse");
            assert_eq!(config.checkpoint_path, Some(PathBuf::from("/models/neumf")));
            assert!(config.assets_path.is_none());
        },
    );
}

#[test]
#[serial]
fn test_from_env_scoring_settings() {
    clear_assetrec_env();

    with_env_vars(
        &[
            ("ASSETREC_DEFAULT_TOP_K", "5"),
            ("ASSETREC_MAX_TOP_K", "50"),
            ("ASSETREC_REQUEST_TIMEOUT_MS", "250"),
            ("ASSETREC_SCORING_BATCH_SIZE", "512"),
            ("ASSETREC_SCORING_SHARDS", "8"),
        ],
        || {
            let config = Config::from_env().expect("should parse");
            assert_eq!(config.default_top_k, 5);
            assert_eq!(config.max_top_k, 50);
            assert_eq!(config.request_timeout(), std::time::Duration::from_millis(250));
            assert_eq!(config.scoring_batch_size, 512);
            assert_eq!(config.scoring_shards, 8);
        },
    );
}

#[test]
#[serial]
fn test_from_env_invalid_number_uses_default() {
    clear_assetrec_env();

    with_env_vars(&[("ASSETREC_DEFAULT_TOP_K", "ten")], || {
        let config = Config::from_env().expect("should parse with fallback");
        assert_eq!(config.default_top_k, 10);
    });
}

#[test]
#[serial]
fn test_invalid_port_zero() {
    clear_assetrec_env();

    with_env_vars(&[("ASSETREC_PORT", "0")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort { .. }));
        assert!(err.to_string().contains("invalid port"));
    });
}

#[test]
#[serial]
fn test_invalid_port_too_large() {
    clear_assetrec_env();

    with_env_vars(&[("ASSETREC_PORT", "99999")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::PortParseError { .. }));
    });
}

#[test]
#[serial]
fn test_invalid_bind_addr() {
    clear_assetrec_env();

    with_env_vars(&[("ASSETREC_BIND_ADDR", "not.an.ip.address")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBindAddr { .. }));
        assert!(err.to_string().contains("failed to parse bind address"));
    });
}

#[test]
fn test_validate_requires_checkpoint_path() {
    let err = Config::default().validate().unwrap_err();

    assert!(matches!(
        err,
        ConfigError::MissingEnvVar {
            name: "ASSETREC_CHECKPOINT_PATH"
        }
    ));
}

#[test]
fn test_validate_nonexistent_checkpoint_path() {
    let config = Config {
        checkpoint_path: Some(PathBuf::from("/nonexistent/checkpoint")),
        ..Default::default()
    };

    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::PathNotFound { .. }));
}

#[test]
fn test_validate_checkpoint_path_is_file() {
    let config = Config {
        checkpoint_path: Some(manifest_dir().join("Cargo.toml")),
        ..Default::default()
    };

    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::NotADirectory { .. }));
}

#[test]
fn test_validate_assets_path_is_directory() {
    let config = Config {
        assets_path: Some(manifest_dir().join("src")),
        ..valid_config()
    };

    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::NotAFile { .. }));
}

#[test]
fn test_validate_missing_overrides_file() {
    let config = Config {
        name_overrides_path: Some(PathBuf::from("/nonexistent/overrides.json")),
        ..valid_config()
    };

    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::PathNotFound { .. }));
}

#[test]
fn test_validate_default_top_k_above_max() {
    let config = Config {
        default_top_k: 20,
        max_top_k: 10,
        ..valid_config()
    };

    let err = config.validate().unwrap_err();
    assert!(matches!(
        err,
        ConfigError::InvalidValue {
            name: "ASSETREC_DEFAULT_TOP_K",
            ..
        }
    ));
}

#[test]
fn test_validate_zero_batch_size_and_shards() {
    let config = Config {
        scoring_batch_size: 0,
        ..valid_config()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidValue { .. })
    ));

    let config = Config {
        scoring_shards: 0,
        ..valid_config()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidValue { .. })
    ));
}

#[test]
fn test_validate_success_with_valid_paths() {
    let config = Config {
        assets_path: Some(manifest_dir().join("Cargo.toml")),
        ..valid_config()
    };

    assert!(config.validate().is_ok());
}

#[test]
fn test_error_messages_are_descriptive() {
    let err = ConfigError::InvalidPort {
        value: "0".to_string(),
    };
    assert!(err.to_string().contains("1 and 65535"));

    let err = ConfigError::MissingEnvVar {
        name: "ASSETREC_CHECKPOINT_PATH",
    };
    assert!(err.to_string().contains("ASSETREC_CHECKPOINT_PATH"));

    let err = ConfigError::InvalidValue {
        name: "ASSETREC_MAX_TOP_K",
        reason: "must be at least 1".to_string(),
    };
    assert!(err.to_string().contains("must be at least 1"));
}

use snsotp::{Authenticator, Config, Error, Mode, create_code, time_interval};
use std::io::Write;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn load_totp_config_and_authenticate() {
    let file = write_config(
        "env: dev\nhost: 127.0.0.1\ncred:\n  secret: JBSWY3DPEHPK3PXP\n  type: totp\n  window: 0\n",
    );
    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.cred.build().unwrap().mode(), Mode::Totp);

    let now = 1_650_000_000;
    let mut auth = Authenticator::in_memory(config.cred);
    let previous = create_code("JBSWY3DPEHPK3PXP", time_interval(now) - 1).unwrap();
    let current = create_code("JBSWY3DPEHPK3PXP", time_interval(now)).unwrap();

    assert!(!auth.validate_at(&previous, now));
    assert!(auth.validate_at(&current, now));
    assert!(!auth.validate_at(&current, now));
}

#[test]
fn missing_file_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = Config::load(dir.path().join("app.yaml"));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn unknown_type_is_rejected_when_building() {
    let file = write_config("cred:\n  secret: JBSWY3DPEHPK3PXP\n  type: steam\n");
    let config = Config::load(file.path()).unwrap();
    assert!(matches!(
        config.cred.build(),
        Err(Error::UnsupportedAlgorithmType(kind)) if kind == "steam"
    ));
}

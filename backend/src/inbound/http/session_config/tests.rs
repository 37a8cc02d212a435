//! Unit tests for session settings.

use std::collections::HashMap;
use std::io::Write;

use mockable::MockEnv;
use rstest::{fixture, rstest};
use tempfile::NamedTempFile;

use super::*;

fn key_file(len: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp key file");
    file.write_all(&vec![b'k'; len]).expect("write key");
    file
}

fn env_with(vars: HashMap<&'static str, String>) -> MockEnv {
    let mut env = MockEnv::new();
    env.expect_string()
        .times(0..)
        .returning(move |name| vars.get(name).cloned());
    env
}

#[fixture]
fn valid_key() -> NamedTempFile {
    key_file(KEY_MIN_BYTES)
}

fn release_vars(key: &NamedTempFile) -> HashMap<&'static str, String> {
    HashMap::from([
        (KEY_FILE_ENV, key.path().display().to_string()),
        (COOKIE_SECURE_ENV, "1".to_owned()),
        (SAMESITE_ENV, "Strict".to_owned()),
        (ALLOW_EPHEMERAL_ENV, "0".to_owned()),
    ])
}

#[rstest]
fn release_accepts_complete_settings(valid_key: NamedTempFile) {
    let env = env_with(release_vars(&valid_key));
    let settings = session_settings_from_env(&env, BuildMode::Release).expect("valid settings");
    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Strict);
}

#[rstest]
fn release_keys_are_derived_deterministically(valid_key: NamedTempFile) {
    let first = session_settings_from_env(&env_with(release_vars(&valid_key)), BuildMode::Release)
        .expect("valid settings");
    let second =
        session_settings_from_env(&env_with(release_vars(&valid_key)), BuildMode::Release)
            .expect("valid settings");
    assert_eq!(key_fingerprint(&first.key), key_fingerprint(&second.key));
}

#[rstest]
#[case::cookie_secure(COOKIE_SECURE_ENV)]
#[case::same_site(SAMESITE_ENV)]
#[case::ephemeral(ALLOW_EPHEMERAL_ENV)]
fn release_requires_every_toggle(valid_key: NamedTempFile, #[case] missing: &'static str) {
    let mut vars = release_vars(&valid_key);
    vars.remove(missing);
    let err = session_settings_from_env(&env_with(vars), BuildMode::Release)
        .err()
        .expect("missing toggle rejected");
    assert!(
        matches!(err, SessionConfigError::MissingEnv { name } if name == missing),
        "unexpected error: {err}"
    );
}

#[rstest]
#[case::cookie_secure(COOKIE_SECURE_ENV, "maybe")]
#[case::same_site(SAMESITE_ENV, "Sideways")]
#[case::ephemeral(ALLOW_EPHEMERAL_ENV, "")]
fn release_rejects_malformed_toggles(
    valid_key: NamedTempFile,
    #[case] name: &'static str,
    #[case] value: &str,
) {
    let mut vars = release_vars(&valid_key);
    vars.insert(name, value.to_owned());
    let err = session_settings_from_env(&env_with(vars), BuildMode::Release)
        .err()
        .expect("malformed toggle rejected");
    assert!(matches!(err, SessionConfigError::InvalidEnv { .. }), "{err}");
}

#[rstest]
fn release_rejects_ephemeral_keys(valid_key: NamedTempFile) {
    let mut vars = release_vars(&valid_key);
    vars.insert(ALLOW_EPHEMERAL_ENV, "true".to_owned());
    let err = session_settings_from_env(&env_with(vars), BuildMode::Release)
        .err()
        .expect("ephemeral rejected");
    assert!(matches!(err, SessionConfigError::EphemeralNotAllowed));
}

#[rstest]
fn release_rejects_short_keys() {
    let short = key_file(32);
    let err = session_settings_from_env(&env_with(release_vars(&short)), BuildMode::Release)
        .err()
        .expect("short key rejected");
    assert!(matches!(
        err,
        SessionConfigError::KeyTooShort { length: 32, .. }
    ));
}

#[rstest]
fn release_rejects_unreadable_keys(valid_key: NamedTempFile) {
    let mut vars = release_vars(&valid_key);
    vars.insert(KEY_FILE_ENV, "/nonexistent/pazanimal/session_key".to_owned());
    let err = session_settings_from_env(&env_with(vars), BuildMode::Release)
        .err()
        .expect("unreadable key rejected");
    assert!(matches!(err, SessionConfigError::KeyRead { .. }));
}

#[rstest]
fn release_rejects_insecure_same_site_none(valid_key: NamedTempFile) {
    let mut vars = release_vars(&valid_key);
    vars.insert(COOKIE_SECURE_ENV, "0".to_owned());
    vars.insert(SAMESITE_ENV, "None".to_owned());
    let err = session_settings_from_env(&env_with(vars), BuildMode::Release)
        .err()
        .expect("insecure None rejected");
    assert!(matches!(err, SessionConfigError::InsecureSameSiteNone));
}

#[rstest]
fn debug_falls_back_to_defaults() {
    let vars = HashMap::from([
        (KEY_FILE_ENV, "/nonexistent/pazanimal/session_key".to_owned()),
        (SAMESITE_ENV, "Sideways".to_owned()),
    ]);
    let settings = session_settings_from_env(&env_with(vars), BuildMode::Debug)
        .expect("debug tolerates gaps");
    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Lax);
}

#[rstest]
fn debug_replaces_short_keys_with_ephemeral_ones() {
    let short = key_file(8);
    let vars = HashMap::from([(KEY_FILE_ENV, short.path().display().to_string())]);
    let first = session_settings_from_env(&env_with(vars.clone()), BuildMode::Debug)
        .expect("debug tolerates short keys");
    let second = session_settings_from_env(&env_with(vars), BuildMode::Debug)
        .expect("debug tolerates short keys");
    assert_ne!(key_fingerprint(&first.key), key_fingerprint(&second.key));
}

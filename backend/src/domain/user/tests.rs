//! Tests for the domain user model.

use super::*;
use chrono::TimeZone;
use rstest::{fixture, rstest};
use serde_json::json;

const VALID_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

#[fixture]
fn admin() -> User {
    User::new(
        UserId::new(VALID_ID).expect("fixture id"),
        UserName::new("Ada Lovelace").expect("fixture name"),
        EmailAddress::new("ada@example.org").expect("fixture email"),
        [Role::Admin, Role::Usuario],
        Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5)
            .single()
            .expect("fixture timestamp"),
    )
}

#[rstest]
#[case("", UserValidationError::EmptyName)]
#[case("   ", UserValidationError::EmptyName)]
#[case(" a ", UserValidationError::NameTooShort { min: USER_NAME_MIN })]
fn rejects_invalid_names(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(UserName::new(raw), Err(expected));
}

#[rstest]
fn rejects_overlong_names() {
    let raw = "a".repeat(USER_NAME_MAX + 1);
    assert_eq!(
        UserName::new(raw),
        Err(UserValidationError::NameTooLong {
            max: USER_NAME_MAX
        })
    );
}

#[rstest]
fn name_is_trimmed_and_counts_characters_not_bytes() {
    let name = UserName::new("  Ñu  ").expect("two characters is enough");
    assert_eq!(name.as_ref(), "Ñu");
}

#[rstest]
fn serialises_with_camel_case_fields(admin: User) {
    let value = serde_json::to_value(&admin).expect("serialise user");
    assert_eq!(
        value,
        json!({
            "id": VALID_ID,
            "name": "Ada Lovelace",
            "email": "ada@example.org",
            "roles": ["ADMIN", "USUARIO"],
            "createdAt": "2025-01-02T03:04:05Z",
        })
    );
}

#[rstest]
fn role_lookup_reflects_granted_roles(admin: User) {
    assert!(admin.has_role(Role::Admin));
    assert!(!admin.has_role(Role::Veterinaria));
}

#[rstest]
fn registration_defaults_to_usuario_role() {
    let request = NewUser::try_from_parts("Juan", "juan@example.org", "secreto", [])
        .expect("valid registration");
    assert_eq!(request.roles().iter().copied().collect::<Vec<_>>(), vec![Role::Usuario]);
    assert_eq!(request.password(), "secreto");
}

#[rstest]
fn registration_keeps_explicit_roles() {
    let request = NewUser::try_from_parts(
        "Vet",
        "vet@example.org",
        "secreto",
        [Role::Veterinaria, Role::Veterinaria],
    )
    .expect("valid registration");
    assert_eq!(request.roles().len(), 1);
    assert!(request.roles().contains(&Role::Veterinaria));
}

#[rstest]
#[case("Juan", "juan@example.org", "12345", UserValidationError::PasswordTooShort { min: PASSWORD_MIN })]
#[case("Juan", "not-an-email", "secreto", UserValidationError::InvalidEmail)]
#[case("J", "juan@example.org", "secreto", UserValidationError::NameTooShort { min: USER_NAME_MIN })]
fn registration_rejects_invalid_inputs(
    #[case] name: &str,
    #[case] email: &str,
    #[case] password: &str,
    #[case] expected: UserValidationError,
) {
    let err = NewUser::try_from_parts(name, email, password, [])
        .expect_err("invalid registration must fail");
    assert_eq!(err, expected);
}

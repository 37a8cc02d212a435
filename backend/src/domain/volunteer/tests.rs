//! Tests for volunteer validation, filtering, and slugs.

use super::*;
use chrono::TimeZone;
use rstest::{fixture, rstest};

#[fixture]
fn now() -> DateTime<Utc> {
    Utc.timestamp_millis_opt(1_740_000_654_321)
        .single()
        .expect("fixture instant")
}

fn draft() -> VolunteerDraft {
    VolunteerDraft {
        first_name: " María ".to_owned(),
        last_name: "Gómez".to_owned(),
        email: "Maria@Example.org".to_owned(),
        areas: vec![VolunteerArea::Veterinaria, VolunteerArea::Paseos],
        profile: VolunteerProfileFields {
            city: Some("Corrientes".to_owned()),
            ..VolunteerProfileFields::default()
        },
    }
}

#[fixture]
fn maria(now: DateTime<Utc>) -> Volunteer {
    NewVolunteer::try_new(draft())
        .expect("valid draft")
        .into_volunteer(VolunteerId::random(), "https://pazanimal.org/", None, now)
        .expect("QR renders")
}

#[rstest]
fn creation_applies_defaults_and_generates_slug(maria: Volunteer, now: DateTime<Utc>) {
    assert_eq!(maria.first_name, "María");
    assert_eq!(maria.email.as_ref(), "maria@example.org");
    assert_eq!(maria.profile.country, DEFAULT_COUNTRY);
    assert!(maria.visible);
    assert_eq!(maria.status, VolunteerStatus::Active);
    assert_eq!(maria.slug, "maria-gomez-654321");
    assert!(maria.qr_code.starts_with("<?xml"));
    assert!(maria.qr_code.contains("<svg"));
    assert_eq!(
        profile_url("https://pazanimal.org/", &maria.slug),
        "https://pazanimal.org/voluntarios/maria-gomez-654321"
    );
    assert_eq!(maria.joined_at, now);
}

#[rstest]
#[case(VolunteerDraft { first_name: "M".to_owned(), ..draft() }, "nombre", "too_short")]
#[case(VolunteerDraft { last_name: " G ".to_owned(), ..draft() }, "apellido", "too_short")]
#[case(VolunteerDraft { email: "maria".to_owned(), ..draft() }, "email", "invalid_email")]
#[case(VolunteerDraft { areas: Vec::new(), ..draft() }, "areas", "empty_areas")]
fn creation_rejects_invalid_fields(
    #[case] input: VolunteerDraft,
    #[case] field: &str,
    #[case] code: &str,
) {
    let err = NewVolunteer::try_new(input).expect_err("invalid draft");
    assert_eq!(err.field(), field);
    assert_eq!(err.code(), code);
}

#[rstest]
fn creation_rejects_relative_photo_urls() {
    let mut input = draft();
    input.profile.photo_url = Some("/fotos/maria.jpg".to_owned());
    assert_eq!(
        NewVolunteer::try_new(input),
        Err(VolunteerValidationError::InvalidPhotoUrl)
    );
}

#[rstest]
fn patch_replaces_areas_wholesale_and_keeps_slug(mut maria: Volunteer, now: DateTime<Utc>) {
    let slug = maria.slug.clone();
    let patch = VolunteerPatch::try_new(VolunteerPatchDraft {
        areas: Some(vec![VolunteerArea::Fotografia]),
        rest: VolunteerPatch {
            visible: Some(false),
            city: Some("Resistencia".to_owned()),
            ..VolunteerPatch::default()
        },
        ..VolunteerPatchDraft::default()
    })
    .expect("valid patch");
    let later = now + chrono::Duration::days(1);

    maria.apply_patch(patch, later);

    assert_eq!(
        maria.areas.iter().copied().collect::<Vec<_>>(),
        vec![VolunteerArea::Fotografia]
    );
    assert!(!maria.visible);
    assert_eq!(maria.profile.city.as_deref(), Some("Resistencia"));
    assert_eq!(maria.first_name, "María");
    assert_eq!(maria.slug, slug);
    assert_eq!(maria.updated_at, later);
    assert_eq!(maria.joined_at, now);
}

#[rstest]
fn patch_rejects_empty_area_replacement() {
    let err = VolunteerPatch::try_new(VolunteerPatchDraft {
        areas: Some(Vec::new()),
        ..VolunteerPatchDraft::default()
    })
    .expect_err("empty areas");
    assert_eq!(err, VolunteerValidationError::EmptyAreas);
}

#[rstest]
#[case(None, None)]
#[case(Some(""), None)]
#[case(Some("  "), None)]
#[case(Some("undefined"), None)]
#[case(Some(" ACTIVO "), Some("ACTIVO"))]
fn filter_values_normalise_blank_input(#[case] raw: Option<&str>, #[case] expected: Option<&str>) {
    assert_eq!(filter_value(raw).as_deref(), expected);
}

#[rstest]
#[case("José", "O'Neill", 1_700_000_000_042, "jose-o-neill-000042")]
#[case("!!", "??", 1_700_000_999_999, "999999")]
fn slugs_are_url_safe(
    #[case] first: &str,
    #[case] last: &str,
    #[case] millis: i64,
    #[case] expected: &str,
) {
    let at = Utc
        .timestamp_millis_opt(millis)
        .single()
        .expect("valid instant");
    let slug = volunteer_slug(first, last, at);
    assert_eq!(slug, expected);
    assert!(crate::domain::slug::is_valid_slug(&slug));
}

#[rstest]
#[case("ACTIVO", Some(VolunteerStatus::Active))]
#[case("RETIRADO", Some(VolunteerStatus::Retired))]
#[case("activo", None)]
fn statuses_parse_stored_values(#[case] raw: &str, #[case] expected: Option<VolunteerStatus>) {
    assert_eq!(VolunteerStatus::parse(raw), expected);
}

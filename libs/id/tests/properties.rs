//! Property tests for the identifier grammar.

use pitchside_id::{
    category_code, city_code, get_parent_job_id, parse_id, parse_location, ApplicationId, Code,
    EntityKind, IdIssuer, JobId, Locality, MemoryAllocator, Sequence,
};
use proptest::prelude::*;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("failed to build runtime")
}

fn code() -> impl Strategy<Value = Code> {
    "[A-Z]{2}".prop_map(|s| Code::parse(&s).unwrap())
}

fn sequence() -> impl Strategy<Value = Sequence> {
    (1u64..=999).prop_map(|v| Sequence::new(v).unwrap())
}

fn locality() -> impl Strategy<Value = Locality> {
    (code(), code(), code()).prop_map(|(category, city, area)| Locality::new(category, city, area))
}

fn category_name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Coach".to_string()),
        Just("Playing".to_string()),
        Just("umpire".to_string()),
        "\\PC{0,16}",
    ]
}

fn location_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Za-z]{1,12}, [A-Za-z ]{1,16}",
        "[A-Za-z]{1,12} [A-Za-z]{1,12}",
        "\\PC{0,24}",
    ]
}

proptest! {
    #[test]
    fn composed_job_ids_roundtrip(category in category_name(), location in location_text()) {
        let issuer = IdIssuer::new(MemoryAllocator::new());
        let job = runtime()
            .block_on(issuer.compose_job_id(&category, &location))
            .unwrap();
        let text = job.to_string();
        prop_assert_eq!(text.len(), 10);

        let expected = parse_location(&location).locality(&category);
        let parsed = parse_id(&text).unwrap();
        prop_assert_eq!(parsed.kind(), EntityKind::Job);
        prop_assert_eq!(parsed.locality(), expected);
        prop_assert_eq!(parsed.to_string(), text);
    }

    #[test]
    fn composed_booking_ids_have_fixed_width(category in category_name(), location in location_text()) {
        let issuer = IdIssuer::new(MemoryAllocator::new());
        let booking = runtime()
            .block_on(issuer.compose_booking_id(&category, &location))
            .unwrap();
        prop_assert_eq!(booking.to_string().len(), 10);
        prop_assert!(booking.to_string().starts_with('B'));
    }

    #[test]
    fn applications_inherit_parent(locality in locality(), job_seq in sequence(), app_seq in sequence()) {
        let parent = JobId::new(locality, job_seq);
        let app = ApplicationId::new(&parent, app_seq);
        let text = app.to_string();
        let parent_text = parent.to_string();

        prop_assert_eq!(text.len(), 13);
        prop_assert_eq!(&text[1..10], &parent_text[1..10]);
        prop_assert_eq!(get_parent_job_id(&text), Some(parent_text.clone()));
        prop_assert_eq!(app.parent_job_id(), parent);
    }

    #[test]
    fn issued_applications_point_back_to_parent(locality in locality(), job_seq in sequence()) {
        let parent = JobId::new(locality, job_seq).to_string();
        let issuer = IdIssuer::new(MemoryAllocator::new());
        let app = runtime()
            .block_on(issuer.compose_application_id(&parent))
            .unwrap();
        prop_assert_eq!(get_parent_job_id(&app.to_string()), Some(parent));
    }

    #[test]
    fn fallback_codes_are_deterministic(name in "\\PC{0,20}") {
        prop_assert_eq!(category_code(&name), category_code(&name));
        prop_assert_eq!(city_code(&name), city_code(&name));
    }

    #[test]
    fn parser_never_panics(input in "\\PC{0,16}") {
        let _ = parse_id(&input);
        let _ = get_parent_job_id(&input);
    }
}

#[test]
fn sequential_issuance_is_gapless() {
    let issuer = IdIssuer::new(MemoryAllocator::new());
    let rt = runtime();
    for expected in 1..=25u16 {
        let job = rt
            .block_on(issuer.compose_job_id("Trainer", "Jaipur, Malviya Nagar"))
            .unwrap();
        assert_eq!(job.sequence().value(), expected);
    }
}

#[test]
fn scope_exhaustion_after_999() {
    let issuer = IdIssuer::new(MemoryAllocator::new());
    let rt = runtime();
    for _ in 0..999 {
        rt.block_on(issuer.compose_booking_id("Venue", "Madurai, Anna Nagar"))
            .unwrap();
    }
    let err = rt
        .block_on(issuer.compose_booking_id("Venue", "Madurai, Anna Nagar"))
        .unwrap_err();
    assert!(matches!(
        err,
        pitchside_id::IssueError::SequenceOverflow { ref scope } if scope == "BVE"
    ));
}

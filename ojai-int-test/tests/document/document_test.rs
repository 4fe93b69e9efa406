use ojai::common::Value;
use ojai::doc;
use ojai::document::Document;
use ojai::errors::ErrorKind;
use ojai_int_test::test_util::{cleanup, create_test_context, create_test_docs, date, run_test};

#[test]
fn test_build_document_from_connection() {
    run_test(
        || create_test_context(),
        |ctx| {
            let document = ctx
                .connection()
                .new_document()?
                .set_id("fdoe-1")
                .set("name", "fredDoe")
                .set("yelping_since", date("2014-03-23"))
                .set("fans", 2)
                .set("support", "gold")
                .build()?;

            assert_eq!(document.id(), Some("fdoe-1"));
            assert_eq!(document.get_date("yelping_since"), Some(date("2014-03-23")));
            assert_eq!(document.get_int("fans"), Some(2));
            assert_eq!(document.len(), 5);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_document_from_json() {
    run_test(
        || create_test_context(),
        |ctx| {
            let document = ctx
                .connection()
                .new_document_from_json(r#"{"_id": "u1", "address": {"city": "Paris"}, "tags": ["a"]}"#)?;
            assert_eq!(document.get_string("address.city"), Some("Paris".to_string()));
            assert_eq!(document.get("tags"), Some(&Value::Array(vec![Value::from("a")])));

            let err = ctx.connection().new_document_from_json("[1, 2]").unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::EncodingError);

            // an empty id never reaches the store
            let err = ctx.connection().new_document_from_json(r#"{"_id": ""}"#).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::EncodingError);
            let err = ctx.connection().new_document_from_json(r#"{"a.b": 1}"#).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::EncodingError);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_rendering_is_stable() {
    let first = Document::builder()
        .set_id("u1")
        .set("support", "gold")
        .set("address.zip", 75001)
        .set("address.city", "Paris")
        .set("fans", 2)
        .build()
        .unwrap();
    let second = Document::builder()
        .set("fans", 2)
        .set("address.city", "Paris")
        .set_id("u1")
        .set("address.zip", 75001)
        .set("support", "gold")
        .build()
        .unwrap();

    let expected = r#"{"_id":"u1","address":{"city":"Paris","zip":75001},"fans":2,"support":"gold"}"#;
    assert_eq!(first.as_json_string(), expected);
    assert_eq!(first.as_json_string(), first.as_json_string());
    assert_eq!(second.as_json_string(), expected);
    assert_eq!(first.to_string(), expected);
    assert_eq!(first, second);
}

#[test]
fn test_rendering_round_trips_through_json() {
    for document in create_test_docs() {
        let text = document.as_json_string();
        let parsed = Document::from_json(&text).unwrap();
        assert_eq!(parsed.as_json_string(), text);
    }
}

#[test]
fn test_built_document_is_immutable() {
    let original = doc! { _id: "u1", fans: 1 };
    let updated = original.to_builder().set("fans", 2).build().unwrap();
    assert_eq!(original.get_int("fans"), Some(1));
    assert_eq!(updated.get_int("fans"), Some(2));
    assert_eq!(updated.id(), Some("u1"));
}

#[test]
fn test_invalid_field_paths() {
    let err = Document::builder().set("a..b", 1).build().unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::InvalidFieldPath);

    let err = Document::builder().set("", 1).build().unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::InvalidFieldPath);

    let err = Document::builder().set_id("").build().unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::WriteError);
}

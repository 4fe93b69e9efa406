use ojai::condition::Op;
use ojai::document::Document;
use ojai::errors::ErrorKind;
use ojai_int_test::test_util::{cleanup, create_test_context, ids, insert_test_documents, run_test};

#[test]
fn test_projection_keeps_only_selected_fields() {
    run_test(
        || create_test_context(),
        |ctx| {
            let mut store = ctx.store()?;
            let document = ctx
                .connection()
                .new_document()?
                .set_id("u1")
                .set("a", 1)
                .set("b", 2)
                .set("c", 3)
                .build()?;
            store.insert_or_replace(&document)?;
            store.flush()?;

            let query = ctx.connection().new_query()?.select(["a", "c"]).build()?;
            let results = store.find_query(&query)?.collect::<Result<Vec<Document>, _>>()?;
            assert_eq!(results.len(), 1);

            let projected = &results[0];
            assert_eq!(projected.get_int("a"), Some(1));
            assert_eq!(projected.get_int("c"), Some(3));
            assert!(!projected.contains("b"));
            assert_eq!(projected.id(), Some("u1"));
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_nested_projection() {
    run_test(
        || create_test_context(),
        |ctx| {
            let mut store = ctx.store()?;
            insert_test_documents(&mut store)?;

            let query = ctx.connection().new_query()?.select(["address.city"]).build()?;
            for document in store.find_query(&query)? {
                let document = document?;
                assert!(document.contains("address.city"));
                assert!(!document.contains("address.zip"));
                assert!(!document.contains("name"));
            }
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_projection_of_missing_field() {
    run_test(
        || create_test_context(),
        |ctx| {
            let mut store = ctx.store()?;
            insert_test_documents(&mut store)?;

            let query = ctx.connection().new_query()?.select(["tags"]).build()?;
            let results = store.find_query(&query)?.collect::<Result<Vec<Document>, _>>()?;
            assert_eq!(results.len(), 3);
            let without_tags = results.iter().filter(|doc| !doc.contains("tags")).count();
            assert_eq!(without_tags, 1);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_query_is_reusable() {
    run_test(
        || create_test_context(),
        |ctx| {
            let mut store = ctx.store()?;
            insert_test_documents(&mut store)?;

            let gold = ctx.connection().new_condition()?.is("support", Op::Equal, "gold").build()?;
            let query = ctx
                .connection()
                .new_query()?
                .select(["name", "support"])
                .where_condition(gold)
                .build()?;

            let first = store.find_query(&query)?.collect::<Result<Vec<Document>, _>>()?;
            let second = store.find_query(&query)?.collect::<Result<Vec<Document>, _>>()?;
            assert_eq!(ids(&first), vec!["bking-3", "jdoe-1"]);
            assert_eq!(first, second);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_query_limit() {
    run_test(
        || create_test_context(),
        |ctx| {
            let mut store = ctx.store()?;
            insert_test_documents(&mut store)?;

            let query = ctx.connection().new_query()?.limit(2).build()?;
            assert_eq!(store.find_query(&query)?.count(), 2);

            let err = ctx.connection().new_query()?.limit(0).build().unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::QueryError);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_invalid_projection() {
    run_test(
        || create_test_context(),
        |ctx| {
            let err = ctx.connection().new_query()?.select(["name", ""]).build().unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::QueryError);
            assert!(err.is_caused_by(&ErrorKind::InvalidFieldPath));
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_query_rendering() {
    run_test(
        || create_test_context(),
        |ctx| {
            let gold = ctx.connection().new_condition()?.is("support", Op::Equal, "gold").build()?;
            let query = ctx
                .connection()
                .new_query()?
                .select(["name", "support"])
                .where_condition(gold)
                .limit(5)
                .build()?;
            assert_eq!(query.to_string(), r#"select name, support where (support = "gold") limit 5"#);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

use ojai::doc;
use ojai::document::Document;
use ojai::errors::ErrorKind;
use ojai::store::memory::InMemoryBackend;
use ojai::connection::Connection;
use ojai_int_test::test_util::{
    cleanup, create_test_context, create_test_docs, fred_doe, ids, insert_test_documents,
    is_sorted, run_test, MEM_ENDPOINT,
};

#[test]
fn test_each_walkthrough_run_adds_a_new_user() {
    run_test(
        || create_test_context(),
        |ctx| {
            let mut store = ctx.store()?;
            let first = fred_doe(&ctx.connection())?;
            let second = fred_doe(&ctx.connection())?;

            let id = first.id().unwrap_or_default();
            assert!(id.starts_with("fdoe-"));
            assert_eq!(first.get_string("name"), Some(format!("fredDoe-{}", &id["fdoe-".len()..])));
            assert_ne!(first.id(), second.id());

            store.insert_or_replace(&first)?;
            store.insert_or_replace(&second)?;
            store.flush()?;
            assert_eq!(store.find()?.count(), 2);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_upsert_same_document_twice() {
    run_test(
        || create_test_context(),
        |ctx| {
            let mut store = ctx.store()?;
            let first = ctx
                .connection()
                .new_document()?
                .set_id("fdoe-1")
                .set("name", "fredDoe")
                .set("fans", 2)
                .build()?;
            let second = first.to_builder().set("fans", 3).set("support", "gold").build()?;

            store.insert_or_replace(&first)?;
            store.insert_or_replace(&second)?;
            store.flush()?;

            let all = store.find()?.collect::<Result<Vec<Document>, _>>()?;
            assert_eq!(all.len(), 1);
            assert_eq!(all[0], second);
            assert_eq!(ctx.backend().flushed_documents(ctx.path()), 1);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_replace_drops_old_fields() {
    run_test(
        || create_test_context(),
        |ctx| {
            let mut store = ctx.store()?;
            store.insert_or_replace(&doc! { _id: "u1", name: "fredDoe", fans: 2 })?;
            store.flush()?;
            store.insert_or_replace(&doc! { _id: "u1", name: "fredDoe" })?;
            store.flush()?;

            let found = store.find_by_id("u1")?;
            assert!(found.is_some_and(|doc| !doc.contains("fans")));
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_insert_without_id() {
    run_test(
        || create_test_context(),
        |ctx| {
            let mut store = ctx.store()?;
            let err = store.insert_or_replace(&doc! { name: "anonymous" }).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::WriteError);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_results_ordered_by_id() {
    run_test(
        || create_test_context(),
        |ctx| {
            let mut store = ctx.store()?;
            insert_test_documents(&mut store)?;

            let all = store.find()?.collect::<Result<Vec<Document>, _>>()?;
            assert_eq!(all.len(), create_test_docs().len());
            assert!(is_sorted(ids(&all), true));
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_unflushed_writes_are_visible() {
    run_test(
        || create_test_context(),
        |ctx| {
            let mut store = ctx.store()?;
            store.insert_or_replace_all(&create_test_docs())?;
            assert_eq!(ctx.backend().pending_writes(ctx.path()), 3);
            assert_eq!(ctx.backend().flushed_documents(ctx.path()), 0);

            assert_eq!(store.find()?.count(), 3);
            assert!(store.find_by_id("jdoe-1")?.is_some());

            store.flush()?;
            assert_eq!(ctx.backend().pending_writes(ctx.path()), 0);
            assert_eq!(ctx.backend().flushed_documents(ctx.path()), 3);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_auto_flush_threshold() {
    let backend = InMemoryBackend::builder()
        .with_store("/apps/user")
        .auto_flush_threshold(2)
        .build();
    let connection = Connection::open(MEM_ENDPOINT, backend.clone()).unwrap();
    let mut store = connection.get_store("/apps/user").unwrap();

    store.insert_or_replace(&doc! { _id: "a" }).unwrap();
    assert_eq!(backend.pending_writes("/apps/user"), 1);
    store.insert_or_replace(&doc! { _id: "b" }).unwrap();
    assert_eq!(backend.pending_writes("/apps/user"), 0);
    assert_eq!(backend.flushed_documents("/apps/user"), 2);
    connection.close().unwrap();
}

#[test]
fn test_store_close_keeps_connection_open() {
    run_test(
        || create_test_context(),
        |ctx| {
            let mut store = ctx.store()?;
            store.close()?;
            store.close()?;
            assert!(store.is_closed());
            assert!(!ctx.connection().is_closed());

            let err = store.insert_or_replace(&doc! { _id: "u1" }).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::ClosedResource);

            // a fresh handle still works
            let mut other = ctx.store()?;
            other.insert_or_replace(&doc! { _id: "u1" })?;
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_store_handles_share_data() {
    run_test(
        || create_test_context(),
        |ctx| {
            let mut writer = ctx.store()?;
            let reader = ctx.store()?;
            writer.insert_or_replace(&doc! { _id: "u1", name: "fredDoe" })?;
            writer.flush()?;
            assert_eq!(
                reader.find_by_id("u1")?.and_then(|doc| doc.get_string("name")),
                Some("fredDoe".to_string())
            );
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

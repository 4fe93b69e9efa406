use ojai::document::Document;
use ojai::errors::ErrorKind;
use ojai::stream::{timeout_after, StreamState};
use ojai_int_test::test_util::{cleanup, create_test_context, insert_test_documents, run_test};
use std::thread;
use std::time::Duration;

#[test]
fn test_stream_is_lazy() {
    run_test(
        || create_test_context(),
        |ctx| {
            let mut store = ctx.store()?;
            insert_test_documents(&mut store)?;

            let mut stream = store.find()?;
            assert_eq!(ctx.backend().open_cursors(), 0);

            // writes made before the first pull are visible
            store.insert_or_replace(&ojai::doc! { _id: "zz-late" })?;
            let mut count = 0;
            while stream.try_next()?.is_some() {
                count += 1;
            }
            assert_eq!(count, 4);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_exhaustion_is_not_an_error() {
    run_test(
        || create_test_context(),
        |ctx| {
            let mut store = ctx.store()?;
            insert_test_documents(&mut store)?;

            let mut stream = store.find()?;
            let documents = stream.by_ref().collect::<Result<Vec<Document>, _>>()?;
            assert_eq!(documents.len(), 3);
            assert_eq!(stream.state(), StreamState::Exhausted);
            assert!(stream.try_next()?.is_none());
            assert_eq!(ctx.backend().open_cursors(), 0);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_interrupted_stream_fails() {
    run_test(
        || create_test_context(),
        |ctx| {
            let mut store = ctx.store()?;
            insert_test_documents(&mut store)?;
            ctx.backend().set_fail_after(Some(1));

            let mut stream = store.find()?;
            assert!(stream.try_next()?.is_some());
            let err = stream.try_next().unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::StreamError);
            assert_eq!(stream.state(), StreamState::Failed);
            assert_eq!(ctx.backend().open_cursors(), 0);

            // collecting surfaces the failure instead of a shorter result
            let collected = store.find()?.collect::<Result<Vec<Document>, _>>();
            assert!(collected.is_err());

            ctx.backend().set_fail_after(None);
            assert_eq!(store.find()?.count(), 3);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_early_close_releases_cursor() {
    run_test(
        || create_test_context(),
        |ctx| {
            let mut store = ctx.store()?;
            insert_test_documents(&mut store)?;

            let mut stream = store.find()?;
            stream.try_next()?;
            assert_eq!(ctx.backend().open_cursors(), 1);

            stream.close()?;
            stream.close()?;
            assert_eq!(ctx.backend().open_cursors(), 0);
            assert_eq!(stream.try_next().unwrap_err().kind(), &ErrorKind::ClosedResource);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_connection_close_invalidates_stream() {
    run_test(
        || create_test_context(),
        |ctx| {
            let mut store = ctx.store()?;
            insert_test_documents(&mut store)?;

            let mut stream = store.find()?;
            stream.try_next()?;
            ctx.connection().close()?;

            assert_eq!(stream.try_next().unwrap_err().kind(), &ErrorKind::ClosedResource);
            assert_eq!(ctx.backend().open_cursors(), 0);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_stream_timeout_releases_cursor() {
    run_test(
        || create_test_context(),
        |ctx| {
            let mut store = ctx.store()?;
            insert_test_documents(&mut store)?;

            let query = ctx.connection().new_query()?.build()?;
            let mut stream = store.find_query_with_options(&query, &timeout_after(Duration::from_millis(30)))?;
            assert!(stream.try_next()?.is_some());
            assert_eq!(ctx.backend().open_cursors(), 1);

            thread::sleep(Duration::from_millis(60));
            let err = stream.try_next().unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::Timeout);
            assert_eq!(ctx.backend().open_cursors(), 0);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_default_timeout_from_endpoint() {
    use ojai::connection::Connection;
    use ojai::store::memory::InMemoryBackend;

    let backend = InMemoryBackend::builder().with_store("/apps/user").build();
    let connection = Connection::open("ojai:mem:?timeout=10", backend).unwrap();
    let mut store = connection.get_store("/apps/user").unwrap();
    store.insert_or_replace(&ojai::doc! { _id: "u1" }).unwrap();

    let mut stream = store.find().unwrap();
    thread::sleep(Duration::from_millis(40));
    assert_eq!(stream.try_next().unwrap_err().kind(), &ErrorKind::Timeout);
    connection.close().unwrap();
}

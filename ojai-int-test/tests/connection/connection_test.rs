use ojai::connection::Connection;
use ojai::errors::ErrorKind;
use ojai::store::memory::InMemoryBackend;
use ojai_int_test::test_util::{cleanup, create_test_context, run_test, MEM_ENDPOINT};
use std::time::Duration;

#[test]
fn test_open_and_close() {
    let backend = InMemoryBackend::builder().with_store("/apps/user").build();
    let connection = Connection::open(MEM_ENDPOINT, backend.clone()).unwrap();
    assert!(backend.is_connected());
    assert!(!connection.is_closed());
    assert_eq!(connection.driver_name(), "mem");

    connection.close().unwrap();
    assert!(connection.is_closed());
    assert!(!backend.is_connected());
}

#[test]
fn test_open_unreachable_endpoint() {
    let backend = InMemoryBackend::builder().unreachable(true).build();
    let err = Connection::open(MEM_ENDPOINT, backend.clone()).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::ConnectionError);
    assert!(!backend.is_connected());
}

#[test]
fn test_open_malformed_endpoint() {
    let err = Connection::open("mem://localhost", InMemoryBackend::new(Default::default())).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::InvalidEndpoint);
}

#[test]
fn test_open_with_other_driver() {
    let err = Connection::open("ojai:mapr:", InMemoryBackend::builder().build()).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::ConnectionError);
}

#[test]
fn test_custom_driver_name() {
    let backend = InMemoryBackend::builder().driver_name("test").build();
    let connection = Connection::open("ojai:test://localhost:5678", backend).unwrap();
    assert_eq!(connection.endpoint().hosts()[0].port(), Some(5678));
    connection.close().unwrap();
}

#[test]
fn test_builder_options() {
    let connection = Connection::builder()
        .backend(InMemoryBackend::builder().build())
        .option("auth", "kerberos")
        .open("ojai:mem:?auth=basic;timeout=750")
        .unwrap();

    let config = connection.config();
    assert_eq!(config.option("auth"), Some("kerberos".to_string()));
    assert_eq!(config.default_timeout(), Some(Duration::from_millis(750)));
    assert_eq!(config.endpoint().unwrap().driver(), "mem");
    connection.close().unwrap();
}

#[test]
fn test_get_store() {
    run_test(
        || create_test_context(),
        |ctx| {
            let connection = ctx.connection();
            let store = connection.get_store(ctx.path())?;
            assert_eq!(store.path(), ctx.path());
            assert!(connection.store_exists(ctx.path())?);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_get_missing_store() {
    run_test(
        || create_test_context(),
        |ctx| {
            let connection = ctx.connection();
            let err = connection.get_store("/apps/missing").unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::StoreNotFound);
            assert!(!connection.store_exists("/apps/missing")?);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_close_is_idempotent() {
    run_test(
        || create_test_context(),
        |ctx| {
            let connection = ctx.connection();
            connection.close()?;
            connection.close()?;
            assert!(connection.is_closed());
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_operations_after_close() {
    run_test(
        || create_test_context(),
        |ctx| {
            let connection = ctx.connection();
            let mut store = connection.get_store(ctx.path())?;
            connection.close()?;

            let closed = |kind: &ErrorKind| assert_eq!(kind, &ErrorKind::ClosedResource);
            closed(connection.get_store(ctx.path()).unwrap_err().kind());
            closed(connection.new_document().err().unwrap().kind());
            closed(connection.new_condition().err().unwrap().kind());
            closed(connection.new_query().err().unwrap().kind());
            closed(connection.store_exists(ctx.path()).unwrap_err().kind());
            closed(store.flush().unwrap_err().kind());
            closed(store.find().unwrap_err().kind());
            closed(store.find_by_id("u1").unwrap_err().kind());

            // closing a store of a closed connection is still harmless
            store.close()?;
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_dropping_last_handle_disconnects() {
    let backend = InMemoryBackend::builder().build();
    {
        let connection = Connection::open(MEM_ENDPOINT, backend.clone()).unwrap();
        let clone = connection.clone();
        drop(connection);
        assert!(backend.is_connected());
        drop(clone);
    }
    assert!(!backend.is_connected());
}

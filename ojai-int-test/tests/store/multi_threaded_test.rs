use ojai::condition::Op;
use ojai_int_test::test_util::{cleanup, create_test_context, fake_user, run_test};
use std::thread;
use std::time::Duration;

#[test]
fn test_store_per_thread() {
    run_test(
        || create_test_context(),
        |ctx| {
            let threads = 4;
            let per_thread = 50;

            let handles: Vec<_> = (0..threads)
                .map(|t| {
                    let connection = ctx.connection();
                    let path = ctx.path().to_string();
                    thread::spawn(move || -> ojai::errors::OjaiResult<()> {
                        let mut store = connection.get_store(&path)?;
                        let support = if t % 2 == 0 { "gold" } else { "silver" };
                        for _ in 0..per_thread {
                            store.insert_or_replace(&fake_user(support)?)?;
                        }
                        store.flush()?;
                        store.close()
                    })
                })
                .collect();

            let backend = ctx.backend();
            let path = ctx.path().to_string();
            awaitility::at_most(Duration::from_secs(10))
                .until(|| backend.flushed_documents(&path) == threads * per_thread);

            for handle in handles {
                handle.join().expect("writer thread panicked")?;
            }

            let gold = ctx.connection().new_condition()?.is("support", Op::Equal, "gold").build()?;
            let query = ctx.connection().new_query()?.where_condition(gold).build()?;
            let count = ctx.store()?.find_query(&query)?.count();
            assert_eq!(count, threads / 2 * per_thread);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_stream_moves_to_another_thread() {
    run_test(
        || create_test_context(),
        |ctx| {
            let mut store = ctx.store()?;
            for _ in 0..10 {
                store.insert_or_replace(&fake_user("gold")?)?;
            }
            store.flush()?;

            let stream = store.find()?;
            let count = thread::spawn(move || stream.filter(|doc| doc.is_ok()).count())
                .join()
                .expect("reader thread panicked");
            assert_eq!(count, 10);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

use ojai::condition::Op;
use ojai::connection::Connection;
use ojai::errors::OjaiResult;
use ojai::store::memory::InMemoryBackend;
use ojai_int_test::test_util::{fake_user, fred_doe, MEM_ENDPOINT};
use std::time::Instant;

const USER_STORE: &str = "/apps/user";

fn main() -> OjaiResult<()> {
    colog::init();

    let backend = InMemoryBackend::builder().with_store(USER_STORE).build();
    let connection = Connection::open(MEM_ENDPOINT, backend)?;
    let mut store = connection.get_store(USER_STORE)?;

    let user = fred_doe(&connection)?;
    store.insert_or_replace(&user)?;

    let count = 20;
    let start = Instant::now();
    for i in 0..count {
        let support = if i % 4 == 0 { "gold" } else { "silver" };
        store.insert_or_replace(&fake_user(support)?)?;
    }
    store.flush()?;
    println!("Inserted {} users in {:?}", count + 1, start.elapsed());

    let gold = connection
        .new_condition()?
        .is("support", Op::Equal, "gold")
        .build()?;
    let query = connection
        .new_query()?
        .select(["name", "yelping_since", "support"])
        .where_condition(gold)
        .build()?;
    println!("Running {}", query);

    let start = Instant::now();
    let mut stream = store.find_query(&query)?;
    while let Some(document) = stream.try_next()? {
        println!("{}", document.as_json_string());
    }
    println!("{} found in {} ms", stream.documents_read(), start.elapsed().as_millis());
    stream.close()?;

    store.close()?;
    connection.close()?;
    Ok(())
}

use chrono::NaiveDate;
use fake::faker::name::en::Name;
use fake::Fake;
use ojai::common::parse_date;
use ojai::connection::Connection;
use ojai::document::Document;
use ojai::errors::{ErrorKind, OjaiError, OjaiResult};
use ojai::store::memory::InMemoryBackend;
use ojai::store::DocumentStore;
use std::backtrace::Backtrace;
use std::thread;
use std::time::{Duration, Instant};

/// Endpoint of the bundled in-memory backend.
pub const MEM_ENDPOINT: &str = "ojai:mem:";

/// Runs a test with retry logic and error handling.
/// Tests run on the current thread to avoid thread exhaustion when running many tests in parallel.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> OjaiResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    B: Fn() -> OjaiResult<TestContext> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    A: Fn(TestContext) -> OjaiResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
{
    const MAX_RETRIES: u32 = 3;
    let mut last_error: Option<String> = None;
    let mut last_backtrace: Option<String> = None;

    for attempt in 1..=MAX_RETRIES {
        let start_time = Instant::now();

        let result = std::panic::catch_unwind(|| {
            let backtrace = Backtrace::capture();
            match before() {
                Ok(ctx) => match test(ctx.clone()) {
                    Ok(_) => match after(ctx) {
                        Ok(_) => Ok(()),
                        Err(e) => Err((format!("After run failed: {:?}", e), backtrace.to_string())),
                    },
                    Err(e) => {
                        let _ = after(ctx);
                        Err((format!("Test failed: {:?}", e), backtrace.to_string()))
                    }
                },
                Err(e) => Err((format!("Before run failed: {:?}", e), backtrace.to_string())),
            }
        });

        let elapsed = start_time.elapsed();

        let (error, backtrace) = match result {
            Ok(Ok(_)) => return,
            Ok(Err((e, bt))) => (e, bt),
            Err(panic_err) => {
                let err_msg = if let Some(s) = panic_err.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_err.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                (format!("Panic: {}", err_msg), Backtrace::capture().to_string())
            }
        };

        if attempt < MAX_RETRIES {
            eprintln!(
                "\n========== Test Attempt {}/{} Failed (took {:?}) ==========",
                attempt, MAX_RETRIES, elapsed
            );
            eprintln!("Error: {}", error);
            eprintln!("Retrying in {}ms...\n", 100 * attempt);
            thread::sleep(Duration::from_millis(100 * attempt as u64));
        }
        last_error = Some(error);
        last_backtrace = Some(backtrace);
    }

    // All retries exhausted - print full details
    eprintln!("\n==================== TEST FAILED ====================");
    eprintln!("Failed after {} attempts", MAX_RETRIES);
    eprintln!("Last error: {}", last_error.as_deref().unwrap_or("Unknown"));
    if let Some(bt) = &last_backtrace {
        if !bt.is_empty() && !bt.contains("disabled") {
            eprintln!("\nBacktrace:\n{}", bt);
        }
    }
    eprintln!("=====================================================\n");

    panic!(
        "Test failed after {} attempts. Last error: {}",
        MAX_RETRIES,
        last_error.unwrap_or_default()
    );
}

/// An open connection to a fresh in-memory backend holding one empty store.
#[derive(Clone)]
pub struct TestContext {
    path: String,
    connection: Connection,
    backend: InMemoryBackend,
}

impl TestContext {
    pub fn new(path: String, connection: Connection, backend: InMemoryBackend) -> Self {
        Self {
            path,
            connection,
            backend,
        }
    }

    /// Path of the store created for this test.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn connection(&self) -> Connection {
        self.connection.clone()
    }

    /// The backend behind the connection, for inspection and fault injection.
    pub fn backend(&self) -> InMemoryBackend {
        self.backend.clone()
    }

    pub fn store(&self) -> OjaiResult<DocumentStore> {
        self.connection.get_store(&self.path)
    }
}

pub fn random_path() -> String {
    format!("/tests/{}", uuid::Uuid::new_v4())
}

pub fn create_test_context() -> OjaiResult<TestContext> {
    let path = random_path();
    let backend = InMemoryBackend::builder().with_store(&path).build();
    let connection = Connection::open(MEM_ENDPOINT, backend.clone())?;
    Ok(TestContext::new(path, connection, backend))
}

pub fn cleanup(ctx: TestContext) -> OjaiResult<()> {
    ctx.connection().close()?;

    if ctx.backend().open_cursors() != 0 {
        return Err(OjaiError::new(
            &format!("{} cursors left open on {}", ctx.backend().open_cursors(), ctx.path()),
            ErrorKind::InternalError,
        ));
    }
    Ok(())
}

pub fn date(text: &str) -> NaiveDate {
    parse_date(text).unwrap()
}

pub fn create_test_docs() -> Vec<Document> {
    let doc1 = ojai::doc! {
        _id: "jdoe-1",
        name: "John Doe",
        yelping_since: (date("2012-07-01")),
        fans: 12,
        support: "gold",
        address: { city: "Paris", zip: 75001 },
        tags: ["food", "travel"],
    };

    let doc2 = ojai::doc! {
        _id: "asmith-2",
        name: "Alice Smith",
        yelping_since: (date("2010-06-12")),
        fans: 3,
        support: "silver",
        address: { city: "Lyon", zip: 69001 },
        tags: ["music"],
    };

    let doc3 = ojai::doc! {
        _id: "bking-3",
        name: "Bob King",
        yelping_since: (date("2014-04-17")),
        fans: 40,
        support: "gold",
        address: { city: "Paris", zip: 75011 },
    };

    vec![doc1, doc2, doc3]
}

pub fn insert_test_documents(store: &mut DocumentStore) -> OjaiResult<()> {
    store.insert_or_replace_all(&create_test_docs())?;
    store.flush()
}

/// The gold user of the walkthrough. Id and name carry a fresh uuid, so
/// every run adds a new user.
pub fn fred_doe(connection: &Connection) -> OjaiResult<Document> {
    let suffix = uuid::Uuid::new_v4();
    connection
        .new_document()?
        .set_id(format!("fdoe-{}", suffix))
        .set("name", format!("fredDoe-{}", suffix))
        .set("yelping_since", date("2014-03-23"))
        .set("fans", 2)
        .set("support", "gold")
        .build()
}

/// A user document with a random id and name.
pub fn fake_user(support: &str) -> OjaiResult<Document> {
    let year = (2004..2020).fake::<i32>();
    let yelping_since = NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or_default();

    Document::builder()
        .set_id(uuid::Uuid::new_v4().to_string())
        .set("name", Name().fake::<String>())
        .set("yelping_since", yelping_since)
        .set("fans", (0..500).fake::<i64>())
        .set("support", support)
        .build()
}

pub fn ids(documents: &[Document]) -> Vec<String> {
    documents
        .iter()
        .filter_map(|doc| doc.id().map(|id| id.to_string()))
        .collect()
}

pub fn is_sorted<T: Ord>(iterable: impl IntoIterator<Item = T>, ascending: bool) -> bool {
    let mut iter = iterable.into_iter();
    if let Some(mut prev) = iter.next() {
        for current in iter {
            if ascending {
                if prev > current {
                    return false;
                }
            } else if prev < current {
                return false;
            }
            prev = current;
        }
    }
    true
}

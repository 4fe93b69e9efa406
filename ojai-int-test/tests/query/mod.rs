mod condition_test;
mod query_test;

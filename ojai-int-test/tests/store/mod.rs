mod multi_threaded_test;
mod store_test;

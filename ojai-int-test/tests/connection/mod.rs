mod connection_test;
mod endpoint_test;

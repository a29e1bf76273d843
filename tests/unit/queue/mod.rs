pub mod broker_test;

pub mod normalize_test;

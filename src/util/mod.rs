pub(crate) mod utils_for_test;

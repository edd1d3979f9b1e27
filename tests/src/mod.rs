pub mod utils;

#[cfg(test)]
pub mod client_tests;
#[cfg(test)]
pub mod fetch_tests;

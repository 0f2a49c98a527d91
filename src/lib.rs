pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod history;
pub mod smart;

#[cfg(test)]
pub mod test_support;

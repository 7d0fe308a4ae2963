//! Terminal front end of the app commands

pub mod contributions;
pub mod funds;
pub mod growth;
pub mod nav;
pub mod setup;
pub mod summary;
pub mod ui;

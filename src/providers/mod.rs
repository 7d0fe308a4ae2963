pub mod bareksa;

//! IO utilities for reading and writing comma-separated datasets.

pub mod csv_table;

pub use csv_table::{read_dataset, write_dataset};

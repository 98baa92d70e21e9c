pub mod enricher;
pub mod fetcher;
pub mod rebuild;
pub mod sorting;

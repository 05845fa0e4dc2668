pub mod client;

pub use client::run_sample_feed;

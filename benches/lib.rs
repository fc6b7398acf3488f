//! numbridge Benchmarks
//!
//! This crate contains performance benchmarks for the array converters.
//! Run with: cargo bench -p numbridge-benchmarks

// This file exists only to satisfy Cargo's requirement for a lib target.
// The actual benchmarks are in benches/conversion_benchmarks.rs

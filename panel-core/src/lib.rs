#![no_std]

// Portable logic for the front-panel power-sequencing controller.
//
// This crate stays portable across MCU firmware and host tooling by avoiding
// the Rust standard library and exposing abstractions the other crates adopt:
// the state table data model, the machine engine, the bounded serial
// transport, and the command console.

pub mod console;
pub mod engine;
pub mod states;
pub mod transport;

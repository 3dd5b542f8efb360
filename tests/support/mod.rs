//! Support for tests that need a live OSRM server.

#![allow(dead_code)]

pub mod osrm_dataset;

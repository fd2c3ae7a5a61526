#![forbid(unsafe_code)]

pub mod annotation;
pub mod check;
pub mod cli;
pub mod container;
pub mod error;
pub mod extract;
pub mod insert;
pub mod loader;
pub mod logging;
pub mod manifest;
pub mod naming;

//! Command workflows behind the `bidboard` binary.
//!
//! Each workflow drives a store built by
//! [`bidboard_business::build_http_store`] and returns what the binary prints.

pub mod commands;

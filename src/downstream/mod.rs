//! Forwarding to the capability services.

pub mod client;

pub use client::{DownstreamClient, DownstreamResponse, ForwardContext};

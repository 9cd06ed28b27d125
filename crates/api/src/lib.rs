//! HTTP API: the request-outcome pipeline and its routing surface.
//!
//! Every endpoint flows through the same stages: handler → (cache-aside →
//! durable store) → envelope, with failures detoured through the classifier
//! exactly once. The modules mirror that shape:
//! - `classify`: heterogeneous failures → one [`coursedesk_core::AppError`]
//! - `envelope`: the uniform success/failure JSON body
//! - `pipeline`: orchestration + the single exposure policy
//! - `app`: router, config, and entity routes

pub mod app;
pub mod classify;
pub mod context;
pub mod envelope;
pub mod middleware;
pub mod pipeline;

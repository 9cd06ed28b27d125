//! Request pipeline.
//!
//! Orchestrates a single request: run the handler, and on failure route the
//! raw error through the classifier exactly once, then always finish through
//! the envelope. Per request the flow is
//! `handler → {ok → envelope} | {err → classify → log → envelope}`;
//! exactly one response is emitted and there is no retry state.

use std::future::Future;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::classify::{RawError, classify};
use crate::context::RequestContext;
use crate::envelope::{self, Pagination};

/// The single development/production exposure decision, passed in once at
/// construction instead of re-checked ad hoc in handlers.
#[derive(Debug, Clone, Copy)]
pub struct ExposurePolicy {
    pub development: bool,
}

/// A handler's successful outcome before enveloping.
#[derive(Debug)]
pub struct Reply<T> {
    status: StatusCode,
    message: String,
    data: Option<T>,
    pagination: Option<Pagination>,
}

impl<T> Reply<T> {
    pub fn ok(message: impl Into<String>, data: Option<T>) -> Self {
        Self::with_status(StatusCode::OK, message, data)
    }

    pub fn created(message: impl Into<String>, data: Option<T>) -> Self {
        Self::with_status(StatusCode::CREATED, message, data)
    }

    pub fn with_status(status: StatusCode, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            status,
            message: message.into(),
            data,
            pagination: None,
        }
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Pipeline {
    policy: ExposurePolicy,
}

impl Pipeline {
    pub fn new(policy: ExposurePolicy) -> Self {
        Self { policy }
    }

    /// Run a handler future to completion and emit the uniform envelope.
    pub async fn run<T, F>(&self, ctx: RequestContext, handler: F) -> Response
    where
        T: Serialize,
        F: Future<Output = Result<Reply<T>, RawError>>,
    {
        match handler.await {
            Ok(reply) => {
                let body = envelope::success(reply.message, reply.data, reply.pagination);
                (reply.status, Json(body)).into_response()
            }
            Err(raw) => self.fail(&ctx, raw),
        }
    }

    /// Classify a raw failure, log it (the one log per failed request), and
    /// emit the failure envelope. Also used directly by middleware that
    /// rejects before a handler runs.
    pub fn fail(&self, ctx: &RequestContext, raw: RawError) -> Response {
        let err = classify(&raw);
        self.log_failure(ctx, &raw, &err);

        let diagnostics = self.policy.development.then(|| format!("{raw:#?}"));
        let body = envelope::failure(&err, &ctx.path, self.policy.development, diagnostics);
        let status =
            StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(body)).into_response()
    }

    fn log_failure(&self, ctx: &RequestContext, raw: &RawError, err: &coursedesk_core::AppError) {
        let principal = ctx
            .principal
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());

        if err.operational {
            tracing::warn!(
                method = %ctx.method,
                path = %ctx.path,
                principal = %principal,
                kind = ?err.kind,
                raw = ?raw,
                "request failed: {}",
                err.message,
            );
        } else {
            tracing::error!(
                method = %ctx.method,
                path = %ctx.path,
                principal = %principal,
                raw = ?raw,
                "unhandled failure",
            );
        }
    }
}

//! Delivery of keyword analysis batches to the enrichment webhook.
//!
//! [`DeliveryClient::send`] posts a [`DeliveryPayload`], validates the shape
//! of the reply and retries every failure with a linearly growing wait before
//! giving up with a single aggregated [`DeliveryError`].

pub mod client;
pub mod error;
pub mod types;
pub mod validate;

mod retry;

pub use client::{DeliveryClient, DEFAULT_WEBHOOK_URL};
pub use error::DeliveryError;
pub use types::{DeliveryContext, DeliveryKeyword, DeliveryPayload, DeliveryResponse};
pub use validate::validate_response;

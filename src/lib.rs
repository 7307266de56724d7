//! Contact Relay - Purchase-to-Directory Webhook Service
//!
//! Receives payment-completion webhooks, verifies their signatures, filters
//! them for the tracked product, and reconciles the purchaser into an
//! external contact directory with a marketing label.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

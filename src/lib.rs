//! Facade visualizer catalog service.
//!
//! An admin console backend for the facade visualizer product catalog:
//! languages with their translation bundles, trademarks, colors, houses,
//! rendered image sets and embeddable widget snapshots, all persisted as
//! path-addressed JSON documents. The two reusable pieces every admin page
//! composes are the generic record browser ([`browse`]) and the scoped
//! editor pipeline ([`editor`]); the HTTP layer ([`http`]) adds the admin
//! API, the public widget endpoints and the `/send-mail` relay.

pub mod browse;
pub mod catalog;
pub mod config;
pub mod editor;
pub mod editors;
pub mod error;
pub mod http;
pub mod i18n;
pub mod mail;
pub mod session;
pub mod snapshot;
pub mod storage;
pub mod store;

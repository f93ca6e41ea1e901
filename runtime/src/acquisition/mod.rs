//! Acquisition layer: fetching remote documents over HTTP.

pub mod http_client;

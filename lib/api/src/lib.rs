//! HTTP surface for Hyurim
//!
//! | Method | Path             | Body / query                  |
//! |--------|------------------|-------------------------------|
//! | POST   | `/recommend`     | `RecommendationRequest` JSON  |
//! | GET    | `/trending`      | `?limit=N`                    |
//! | POST   | `/index/rebuild` |                               |
//! | GET    | `/health`        |                               |
//!
//! Validation failures answer `400` with `{"error", "field"}`. An empty
//! result list is still a `200`.

pub mod rest;

pub use rest::{ApiState, RestApi};

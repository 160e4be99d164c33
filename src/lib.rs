//! storefeed
//!
//! Adaptive pagination engine for storefront listings. One engine presents a
//! listing either as numbered pages or as an infinite-scroll list, over a store
//! that may only support cursor pagination, emulating page offsets by
//! accumulating the cursor feed when it has to.
//!
//! Pure Core / Impure Shell:
//! - [`state`]: the engine. Every operation returns the loads to start.
//! - [`runtime`]: tokio driver that runs those loads against [`source`] ports.

pub mod config;
pub mod logging;
pub mod model;
pub mod runtime;
pub mod source;
pub mod state;

// Adapters layer: concrete implementations of the domain ports (http, caches).

pub mod cache;
pub mod http;

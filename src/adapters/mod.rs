// Adapters layer: concrete entry points for external systems (HTTP).

pub mod http;

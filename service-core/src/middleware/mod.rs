pub mod tracing;

pub use tracing::{REQUEST_ID_HEADER, request_id_middleware, request_span};

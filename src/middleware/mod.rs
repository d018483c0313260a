mod http_metrics;
mod identity;
mod request_id;

pub use http_metrics::http_metrics_middleware;
pub use identity::{Identity, identity_middleware};
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};

pub mod gateway;
pub mod metrics;
pub mod prompt;
pub mod providers;

pub use gateway::{GatewayError, GatewayReply, InferenceGateway, ModelState, ReplySource};
pub use metrics::{get_metrics, init_metrics};
pub use prompt::{format_request, FormattedRequest};

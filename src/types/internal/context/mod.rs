pub mod context_result;
pub mod request_context;
pub mod request_source;

pub use {context_result::ContextResult, request_context::RequestContext, request_source::RequestSource};

// AI evaluation of an application: résumé vs vacancy.
// All model calls go through llm_client. No direct HTTP calls here.

pub mod extractor;
pub mod handlers;
pub mod normalizer;
pub mod pipeline;
pub mod prompts;
pub mod resolver;
pub mod store;

mod api;
mod model;
mod service;

pub use api::{OpenAiApiClient, OpenAiServiceOptions};
pub use model::OpenAiModel;
pub use service::OpenAiService;

const PROVIDER: &str = "openai";
const PROVIDER_LABEL: &str = "OpenAI";

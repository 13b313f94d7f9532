mod api_client;
mod client_utils;
mod errors;
mod ext;
mod formatter;
mod generative_model;
mod mime_utils;
mod opentelemetry;
mod params;
mod reconciler;
mod types;

pub mod ai_services_test;
pub mod google;
pub mod openai;
pub mod transformer;

pub use api_client::{ApiClient, RequestDescriptor, RequestOptions};
pub use errors::*;
pub use formatter::{Prompt, SystemInstruction};
pub use generative_model::{GenerativeAiModel, GenerativeAiService};
pub use params::ModelParams;
pub use reconciler::{DefaultLocalizer, Localizer, ResponseReconciler};
pub use types::*;

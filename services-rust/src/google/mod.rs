mod api;
mod model;
mod safety_setting;
mod service;

pub use api::{GoogleAiServiceOptions, GoogleApiClient};
pub use model::GoogleAiModel;
pub use safety_setting::SafetySetting;
pub use service::GoogleAiService;

const PROVIDER: &str = "google";
const PROVIDER_LABEL: &str = "Google AI";

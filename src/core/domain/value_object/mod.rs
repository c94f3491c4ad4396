mod application_api_key;
mod panel_host;
mod panel_port;
mod panel_url;

pub use application_api_key::ApplicationApiKey;
pub use panel_host::PanelHost;
pub use panel_port::PanelPort;
pub use panel_url::PanelUrl;

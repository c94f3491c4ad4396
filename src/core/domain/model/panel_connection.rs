use crate::core::domain::{
    error::CapacityResult,
    value_object::{ApplicationApiKey, PanelHost, PanelPort, PanelUrl},
};

/// Validated connection details for one panel installation.
#[derive(Debug, Clone)]
pub struct PanelConnection {
    panel_host: PanelHost,
    panel_port: PanelPort,
    api_key: ApplicationApiKey,
    secure: bool,
    accept_invalid_certs: bool,
    panel_url: PanelUrl,
}

impl PanelConnection {
    pub fn new(
        panel_host: PanelHost,
        panel_port: PanelPort,
        api_key: ApplicationApiKey,
        secure: bool,
        accept_invalid_certs: bool,
    ) -> CapacityResult<Self> {
        let panel_url = PanelUrl::new(&panel_host, &panel_port, secure)?;
        Ok(Self {
            panel_host,
            panel_port,
            api_key,
            secure,
            accept_invalid_certs,
            panel_url,
        })
    }

    pub fn panel_host(&self) -> &PanelHost {
        &self.panel_host
    }

    pub fn panel_port(&self) -> &PanelPort {
        &self.panel_port
    }

    pub fn api_key(&self) -> &ApplicationApiKey {
        &self.api_key
    }

    pub fn is_connection_secure(&self) -> bool {
        self.secure
    }

    pub fn accepts_invalid_certs(&self) -> bool {
        self.accept_invalid_certs
    }

    pub fn panel_url(&self) -> &PanelUrl {
        &self.panel_url
    }
}

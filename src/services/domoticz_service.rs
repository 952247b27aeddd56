use crate::configs::Domoticz as DomoticzConfig;

/// Push client for a Domoticz server.
///
/// Pushes are observationally inert to the gateway: they run in detached
/// tasks, and an unreachable or slow server only produces a log line.
pub struct DomoticzService {
    config: DomoticzConfig,
    client: reqwest::Client,
}

impl DomoticzService {
    pub fn new(config: DomoticzConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn hardware_id(&self) -> Option<&str> {
        self.config.hardware_id.as_deref()
    }

    /// Fire one `udevice` update at the server.
    pub async fn push(&self, params: &str) {
        let url = format!(
            "http://{}:{}/json.htm?type=command&param=udevice&{params}",
            self.config.host, self.config.port
        );

        tracing::debug!("pushing to domoticz: {url}");

        match self.client.get(&url).send().await {
            Ok(response) => match response.text().await {
                Ok(body) => tracing::debug!("domoticz response: {body}"),
                Err(err) => tracing::warn!("failed to read domoticz response: {err}"),
            },
            Err(err) => tracing::warn!("failed to push to domoticz: {err}"),
        }
    }
}

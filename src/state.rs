use crate::client::ResourceClient;
use crate::config::Config;
use crate::stats::DurationPolicy;
use url::Url;

#[derive(Clone)]
pub struct AppState {
    pub client: ResourceClient,
    pub duration_policy: DurationPolicy,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            client: ResourceClient::new(config.api_url.clone()),
            duration_policy: config.duration_policy,
        }
    }

    pub fn owns_link(&self, link: &str) -> bool {
        match (Url::parse(self.client.base_url()), Url::parse(link)) {
            (Ok(base), Ok(target)) => base.origin() == target.origin(),
            _ => false,
        }
    }
}

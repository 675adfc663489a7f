use crate::identity::Identity;

pub const DEFAULT_BASE_URL: &str = "http://172.16.17.251:8000";
pub const DEFAULT_APP_NAME: &str = "pdfchat";

/// Where the agent service lives and which deployed agent to talk to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    pub base_url: String,
    pub app_name: String,
}

impl AgentConfig {
    pub fn new(base_url: impl Into<String>, app_name: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let base_url = base_url.trim().trim_end_matches('/');
        let app_name = app_name.into();
        let app_name = app_name.trim();

        Self {
            base_url: if base_url.is_empty() {
                DEFAULT_BASE_URL.to_string()
            } else {
                base_url.to_string()
            },
            app_name: if app_name.is_empty() {
                DEFAULT_APP_NAME.to_string()
            } else {
                app_name.to_string()
            },
        }
    }

    pub fn session_url(&self, identity: &Identity) -> String {
        format!(
            "{}/apps/{}/users/{}/sessions/{}",
            self.base_url, self.app_name, identity.user_id, identity.session_id
        )
    }

    pub fn run_url(&self) -> String {
        format!("{}/run", self.base_url)
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, DEFAULT_APP_NAME)
    }
}

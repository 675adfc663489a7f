use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};
use thesis_chat_agent::{AgentConfig, DEFAULT_APP_NAME, DEFAULT_BASE_URL};

pub const ENV_PREFIX: &str = "THESIS_CHAT_";
/// The only environment override the widget honours.
pub const BASE_URL_ENV: &str = "THESIS_CHAT_BASE_URL";

/// Widget configuration, resolved once when the widget is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_app_name")]
    pub app_name: String,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            app_name: default_app_name(),
        }
    }
}

impl WidgetSettings {
    /// Resolves settings from the process environment, falling back to the
    /// built-in defaults when extraction fails.
    pub fn resolve() -> Self {
        match Self::extract(Self::figment()) {
            Ok(settings) => settings,
            Err(error) => {
                tracing::warn!("failed to resolve widget settings: {error}. using defaults");
                Self::default()
            }
        }
    }

    /// Defaults overlaid with `THESIS_CHAT_BASE_URL`. The app name is fixed.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Env::prefixed(ENV_PREFIX).only(&["base_url"]))
    }

    pub fn extract(figment: Figment) -> Result<Self, SettingsError> {
        let settings = figment.extract::<Self>().context(ExtractSnafu {
            stage: "extract-widget-settings",
        })?;
        Ok(settings.normalized())
    }

    pub fn normalized(self) -> Self {
        let config = self.to_agent_config();
        Self {
            base_url: config.base_url,
            app_name: config.app_name,
        }
    }

    pub fn to_agent_config(&self) -> AgentConfig {
        AgentConfig::new(&self.base_url, &self.app_name)
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SettingsError {
    #[snafu(display("failed to extract settings on `{stage}`: {source}"))]
    Extract {
        stage: &'static str,
        source: figment::Error,
    },
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_app_name() -> String {
    DEFAULT_APP_NAME.to_string()
}

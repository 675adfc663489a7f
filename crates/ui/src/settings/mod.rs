pub mod state;

pub use state::{BASE_URL_ENV, ENV_PREFIX, SettingsError, WidgetSettings};

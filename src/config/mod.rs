mod settings;

use config::{Config, ConfigError, Environment, File};

use settings::PartialSettings;

pub use settings::{
    BrokerSettings, EmailSettings, LogSettings, PersistenceSettings, ServerSettings, Settings,
    WebSettings,
};

/// Loads the configuration from the default file and `COVBUS_` environment
/// variables, then merges it over the default values.
///
/// Sections are separated by a double underscore, so
/// `COVBUS_BROKER__LISTENER_CAPACITY=64` sets `broker.listener_capacity`.
/// `COVBUS_EMAIL__SUBSCRIBERS` takes a comma separated list.
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(
            Environment::with_prefix("COVBUS")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("email.subscribers")
                .try_parsing(true),
        );

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    Ok(partial.merge(Settings::default()))
}

use serde::Deserialize;

/// Top-level configuration settings for the application.
///
/// Each section configures one part of the service: the websocket stream,
/// the webhook server, the broker, outgoing email, the coverage store and
/// logging.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub web: WebSettings,
    pub broker: BrokerSettings,
    pub email: EmailSettings,
    pub persistence: PersistenceSettings,
    pub log: LogSettings,
}

/// Address the websocket server binds to.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Webhook and HTTP API server.
///
/// `secret` is the shared key webhook deliveries are signed with.
#[derive(Debug, Deserialize, Clone)]
pub struct WebSettings {
    pub host: String,
    pub port: u16,
    pub secret: String,
}

/// Configuration settings for the broker.
///
/// `delivery_timeout_ms` bounds how long a publish waits on one stalled
/// listener. The default `0` waits indefinitely, so every listener registered
/// before a publish receives its event. A non-zero value trades that away:
/// a listener that stays full past the limit misses the event.
#[derive(Debug, Deserialize, Clone)]
pub struct BrokerSettings {
    pub listener_capacity: usize,
    pub delivery_timeout_ms: u64,
}

/// SMTP relay and the addresses coverage reports are mailed to.
///
/// Email is disabled while `host` is empty.
#[derive(Debug, Deserialize, Clone)]
pub struct EmailSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
    pub subscribers: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PersistenceSettings {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    pub level: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Any value may be left out; missing ones are filled from
/// [`Settings::default`].
#[derive(Debug, Deserialize, Default)]
pub struct PartialSettings {
    pub server: Option<PartialServerSettings>,
    pub web: Option<PartialWebSettings>,
    pub broker: Option<PartialBrokerSettings>,
    pub email: Option<PartialEmailSettings>,
    pub persistence: Option<PartialPersistenceSettings>,
    pub log: Option<PartialLogSettings>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialWebSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub secret: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialBrokerSettings {
    pub listener_capacity: Option<usize>,
    pub delivery_timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialEmailSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: Option<String>,
    pub subscribers: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialPersistenceSettings {
    pub path: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialLogSettings {
    pub level: Option<String>,
}

impl PartialSettings {
    /// Fills every missing value from `default`.
    pub fn merge(self, default: Settings) -> Settings {
        let server = self.server.unwrap_or_default();
        let web = self.web.unwrap_or_default();
        let broker = self.broker.unwrap_or_default();
        let email = self.email.unwrap_or_default();
        let persistence = self.persistence.unwrap_or_default();
        let log = self.log.unwrap_or_default();

        Settings {
            server: ServerSettings {
                host: server.host.unwrap_or(default.server.host),
                port: server.port.unwrap_or(default.server.port),
            },
            web: WebSettings {
                host: web.host.unwrap_or(default.web.host),
                port: web.port.unwrap_or(default.web.port),
                secret: web.secret.unwrap_or(default.web.secret),
            },
            broker: BrokerSettings {
                listener_capacity: broker
                    .listener_capacity
                    .unwrap_or(default.broker.listener_capacity),
                delivery_timeout_ms: broker
                    .delivery_timeout_ms
                    .unwrap_or(default.broker.delivery_timeout_ms),
            },
            email: EmailSettings {
                host: email.host.unwrap_or(default.email.host),
                port: email.port.unwrap_or(default.email.port),
                username: email.username.unwrap_or(default.email.username),
                password: email.password.unwrap_or(default.email.password),
                from: email.from.unwrap_or(default.email.from),
                subscribers: email
                    .subscribers
                    .map(|list| {
                        list.into_iter()
                            .map(|s| s.trim().to_string())
                            .filter(|s| !s.is_empty())
                            .collect()
                    })
                    .unwrap_or(default.email.subscribers),
            },
            persistence: PersistenceSettings {
                path: persistence.path.unwrap_or(default.persistence.path),
            },
            log: LogSettings {
                level: log.level.unwrap_or(default.log.level),
            },
        }
    }
}

impl ServerSettings {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl WebSettings {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Provides default values for `Settings`.
///
/// Ensures the application has sensible defaults if no configuration is provided.
impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            web: WebSettings {
                host: "127.0.0.1".to_string(),
                port: 8081,
                secret: String::new(),
            },
            broker: BrokerSettings {
                listener_capacity: 1024,
                delivery_timeout_ms: 0,
            },
            email: EmailSettings {
                host: String::new(),
                port: 587,
                username: String::new(),
                password: String::new(),
                from: String::new(),
                subscribers: Vec::new(),
            },
            persistence: PersistenceSettings {
                path: "covbus_db".to_string(),
            },
            log: LogSettings {
                level: "info".to_string(),
            },
        }
    }
}

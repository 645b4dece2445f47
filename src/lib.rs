//! # covbus
//!
//! `covbus` is an in-memory event bus for CI coverage reports. Signed webhook
//! deliveries become events on a broker; a dispatch loop looks up who cares
//! about each event in a roster and notifies them concurrently.
//!
//! ## Core Modules
//!
//! - `broker`: Fans every published event out to all of its listeners.
//! - `roster`: Subscription registry keyed by event name; mints subscription ids.
//! - `dispatch`: Bridges the two, turning broker events into subscriber notifications.
//! - `event`: The events flowing through the bus.
//! - `subscriber`: The `Subscriber` trait and the built-in subscribers.
//!
//! ## Collaborators
//!
//! - `cache`: Latest coverage per package, for queries.
//! - `persistence`: Durable coverage snapshot backed by sled.
//! - `emailer`: SMTP delivery of coverage notifications.
//! - `web`: Webhook ingestion and the coverage query API.
//! - `transport`: Websocket streaming of events to clients.
//! - `config`: Loading settings from files and the environment.
//! - `utils`: Error types and logging setup.

pub mod broker;
pub mod cache;
pub mod config;
pub mod dispatch;
pub mod emailer;
pub mod event;
pub mod persistence;
pub mod roster;
pub mod subscriber;
pub mod transport;
pub mod utils;
pub mod web;

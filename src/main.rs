use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;

use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use covbus::broker::MemoryBroker;
use covbus::cache::{Cache, MemoryCache};
use covbus::config::{Settings, load_config};
use covbus::dispatch;
use covbus::emailer::{Emailer, SmtpEmailer};
use covbus::event::{EVENT_COVERAGE, EVENT_GITHUB};
use covbus::persistence::{Repo, SledRepo};
use covbus::roster::{MemoryRoster, Roster};
use covbus::subscriber::{CacheWriter, CoverageSplitter, EmailNotifier, RepoWriter, Subscriber};
use covbus::transport::websocket::start_websocket_server;
use covbus::utils::logging;
use covbus::web::{Hook, WebState, start_web_server};

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    logging::init(&config.log.level);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("covbus failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Settings) -> Result<(), Box<dyn Error>> {
    let repo = Arc::new(SledRepo::open(&config.persistence.path)?);
    let cache = Arc::new(MemoryCache::new());
    let stored = repo.load()?;
    cache.reset(&stored)?;
    info!(packages = stored.len(), "cache primed from store");

    let broker = Arc::new(MemoryBroker::from_settings(&config.broker));
    let roster = Arc::new(MemoryRoster::new());

    // the roster holds weak references, this vec keeps the subscribers alive
    let github: [Arc<dyn Subscriber>; 3] = [
        Arc::new(RepoWriter::new(repo.clone())),
        Arc::new(CacheWriter::new(cache.clone())),
        Arc::new(CoverageSplitter::new(broker.clone())),
    ];
    let mut subscribers = Vec::from(github);
    for sub in &subscribers {
        roster.subscribe(EVENT_GITHUB, sub)?;
    }

    if config.email.host.is_empty() {
        info!("no smtp host configured, coverage emails disabled");
    } else {
        let mailer: Arc<dyn Emailer> = Arc::new(SmtpEmailer::new(&config.email)?);
        for address in &config.email.subscribers {
            let notifier: Arc<dyn Subscriber> =
                Arc::new(EmailNotifier::new(mailer.clone(), address.clone()));
            roster.subscribe(EVENT_COVERAGE, &notifier)?;
            subscribers.push(notifier);
        }
        info!(recipients = config.email.subscribers.len(), "coverage emails enabled");
    }

    let shutdown = CancellationToken::new();

    let dispatch = tokio::spawn(dispatch::attach(
        broker.clone(),
        roster.clone(),
        shutdown.clone(),
    ));

    let mut web = {
        let addr = config.web.addr();
        let state = WebState {
            hook: Arc::new(Hook::new(broker.clone(), config.web.secret.clone())),
            cache: cache.clone(),
        };
        let shutdown = shutdown.clone();
        tokio::spawn(async move { start_web_server(&addr, state, shutdown).await })
    };

    let mut stream = {
        let addr = config.server.addr();
        let (broker, roster, shutdown) = (broker.clone(), roster.clone(), shutdown.clone());
        tokio::spawn(async move { start_websocket_server(&addr, broker, roster, shutdown).await })
    };

    let outcome = tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received. Exiting gracefully.");
            Ok(())
        }
        res = &mut web => server_exit("web", res),
        res = &mut stream => server_exit("websocket", res),
    };

    shutdown.cancel();
    match dispatch.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(error = %e, "dispatch loop stopped with an error"),
        Err(e) => warn!(error = %e, "dispatch task failed"),
    }

    roster.close()?;
    drop(subscribers);
    cache.close()?;
    repo.close()?;
    info!("covbus stopped");

    outcome
}

fn server_exit(
    name: &str,
    res: Result<std::io::Result<()>, JoinError>,
) -> Result<(), Box<dyn Error>> {
    match res {
        Ok(Ok(())) => {
            warn!("{} server exited unexpectedly", name);
            Ok(())
        }
        Ok(Err(e)) => Err(format!("{name} server failed: {e}").into()),
        Err(e) => Err(e.into()),
    }
}

//! Subcommand implementations.

use kestrel::{
    CacheState, DeliveryEngine, EventListener, IdentityResolver, PeerWarmer, Platform,
    RelayConfig, RelayContext, RelayError, RelayResult, ResolvedIdentity,
};
use std::sync::Arc;
use telegram_bot_client::UpdatePoller;
use tracing::{error, info, warn};

const UNREACHABLE_HINT: &str =
    "Ask the destination to send the bot a message (or run `kestrel init-contact`), then retry.";

struct Session {
    platform: Arc<dyn Platform>,
    poller: UpdatePoller,
    resolver: IdentityResolver,
    warmer: PeerWarmer,
}

async fn connect(config: &RelayConfig) -> RelayResult<Session> {
    let (platform, poller) = telegram_bot_client::connect(
        &config.api_base_url,
        &config.bot_token,
        config.poll_timeout,
    )
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to connect to the Bot API");
        RelayError::from(e.into_lookup_error())
    })?;

    let platform: Arc<dyn Platform> = Arc::new(platform);
    Ok(Session {
        resolver: IdentityResolver::new(platform.clone()),
        warmer: PeerWarmer::new(
            platform.clone(),
            config.conversation_page_size,
            config.warm_settle_delay,
        ),
        platform,
        poller,
    })
}

async fn resolve_destination(
    session: &Session,
    config: &RelayConfig,
) -> RelayResult<ResolvedIdentity> {
    session
        .resolver
        .resolve(&config.destination)
        .await
        .map_err(|e| {
            error!(reference = %config.destination, error = %e, "Failed to resolve destination");
            RelayError::Resolution {
                role: "destination",
                source: e,
            }
        })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl-C; stop the process to exit");
        std::future::pending::<()>().await;
    }
}

/// Resolve both contacts, warm both routes, then relay until Ctrl-C.
pub async fn run_relay(config: &RelayConfig) -> RelayResult<()> {
    let mut session = connect(config).await?;

    let context = RelayContext::establish(
        &session.resolver,
        &session.warmer,
        &config.source,
        &config.destination,
    )
    .await?;

    info!(
        source_route = %context.source_cache(),
        destination_route = %context.destination_cache(),
        "Relay ready"
    );
    if context.destination_cache() == CacheState::Unreachable {
        warn!(
            destination = %context.destination(),
            hint = UNREACHABLE_HINT,
            "Destination is not reachable yet"
        );
    }

    let engine = DeliveryEngine::new(session.platform.clone());
    let mut listener = EventListener::new(context, engine);
    let stats = listener.run(&mut session.poller, shutdown_signal()).await;

    info!(
        dispatched = stats.dispatched,
        failed = stats.failed,
        feed_errors = stats.feed_errors,
        "Relay stopped"
    );
    Ok(())
}

/// Resolve and warm the destination, and print what was found.
pub async fn warm_destination(config: &RelayConfig) -> RelayResult<()> {
    let session = connect(config).await?;
    let destination = resolve_destination(&session, config).await?;
    let state = session.warmer.warm(&destination).await;

    println!("Destination: {destination}");
    println!("Route:       {state}");
    if state == CacheState::Unreachable {
        println!();
        println!("{UNREACHABLE_HINT}");
    }
    Ok(())
}

/// Make sure a conversation with the destination exists, sending `notice` if needed.
pub async fn init_contact(config: &RelayConfig, notice: &str) -> RelayResult<()> {
    let session = connect(config).await?;
    let destination = resolve_destination(&session, config).await?;

    match session.warmer.introduce(&destination, notice).await {
        Ok(state) => {
            println!("Destination: {destination}");
            println!("Route:       {state}");
            if state == CacheState::Unreachable {
                println!();
                println!("The introduction was sent but the route is still unresolved.");
                println!("{UNREACHABLE_HINT}");
            }
            Ok(())
        }
        Err(e) => {
            error!(destination = %destination, error = %e, "Failed to send introduction");
            println!("Could not message {destination}: {e}");
            println!();
            println!("Likely causes:");
            println!("  - the destination's privacy settings do not accept messages from bots");
            println!("  - the destination has blocked the bot");
            println!("  - the destination has never started a conversation with the bot");
            Err(e.into())
        }
    }
}

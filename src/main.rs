use mc_status_relay::config::Config;
use mc_status_relay::services::delivery::{
    build_schedule, job_queue, run_schedule, run_startup_poll, DeliveryScheduler, JobDispatcher,
};
use mc_status_relay::services::delivery::StatusSink;
use mc_status_relay::services::discord::{ChannelSink, DiscordClient, InteractionVerifier};
use mc_status_relay::services::presentation::Presenter;
use mc_status_relay::services::status::SlpClient;
use mc_status_relay::AppState;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const JOB_QUEUE_CAPACITY: usize = 32;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mc_status_relay=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!("❌ {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let config = Config::from_env()?;
    let monitor = config.monitor.clone();

    let verifier = InteractionVerifier::from_hex(&config.discord.public_key).map_err(|e| e.to_string())?;
    let discord = DiscordClient::new(&config.discord);

    match discord.register_commands().await {
        Ok(()) => tracing::info!("✅ Slash commands registered"),
        Err(e) => tracing::error!("❌ Failed to register slash commands: {}", e),
    }

    let broadcast: Option<Arc<dyn StatusSink>> = match &monitor.channel_id {
        Some(channel_id) => Some(Arc::new(ChannelSink::new(discord.clone(), channel_id.clone()))),
        None => {
            tracing::warn!("MONITOR_CHANNEL_ID not set, status broadcasts are disabled");
            None
        }
    };

    let scheduler = Arc::new(DeliveryScheduler::new(
        monitor.clone(),
        Presenter::new(monitor.target.clone(), config.colors),
        Arc::new(SlpClient::new()),
        broadcast,
    ));

    let (jobs, receiver) = job_queue(JOB_QUEUE_CAPACITY);
    let dispatcher = tokio::spawn(JobDispatcher::new(scheduler, receiver).run());

    let mut producers: Vec<JoinHandle<()>> = Vec::new();
    if monitor.enabled {
        let schedule = build_schedule(monitor.poll_interval).map_err(|e| e.to_string())?;
        tracing::info!(
            "🔍 Monitoring {} every {} minute(s)",
            monitor.target.address(),
            (monitor.poll_interval.as_secs() / 60).max(1)
        );
        producers.push(tokio::spawn(run_schedule(schedule, jobs.clone())));
        producers.push(tokio::spawn(run_startup_poll(monitor.startup_delay, jobs.clone())));
    } else {
        tracing::info!("Monitoring disabled, only /status requests will be served");
    }

    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState {
        config,
        jobs,
        discord,
        verifier,
    });
    let app = mc_status_relay::create_app(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| format!("Failed to bind {}: {}", bind_addr, e))?;
    tracing::info!("Server running on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("Server error: {}", e))?;

    // The router owned the last sender; stopping the producers closes the queue
    for producer in producers {
        producer.abort();
    }
    if let Err(e) = dispatcher.await {
        tracing::error!("❌ Dispatcher task failed: {}", e);
    }

    tracing::info!("👋 Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

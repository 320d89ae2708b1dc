use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::{
    controller::{GalleryController, SettingsController, GALLERY_RELOAD_INTERVAL},
    live::{ChannelEvent, LiveChannel},
    view::next_run_label,
    ApiHandle, ClientError, DashboardClient,
};
use shared::protocol::LiveEvent;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::{interval_at, Instant};
use tracing::{info, warn};

mod config;
mod render;

use config::{load_config, Config};

#[derive(Parser, Debug)]
#[command(name = "dashboard", about = "Terminal dashboard for the autoposter web API")]
struct Args {
    /// Overrides the configured server URL.
    #[arg(long)]
    server_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Settings form: show, save, or follow live updates.
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Image gallery: render once or follow live updates.
    Gallery {
        #[command(subcommand)]
        action: GalleryAction,
    },
    /// Triggers an immediate post; prints the acknowledgment only.
    PostNow,
    /// Prints the scheduler status.
    Status,
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    Show,
    Save {
        /// Minutes between automated posts.
        #[arg(long)]
        interval: Option<u32>,
        /// Numeric filter id, or "none" to clear it.
        #[arg(long)]
        filter_id: Option<String>,
        /// Tag groups, one per line; "\n" starts a new group.
        #[arg(long)]
        tags: Option<String>,
    },
    Watch,
}

#[derive(Subcommand, Debug)]
enum GalleryAction {
    Show,
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let mut config = load_config();
    if let Some(server_url) = args.server_url {
        config.server_url = server_url;
    }

    match run(args.command, config).await {
        Ok(()) => Ok(()),
        Err(err) if err.requires_login() => {
            eprintln!(
                "authentication required: set user/password in dashboard.toml \
                 or APP__USER/APP__PASSWORD"
            );
            std::process::exit(2);
        }
        Err(err) => Err(err.into()),
    }
}

async fn run(command: Command, config: Config) -> Result<(), ClientError> {
    let client = Arc::new(DashboardClient::new(&config.server_url)?);
    if let (Some(user), Some(password)) = (&config.user, &config.password) {
        client.login(user, password).await?;
        info!("signed in as {user}");
    }
    let api: Arc<dyn ApiHandle> = client;

    match command {
        Command::Settings { action } => run_settings(api, &config, action).await,
        Command::Gallery {
            action: GalleryAction::Show,
        } => {
            let mut controller = GalleryController::new(api, config.gallery_limit);
            controller.refresh().await?;
            print!("{}", render::gallery(&controller.view));
            Ok(())
        }
        Command::Gallery {
            action: GalleryAction::Watch,
        } => watch_gallery(api, &config).await,
        Command::PostNow => {
            let mut controller = SettingsController::new(api);
            controller.post_now().await?;
            if let Some(toast) = &controller.toast {
                println!("{}", render::toast_line(toast));
            }
            Ok(())
        }
        Command::Status => {
            let status = api.fetch_status().await?;
            println!("{}", next_run_label(status.next_run_at));
            println!("Interval: {} minutes", status.interval_minutes);
            Ok(())
        }
    }
}

async fn run_settings(
    api: Arc<dyn ApiHandle>,
    config: &Config,
    action: SettingsAction,
) -> Result<(), ClientError> {
    match action {
        SettingsAction::Show => {
            let mut controller = SettingsController::new(api);
            controller.load().await?;
            print!("{}", render::settings_form(&controller.form));
            Ok(())
        }
        SettingsAction::Save {
            interval,
            filter_id,
            tags,
        } => {
            let mut controller = SettingsController::new(api);
            // Load first so unspecified fields keep their server values.
            controller.load().await?;
            if let Some(interval) = interval {
                controller.form.interval_text = interval.to_string();
            }
            if let Some(filter) = filter_id {
                controller.form.filter_text = match filter.to_ascii_lowercase().as_str() {
                    "none" | "null" | "off" => String::new(),
                    _ => filter,
                };
            }
            if let Some(tags) = tags {
                controller.form.tags_text = tags.replace("\\n", "\n");
            }
            controller.save().await?;
            if let Some(toast) = &controller.toast {
                println!("{}", render::toast_line(toast));
            }
            print!("{}", render::settings_form(&controller.form));
            Ok(())
        }
        SettingsAction::Watch => watch_settings(api, config).await,
    }
}

async fn watch_settings(api: Arc<dyn ApiHandle>, config: &Config) -> Result<(), ClientError> {
    let mut controller = SettingsController::new(api);
    controller.load().await?;
    print!("{}", render::settings_form(&controller.form));

    let channel = LiveChannel::new();
    let mut events = channel.subscribe();
    channel.start(&config.server_url).await?;

    loop {
        tokio::select! {
            received = events.recv() => match received {
                Ok(ChannelEvent::Connected) => info!("live: connected"),
                Ok(ChannelEvent::Reconnecting) => warn!("live: reconnecting"),
                Ok(ChannelEvent::Event(event)) => {
                    controller.apply_event(event.clone());
                    match event {
                        LiveEvent::Status { .. } => println!("{}", controller.form.next_run_text),
                        LiveEvent::Toast { .. } => {
                            if let Some(toast) = &controller.toast {
                                println!("{}", render::toast_line(toast));
                            }
                        }
                        LiveEvent::NewImage { .. } => {}
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!("live: dropped {skipped} queued events"),
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    channel.shutdown().await;
    Ok(())
}

async fn watch_gallery(api: Arc<dyn ApiHandle>, config: &Config) -> Result<(), ClientError> {
    let mut controller = GalleryController::new(api, config.gallery_limit);
    controller.refresh().await?;
    print!("{}", render::gallery(&controller.view));

    let channel = LiveChannel::new();
    let mut events = channel.subscribe();
    channel.start(&config.server_url).await?;

    // Redundant periodic reload, independent of push events. Offset so the
    // first tick fires one interval from now, not immediately.
    let mut reload = interval_at(
        Instant::now() + GALLERY_RELOAD_INTERVAL,
        GALLERY_RELOAD_INTERVAL,
    );

    loop {
        tokio::select! {
            received = events.recv() => match received {
                Ok(event) => {
                    controller.apply_event(event.clone()).await?;
                    match event {
                        ChannelEvent::Connected | ChannelEvent::Reconnecting => {
                            println!("{}", controller.live_status);
                        }
                        ChannelEvent::Event(LiveEvent::Status { .. }) => {
                            println!("{}", controller.next_run_text);
                        }
                        ChannelEvent::Event(LiveEvent::Toast { .. }) => {
                            if let Some(toast) = &controller.toast {
                                println!("{}", render::toast_line(toast));
                            }
                        }
                        ChannelEvent::Event(LiveEvent::NewImage { .. }) => {
                            print!("{}", render::gallery(&controller.view));
                        }
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!("live: dropped {skipped} queued events"),
                Err(RecvError::Closed) => break,
            },
            _ = reload.tick() => {
                controller.refresh().await?;
                print!("{}", render::gallery(&controller.view));
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    channel.shutdown().await;
    Ok(())
}

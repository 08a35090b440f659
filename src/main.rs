mod adapters;
mod config;
mod discount;
mod model;
mod normalizer;
mod orchestrator;
mod session;
mod store;

use config::{AppConfig, DEFAULT_CONFIG_PATH, load_config};
use discount::Discount;
use model::TitlePriceRecord;
use normalizer::format_price;
use orchestrator::{CancelToken, FetchOrchestrator, PassEvent};
use session::{PageSession, WebDriverSession};
use store::ResultStore;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("panic: {:?}", panic_info);
    }));

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config: AppConfig = match load_config(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error: {}", e);
            std::process::exit(1);
        }
    };
    if config.titles.is_empty() {
        warn!("No games to check in {}; nothing to do", config_path);
        return;
    }
    info!("Tracking {} titles", config.titles.len());

    let (tx, mut rx) = mpsc::unbounded_channel();
    let orchestrator = FetchOrchestrator::new();
    let cancel = CancelToken::new();

    // Ctrl-C trips the cancel token; the worker closes the browser
    // session on its way out.
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, cancelling pass...");
                cancel.cancel();
            }
        });
    }

    let mut store = ResultStore::new();

    let driver_url = config.webdriver_url.clone();
    let headless = config.headless;
    orchestrator.start(
        move || async move {
            let session = WebDriverSession::connect(&driver_url, headless).await?;
            Ok(Arc::new(session) as Arc<dyn PageSession>)
        },
        config.titles.clone(),
        tx,
        cancel.clone(),
    );

    let mut fatal = false;
    while let Some(event) = rx.recv().await {
        match event {
            PassEvent::Progress(message) => info!("{}", message),
            PassEvent::Error(message) => warn!("{}", message),
            PassEvent::TitleUpdated(record) => {
                info!("Updated {} ({} vendors)", record.name, record.vendors.len());
                if let Err(e) = store.append(record) {
                    warn!("Dropping duplicate result: {}", e);
                }
            }
            PassEvent::Completed => {
                info!("All prices updated ({} titles)", store.len());
                break;
            }
            PassEvent::Fatal(message) => {
                error!("Pass aborted: {}", message);
                // A half-collected table is misleading; drop it.
                store.clear();
                fatal = true;
                break;
            }
        }
    }

    if store.is_empty() {
        warn!("No results collected this pass");
    }
    print_results(&store, &config);
    if fatal {
        std::process::exit(1);
    }
}

/// Renders the result table. Zero prices print as blank cells; error
/// rows show the message instead of prices.
fn print_results(store: &ResultStore, config: &AppConfig) {
    let view = if config.discounted_only {
        store.filtered_view(config.sort)
    } else {
        store.sorted_view(config.sort)
    };
    if view.is_empty() {
        println!("No results.");
        return;
    }

    println!(
        "{:<36} {:<9} {:>10} {:>10}  {}",
        "Game", "Vendor", "Current", "Base", "Discount"
    );
    for record in view {
        print_record(record);
    }
}

fn print_record(record: &TitlePriceRecord) {
    for (vendor, snapshot) in &record.vendors {
        if let Some(message) = &snapshot.error {
            println!(
                "{:<36} {:<9} error: {}",
                record.name,
                vendor.label(),
                message
            );
            continue;
        }
        let discount = Discount::compute(snapshot.current_price, snapshot.base_price)
            .map(|d| format!("{} ({}%)", format_price(d.amount), d.percent))
            .unwrap_or_default();
        println!(
            "{:<36} {:<9} {:>10} {:>10}  {}",
            record.name,
            vendor.label(),
            blank_if_zero(snapshot.current_price),
            blank_if_zero(snapshot.base_price),
            discount
        );
    }
}

fn blank_if_zero(price: f64) -> String {
    if price > 0.0 {
        format_price(price)
    } else {
        String::new()
    }
}

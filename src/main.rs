//! Headless front end for the tour engine.
//!
//! Prefetches slide lists for every region into the local store, reports
//! viewing progress, and exposes the explicit reset operations. The
//! graphical tour consumes the same library API.

use log::info;
use std::env;
use std::error::Error;
use tour_cache::config::Config;
use tour_cache::region::{self, BASE_REGIONS, BONUS_REGION, Region};
use tour_cache::services::DiscoverOptions;
use tour_cache::state::AppState;

const USAGE: &str = "usage: tour-cache [prefetch|status|reset-slides|reset-progress]

environment:
  TOUR_BASE_URL  base URL of the static slide host
  TOUR_DB_PATH   path of the local database file (default: tour-cache.db)";

fn config_from_env() -> Config {
    let mut config = Config::default();
    if let Ok(url) = env::var("TOUR_BASE_URL") {
        config.base_url = url;
    }
    if let Ok(path) = env::var("TOUR_DB_PATH") {
        config.db_path = path.into();
    }
    config
}

/// All regions that are currently part of the tour. The bonus region only
/// counts once split mode has been reached.
async fn active_regions(app: &AppState) -> Vec<Region> {
    let mut regions: Vec<Region> = BASE_REGIONS.clone();
    if app.progress.split_mode().await {
        regions.push(BONUS_REGION.clone());
    }
    regions
}

async fn prefetch(app: &AppState) {
    for region in active_regions(app).await {
        let region_id = region.id.clone();
        let options = DiscoverOptions {
            on_progress: Some(Box::new(move |loaded| {
                info!("{}: loading... ({})", region_id, loaded);
            })),
        };
        let slides = app.discovery.discover_with(&region, &options).await;
        if slides.is_empty() {
            println!("{:<12} no slides published yet", region.id);
        } else {
            println!("{:<12} {} slides", region.id, slides.len());
        }
    }
}

async fn status(app: &AppState) {
    let snapshot = app.progress.snapshot().await;
    println!("Phase: {:?}", app.progress.phase().await);
    println!("{} ({:.0}%)", snapshot.label(), snapshot.percentage);

    for region in active_regions(app).await {
        let cached = app.discovery.cached(&region.id).await;
        let slides = match &cached {
            Some(slides) if !slides.is_empty() => format!("{} slides", slides.len()),
            Some(_) => "checked, none found".to_string(),
            None => "not checked".to_string(),
        };
        let viewed = if app.progress.is_viewed(&region.id).await {
            "viewed"
        } else {
            "-"
        };
        println!(
            "{:<12} {:<4} {} [{}]",
            region.id, region.display_code, slides, viewed
        );
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let command = env::args()
        .nth(1)
        .unwrap_or_else(|| "prefetch".to_string());
    if command == "--help" || command == "-h" {
        println!("{}", USAGE);
        return Ok(());
    }

    let app = AppState::init(config_from_env()).await?;

    match command.as_str() {
        "prefetch" => prefetch(&app).await,
        "status" => status(&app).await,
        "reset-slides" => {
            app.discovery.reset_slides().await?;
            println!("Slide cache cleared for {} regions", region::base_region_count() + 1);
        }
        "reset-progress" => {
            app.progress.reset().await?;
            println!("Viewing progress reset");
        }
        other => {
            eprintln!("Unknown command: {}\n{}", other, USAGE);
            std::process::exit(2);
        }
    }

    // The browser original saves on visibility loss; the closest analog
    // here is a flush before exit.
    app.progress.flush().await?;
    Ok(())
}

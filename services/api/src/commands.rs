use crate::infra::{
    build_planner, load_catalog, load_rubric, open_listing_store, InMemoryAccreditationRepository,
};
use boardinghouse::accreditation::{
    AccreditationForm, AccreditationService, ClassificationThresholds, EvaluationOutcome,
};
use boardinghouse::config::AppConfig;
use boardinghouse::error::AppError;
use boardinghouse::listings::{Listing, ListingService};
use boardinghouse::routing::{resolve_route, GeoPoint, RouteResolution};
use clap::Args;
use std::fmt::Write as _;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// Questionnaire JSON file (same shape as the HTTP form payload)
    #[arg(long)]
    pub(crate) form: PathBuf,
    /// Print the evaluation as JSON instead of a readable breakdown
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct RouteArgs {
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) start_lat: f64,
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) start_lng: f64,
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) end_lat: f64,
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) end_lng: f64,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ListingsArgs {
    /// Only show listings in this locality (e.g. tagbilaran, dauis)
    #[arg(long)]
    pub(crate) locality: Option<String>,
    /// Case-insensitive name or address filter
    #[arg(long)]
    pub(crate) search: Option<String>,
}

pub(crate) fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let rubric = Arc::new(load_rubric(config.rubric_path.as_deref())?);

    let reader = BufReader::new(File::open(&args.form)?);
    let form: AccreditationForm = serde_json::from_reader(reader).map_err(std::io::Error::from)?;
    let name = form.general.boarding_house_name.trim().to_string();

    let service = AccreditationService::new(
        Arc::new(InMemoryAccreditationRepository::default()),
        rubric,
        ClassificationThresholds::default(),
    );
    let outcome = match service.evaluate(form) {
        Ok(outcome) => outcome,
        Err(err) => {
            println!("Questionnaire rejected: {}", err);
            return Ok(());
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&outcome) {
            Ok(json) => println!("{}", json),
            Err(err) => println!("Evaluation payload unavailable: {}", err),
        }
    } else {
        print!("{}", render_evaluation(&name, &outcome));
    }
    Ok(())
}

pub(crate) fn render_evaluation(name: &str, outcome: &EvaluationOutcome) -> String {
    let score = &outcome.score;
    let mut out = String::new();
    let name = if name.is_empty() { "(unnamed)" } else { name };

    let _ = writeln!(out, "Accreditation evaluation: {}", name);
    let _ = writeln!(
        out,
        "- Score {}/{} ({:.1}%)",
        score.total_score, score.max_score, score.percentage
    );
    let _ = writeln!(out, "Sections:");
    for section in &score.per_section {
        let _ = writeln!(
            out,
            "  - {}: {}/{} ({:.1}%)",
            section.label, section.score, section.max_score, section.percentage
        );
    }
    if score.critical_failures.is_empty() {
        let _ = writeln!(out, "Critical items: all acceptable");
    } else {
        let _ = writeln!(out, "Critical items not acceptable:");
        for failure in &score.critical_failures {
            match &failure.alternative {
                Some(alternative) => {
                    let _ = writeln!(out, "  - {} (alternative: {})", failure.label, alternative);
                }
                None => {
                    let _ = writeln!(out, "  - {}", failure.label);
                }
            }
        }
    }
    let _ = writeln!(out, "Decision: {}", outcome.decision.summary());
    out
}

pub(crate) async fn run_route(args: RouteArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let planner = build_planner(&config.routing)?;
    let start = GeoPoint::new(args.start_lat, args.start_lng);
    let end = GeoPoint::new(args.end_lat, args.end_lng);

    let resolution = resolve_route(planner.as_ref(), start, end).await?;
    print!("{}", render_route(planner.backend(), &resolution));
    Ok(())
}

pub(crate) fn render_route(backend: &str, resolution: &RouteResolution) -> String {
    let mut out = String::new();
    if resolution.fallback {
        let _ = writeln!(
            out,
            "Routing backend '{}' unavailable; showing a straight line",
            backend
        );
    } else {
        let _ = writeln!(out, "Route via {}", backend);
    }
    let _ = writeln!(
        out,
        "- {} points | {:.2} km",
        resolution.path.points.len(),
        resolution.path.length_km()
    );
    for point in &resolution.path.points {
        let _ = writeln!(out, "  {:.6}, {:.6}", point.lat, point.lng);
    }
    out
}

pub(crate) fn run_listings(args: ListingsArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let catalog = load_catalog(config.listings.catalog_csv.as_deref())?;
    let store = open_listing_store(config.listings.store_path.as_deref(), &catalog)?;
    let service = ListingService::new(Arc::new(catalog), store);

    let locality = args.locality.as_deref().map(str::trim).filter(|key| !key.is_empty());
    let listings = match service.search(locality, args.search.as_deref()) {
        Ok(listings) => listings,
        Err(err) => {
            println!("Listings unavailable: {}", err);
            return Ok(());
        }
    };

    print!("{}", render_listings(&listings));
    Ok(())
}

pub(crate) fn render_listings(listings: &[Listing]) -> String {
    let mut out = String::new();
    if listings.is_empty() {
        let _ = writeln!(out, "No listings match");
        return out;
    }

    let _ = writeln!(out, "{} listing(s)", listings.len());
    for listing in listings {
        let vacancy = match (listing.available, listing.rooms) {
            (Some(available), Some(rooms)) => format!("{available}/{rooms} rooms free"),
            _ => "vacancy unknown".to_string(),
        };
        let _ = writeln!(
            out,
            "- #{} {} [{}] {} | {} | {}",
            listing.id,
            listing.name,
            listing.status.label(),
            listing.address,
            listing.rate,
            vacancy
        );
    }
    out
}

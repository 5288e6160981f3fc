mod logging;
mod request;
mod settings;

use clap::Parser;
use field_route_lib::PathFinder;
use request::{RequestError, RouteRequest, RouteResponse};
use settings::Settings;
use std::io::Read;
use std::process::ExitCode;

fn main() -> ExitCode {
    logging::setup_logging();
    let settings = Settings::parse();

    let response = match run(&settings) {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Route query failed: {}", e);
            RouteResponse::from(e)
        }
    };

    match response.to_json(settings.pretty) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            tracing::error!("Failed to encode response: {}", e);
            return ExitCode::FAILURE;
        }
    }

    if response.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Read the request, answer it and build the response
fn run(settings: &Settings) -> Result<RouteResponse, RequestError> {
    let text = read_input(settings)?;
    let request = RouteRequest::parse(&text)?;
    let (start, end) = request.endpoints()?;
    let region = request.region()?;
    tracing::info!(
        "Routing ({}, {}) -> ({}, {}) through a field with {} holes",
        start.x,
        start.y,
        end.x,
        end.y,
        region.holes().len()
    );

    let path = PathFinder::new(settings.config()).find_path(start, end, &region)?;
    tracing::info!(
        "Route has {} points and length {:.6}",
        path.points.len(),
        path.length
    );
    Ok(RouteResponse::from(path))
}

fn read_input(settings: &Settings) -> Result<String, RequestError> {
    match &settings.input {
        Some(path) => {
            tracing::debug!("Reading request from {}", path.display());
            Ok(std::fs::read_to_string(path)?)
        }
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

// src/api.rs

use serde::Serialize;
use serde_json::{json, Value};
use std::{convert::Infallible, sync::Arc, time::Instant};
use tracing::{error, info, warn};
use warp::{
    http::StatusCode,
    hyper::body::Bytes,
    reply::{self, Reply, Response},
    Filter, Rejection,
};

use crate::config::DataConfig;
use crate::cycle;
use crate::measure::{Measure, ZipCode};
use crate::query::Lookup;

const MAX_BODY_BYTES: u64 = 16 * 1024;

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
}

fn error_reply(status: StatusCode, error: &'static str) -> Response {
    reply::with_status(reply::json(&ErrorResponse { error }), status).into_response()
}

/// `GET /` and `POST /county_data`.
pub fn routes(
    data: Arc<DataConfig>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let home_route = warp::path::end().and(warp::get()).and_then(home);

    let county_route = warp::path("county_data")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::header::optional::<String>("content-type"))
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::bytes())
        .and(warp::any().map(move || Arc::clone(&data)))
        .and_then(county_data)
        .recover(body_rejection);

    home_route
        .or(county_route)
        .with(warp::trace::request())
}

async fn home() -> Result<impl Reply, Infallible> {
    Ok(reply::json(&json!({
        "message": "County Health Data API. Use /county_data endpoint with POST requests."
    })))
}

/// Body-size rejections answer in the same JSON error shape as the handler;
/// everything else falls through to warp.
async fn body_rejection(rejection: Rejection) -> Result<Response, Rejection> {
    if rejection.find::<warp::reject::PayloadTooLarge>().is_some() {
        warn!("request body over {} bytes", MAX_BODY_BYTES);
        return Ok(error_reply(
            StatusCode::PAYLOAD_TOO_LARGE,
            "Request body too large",
        ));
    }
    if rejection.find::<warp::reject::LengthRequired>().is_some() {
        return Ok(error_reply(
            StatusCode::LENGTH_REQUIRED,
            "Content-Length header is required",
        ));
    }
    Err(rejection)
}

/// `application/json` or any `+json` media type, parameters ignored.
fn is_json(content_type: Option<&str>) -> bool {
    let Some(ct) = content_type else {
        return false;
    };
    let mime = ct.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

/// Pull a non-empty string field out of the request object.
fn text_field<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

async fn county_data(
    content_type: Option<String>,
    body: Bytes,
    data: Arc<DataConfig>,
) -> Result<Response, Infallible> {
    if !is_json(content_type.as_deref()) {
        return Ok(error_reply(
            StatusCode::BAD_REQUEST,
            "Content-Type must be application/json",
        ));
    }

    let request: Value = match serde_json::from_slice(&body) {
        Ok(v @ Value::Object(_)) => v,
        _ => {
            return Ok(error_reply(
                StatusCode::BAD_REQUEST,
                "Request body must be a JSON object",
            ))
        }
    };
    info!(%request, "received request");

    if request.get("coffee").and_then(Value::as_str) == Some("teapot") {
        return Ok(StatusCode::IM_A_TEAPOT.into_response());
    }

    let (Some(zip), Some(measure)) = (
        text_field(&request, "zip"),
        text_field(&request, "measure_name"),
    ) else {
        return Ok(error_reply(
            StatusCode::BAD_REQUEST,
            "Both zip and measure_name are required",
        ));
    };
    let Ok(zip) = zip.parse::<ZipCode>() else {
        return Ok(error_reply(
            StatusCode::BAD_REQUEST,
            "ZIP code must be 5 digits",
        ));
    };
    let Ok(measure) = measure.parse::<Measure>() else {
        return Ok(error_reply(StatusCode::BAD_REQUEST, "Invalid measure_name"));
    };

    Ok(answer(&data, zip, measure).await)
}

/// Run one query cycle on the blocking pool and map its outcome to a reply.
async fn answer(data: &DataConfig, zip: ZipCode, measure: Measure) -> Response {
    let start = Instant::now();
    let sources = data.sources();
    let outcome = tokio::task::spawn_blocking({
        let zip = zip.clone();
        move || cycle::run(&sources, zip.as_str(), measure.as_str())
    })
    .await;

    match outcome {
        Ok(Ok(Lookup::Found(rows))) => {
            info!(rows = rows.len(), elapsed = ?start.elapsed(), "returning results");
            reply::json(&rows).into_response()
        }
        Ok(Ok(Lookup::NotFound(absent))) => {
            info!(%zip, %measure, ?absent, "no data found");
            error_reply(
                StatusCode::NOT_FOUND,
                "No data found for the given zip and measure_name",
            )
        }
        Ok(Err(e)) if e.is_configuration() => {
            error!("dataset unavailable: {}", e);
            error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database configuration error",
            )
        }
        Ok(Err(e)) => {
            error!("database error: {}", e);
            error_reply(StatusCode::INTERNAL_SERVER_ERROR, "Database error")
        }
        Err(e) => {
            warn!("query cycle task failed: {}", e);
            error_reply(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

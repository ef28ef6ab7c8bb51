use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use image::RgbaImage;
use serde::Deserialize;
use tracing::warn;
use utoipa::{IntoParams, ToSchema};

use crate::clock;
use crate::fonts::FontBook;
use crate::map::MapView;
use crate::model::{CustomConfig, LocationRecord, MapKind, Theme};
use crate::photo::PhotoBuffer;
use crate::render::{self, RenderInput};
use crate::serial;
use crate::state::AppState;
use crate::theme::StampError;
use crate::util;

// Initial map position of the original app (Borobudur).
pub const DEFAULT_LAT: f64 = -7.601301;
pub const DEFAULT_LNG: f64 = 110.201094;
pub const DEFAULT_ZOOM: u8 = 15;

fn normalize_width() -> u32 {
    std::env::var("SCALE_NORMALIZE_WIDTH")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(1280)
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StampRequest {
    /// Base64 or data-URI encoded photo. The sample gradient photo is used
    /// when absent.
    pub photo: Option<String>,
    /// theme1 | theme2 | precision | custom (unknown values → theme1)
    pub theme: Option<String>,

    pub title: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    /// Overrides for the session clock labels.
    pub date: Option<String>,
    pub time: Option<String>,
    pub serial: Option<String>,

    /// theme2 institution logo source.
    pub logo_url: Option<String>,

    pub zoom: Option<u8>,
    /// roadmap | satellite
    pub map_type: Option<String>,
    /// Cap the photo at the canonical width before stamping.
    pub normalize: Option<bool>,

    pub custom: Option<CustomConfig>,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "geostamp",
    responses((status = 200, description = "Health check", body = serde_json::Value))
)]
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

async fn fetch_logo(http: &reqwest::Client, url: &str) -> Option<RgbaImage> {
    let resp = match http.get(url).send().await {
        Ok(r) if r.status().is_success() => r,
        Ok(r) => {
            warn!("logo fetch failed: http {}", r.status());
            return None;
        }
        Err(e) => {
            warn!("logo fetch failed: {e}");
            return None;
        }
    };
    let bytes = match resp.bytes().await {
        Ok(b) => b,
        Err(e) => {
            warn!("logo fetch failed: {e}");
            return None;
        }
    };
    match image::load_from_memory(&bytes) {
        Ok(img) => Some(img.to_rgba8()),
        Err(e) => {
            warn!("logo decode failed: {e}");
            None
        }
    }
}

#[utoipa::path(
    post,
    path = "/stamp",
    tag = "geostamp",
    request_body = StampRequest,
    responses(
        (status = 200, description = "Composited photo", content_type = "image/jpeg"),
        (status = 400, description = "Bad request"),
        (status = 500, description = "Internal error")
    )
)]
pub async fn stamp(
    State(st): State<Arc<AppState>>,
    Json(req): Json<StampRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let latitude = req.latitude.unwrap_or(DEFAULT_LAT);
    let longitude = req.longitude.unwrap_or(DEFAULT_LNG);
    if !(-90.0..=90.0).contains(&latitude) {
        return Err((StatusCode::BAD_REQUEST, format!("latitude out of range: {latitude}")));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err((StatusCode::BAD_REQUEST, format!("longitude out of range: {longitude}")));
    }

    let fonts = FontBook::load()
        .map_err(StampError::from)
        .map_err(status_of)?;

    let photo = match req.photo.as_deref().map(str::trim) {
        Some(p) if !p.is_empty() => PhotoBuffer::from_base64(p).map_err(status_of)?,
        _ => PhotoBuffer::sample(Some(&fonts)),
    };
    let photo = if req.normalize.unwrap_or(false) {
        photo.normalize(normalize_width()).map_err(status_of)?
    } else {
        photo
    };

    let theme = Theme::parse(req.theme.as_deref().unwrap_or("theme1"));
    let kind = MapKind::parse(req.map_type.as_deref().unwrap_or("roadmap"));
    let view = MapView {
        lat: latitude,
        lng: longitude,
        zoom: req.zoom.unwrap_or(DEFAULT_ZOOM),
        kind,
    };

    // A map that fails to assemble degrades to the last published one, or to
    // the per-theme placeholder region, instead of failing the request.
    let map_set = match st.map.refresh(view).await {
        Ok(set) => Some(set),
        Err(e) => {
            warn!("map refresh failed: {e}");
            st.map.latest()
        }
    };

    let logo = match (theme, req.logo_url.as_deref()) {
        (Theme::Theme2, Some(url)) if !url.trim().is_empty() => {
            fetch_logo(&st.http, url.trim()).await
        }
        _ => None,
    };

    let rendered_at = clock::now_jakarta();
    let time = match (req.date, req.time) {
        (None, None) => clock::timestamp_from(&rendered_at),
        (date, time) => {
            let generated = clock::timestamp_from(&rendered_at);
            crate::model::TimeStamp {
                date_label: date.unwrap_or(generated.date_label),
                time_label: time.unwrap_or(generated.time_label),
            }
        }
    };
    let serial_tag = req
        .serial
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(serial::generate);

    let location = LocationRecord {
        title: req.title.unwrap_or_default(),
        address: req.address.unwrap_or_default(),
        latitude,
        longitude,
    };
    let custom = req.custom.unwrap_or_default();

    let input = RenderInput {
        map: map_set.as_ref().map(|s| &s.image),
        logo: logo.as_ref(),
        location: &location,
        time: &time,
        serial: &serial_tag,
        custom: &custom,
        rendered_at,
        fonts: &fonts,
    };

    let canvas = render::render(Some(&photo), theme, &input)
        .ok_or_else(|| status_of(StampError::Internal("empty render".into())))?;
    let jpeg = render::export_jpeg(&canvas).map_err(status_of)?;

    let filename = render::export_filename(chrono::Utc::now().timestamp_millis());
    Ok((
        [
            (header::CONTENT_TYPE, "image/jpeg".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        jpeg,
    ))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MapQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub zoom: Option<u8>,
    /// roadmap | satellite
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[utoipa::path(
    get,
    path = "/map",
    tag = "geostamp",
    params(MapQuery),
    responses(
        (status = 200, description = "Stitched 450x450 map", content_type = "image/png"),
        (status = 500, description = "Map assembly failed")
    )
)]
pub async fn map_snapshot(
    State(st): State<Arc<AppState>>,
    Query(q): Query<MapQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let view = MapView {
        lat: q.lat.unwrap_or(DEFAULT_LAT),
        lng: q.lng.unwrap_or(DEFAULT_LNG),
        zoom: q.zoom.unwrap_or(DEFAULT_ZOOM),
        kind: MapKind::parse(q.kind.as_deref().unwrap_or("roadmap")),
    };
    let set = st
        .map
        .refresh(view)
        .await
        .map_err(|e| status_of(StampError::Map(e)))?;
    let png = util::png_encode_rgba8(&set.image)
        .map_err(|e| status_of(StampError::Image(e)))?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}

fn status_of(e: StampError) -> (StatusCode, String) {
    match e {
        StampError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    }
}

//! Static map assembly.
//!
//! Roadmap views are stitched client-side from the same raster tile source
//! the interactive map uses: the 3×3 grid around the center tile lands in a
//! 768×768 staging buffer, and a 450×450 square centered on the exact
//! fractional tile point is cropped out. Satellite views come from a
//! single-image provider instead.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use image::{imageops, DynamicImage, RgbaImage};
use parking_lot::Mutex;
use thiserror::Error;
use tracing::warn;

use crate::draw;
use crate::model::MapKind;
use crate::tile::{self, TILE_SIZE};

pub const STAGING_SIZE: u32 = 768;
pub const MAP_SIZE: u32 = 450;

pub const DEFAULT_TILE_URL_TEMPLATE: &str =
    "https://basemaps.cartocdn.com/rastertiles/voyager/{z}/{x}/{y}.png";
pub const DEFAULT_SATELLITE_URL_TEMPLATE: &str =
    "https://static-maps.yandex.ru/1.x/?lang=id_ID&ll={lng},{lat}&z={z}&l=sat,skl&size={size},{size}";

#[derive(Debug, Error)]
pub enum MapError {
    #[error("http: {0}")]
    Http(String),
    #[error("decode: {0}")]
    Decode(String),
}

/// Raster source seam. The HTTP implementation is the production path; tests
/// substitute stubs to exercise the failure and staleness policies.
pub trait TileFetcher: Send + Sync {
    fn fetch_tile(&self, zoom: u8, x: i64, y: i64) -> BoxFuture<'_, Result<DynamicImage, MapError>>;

    fn fetch_satellite(
        &self,
        lat: f64,
        lng: f64,
        zoom: u8,
        size: u32,
    ) -> BoxFuture<'_, Result<DynamicImage, MapError>>;
}

pub struct HttpTileFetcher {
    http: reqwest::Client,
    tile_template: String,
    satellite_template: String,
}

impl HttpTileFetcher {
    pub fn new(http: reqwest::Client) -> Self {
        let tile_template = std::env::var("TILE_URL_TEMPLATE")
            .unwrap_or_else(|_| DEFAULT_TILE_URL_TEMPLATE.to_string());
        let satellite_template = std::env::var("SATELLITE_URL_TEMPLATE")
            .unwrap_or_else(|_| DEFAULT_SATELLITE_URL_TEMPLATE.to_string());
        Self { http, tile_template, satellite_template }
    }

    async fn fetch_image(&self, url: String) -> Result<DynamicImage, MapError> {
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| MapError::Http(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(MapError::Http(format!("http {} for {url}", resp.status())));
        }
        let bytes = resp.bytes().await.map_err(|e| MapError::Http(e.to_string()))?;
        image::load_from_memory(&bytes).map_err(|e| MapError::Decode(e.to_string()))
    }
}

impl TileFetcher for HttpTileFetcher {
    fn fetch_tile(&self, zoom: u8, x: i64, y: i64) -> BoxFuture<'_, Result<DynamicImage, MapError>> {
        let url = tile::tile_url(&self.tile_template, zoom, x, y);
        self.fetch_image(url).boxed()
    }

    fn fetch_satellite(
        &self,
        lat: f64,
        lng: f64,
        zoom: u8,
        size: u32,
    ) -> BoxFuture<'_, Result<DynamicImage, MapError>> {
        let url = self
            .satellite_template
            .replace("{lat}", &lat.to_string())
            .replace("{lng}", &lng.to_string())
            .replace("{z}", &zoom.to_string())
            .replace("{size}", &size.to_string());
        self.fetch_image(url).boxed()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapView {
    pub lat: f64,
    pub lng: f64,
    pub zoom: u8,
    pub kind: MapKind,
}

/// The published, ready-to-draw square map image for a view.
pub struct MapTileSet {
    pub image: RgbaImage,
    pub view: MapView,
}

/// Owns the latest stitched map. Each refresh takes a monotonically
/// increasing token; a result is published only while its token is still the
/// newest issued, so a slow stale request can never overwrite a newer one.
pub struct MapService<F> {
    fetcher: F,
    generation: AtomicU64,
    latest: Mutex<Option<Arc<MapTileSet>>>,
}

impl<F: TileFetcher> MapService<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            generation: AtomicU64::new(0),
            latest: Mutex::new(None),
        }
    }

    pub fn latest(&self) -> Option<Arc<MapTileSet>> {
        self.latest.lock().clone()
    }

    /// Builds the map for `view` and publishes it unless a newer refresh was
    /// issued meanwhile. The result is returned either way so a caller that
    /// initiated the refresh can still use it directly.
    pub async fn refresh(&self, view: MapView) -> Result<Arc<MapTileSet>, MapError> {
        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let _span = crate::perf::PerfSpan::new("map_refresh");

        let image = match view.kind {
            MapKind::Roadmap => self.stitch(view).await,
            MapKind::Satellite => self.satellite(view).await?,
        };
        let set = Arc::new(MapTileSet { image, view });
        if token == self.generation.load(Ordering::SeqCst) {
            *self.latest.lock() = Some(Arc::clone(&set));
        }
        Ok(set)
    }

    /// 3×3 stitch. A failed tile still counts as completed — its region of
    /// the staging buffer stays at the pre-filled background — so the crop
    /// always happens after exactly nine completions.
    async fn stitch(&self, view: MapView) -> RgbaImage {
        let coord = tile::project(view.lat, view.lng, view.zoom);
        let (cx, cy) = coord.center_tile();
        let (offset_x, offset_y) = coord.pixel_offset();

        let mut staging = draw::new_canvas(STAGING_SIZE, STAGING_SIZE);

        let grid: Vec<(i64, i64)> = (-1..=1)
            .flat_map(|dx| (-1..=1).map(move |dy| (dx, dy)))
            .collect();
        let mut pending: FuturesUnordered<_> = grid
            .into_iter()
            .map(|(dx, dy)| {
                let fut = self.fetcher.fetch_tile(view.zoom, cx + dx, cy + dy);
                async move { (dx, dy, fut.await) }
            })
            .collect();

        // Tiles are blitted at their precomputed grid offsets as they
        // arrive; completion order is irrelevant.
        while let Some((dx, dy, result)) = pending.next().await {
            match result {
                Ok(img) => {
                    let tile_img = img.to_rgba8();
                    let x = ((dx + 1) as u32) * TILE_SIZE;
                    let y = ((dy + 1) as u32) * TILE_SIZE;
                    draw::overlay_alpha(&mut staging, &tile_img, x as i64, y as i64);
                }
                Err(e) => {
                    warn!("tile ({dx},{dy}) failed, leaving blank: {e}");
                }
            }
        }

        // Crop the square centered on the exact fractional point, which sits
        // at (256 + offset) in the staging buffer.
        let half = (MAP_SIZE / 2) as f64;
        let max = (STAGING_SIZE - MAP_SIZE) as f64;
        let crop_x = (TILE_SIZE as f64 + offset_x - half).round().clamp(0.0, max) as u32;
        let crop_y = (TILE_SIZE as f64 + offset_y - half).round().clamp(0.0, max) as u32;
        imageops::crop_imm(&staging, crop_x, crop_y, MAP_SIZE, MAP_SIZE).to_image()
    }

    async fn satellite(&self, view: MapView) -> Result<RgbaImage, MapError> {
        let img = self
            .fetcher
            .fetch_satellite(view.lat, view.lng, view.zoom, MAP_SIZE)
            .await?;
        let img = img.to_rgba8();
        if img.width() == MAP_SIZE && img.height() == MAP_SIZE {
            Ok(img)
        } else {
            Ok(imageops::resize(
                &img,
                MAP_SIZE,
                MAP_SIZE,
                imageops::FilterType::Lanczos3,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::time::Duration;

    /// Stub source: solid-color tiles, optionally failing a subset, with a
    /// per-instance artificial latency.
    struct StubFetcher {
        color: [u8; 3],
        fail: fn(i64, i64) -> bool,
        delay: Duration,
    }

    impl StubFetcher {
        fn solid(color: [u8; 3]) -> Self {
            Self { color, fail: |_, _| false, delay: Duration::ZERO }
        }
    }

    impl TileFetcher for StubFetcher {
        fn fetch_tile(
            &self,
            _zoom: u8,
            x: i64,
            y: i64,
        ) -> BoxFuture<'_, Result<DynamicImage, MapError>> {
            let color = self.color;
            let fail = (self.fail)(x, y);
            let delay = self.delay;
            async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                if fail {
                    return Err(MapError::Http("stub failure".into()));
                }
                let img = RgbaImage::from_pixel(256, 256, Rgba([color[0], color[1], color[2], 255]));
                Ok(DynamicImage::ImageRgba8(img))
            }
            .boxed()
        }

        fn fetch_satellite(
            &self,
            _lat: f64,
            _lng: f64,
            _zoom: u8,
            size: u32,
        ) -> BoxFuture<'_, Result<DynamicImage, MapError>> {
            let color = self.color;
            async move {
                let img =
                    RgbaImage::from_pixel(size, size, Rgba([color[0], color[1], color[2], 255]));
                Ok(DynamicImage::ImageRgba8(img))
            }
            .boxed()
        }
    }

    fn roadmap_view() -> MapView {
        MapView { lat: -7.601301, lng: 110.201094, zoom: 15, kind: MapKind::Roadmap }
    }

    #[tokio::test]
    async fn stitch_produces_450_square() {
        let svc = MapService::new(StubFetcher::solid([40, 120, 40]));
        let set = svc.refresh(roadmap_view()).await.unwrap();
        assert_eq!(set.image.width(), MAP_SIZE);
        assert_eq!(set.image.height(), MAP_SIZE);
        // Interior fully covered by tile color.
        assert_eq!(set.image.get_pixel(225, 225).0, [40, 120, 40, 255]);
        assert!(svc.latest().is_some());
    }

    #[tokio::test]
    async fn majority_tile_failure_still_publishes() {
        // 5 of 9 requests fail; the compositor must still terminate and
        // publish, with the failed regions left blank.
        let mut svc = MapService::new(StubFetcher::solid([200, 0, 0]));
        // Center tile (26414, 17077) has an odd coordinate sum, so this
        // fails the center and the four corners: 5 of 9.
        svc.fetcher.fail = |x, y| (x + y).rem_euclid(2) == 1;
        let set = svc.refresh(roadmap_view()).await.unwrap();
        assert_eq!(set.image.width(), MAP_SIZE);
        assert!(svc.latest().is_some());
        let blank = set.image.pixels().filter(|p| p.0[3] == 0).count();
        let filled = set.image.pixels().filter(|p| p.0 == [200, 0, 0, 255]).count();
        assert!(blank > 0, "failed tiles should leave blank regions");
        assert!(filled > 0, "successful tiles should still land");
    }

    #[tokio::test]
    async fn satellite_bypasses_stitching() {
        let svc = MapService::new(StubFetcher::solid([0, 0, 200]));
        let view = MapView { kind: MapKind::Satellite, ..roadmap_view() };
        let set = svc.refresh(view).await.unwrap();
        assert_eq!(set.image.width(), MAP_SIZE);
        assert_eq!(set.image.get_pixel(10, 10).0, [0, 0, 200, 255]);
    }

    #[tokio::test]
    async fn stale_refresh_does_not_overwrite_newer_result() {
        let slow = MapService::new(StubFetcher {
            color: [1, 1, 1],
            fail: |_, _| false,
            delay: Duration::from_millis(80),
        });
        let slow = Arc::new(slow);

        // Issue the slow refresh first, then a second refresh of the same
        // service with a different view while the first is still in flight.
        let first = {
            let svc = Arc::clone(&slow);
            tokio::spawn(async move { svc.refresh(roadmap_view()).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        let newer_view = MapView { lat: 1.0, lng: 2.0, ..roadmap_view() };
        // This one also sleeps 80ms, but its token is newer; wait for both.
        let second = slow.refresh(newer_view).await.unwrap();
        let _ = first.await.unwrap().unwrap();

        let latest = slow.latest().expect("a map should be published");
        assert_eq!(latest.view, second.view, "stale result must not win");
    }
}

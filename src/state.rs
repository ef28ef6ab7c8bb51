use std::sync::Arc;

use crate::map::{HttpTileFetcher, MapService};

#[derive(Clone)]
pub struct AppState {
    pub http: reqwest::Client,
    pub map: Arc<MapService<HttpTileFetcher>>,
}

impl AppState {
    pub fn new() -> Self {
        let http = reqwest::Client::new();
        let map = Arc::new(MapService::new(HttpTileFetcher::new(http.clone())));
        Self { http, map }
    }
}

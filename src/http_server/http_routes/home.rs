use std::sync::Arc;

use axum::{Json, extract::State};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;

use crate::http_server::{
    error::Report,
    http_routes::{Page, render},
    state::AppState,
};
use crate::services::{
    artist::{ArtistService, ArtistSummary},
    venue::{RecentVenue, VenueService},
};

const RECENT_LIMIT: u64 = 10;

#[derive(Debug, Serialize)]
pub struct Home {
    pub recent_venues: Vec<RecentVenue>,
    pub recent_artists: Vec<ArtistSummary>,
}

pub async fn index(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<Page<Home>>), Report> {
    let recent_venues = VenueService::new(app_state.db.clone())
        .recent(RECENT_LIMIT)
        .await?;
    let recent_artists = ArtistService::new(app_state.db.clone())
        .recent(RECENT_LIMIT)
        .await?;

    Ok(render(
        jar,
        Home {
            recent_venues,
            recent_artists,
        },
    ))
}

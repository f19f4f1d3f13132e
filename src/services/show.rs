use std::sync::Arc;

use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set, TransactionTrait};
use serde::Serialize;
use tracing::instrument;

use crate::database::Database;
use crate::entities;
use crate::error::Result;
use crate::forms::ShowForm;
use crate::time_format::{DateFormat, format_datetime};
use crate::validation::Validator;

/// One row of the show listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShowListing {
    pub venue_id: i64,
    pub venue_name: String,
    pub artist_id: i64,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: String,
}

pub struct ShowService {
    db: Arc<Database>,
}

impl ShowService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Every show ordered by start time.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<ShowListing>> {
        let shows = entities::show::Entity::find()
            .find_also_related(entities::venue::Entity)
            .order_by_asc(entities::show::Column::StartTime)
            .order_by_asc(entities::show::Column::Id)
            .all(&self.db.conn)
            .await?;

        let artists = entities::artist::Entity::find()
            .all(&self.db.conn)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect::<std::collections::HashMap<_, _>>();

        Ok(shows
            .into_iter()
            .filter_map(|(show, venue)| {
                let venue = venue?;
                let artist = artists.get(&show.artist_id)?;
                Some(ShowListing {
                    venue_id: venue.id,
                    venue_name: venue.name,
                    artist_id: artist.id,
                    artist_name: artist.name.clone(),
                    artist_image_link: artist.image_link.clone(),
                    start_time: format_datetime(&show.start_time, DateFormat::Medium),
                })
            })
            .collect())
    }

    /// Book an artist at a venue. Both must exist.
    #[instrument(skip(self, form))]
    pub async fn create(&self, form: ShowForm) -> Result<entities::show::Model> {
        let new_show = form.validate()?;

        let txn = self.db.conn.begin().await?;

        let artist = entities::artist::Entity::find_by_id(new_show.artist_id)
            .one(&txn)
            .await?;
        let venue = entities::venue::Entity::find_by_id(new_show.venue_id)
            .one(&txn)
            .await?;

        let mut v = Validator::new();
        if artist.is_none() {
            v.add(
                "artist_id",
                format!("No artist with id {}.", new_show.artist_id),
            );
        }
        if venue.is_none() {
            v.add("venue_id", format!("No venue with id {}.", new_show.venue_id));
        }
        v.finish()?;

        let show = entities::show::ActiveModel {
            artist_id: Set(new_show.artist_id),
            venue_id: Set(new_show.venue_id),
            start_time: Set(new_show.start_time),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        log::info!(
            "Show created: artist {} at venue {} on {} (ID: {})",
            show.artist_id,
            show.venue_id,
            format_datetime(&show.start_time, DateFormat::Full),
            show.id
        );
        Ok(show)
    }
}

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};
use serde::Serialize;
use tracing::instrument;

use crate::database::Database;
use crate::entities;
use crate::error::{Error, Result};
use crate::forms::VenueForm;
use crate::genres;
use crate::services::schedule::{self, upcoming_counts};
use crate::services::search::{Listing, NameFilter, SearchResults};
use crate::time_format::{DateFormat, format_datetime};

/// Venues sharing one (city, state).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationGroup {
    pub city: String,
    pub state: String,
    pub venues: Vec<Listing>,
}

/// A show seen from the venue's page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VenueShow {
    pub artist_id: i64,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VenueDetail {
    pub id: i64,
    pub name: String,
    pub genres: Vec<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub facebook_link: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
    pub image_link: Option<String>,
    pub past_shows: Vec<VenueShow>,
    pub upcoming_shows: Vec<VenueShow>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentVenue {
    pub id: i64,
    pub name: String,
    pub city: String,
    pub state: String,
}

pub struct VenueService {
    db: Arc<Database>,
}

impl VenueService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn list_grouped_by_location(&self) -> Result<Vec<LocationGroup>> {
        self.list_grouped_by_location_at(Utc::now()).await
    }

    /// Every venue grouped by location. Groups are ordered by state then
    /// city, venues inside a group by name.
    #[instrument(skip(self))]
    pub async fn list_grouped_by_location_at(&self, now: DateTime<Utc>) -> Result<Vec<LocationGroup>> {
        let venues = entities::venue::Entity::find()
            .order_by_asc(entities::venue::Column::State)
            .order_by_asc(entities::venue::Column::City)
            .order_by_asc(entities::venue::Column::Name)
            .order_by_asc(entities::venue::Column::Id)
            .all(&self.db.conn)
            .await?;

        let counts =
            upcoming_counts(&self.db.conn, entities::show::Column::VenueId, now).await?;

        let mut groups: Vec<LocationGroup> = Vec::new();
        for venue in venues {
            let listing = Listing {
                id: venue.id,
                name: venue.name,
                num_upcoming_shows: counts.get(&venue.id).copied().unwrap_or(0),
            };

            match groups.last_mut() {
                Some(group) if group.city == venue.city && group.state == venue.state => {
                    group.venues.push(listing)
                }
                _ => groups.push(LocationGroup {
                    city: venue.city,
                    state: venue.state,
                    venues: vec![listing],
                }),
            }
        }

        Ok(groups)
    }

    pub async fn search(&self, term: &str) -> Result<SearchResults<Listing>> {
        self.search_at(term, Utc::now()).await
    }

    /// Case-insensitive substring search on the venue name.
    #[instrument(skip(self))]
    pub async fn search_at(&self, term: &str, now: DateTime<Utc>) -> Result<SearchResults<Listing>> {
        let filter = NameFilter::new(term);
        let venues = entities::venue::Entity::find()
            .order_by_asc(entities::venue::Column::Name)
            .order_by_asc(entities::venue::Column::Id)
            .all(&self.db.conn)
            .await?;

        let counts =
            upcoming_counts(&self.db.conn, entities::show::Column::VenueId, now).await?;

        let listings = venues
            .into_iter()
            .filter(|venue| filter.matches(&venue.name))
            .map(|venue| Listing {
                num_upcoming_shows: counts.get(&venue.id).copied().unwrap_or(0),
                id: venue.id,
                name: venue.name,
            })
            .collect::<Vec<_>>();

        log::debug!("Venue search {:?} matched {} venues", term, listings.len());
        Ok(listings.into())
    }

    pub async fn get_detail(&self, id: i64) -> Result<VenueDetail> {
        self.get_detail_at(id, Utc::now()).await
    }

    #[instrument(skip(self))]
    pub async fn get_detail_at(&self, id: i64, now: DateTime<Utc>) -> Result<VenueDetail> {
        let venue = self.find(id).await?;

        let shows = venue
            .find_related(entities::show::Entity)
            .find_also_related(entities::artist::Entity)
            .order_by_asc(entities::show::Column::StartTime)
            .order_by_asc(entities::show::Column::Id)
            .all(&self.db.conn)
            .await?;

        let entries = shows
            .into_iter()
            .filter_map(|(show, artist)| {
                let artist = artist?;
                Some((
                    show.start_time,
                    VenueShow {
                        artist_id: artist.id,
                        artist_name: artist.name,
                        artist_image_link: artist.image_link,
                        start_time: format_datetime(&show.start_time, DateFormat::Medium),
                    },
                ))
            })
            .collect::<Vec<_>>();

        let schedule = schedule::partition(entries, &now, |(start_time, _)| *start_time);
        let past_shows: Vec<VenueShow> = schedule.past.into_iter().map(|(_, s)| s).collect();
        let upcoming_shows: Vec<VenueShow> =
            schedule.upcoming.into_iter().map(|(_, s)| s).collect();

        Ok(VenueDetail {
            id: venue.id,
            genres: genres::split(&venue.genres),
            name: venue.name,
            address: venue.address,
            city: venue.city,
            state: venue.state,
            phone: venue.phone,
            website: venue.website,
            facebook_link: venue.facebook_link,
            seeking_talent: venue.seeking_talent,
            seeking_description: venue.seeking_description,
            image_link: venue.image_link,
            past_shows_count: past_shows.len(),
            upcoming_shows_count: upcoming_shows.len(),
            past_shows,
            upcoming_shows,
        })
    }

    /// Current values for the edit form.
    pub async fn get_form(&self, id: i64) -> Result<VenueForm> {
        let venue = self.find(id).await?;
        Ok(VenueForm::from(&venue))
    }

    /// Most recently listed venues, newest first.
    pub async fn recent(&self, limit: u64) -> Result<Vec<RecentVenue>> {
        let venues = entities::venue::Entity::find()
            .order_by_desc(entities::venue::Column::CreatedAt)
            .order_by_desc(entities::venue::Column::Id)
            .limit(limit)
            .all(&self.db.conn)
            .await?;

        Ok(venues
            .into_iter()
            .map(|v| RecentVenue {
                id: v.id,
                name: v.name,
                city: v.city,
                state: v.state,
            })
            .collect())
    }

    #[instrument(skip(self, form), fields(name = %form.name))]
    pub async fn create(&self, form: VenueForm) -> Result<entities::venue::Model> {
        form.validate()?;

        let mut venue = entities::venue::ActiveModel::new();
        form.apply(&mut venue);

        let txn = self.db.conn.begin().await?;
        let venue = venue.insert(&txn).await?;
        txn.commit().await?;

        log::info!("Venue created: '{}' (ID: {})", venue.name, venue.id);
        Ok(venue)
    }

    #[instrument(skip(self, form), fields(name = %form.name))]
    pub async fn update(&self, id: i64, form: VenueForm) -> Result<entities::venue::Model> {
        form.validate()?;

        let txn = self.db.conn.begin().await?;
        let existing = entities::venue::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| Error::not_found("venue", id))?;

        let mut venue: entities::venue::ActiveModel = existing.into();
        form.apply(&mut venue);
        let venue = venue.update(&txn).await?;
        txn.commit().await?;

        log::info!("Venue updated: '{}' (ID: {})", venue.name, venue.id);
        Ok(venue)
    }

    /// Remove a venue together with every show booked there.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<entities::venue::Model> {
        let txn = self.db.conn.begin().await?;
        let venue = entities::venue::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| Error::not_found("venue", id))?;

        let shows = entities::show::Entity::delete_many()
            .filter(entities::show::Column::VenueId.eq(id))
            .exec(&txn)
            .await?;
        entities::venue::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        log::info!(
            "Venue deleted: '{}' (ID: {}) with {} shows",
            venue.name,
            venue.id,
            shows.rows_affected
        );
        Ok(venue)
    }

    async fn find(&self, id: i64) -> Result<entities::venue::Model> {
        entities::venue::Entity::find_by_id(id)
            .one(&self.db.conn)
            .await?
            .ok_or_else(|| Error::not_found("venue", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use sea_orm::PaginatorTrait;

    use crate::test_utils::{insert_artist, insert_show, insert_venue, test_db};

    fn musical_hop_form() -> VenueForm {
        VenueForm {
            name: "The Musical Hop".into(),
            city: "San Francisco".into(),
            state: "CA".into(),
            address: "1015 Folsom Street".into(),
            phone: Some("123-123-1234".into()),
            genres: vec!["Jazz".into(), "Reggae".into(), "Swing".into()],
            facebook_link: Some("https://www.facebook.com/TheMusicalHop".into()),
            website: Some("https://www.themusicalhop.com".into()),
            seeking_talent: true,
            seeking_description: Some("We are on the lookout for a local artist".into()),
            ..Default::default()
        }
    }

    async fn venue_count(db: &Database) -> u64 {
        entities::venue::Entity::find().count(&db.conn).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_read_back() {
        let db = test_db().await;
        let service = VenueService::new(db.clone());

        let venue = service.create(musical_hop_form()).await.unwrap();
        assert_eq!(venue.genres, "Jazz,Reggae,Swing");

        let detail = service.get_detail(venue.id).await.unwrap();
        assert_eq!(detail.name, "The Musical Hop");
        assert_eq!(detail.genres, vec!["Jazz", "Reggae", "Swing"]);
        assert!(detail.seeking_talent);
        assert_eq!(detail.past_shows_count, 0);
        assert_eq!(detail.upcoming_shows_count, 0);
    }

    #[tokio::test]
    async fn test_create_with_missing_name_persists_nothing() {
        let db = test_db().await;
        let service = VenueService::new(db.clone());
        insert_venue(&db, "Park Square Live Music & Coffee", "San Francisco", "CA").await;

        let mut form = musical_hop_form();
        form.name = "".into();
        let err = service.create(form).await.unwrap_err();

        match err {
            Error::Validation(errors) => assert!(errors.has_field("name")),
            other => panic!("expected validation failure, got {other:?}"),
        }
        assert_eq!(venue_count(&db).await, 1);
    }

    #[tokio::test]
    async fn test_detail_not_found() {
        let db = test_db().await;
        let service = VenueService::new(db);

        let err = service.get_detail(42).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { entity: "venue", id: 42 }));
    }

    #[tokio::test]
    async fn test_detail_partitions_past_and_upcoming() {
        let db = test_db().await;
        let now = Utc::now();
        let hop = insert_venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        let petals = insert_artist(&db, "Guns N Petals").await;
        insert_show(&db, petals.id, hop.id, now - Duration::days(1)).await;
        insert_show(&db, petals.id, hop.id, now + Duration::days(7)).await;

        let detail = VenueService::new(db)
            .get_detail_at(hop.id, now)
            .await
            .unwrap();

        assert_eq!(detail.past_shows_count, 1);
        assert_eq!(detail.upcoming_shows_count, 1);
        assert_eq!(detail.past_shows[0].artist_id, petals.id);
        assert_eq!(detail.past_shows[0].artist_name, "Guns N Petals");
        assert_eq!(detail.upcoming_shows[0].artist_image_link, petals.image_link);
        assert_eq!(
            detail.upcoming_shows[0].start_time,
            format_datetime(&(now + Duration::days(7)), DateFormat::Medium)
        );
    }

    #[tokio::test]
    async fn test_detail_show_starting_now_is_past() {
        let db = test_db().await;
        let now = Utc::now();
        let hop = insert_venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        let petals = insert_artist(&db, "Guns N Petals").await;
        let show = insert_show(&db, petals.id, hop.id, now).await;

        let detail = VenueService::new(db)
            .get_detail_at(hop.id, show.start_time)
            .await
            .unwrap();

        assert_eq!(detail.past_shows_count, 1);
        assert_eq!(detail.upcoming_shows_count, 0);
    }

    #[tokio::test]
    async fn test_grouped_by_location_counts_per_venue() {
        let db = test_db().await;
        let now = Utc::now();
        let hop = insert_venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        let park = insert_venue(&db, "Park Square Live Music & Coffee", "San Francisco", "CA").await;
        let bar = insert_venue(&db, "The Dueling Pianos Bar", "New York", "NY").await;
        let petals = insert_artist(&db, "Guns N Petals").await;
        insert_show(&db, petals.id, park.id, now + Duration::days(3)).await;
        insert_show(&db, petals.id, park.id, now + Duration::days(4)).await;
        insert_show(&db, petals.id, hop.id, now - Duration::days(4)).await;

        let groups = VenueService::new(db)
            .list_grouped_by_location_at(now)
            .await
            .unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!((groups[0].city.as_str(), groups[0].state.as_str()), ("San Francisco", "CA"));
        assert_eq!((groups[1].city.as_str(), groups[1].state.as_str()), ("New York", "NY"));

        let sf = &groups[0].venues;
        assert_eq!(sf.len(), 2);
        assert_eq!(sf[0].id, park.id);
        assert_eq!(sf[0].num_upcoming_shows, 2);
        assert_eq!(sf[1].id, hop.id);
        assert_eq!(sf[1].num_upcoming_shows, 0);

        assert_eq!(groups[1].venues[0].id, bar.id);
        assert_eq!(groups[1].venues[0].num_upcoming_shows, 0);
    }

    #[tokio::test]
    async fn test_grouped_by_location_empty() {
        let db = test_db().await;
        let groups = VenueService::new(db).list_grouped_by_location().await.unwrap();
        assert!(groups.is_empty());
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_substring() {
        let db = test_db().await;
        let now = Utc::now();
        let hop = insert_venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        let park = insert_venue(&db, "Park Square Live Music & Coffee", "San Francisco", "CA").await;
        insert_venue(&db, "The Dueling Pianos Bar", "New York", "NY").await;
        let petals = insert_artist(&db, "Guns N Petals").await;
        insert_show(&db, petals.id, hop.id, now + Duration::days(1)).await;

        let service = VenueService::new(db);

        let lower = service.search_at("hop", now).await.unwrap();
        let upper = service.search_at("HOP", now).await.unwrap();
        assert_eq!(lower, upper);
        assert_eq!(lower.count, 1);
        assert_eq!(lower.data[0].id, hop.id);
        assert_eq!(lower.data[0].num_upcoming_shows, 1);

        let music = service.search_at("Music", now).await.unwrap();
        let ids: Vec<i64> = music.data.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![park.id, hop.id]);
        assert_eq!(music.data[0].num_upcoming_shows, 0);
    }

    #[tokio::test]
    async fn test_search_empty_term_matches_all() {
        let db = test_db().await;
        insert_venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        insert_venue(&db, "The Dueling Pianos Bar", "New York", "NY").await;

        let results = VenueService::new(db).search("").await.unwrap();
        assert_eq!(results.count, 2);
    }

    #[tokio::test]
    async fn test_search_wildcards_match_literally() {
        let db = test_db().await;
        insert_venue(&db, "100% Live", "Austin", "TX").await;
        insert_venue(&db, "The Musical Hop", "San Francisco", "CA").await;

        let service = VenueService::new(db);
        assert_eq!(service.search("%").await.unwrap().count, 1);
        assert_eq!(service.search("_").await.unwrap().count, 0);
    }

    #[tokio::test]
    async fn test_search_folds_non_ascii_case() {
        let db = test_db().await;
        let cafe = insert_venue(&db, "Café Über", "Berlin", "BE").await;
        insert_venue(&db, "The Musical Hop", "San Francisco", "CA").await;

        let service = VenueService::new(db);
        let lower = service.search("über").await.unwrap();
        let upper = service.search("ÜBER").await.unwrap();
        assert_eq!(lower, upper);
        assert_eq!(lower.count, 1);
        assert_eq!(lower.data[0].id, cafe.id);
        assert_eq!(service.search("CAFÉ").await.unwrap().count, 1);
    }

    #[tokio::test]
    async fn test_update_replaces_fields() {
        let db = test_db().await;
        let service = VenueService::new(db.clone());
        let venue = service.create(musical_hop_form()).await.unwrap();

        let mut form = musical_hop_form();
        form.name = "The Musical Hop & Skip".into();
        form.genres = vec!["Folk".into()];
        form.seeking_talent = false;
        let updated = service.update(venue.id, form).await.unwrap();

        assert_eq!(updated.id, venue.id);
        assert_eq!(updated.name, "The Musical Hop & Skip");
        assert_eq!(updated.genres, "Folk");
        assert!(!updated.seeking_talent);
        assert_eq!(updated.created_at, venue.created_at);
    }

    #[tokio::test]
    async fn test_update_missing_venue() {
        let db = test_db().await;
        let err = VenueService::new(db)
            .update(7, musical_hop_form())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { id: 7, .. }));
    }

    #[tokio::test]
    async fn test_update_invalid_keeps_old_values() {
        let db = test_db().await;
        let service = VenueService::new(db.clone());
        let venue = service.create(musical_hop_form()).await.unwrap();

        let mut form = musical_hop_form();
        form.city = "".into();
        form.name = "Renamed".into();
        assert!(matches!(
            service.update(venue.id, form).await,
            Err(Error::Validation(_))
        ));

        let form = service.get_form(venue.id).await.unwrap();
        assert_eq!(form, musical_hop_form());
    }

    #[tokio::test]
    async fn test_delete_cascades_to_shows() {
        let db = test_db().await;
        let now = Utc::now();
        let hop = insert_venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        let bar = insert_venue(&db, "The Dueling Pianos Bar", "New York", "NY").await;
        let petals = insert_artist(&db, "Guns N Petals").await;
        let gone = insert_show(&db, petals.id, hop.id, now + Duration::days(1)).await;
        let kept = insert_show(&db, petals.id, bar.id, now + Duration::days(1)).await;

        let service = VenueService::new(db.clone());
        service.delete(hop.id).await.unwrap();

        assert!(
            entities::show::Entity::find_by_id(gone.id)
                .one(&db.conn)
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            entities::show::Entity::find_by_id(kept.id)
                .one(&db.conn)
                .await
                .unwrap()
                .is_some()
        );
        assert!(matches!(
            service.get_detail(hop.id).await,
            Err(Error::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_missing_venue() {
        let db = test_db().await;
        let err = VenueService::new(db).delete(3).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { id: 3, .. }));
    }

    #[tokio::test]
    async fn test_recent_newest_first() {
        let db = test_db().await;
        let first = insert_venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        let second = insert_venue(&db, "The Dueling Pianos Bar", "New York", "NY").await;

        let recent = VenueService::new(db).recent(10).await.unwrap();
        let ids: Vec<i64> = recent.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }
}

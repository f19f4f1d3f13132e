use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, EntityTrait, ModelTrait, QueryOrder, QuerySelect,
    TransactionTrait,
};
use serde::Serialize;
use tracing::instrument;

use crate::database::Database;
use crate::entities;
use crate::error::{Error, Result};
use crate::forms::ArtistForm;
use crate::genres;
use crate::services::schedule::{self, upcoming_counts};
use crate::services::search::{Listing, NameFilter, SearchResults};
use crate::time_format::{DateFormat, format_datetime};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistSummary {
    pub id: i64,
    pub name: String,
}

/// A show seen from the artist's page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistShow {
    pub venue_id: i64,
    pub venue_name: String,
    pub venue_image_link: Option<String>,
    pub start_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistDetail {
    pub id: i64,
    pub name: String,
    pub genres: Vec<String>,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub facebook_link: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
    pub image_link: Option<String>,
    pub past_shows: Vec<ArtistShow>,
    pub upcoming_shows: Vec<ArtistShow>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

pub struct ArtistService {
    db: Arc<Database>,
}

impl ArtistService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<ArtistSummary>> {
        let artists = entities::artist::Entity::find()
            .order_by_asc(entities::artist::Column::Id)
            .all(&self.db.conn)
            .await?;

        Ok(artists
            .into_iter()
            .map(|a| ArtistSummary {
                id: a.id,
                name: a.name,
            })
            .collect())
    }

    pub async fn search(&self, term: &str) -> Result<SearchResults<Listing>> {
        self.search_at(term, Utc::now()).await
    }

    /// Case-insensitive substring search on the artist name.
    #[instrument(skip(self))]
    pub async fn search_at(&self, term: &str, now: DateTime<Utc>) -> Result<SearchResults<Listing>> {
        let filter = NameFilter::new(term);
        let artists = entities::artist::Entity::find()
            .order_by_asc(entities::artist::Column::Name)
            .order_by_asc(entities::artist::Column::Id)
            .all(&self.db.conn)
            .await?;

        let counts =
            upcoming_counts(&self.db.conn, entities::show::Column::ArtistId, now).await?;

        let listings = artists
            .into_iter()
            .filter(|artist| filter.matches(&artist.name))
            .map(|artist| Listing {
                num_upcoming_shows: counts.get(&artist.id).copied().unwrap_or(0),
                id: artist.id,
                name: artist.name,
            })
            .collect::<Vec<_>>();

        log::debug!("Artist search {:?} matched {} artists", term, listings.len());
        Ok(listings.into())
    }

    pub async fn get_detail(&self, id: i64) -> Result<ArtistDetail> {
        self.get_detail_at(id, Utc::now()).await
    }

    #[instrument(skip(self))]
    pub async fn get_detail_at(&self, id: i64, now: DateTime<Utc>) -> Result<ArtistDetail> {
        let artist = self.find(id).await?;

        let shows = artist
            .find_related(entities::show::Entity)
            .find_also_related(entities::venue::Entity)
            .order_by_asc(entities::show::Column::StartTime)
            .order_by_asc(entities::show::Column::Id)
            .all(&self.db.conn)
            .await?;

        let entries = shows.into_iter().filter_map(|(show, venue)| {
            let venue = venue?;
            Some((
                show.start_time,
                ArtistShow {
                    venue_id: venue.id,
                    venue_name: venue.name,
                    venue_image_link: venue.image_link,
                    start_time: format_datetime(&show.start_time, DateFormat::Medium),
                },
            ))
        });

        let schedule = schedule::partition(entries, &now, |(start_time, _)| *start_time);
        let past_shows: Vec<ArtistShow> = schedule.past.into_iter().map(|(_, s)| s).collect();
        let upcoming_shows: Vec<ArtistShow> =
            schedule.upcoming.into_iter().map(|(_, s)| s).collect();

        Ok(ArtistDetail {
            id: artist.id,
            genres: genres::split(&artist.genres),
            name: artist.name,
            city: artist.city,
            state: artist.state,
            phone: artist.phone,
            website: artist.website,
            facebook_link: artist.facebook_link,
            seeking_venue: artist.seeking_venue,
            seeking_description: artist.seeking_description,
            image_link: artist.image_link,
            past_shows_count: past_shows.len(),
            upcoming_shows_count: upcoming_shows.len(),
            past_shows,
            upcoming_shows,
        })
    }

    pub async fn get_form(&self, id: i64) -> Result<ArtistForm> {
        let artist = self.find(id).await?;
        Ok(ArtistForm::from(&artist))
    }

    /// Most recently listed artists, newest first.
    pub async fn recent(&self, limit: u64) -> Result<Vec<ArtistSummary>> {
        let artists = entities::artist::Entity::find()
            .order_by_desc(entities::artist::Column::CreatedAt)
            .order_by_desc(entities::artist::Column::Id)
            .limit(limit)
            .all(&self.db.conn)
            .await?;

        Ok(artists
            .into_iter()
            .map(|a| ArtistSummary {
                id: a.id,
                name: a.name,
            })
            .collect())
    }

    #[instrument(skip(self, form), fields(name = %form.name))]
    pub async fn create(&self, form: ArtistForm) -> Result<entities::artist::Model> {
        form.validate()?;

        let mut artist = entities::artist::ActiveModel::new();
        form.apply(&mut artist);

        let txn = self.db.conn.begin().await?;
        let artist = artist.insert(&txn).await?;
        txn.commit().await?;

        log::info!("Artist created: '{}' (ID: {})", artist.name, artist.id);
        Ok(artist)
    }

    #[instrument(skip(self, form), fields(name = %form.name))]
    pub async fn update(&self, id: i64, form: ArtistForm) -> Result<entities::artist::Model> {
        form.validate()?;

        let txn = self.db.conn.begin().await?;
        let existing = entities::artist::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| Error::not_found("artist", id))?;

        let mut artist: entities::artist::ActiveModel = existing.into();
        form.apply(&mut artist);
        let artist = artist.update(&txn).await?;
        txn.commit().await?;

        log::info!("Artist updated: '{}' (ID: {})", artist.name, artist.id);
        Ok(artist)
    }

    async fn find(&self, id: i64) -> Result<entities::artist::Model> {
        entities::artist::Entity::find_by_id(id)
            .one(&self.db.conn)
            .await?
            .ok_or_else(|| Error::not_found("artist", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use sea_orm::PaginatorTrait;

    use crate::services::venue::VenueService;
    use crate::test_utils::{insert_artist, insert_show, insert_venue, test_db};

    fn petals_form() -> ArtistForm {
        ArtistForm {
            name: "Guns N Petals".into(),
            city: "San Francisco".into(),
            state: "CA".into(),
            phone: Some("326-123-5000".into()),
            genres: vec!["Rock n Roll".into()],
            website: Some("https://www.gunsnpetalsband.com".into()),
            seeking_venue: true,
            seeking_description: Some("Looking for shows to perform at in the San Francisco Bay Area!".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let db = test_db().await;
        let service = ArtistService::new(db);

        let created = service.create(petals_form()).await.unwrap();
        assert!(created.seeking_venue);

        let artists = service.list().await.unwrap();
        assert_eq!(
            artists,
            vec![ArtistSummary {
                id: created.id,
                name: "Guns N Petals".into()
            }]
        );
    }

    #[tokio::test]
    async fn test_create_without_name_is_rejected() {
        let db = test_db().await;
        let service = ArtistService::new(db.clone());

        let mut form = petals_form();
        form.name = " ".into();
        assert!(matches!(
            service.create(form).await,
            Err(Error::Validation(_))
        ));
        let count = entities::artist::Entity::find().count(&db.conn).await.unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_search() {
        let db = test_db().await;
        let now = Utc::now();
        let petals = insert_artist(&db, "Guns N Petals").await;
        let matt = insert_artist(&db, "Matt Quevedo").await;
        let sax = insert_artist(&db, "The Wild Sax Band").await;
        let hop = insert_venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        insert_show(&db, sax.id, hop.id, now + Duration::days(2)).await;

        let service = ArtistService::new(db);

        let a = service.search_at("A", now).await.unwrap();
        let ids: Vec<i64> = a.data.iter().map(|l| l.id).collect();
        assert_eq!(a.count, 3);
        assert_eq!(ids, vec![petals.id, matt.id, sax.id]);

        let band = service.search_at("band", now).await.unwrap();
        assert_eq!(band.count, 1);
        assert_eq!(band.data[0].name, "The Wild Sax Band");
        assert_eq!(band.data[0].num_upcoming_shows, 1);
    }

    #[tokio::test]
    async fn test_search_folds_non_ascii_case() {
        let db = test_db().await;
        let sigur = insert_artist(&db, "Sigur Rós").await;
        insert_artist(&db, "Matt Quevedo").await;

        let service = ArtistService::new(db);
        let lower = service.search("rós").await.unwrap();
        let upper = service.search("RÓS").await.unwrap();
        assert_eq!(lower, upper);
        assert_eq!(lower.count, 1);
        assert_eq!(lower.data[0].id, sigur.id);
    }

    #[tokio::test]
    async fn test_detail_not_found() {
        let db = test_db().await;
        let err = ArtistService::new(db).get_detail(9).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { entity: "artist", id: 9 }));
    }

    #[tokio::test]
    async fn test_detail_mirrors_venue_detail() {
        let db = test_db().await;
        let now = Utc::now();
        let hop = insert_venue(&db, "The Musical Hop", "San Francisco", "CA").await;
        let petals = insert_artist(&db, "Guns N Petals").await;
        insert_show(&db, petals.id, hop.id, now - Duration::days(1)).await;
        insert_show(&db, petals.id, hop.id, now + Duration::days(7)).await;

        let artist = ArtistService::new(db.clone())
            .get_detail_at(petals.id, now)
            .await
            .unwrap();
        let venue = VenueService::new(db)
            .get_detail_at(hop.id, now)
            .await
            .unwrap();

        assert_eq!(artist.past_shows_count, 1);
        assert_eq!(artist.upcoming_shows_count, 1);
        assert_eq!(venue.past_shows_count, 1);
        assert_eq!(venue.upcoming_shows_count, 1);

        assert_eq!(artist.past_shows[0].venue_id, hop.id);
        assert_eq!(artist.past_shows[0].venue_name, "The Musical Hop");
        assert_eq!(artist.upcoming_shows[0].venue_image_link, hop.image_link);
        assert_eq!(
            artist.upcoming_shows[0].start_time,
            venue.upcoming_shows[0].start_time
        );
        assert_eq!(artist.genres, vec!["Rock n Roll"]);
    }

    #[tokio::test]
    async fn test_get_form_splits_genres() {
        let db = test_db().await;
        let service = ArtistService::new(db);
        let mut form = petals_form();
        form.genres = vec!["Jazz".into(), "Classical".into()];
        let artist = service.create(form.clone()).await.unwrap();

        assert_eq!(service.get_form(artist.id).await.unwrap(), form);
    }

    #[tokio::test]
    async fn test_update_last_commit_wins() {
        let db = test_db().await;
        let service = Arc::new(ArtistService::new(db.clone()));
        let artist = service.create(petals_form()).await.unwrap();

        let mut first = petals_form();
        first.name = "Guns N Roses".into();
        first.city = "Los Angeles".into();
        let mut second = petals_form();
        second.name = "Petals Only".into();
        second.genres = vec!["Folk".into()];

        let (a, b) = tokio::join!(
            service.update(artist.id, first.clone()),
            service.update(artist.id, second.clone())
        );
        a.unwrap();
        b.unwrap();

        // Whichever committed last is stored whole, never a mix of both.
        let stored = service.get_form(artist.id).await.unwrap();
        assert!(stored == first || stored == second, "merged state: {stored:?}");

        service.update(artist.id, second.clone()).await.unwrap();
        assert_eq!(service.get_form(artist.id).await.unwrap(), second);
    }

    #[tokio::test]
    async fn test_update_missing_artist() {
        let db = test_db().await;
        let err = ArtistService::new(db)
            .update(11, petals_form())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { entity: "artist", id: 11 }));
    }
}

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelBehavior, ActiveModelTrait, Set};

use crate::database::Database;
use crate::entities;

pub async fn test_db() -> Arc<Database> {
    Arc::new(Database::in_memory().await.unwrap())
}

pub async fn insert_venue(db: &Database, name: &str, city: &str, state: &str) -> entities::venue::Model {
    let venue = entities::venue::ActiveModel {
        name: Set(name.into()),
        city: Set(city.into()),
        state: Set(state.into()),
        address: Set("1015 Folsom Street".into()),
        genres: Set("Jazz,Reggae".into()),
        image_link: Set(Some(format!("https://images.example.com/{}.jpg", name.len()))),
        ..entities::venue::ActiveModel::new()
    };
    venue.insert(&db.conn).await.unwrap()
}

pub async fn insert_artist(db: &Database, name: &str) -> entities::artist::Model {
    let artist = entities::artist::ActiveModel {
        name: Set(name.into()),
        city: Set("San Francisco".into()),
        state: Set("CA".into()),
        genres: Set("Rock n Roll".into()),
        image_link: Set(Some(format!("https://images.example.com/{}.png", name.len()))),
        ..entities::artist::ActiveModel::new()
    };
    artist.insert(&db.conn).await.unwrap()
}

pub async fn insert_show(
    db: &Database,
    artist_id: i64,
    venue_id: i64,
    start_time: DateTime<Utc>,
) -> entities::show::Model {
    let show = entities::show::ActiveModel {
        artist_id: Set(artist_id),
        venue_id: Set(venue_id),
        start_time: Set(start_time),
        ..Default::default()
    };
    show.insert(&db.conn).await.unwrap()
}

use std::sync::Arc;

use axum::{Json, extract::State, response::Redirect};
use axum_extra::extract::{Form, FormRejection, cookie::CookieJar};

use crate::forms::{ArtistForm, SearchForm};
use crate::http_server::{
    error::{Report, log_mutation_failure, log_rejected_form},
    flash::{self, Notice},
    http_routes::{EditPage, Page, RecordId, SearchPage, render},
    state::AppState,
};
use crate::services::{
    artist::{ArtistDetail, ArtistService, ArtistSummary},
    search::{Listing, SearchResults},
};

pub async fn list_artists(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<Page<Vec<ArtistSummary>>>), Report> {
    let artists = ArtistService::new(app_state.db.clone()).list().await?;
    Ok(render(jar, artists))
}

pub async fn search_artists(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<SearchForm>,
) -> Result<(CookieJar, Json<Page<SearchPage<SearchResults<Listing>>>>), Report> {
    let results = ArtistService::new(app_state.db.clone())
        .search(&form.search_term)
        .await?;
    Ok(render(
        jar,
        SearchPage {
            search_term: form.search_term,
            results,
        },
    ))
}

pub async fn show_artist(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
    RecordId(artist_id): RecordId,
) -> Result<(CookieJar, Json<Page<ArtistDetail>>), Report> {
    let artist = ArtistService::new(app_state.db.clone())
        .get_detail(artist_id)
        .await?;
    Ok(render(jar, artist))
}

pub async fn create_artist_form(jar: CookieJar) -> (CookieJar, Json<Page<ArtistForm>>) {
    render(jar, ArtistForm::default())
}

pub async fn create_artist_submission(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
    form: Result<Form<ArtistForm>, FormRejection>,
) -> (CookieJar, Redirect) {
    let notice = match form {
        Ok(Form(form)) => {
            let name = form.name.clone();
            match ArtistService::new(app_state.db.clone()).create(form).await {
                Ok(artist) => {
                    Notice::success(format!("Artist {} was successfully listed!", artist.name))
                }
                Err(err) => {
                    log_mutation_failure("Create artist", &err);
                    Notice::failure(format!(
                        "An error occurred. Artist {} could not be listed.",
                        name
                    ))
                }
            }
        }
        Err(rejection) => {
            log_rejected_form("Create artist", &rejection);
            Notice::failure("An error occurred. Artist could not be listed.")
        }
    };

    (flash::set(jar, &notice), Redirect::to("/"))
}

pub async fn edit_artist(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
    RecordId(artist_id): RecordId,
) -> Result<(CookieJar, Json<Page<EditPage<ArtistForm>>>), Report> {
    let form = ArtistService::new(app_state.db.clone())
        .get_form(artist_id)
        .await?;
    Ok(render(jar, EditPage { id: artist_id, form }))
}

pub async fn edit_artist_submission(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
    RecordId(artist_id): RecordId,
    form: Result<Form<ArtistForm>, FormRejection>,
) -> (CookieJar, Redirect) {
    let result = match form {
        Ok(Form(form)) => ArtistService::new(app_state.db.clone())
            .update(artist_id, form)
            .await
            .map_err(|err| log_mutation_failure("Edit artist", &err)),
        Err(rejection) => {
            log_rejected_form("Edit artist", &rejection);
            Err(())
        }
    };
    let notice = match result {
        Ok(artist) => Notice::success(format!("Artist {} was successfully edited!", artist.name)),
        Err(()) => Notice::failure("An error occurred. Artist could not be edited."),
    };

    (
        flash::set(jar, &notice),
        Redirect::to(&format!("/artists/{artist_id}")),
    )
}

use std::sync::Arc;

use axum::{Json, extract::State, response::Redirect};
use axum_extra::extract::{Form, FormRejection, cookie::CookieJar};

use crate::forms::{SearchForm, VenueForm};
use crate::http_server::{
    error::{Report, log_mutation_failure, log_rejected_form},
    flash::{self, Notice},
    http_routes::{EditPage, Page, RecordId, SearchPage, render},
    state::AppState,
};
use crate::services::{
    search::{Listing, SearchResults},
    venue::{LocationGroup, VenueDetail, VenueService},
};

pub async fn list_venues(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<Page<Vec<LocationGroup>>>), Report> {
    let areas = VenueService::new(app_state.db.clone())
        .list_grouped_by_location()
        .await?;
    Ok(render(jar, areas))
}

pub async fn search_venues(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<SearchForm>,
) -> Result<(CookieJar, Json<Page<SearchPage<SearchResults<Listing>>>>), Report> {
    let results = VenueService::new(app_state.db.clone())
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

pub async fn show_venue(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
    RecordId(venue_id): RecordId,
) -> Result<(CookieJar, Json<Page<VenueDetail>>), Report> {
    let venue = VenueService::new(app_state.db.clone())
        .get_detail(venue_id)
        .await?;
    Ok(render(jar, venue))
}

pub async fn create_venue_form(jar: CookieJar) -> (CookieJar, Json<Page<VenueForm>>) {
    render(jar, VenueForm::default())
}

pub async fn create_venue_submission(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
    form: Result<Form<VenueForm>, FormRejection>,
) -> (CookieJar, Redirect) {
    let notice = match form {
        Ok(Form(form)) => {
            let name = form.name.clone();
            match VenueService::new(app_state.db.clone()).create(form).await {
                Ok(venue) => {
                    Notice::success(format!("Venue {} was successfully listed!", venue.name))
                }
                Err(err) => {
                    log_mutation_failure("Create venue", &err);
                    Notice::failure(format!(
                        "An error occurred. Venue {} could not be listed.",
                        name
                    ))
                }
            }
        }
        Err(rejection) => {
            log_rejected_form("Create venue", &rejection);
            Notice::failure("An error occurred. Venue could not be listed.")
        }
    };

    (flash::set(jar, &notice), Redirect::to("/"))
}

pub async fn edit_venue(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
    RecordId(venue_id): RecordId,
) -> Result<(CookieJar, Json<Page<EditPage<VenueForm>>>), Report> {
    let form = VenueService::new(app_state.db.clone())
        .get_form(venue_id)
        .await?;
    Ok(render(jar, EditPage { id: venue_id, form }))
}

pub async fn edit_venue_submission(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
    RecordId(venue_id): RecordId,
    form: Result<Form<VenueForm>, FormRejection>,
) -> (CookieJar, Redirect) {
    let result = match form {
        Ok(Form(form)) => VenueService::new(app_state.db.clone())
            .update(venue_id, form)
            .await
            .map_err(|err| log_mutation_failure("Edit venue", &err)),
        Err(rejection) => {
            log_rejected_form("Edit venue", &rejection);
            Err(())
        }
    };
    let notice = match result {
        Ok(venue) => Notice::success(format!("Venue {} was successfully edited!", venue.name)),
        Err(()) => Notice::failure("An error occurred. Venue could not be edited."),
    };

    (
        flash::set(jar, &notice),
        Redirect::to(&format!("/venues/{venue_id}")),
    )
}

pub async fn delete_venue(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
    RecordId(venue_id): RecordId,
) -> (CookieJar, Redirect) {
    let notice = match VenueService::new(app_state.db.clone())
        .delete(venue_id)
        .await
    {
        Ok(_) => Notice::success("Venue was deleted successfully!"),
        Err(err) => {
            log_mutation_failure("Delete venue", &err);
            Notice::failure("Venue was not deleted.")
        }
    };

    (flash::set(jar, &notice), Redirect::to("/"))
}

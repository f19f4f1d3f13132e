use std::sync::Arc;

use axum::{Json, extract::State, response::Redirect};
use axum_extra::extract::{Form, FormRejection, cookie::CookieJar};

use crate::forms::ShowForm;
use crate::http_server::{
    error::{Report, log_mutation_failure, log_rejected_form},
    flash::{self, Notice},
    http_routes::{Page, render},
    state::AppState,
};
use crate::services::show::{ShowListing, ShowService};

pub async fn list_shows(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<Page<Vec<ShowListing>>>), Report> {
    let shows = ShowService::new(app_state.db.clone()).list().await?;
    Ok(render(jar, shows))
}

pub async fn create_show_form(jar: CookieJar) -> (CookieJar, Json<Page<ShowForm>>) {
    render(jar, ShowForm::default())
}

pub async fn create_show_submission(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
    form: Result<Form<ShowForm>, FormRejection>,
) -> (CookieJar, Redirect) {
    let result = match form {
        Ok(Form(form)) => ShowService::new(app_state.db.clone())
            .create(form)
            .await
            .map_err(|err| log_mutation_failure("Create show", &err)),
        Err(rejection) => {
            log_rejected_form("Create show", &rejection);
            Err(())
        }
    };
    let notice = match result {
        Ok(_) => Notice::success("Show was successfully listed!"),
        Err(()) => Notice::failure("An error occurred. Show could not be listed."),
    };

    (flash::set(jar, &notice), Redirect::to("/"))
}

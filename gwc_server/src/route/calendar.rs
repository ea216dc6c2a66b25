use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        StatusCode,
    },
    response::{IntoResponse, Response},
};
use gwc_core::{
    calendar::{self, CalendarError, GenerationRequest, MEDIA_TYPE},
    catalog::Catalog,
};
use serde::Deserialize;

use crate::route::{split_list, waste_type_ids};

#[derive(Debug, Clone, Deserialize)]
pub struct QueryParams {
    route: u32,
    /// comma separated waste type ids
    #[serde(default)]
    waste_types: Option<String>,
    /// comma separated alert preset ids
    #[serde(default)]
    alerts: Option<String>,
}

impl QueryParams {
    fn generation_request(
        &self,
        catalog: &Catalog,
    ) -> Result<GenerationRequest, (StatusCode, String)> {
        let alerts = catalog
            .alert_presets(split_list(self.alerts.as_deref().unwrap_or_default()))
            .map_err(|err| (StatusCode::BAD_REQUEST, err.to_string()))?;
        Ok(GenerationRequest::new(
            self.route,
            waste_type_ids(catalog, self.waste_types.as_deref())?,
            alerts,
        ))
    }
}

/// Header value offering the calendar as a download.
///
/// Clients that do not understand `filename*` get an ASCII-only fallback.
pub fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|character| match character {
            ' '..='~' if character != '"' && character != '\\' => character,
            _ => '_',
        })
        .collect();
    format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
        urlencoding::encode(file_name)
    )
}

/// Handle calendar requests.
///
/// The `route` must be given in the query string, `waste_types` and `alerts` are optional.
pub async fn handler(
    State(catalog): State<Arc<Catalog>>,
    Query(query_params): Query<QueryParams>,
) -> Result<Response, (StatusCode, String)> {
    let request = query_params.generation_request(&catalog)?;
    let document = calendar::generate(&catalog, &request).map_err(|err| match err {
        CalendarError::UnknownRoute(_) => (StatusCode::NOT_FOUND, err.to_string()),
    })?;
    let response = (
        [
            (CONTENT_TYPE, String::from(MEDIA_TYPE)),
            (CONTENT_DISPOSITION, content_disposition(&document.file_name)),
        ],
        document.content,
    )
        .into_response();
    Ok(response)
}

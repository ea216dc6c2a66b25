use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use gwc_core::{
    catalog::Catalog,
    summary::{summarize, CalendarSummary},
};
use serde::Deserialize;

use crate::route::waste_type_ids;

#[derive(Debug, Clone, Deserialize)]
pub struct QueryParams {
    route: u32,
    /// comma separated waste type ids
    #[serde(default)]
    waste_types: Option<String>,
}

/// Handle summary requests.
pub async fn handler(
    State(catalog): State<Arc<Catalog>>,
    Query(query_params): Query<QueryParams>,
) -> Result<Json<CalendarSummary>, (StatusCode, String)> {
    let waste_type_ids = waste_type_ids(&catalog, query_params.waste_types.as_deref())?;
    summarize(&catalog, query_params.route, &waste_type_ids)
        .map(Json)
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                format!("Route {} not found", query_params.route),
            )
        })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        extract::{Query, State},
        http::StatusCode,
    };
    use gwc_core::catalog::Catalog;

    use super::*;

    #[tokio::test]
    async fn test_handler() {
        let catalog = Arc::new(Catalog::bundled().unwrap());
        let query_params = QueryParams {
            route: 3,
            waste_types: None,
        };
        let Json(summary) = handler(State(catalog), Query(query_params)).await.unwrap();
        assert_eq!(summary.total, 57);
        assert_eq!(summary.types.len(), 4);
    }

    #[tokio::test]
    async fn test_handler_unknown_route() {
        let catalog = Arc::new(Catalog::bundled().unwrap());
        let query_params = QueryParams {
            route: 99,
            waste_types: Some(String::from("matavfall")),
        };
        let (status, _) = handler(State(catalog), Query(query_params))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

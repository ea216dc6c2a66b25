pub mod calendar;
pub mod summary;

use std::collections::BTreeSet;

use axum::http::StatusCode;
use gwc_core::catalog::Catalog;

/// Split a comma separated query parameter.
fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|item| !item.is_empty())
}

/// The selected waste type ids, all catalog waste types if the parameter is missing.
pub fn waste_type_ids(
    catalog: &Catalog,
    waste_types: Option<&str>,
) -> Result<BTreeSet<String>, (StatusCode, String)> {
    let waste_type_ids: BTreeSet<String> = match waste_types {
        Some(waste_types) => split_list(waste_types).map(String::from).collect(),
        None => catalog.waste_type_ids().into_iter().collect(),
    };
    if waste_type_ids.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            String::from("no waste types selected"),
        ));
    }
    Ok(waste_type_ids)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use gwc_core::catalog::Catalog;

    use super::*;

    #[test]
    fn test_waste_type_ids() {
        let catalog = Catalog::bundled().unwrap();
        assert_eq!(waste_type_ids(&catalog, None).unwrap().len(), 4);
        let selected = waste_type_ids(&catalog, Some("matavfall, glass,,")).unwrap();
        assert_eq!(
            selected.into_iter().collect::<Vec<String>>(),
            vec!["glass", "matavfall"]
        );
        let (status, _) = waste_type_ids(&catalog, Some(" , ")).unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

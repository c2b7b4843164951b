//! Client-side filtering for the route-manager panel.
//!
//! The master route list is small, so filtering happens over the
//! already-fetched array on every keystroke. No debounce, no re-fetch.

use crate::api::types::MasterRoute;

/// Active-status facet of the route filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl StatusFilter {
    pub fn next(self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::Active,
            StatusFilter::Active => StatusFilter::Inactive,
            StatusFilter::Inactive => StatusFilter::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Active => "active",
            StatusFilter::Inactive => "inactive",
        }
    }
}

/// Search + status + platform facets applied to the route list.
#[derive(Debug, Clone, Default)]
pub struct RouteFilter {
    /// Case-insensitive substring matched against name, origin and
    /// destination.
    pub search: String,
    pub status: StatusFilter,
    /// Only routes with a URL configured for this platform.
    pub platform: Option<String>,
}

impl RouteFilter {
    pub fn matches(&self, route: &MasterRoute) -> bool {
        if !self.search.is_empty() {
            let needle = self.search.to_lowercase();
            let hit = route.name.to_lowercase().contains(&needle)
                || route.origin.to_lowercase().contains(&needle)
                || route.destination.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }

        match self.status {
            StatusFilter::All => {}
            StatusFilter::Active if !route.active => return false,
            StatusFilter::Inactive if route.active => return false,
            _ => {}
        }

        if let Some(platform) = &self.platform {
            if !route.platforms.get(platform).copied().unwrap_or(false) {
                return false;
            }
        }

        true
    }
}

/// Filter the fetched route list; result order follows the input.
pub fn filter_routes<'a>(routes: &'a [MasterRoute], filter: &RouteFilter) -> Vec<&'a MasterRoute> {
    routes.iter().filter(|r| filter.matches(r)).collect()
}

/// Placeholders each platform's URL template must carry so the server
/// can substitute the crawl date. Checked client-side before POSTing a
/// template; the server validates again.
pub fn validate_url_template(platform: &str, url: &str) -> Result<(), String> {
    if url.trim().is_empty() {
        return Err("URL is required".to_string());
    }
    let required: &[&str] = match platform {
        "redbus" => &["[[DAY]]", "[[MONTH]]", "[[YEAR]]"],
        "traveloka" => &["[[DATE]]"],
        _ => &[],
    };
    for placeholder in required {
        if !url.contains(placeholder) {
            return Err(format!("Missing {placeholder} placeholder for {platform}"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn route(name: &str, origin: &str, destination: &str, active: bool) -> MasterRoute {
        MasterRoute {
            id: name.to_lowercase().replace('-', "_"),
            name: name.to_string(),
            origin: origin.to_string(),
            destination: destination.to_string(),
            category: "intercity".to_string(),
            active,
            platforms: HashMap::from([("redbus".to_string(), true)]),
        }
    }

    fn sample() -> Vec<MasterRoute> {
        vec![
            route("Jakarta-Semarang", "Jakarta", "Semarang", true),
            route("Jakarta-Surabaya", "Jakarta", "Surabaya", true),
            route("Bandung-Malang", "Bandung", "Malang", false),
        ]
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let routes = sample();
        let filter = RouteFilter {
            search: "SEMA".to_string(),
            ..Default::default()
        };
        let hits = filter_routes(&routes, &filter);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Jakarta-Semarang");
    }

    #[test]
    fn search_matches_origin_and_destination() {
        let routes = sample();
        let by_origin = RouteFilter {
            search: "jakarta".to_string(),
            ..Default::default()
        };
        assert_eq!(filter_routes(&routes, &by_origin).len(), 2);

        let by_destination = RouteFilter {
            search: "malang".to_string(),
            ..Default::default()
        };
        assert_eq!(filter_routes(&routes, &by_destination).len(), 1);
    }

    #[test]
    fn status_facet_narrows() {
        let routes = sample();
        let active = RouteFilter {
            status: StatusFilter::Active,
            ..Default::default()
        };
        assert_eq!(filter_routes(&routes, &active).len(), 2);

        let inactive = RouteFilter {
            status: StatusFilter::Inactive,
            ..Default::default()
        };
        let hits = filter_routes(&routes, &inactive);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Bandung-Malang");
    }

    #[test]
    fn platform_facet_requires_configured_url() {
        let mut routes = sample();
        routes[1].platforms.clear();
        let filter = RouteFilter {
            platform: Some("redbus".to_string()),
            ..Default::default()
        };
        let hits = filter_routes(&routes, &filter);
        assert!(hits.iter().all(|r| r.name != "Jakarta-Surabaya"));
    }

    #[test]
    fn status_filter_cycles() {
        assert_eq!(StatusFilter::All.next(), StatusFilter::Active);
        assert_eq!(StatusFilter::Active.next(), StatusFilter::Inactive);
        assert_eq!(StatusFilter::Inactive.next(), StatusFilter::All);
    }

    #[test]
    fn url_template_placeholders_enforced() {
        assert!(validate_url_template(
            "redbus",
            "https://www.redbus.id/x?onward=[[DAY]]-[[MONTH]]-[[YEAR]]"
        )
        .is_ok());
        assert!(validate_url_template("redbus", "https://www.redbus.id/x?onward=[[DAY]]").is_err());
        assert!(validate_url_template("traveloka", "https://t.example/search?dt=[[DATE]]").is_ok());
        assert!(validate_url_template("traveloka", "https://t.example/search").is_err());
        assert!(validate_url_template("unknown", "https://example.com").is_ok());
        assert!(validate_url_template("redbus", "   ").is_err());
    }
}

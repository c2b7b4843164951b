//! Bus-class taxonomy, analytics grouping and prediction filtering.

use chrono::NaiveDate;

use crate::api::types::{AnalyticsSummary, PredictionRow};

/// Coarse bus-class buckets used by the analytics table.
///
/// The real taxonomy belongs on the server. When the server starts
/// labelling classes, the label wins (see [`BusClass::from_parts`]);
/// until then type names are bucketed by substring, matching the
/// backend's own grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BusClass {
    Vip,
    Executive,
    Economy,
    Other,
}

impl BusClass {
    pub const ALL: [BusClass; 4] = [
        BusClass::Vip,
        BusClass::Executive,
        BusClass::Economy,
        BusClass::Other,
    ];

    /// Substring fallback over the raw type name.
    pub fn classify(type_name: &str) -> Self {
        let name = type_name.to_lowercase();
        if name.contains("vip") {
            BusClass::Vip
        } else if name.contains("executive") || name.contains("eks") {
            BusClass::Executive
        } else if name.contains("economy") || name.contains("eco") {
            BusClass::Economy
        } else {
            BusClass::Other
        }
    }

    /// Prefer a server-provided category label; fall back to
    /// classifying the type name.
    pub fn from_parts(category: Option<&str>, type_name: &str) -> Self {
        match category {
            Some(label) => match label.to_lowercase().as_str() {
                "vip" => BusClass::Vip,
                "executive" => BusClass::Executive,
                "economy" => BusClass::Economy,
                "other" => BusClass::Other,
                _ => Self::classify(type_name),
            },
            None => Self::classify(type_name),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BusClass::Vip => "VIP",
            BusClass::Executive => "Executive",
            BusClass::Economy => "Economy",
            BusClass::Other => "Other",
        }
    }
}

/// One analytics table row: departure counts per class for a company.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyBreakdown {
    pub company: String,
    pub vip: u64,
    pub executive: u64,
    pub economy: u64,
    pub other: u64,
}

impl CompanyBreakdown {
    pub fn total(&self) -> u64 {
        self.vip + self.executive + self.economy + self.other
    }

    pub fn count(&self, class: BusClass) -> u64 {
        match class {
            BusClass::Vip => self.vip,
            BusClass::Executive => self.executive,
            BusClass::Economy => self.economy,
            BusClass::Other => self.other,
        }
    }
}

/// Group the report's company × type counts into company × class rows,
/// sorted by company name.
pub fn class_breakdown(summary: &AnalyticsSummary) -> Vec<CompanyBreakdown> {
    let mut rows: Vec<CompanyBreakdown> = summary
        .bus_types_by_company
        .iter()
        .map(|(company, types)| {
            let mut row = CompanyBreakdown {
                company: company.clone(),
                ..Default::default()
            };
            for (type_name, count) in types {
                match BusClass::classify(type_name) {
                    BusClass::Vip => row.vip += count,
                    BusClass::Executive => row.executive += count,
                    BusClass::Economy => row.economy += count,
                    BusClass::Other => row.other += count,
                }
            }
            row
        })
        .collect();
    rows.sort_by(|a, b| a.company.cmp(&b.company));
    rows
}

/// Client-side filter over already-fetched prediction rows.
#[derive(Debug, Clone, Default)]
pub struct PredictionFilter {
    /// Case-insensitive substring on the route name.
    pub route: String,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl PredictionFilter {
    pub fn matches(&self, row: &PredictionRow) -> bool {
        if !self.route.is_empty()
            && !row
                .route_name
                .to_lowercase()
                .contains(&self.route.to_lowercase())
        {
            return false;
        }

        if self.from.is_none() && self.to.is_none() {
            return true;
        }

        // Dates may arrive as bare `YYYY-MM-DD` or full ISO timestamps.
        let Some(date) = parse_row_date(&row.prediction_date) else {
            // Unparseable dates only survive an unconstrained filter
            return false;
        };
        if let Some(from) = self.from {
            if date < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if date > to {
                return false;
            }
        }
        true
    }
}

fn parse_row_date(raw: &str) -> Option<NaiveDate> {
    let head = raw.get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

pub fn filter_predictions<'a>(
    rows: &'a [PredictionRow],
    filter: &PredictionFilter,
) -> Vec<&'a PredictionRow> {
    rows.iter().filter(|r| filter.matches(r)).collect()
}

/// Server-side bound on `days_back`, checked before the request.
pub fn valid_days_back(days_back: u32) -> bool {
    (7..=365).contains(&days_back)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn substring_classification() {
        assert_eq!(BusClass::classify("VIP Sleeper"), BusClass::Vip);
        assert_eq!(BusClass::classify("Eksekutif AC"), BusClass::Executive);
        assert_eq!(BusClass::classify("Executive Class"), BusClass::Executive);
        assert_eq!(BusClass::classify("Ekonomi / eco"), BusClass::Economy);
        assert_eq!(BusClass::classify("Double Decker"), BusClass::Other);
    }

    #[test]
    fn server_category_wins_over_type_name() {
        assert_eq!(
            BusClass::from_parts(Some("economy"), "VIP Sleeper"),
            BusClass::Economy
        );
        // Unknown label falls back to the type name
        assert_eq!(
            BusClass::from_parts(Some("premium"), "VIP Sleeper"),
            BusClass::Vip
        );
        assert_eq!(
            BusClass::from_parts(None, "Executive"),
            BusClass::Executive
        );
    }

    #[test]
    fn breakdown_groups_types_per_company() {
        let summary = AnalyticsSummary {
            bus_types_by_company: HashMap::from([
                (
                    "Sinar Jaya".to_string(),
                    HashMap::from([
                        ("VIP".to_string(), 3),
                        ("Eksekutif".to_string(), 5),
                        ("Sleeper".to_string(), 1),
                    ]),
                ),
                (
                    "Rosalia Indah".to_string(),
                    HashMap::from([("Economy AC".to_string(), 7)]),
                ),
            ]),
            ..Default::default()
        };

        let rows = class_breakdown(&summary);
        assert_eq!(rows.len(), 2);
        // Sorted by company
        assert_eq!(rows[0].company, "Rosalia Indah");
        assert_eq!(rows[0].economy, 7);
        assert_eq!(rows[1].company, "Sinar Jaya");
        assert_eq!(rows[1].vip, 3);
        assert_eq!(rows[1].executive, 5);
        assert_eq!(rows[1].other, 1);
        assert_eq!(rows[1].total(), 9);
    }

    fn row(route: &str, date: &str) -> PredictionRow {
        PredictionRow {
            route_name: route.to_string(),
            prediction_date: date.to_string(),
            predicted_total: 10.0,
            predicted_vip: 2.0,
            predicted_executive: 5.0,
            predicted_other: 3.0,
            predicted_price: None,
            predicted_departing_time: None,
            predicted_reaching_time: None,
        }
    }

    #[test]
    fn prediction_filter_by_route_and_range() {
        let rows = vec![
            row("Jakarta-Semarang", "2025-12-01"),
            row("Jakarta-Semarang", "2025-12-15T00:00:00"),
            row("Jakarta-Malang", "2025-12-02"),
        ];

        let filter = PredictionFilter {
            route: "semarang".to_string(),
            from: Some(NaiveDate::from_ymd_opt(2025, 12, 10).unwrap()),
            to: None,
        };
        let hits = filter_predictions(&rows, &filter);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].prediction_date, "2025-12-15T00:00:00");
    }

    #[test]
    fn unbounded_filter_passes_everything() {
        let rows = vec![row("A", "2025-12-01"), row("B", "garbage-date")];
        let hits = filter_predictions(&rows, &PredictionFilter::default());
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn days_back_bounds() {
        assert!(!valid_days_back(6));
        assert!(valid_days_back(7));
        assert!(valid_days_back(90));
        assert!(valid_days_back(365));
        assert!(!valid_days_back(366));
    }
}

use crate::charts::ChartKind;
use crate::data::{SalesFilter, Selection};
use crate::web::error::AppError;
use chrono::NaiveDate;
use serde::Deserialize;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Query string shared by the page and every data route.
///
/// Every field arrives as a string so that blank form values are accepted and
/// malformed ones surface as a JSON `400` instead of an extractor rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardQuery {
    pub start: Option<String>,
    pub end: Option<String>,
    pub region: Option<String>,
    pub category: Option<String>,
    pub tab: Option<String>,
    pub tick: Option<String>,
}

impl DashboardQuery {
    pub fn filter(&self) -> Result<SalesFilter, AppError> {
        let filter = SalesFilter {
            start: parse_date("start", self.start.as_deref())?,
            end: parse_date("end", self.end.as_deref())?,
            region: Selection::parse(self.region.as_deref().unwrap_or_default()),
            category: Selection::parse(self.category.as_deref().unwrap_or_default()),
        };
        filter.validate()?;
        Ok(filter)
    }

    pub fn tab(&self) -> DashboardTab {
        DashboardTab::parse(self.tab.as_deref().unwrap_or_default())
    }

    /// Refresh counter; blank or absent means 0.
    pub fn tick(&self) -> Result<u64, AppError> {
        match self.tick.as_deref().map(str::trim) {
            None | Some("") => Ok(0),
            Some(raw) => raw.parse().map_err(|_| {
                AppError::BadRequest(format!("Invalid tick '{raw}', expected a whole number"))
            }),
        }
    }
}

fn parse_date(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .map(Some)
            .map_err(|_| {
                AppError::BadRequest(format!(
                    "Invalid {field} date '{raw}', expected YYYY-MM-DD"
                ))
            }),
    }
}

/// Chart tabs on the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DashboardTab {
    #[default]
    Sales,
    Trends,
    Product,
}

impl DashboardTab {
    pub const ALL: [DashboardTab; 3] = [
        DashboardTab::Sales,
        DashboardTab::Trends,
        DashboardTab::Product,
    ];

    /// Unknown ids fall back to the sales tab.
    pub fn parse(id: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|tab| tab.id() == id.trim())
            .unwrap_or_default()
    }

    pub fn id(&self) -> &'static str {
        match self {
            DashboardTab::Sales => "sales-tab",
            DashboardTab::Trends => "trends-tab",
            DashboardTab::Product => "product-tab",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DashboardTab::Sales => "Sales Overview",
            DashboardTab::Trends => "Trends Analysis",
            DashboardTab::Product => "Product Performance",
        }
    }

    pub fn chart(&self) -> ChartKind {
        match self {
            DashboardTab::Sales => ChartKind::SalesByRegion,
            DashboardTab::Trends => ChartKind::SalesTrend,
            DashboardTab::Product => ChartKind::ProductPerformance,
        }
    }
}

/// Query string reproducing `filter`, for links that keep the current selection.
pub fn query_string(filter: &SalesFilter, tab: DashboardTab, tick: u64) -> String {
    let date = |d: Option<NaiveDate>| {
        d.map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default()
    };
    format!(
        "start={}&end={}&region={}&category={}&tab={}&tick={}",
        date(filter.start),
        date(filter.end),
        urlencoding::encode(filter.region.as_value()),
        urlencoding::encode(filter.category.as_value()),
        tab.id(),
        tick
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(start: &str, end: &str) -> DashboardQuery {
        DashboardQuery {
            start: Some(start.into()),
            end: Some(end.into()),
            ..DashboardQuery::default()
        }
    }

    #[test]
    fn blank_values_mean_no_filter() {
        let filter = query("", "").filter().unwrap();
        assert_eq!(filter, SalesFilter::default());
        assert_eq!(DashboardQuery::default().tick().unwrap(), 0);
    }

    #[test]
    fn parses_dates_and_selections() {
        let mut q = query("2024-01-02", "2024-01-03");
        q.region = Some("North".into());
        q.category = Some("ALL".into());
        let filter = q.filter().unwrap();

        assert_eq!(filter.start, NaiveDate::from_ymd_opt(2024, 1, 2));
        assert_eq!(filter.end, NaiveDate::from_ymd_opt(2024, 1, 3));
        assert_eq!(filter.region, Selection::Only("North".into()));
        assert!(filter.category.is_all());
    }

    #[test]
    fn rejects_bad_dates() {
        assert!(matches!(
            query("01/02/2024", "").filter(),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            query("2024-01-04", "2024-01-01").filter(),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn tick_must_be_a_whole_number() {
        let tick = |raw: &str| DashboardQuery {
            tick: Some(raw.into()),
            ..DashboardQuery::default()
        };
        assert_eq!(tick("7").tick().unwrap(), 7);
        assert_eq!(tick(" ").tick().unwrap(), 0);
        assert_eq!(tick("18446744073709551615").tick().unwrap(), u64::MAX);
        assert!(matches!(tick("abc").tick(), Err(AppError::BadRequest(_))));
        assert!(matches!(tick("-1").tick(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn unknown_tab_falls_back_to_sales() {
        assert_eq!(DashboardTab::parse("trends-tab"), DashboardTab::Trends);
        assert_eq!(DashboardTab::parse("bogus"), DashboardTab::Sales);
        assert_eq!(DashboardTab::parse(""), DashboardTab::Sales);
        assert_eq!(DashboardTab::Product.chart(), ChartKind::ProductPerformance);
    }

    #[test]
    fn query_string_encodes_selection() {
        let filter = SalesFilter {
            region: Selection::Only("North East".into()),
            ..SalesFilter::default()
        };
        assert_eq!(
            query_string(&filter, DashboardTab::Trends, 3),
            "start=&end=&region=North%20East&category=all&tab=trends-tab&tick=3"
        );
    }
}

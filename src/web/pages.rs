use askama::Template;

use crate::{
    config::TierSettings,
    models::{tier_slug, RankedCollector, MISSING_VALUE},
    scoring::ThresholdTable,
    sheet::SheetView,
};

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomePage<'a> {
    pub app_name: &'a str,
    pub top: &'a [RankedCollector],
    pub total: usize,
    pub generated_at: String,
}

#[derive(Template)]
#[template(path = "top_collectors.html")]
pub struct TopCollectorsPage<'a> {
    pub app_name: &'a str,
    pub collectors: &'a [RankedCollector],
    pub generated_at: String,
}

#[derive(Template)]
#[template(path = "about.html")]
pub struct AboutPage<'a> {
    pub app_name: &'a str,
    pub tiers: Vec<TierRow>,
}

#[derive(Template)]
#[template(path = "sheet.html")]
pub struct SheetPage<'a> {
    pub app_name: &'a str,
    pub sheet: SheetView,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorPage<'a> {
    pub app_name: &'a str,
    pub status: u16,
    pub title: &'a str,
    pub message: String,
}

/// One line of the tier table on the about page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierRow {
    pub tier: String,
    pub slug: String,
    pub points: String,
    pub minifigs: String,
}

impl TierRow {
    /// Highest tier first. Tiers a table never produces show the placeholder.
    pub fn from_settings(settings: &TierSettings) -> Vec<TierRow> {
        let minimum = |table: &ThresholdTable, tier: &str| {
            table
                .entries()
                .iter()
                .find(|t| t.tier == tier)
                .map(|t| format!("{}+", t.minimum))
                .unwrap_or_else(|| MISSING_VALUE.to_string())
        };

        settings
            .order
            .iter()
            .rev()
            .map(|tier| TierRow {
                tier: tier.clone(),
                slug: tier_slug(tier),
                points: minimum(&settings.points, tier),
                minifigs: minimum(&settings.minifigs, tier),
            })
            .collect()
    }
}

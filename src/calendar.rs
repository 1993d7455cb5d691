//! Canonical month order and seed content.
//!
//! The board is a fixed twelve-month window. [`MONTH_IDS`] defines the one
//! true display order; fetched documents are always projected onto it and
//! a missing document falls back to the seed record for that slot. The
//! seed content is the demo board written on first bootstrap.

use crate::types::{
    BoardSettings, CampaignActivity, LaunchRecord, MonthRecord, Quarter, ResourceLink,
};

/// Canonical month document ids, in display order. Never grows or shrinks.
pub const MONTH_IDS: [&str; 12] = [
    "jan-2026", "feb-2026", "mar-2026", "apr-2026", "may-2026", "jun-2026",
    "jul-2026", "aug-2026", "sep-2026", "oct-2026", "nov-2026", "dec-2026",
];

/// Calendar year shared by every month slot.
pub const BOARD_YEAR: u16 = 2026;

fn month(
    id: &str,
    name: &str,
    quarter: Quarter,
    product_launch: LaunchRecord,
    campaigns: Vec<CampaignActivity>,
) -> MonthRecord {
    MonthRecord {
        id: id.to_string(),
        name: name.to_string(),
        header_logo: None,
        quarter,
        year: BOARD_YEAR,
        product_launch,
        campaigns,
        comments: Vec::new(),
    }
}

fn launch(
    title: &str,
    objective: &str,
    budget: &str,
    performance_spend: &str,
    brand_spend: &str,
    image: &str,
    resources: Vec<ResourceLink>,
) -> LaunchRecord {
    LaunchRecord {
        title: title.to_string(),
        logo: None,
        image: Some(image.to_string()),
        objective: objective.to_string(),
        budget: budget.to_string(),
        performance_spend: performance_spend.to_string(),
        brand_spend: brand_spend.to_string(),
        resources,
        ..Default::default()
    }
}

fn resource(id: &str, label: &str, url: &str) -> ResourceLink {
    ResourceLink {
        id: id.to_string(),
        label: label.to_string(),
        url: url.to_string(),
    }
}

/// The full twelve-record seed skeleton, in canonical order.
///
/// This is what the one-time bootstrap batch writes, and what projection
/// falls back to per slot when a document is missing remotely.
pub fn seed_months() -> Vec<MonthRecord> {
    vec![
        month(
            "jan-2026",
            "January",
            Quarter::Fy26Q4,
            LaunchRecord::default(),
            vec![CampaignActivity {
                id: "c1".to_string(),
                name: "New Year Kickoff".to_string(),
            }],
        ),
        month(
            "feb-2026",
            "February",
            Quarter::Fy26Q4,
            LaunchRecord::default(),
            Vec::new(),
        ),
        month(
            "mar-2026",
            "March",
            Quarter::Fy26Q4,
            launch(
                "Guy Fieri / Flavortown",
                "Launch partnership with high-heat influencer mailers.",
                "$120k",
                "$85,000",
                "$35,000",
                "https://picsum.photos/800/600?random=2",
                vec![
                    resource("r1", "Partnership Deck", "#"),
                    resource("r2", "Asset Folder", "#"),
                ],
            ),
            Vec::new(),
        ),
        month(
            "apr-2026",
            "April",
            Quarter::Fy27Q1,
            LaunchRecord::default(),
            Vec::new(),
        ),
        month(
            "may-2026",
            "May",
            Quarter::Fy27Q1,
            launch(
                "Mandalorian & Grogu",
                "Capitalize on season release with exclusive line.",
                "$200k",
                "$120,000",
                "$80,000",
                "https://picsum.photos/800/600?random=4",
                Vec::new(),
            ),
            Vec::new(),
        ),
        month(
            "jun-2026",
            "June",
            Quarter::Fy27Q1,
            launch(
                "Licksters",
                "Summer treat campaign focusing on cooling products.",
                "$85k",
                "$60,000",
                "$25,000",
                "https://picsum.photos/800/600?random=12",
                Vec::new(),
            ),
            Vec::new(),
        ),
        month(
            "jul-2026",
            "July",
            Quarter::Fy27Q2,
            LaunchRecord::default(),
            Vec::new(),
        ),
        month(
            "aug-2026",
            "August",
            Quarter::Fy27Q2,
            LaunchRecord::default(),
            Vec::new(),
        ),
        month(
            "sep-2026",
            "September",
            Quarter::Fy27Q2,
            launch(
                "Liquid Death",
                "Disrupt category with hydration collaboration.",
                "$150k",
                "$100,000",
                "$50,000",
                "https://picsum.photos/800/600?random=6",
                Vec::new(),
            ),
            Vec::new(),
        ),
        month(
            "oct-2026",
            "October",
            Quarter::Fy27Q3,
            launch(
                "Crocs 2.0",
                "Follow up success of v1 with new styles.",
                "$180k",
                "$110,000",
                "$70,000",
                "https://picsum.photos/800/600?random=7",
                Vec::new(),
            ),
            Vec::new(),
        ),
        month(
            "nov-2026",
            "November",
            Quarter::Fy27Q3,
            launch(
                "Girl Scouts",
                "Cookie season partnership launch.",
                "$110k",
                "$70,000",
                "$40,000",
                "https://picsum.photos/800/600?random=9",
                Vec::new(),
            ),
            Vec::new(),
        ),
        month(
            "dec-2026",
            "December",
            Quarter::Fy27Q3,
            LaunchRecord::default(),
            Vec::new(),
        ),
    ]
}

/// Settings written alongside the month seed.
pub fn default_settings() -> BoardSettings {
    BoardSettings::default()
}

/// Months belonging to one quarter, preserving canonical order.
pub fn months_in_quarter(months: &[MonthRecord], quarter: Quarter) -> Vec<MonthRecord> {
    months
        .iter()
        .filter(|m| m.quarter == quarter)
        .cloned()
        .collect()
}

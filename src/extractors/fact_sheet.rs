// src/extractors/fact_sheet.rs

use serde::Serialize;

/// Numeric fields of a [`FactSheet`], addressable by the rule tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    QuarterlyRevenue,
    QuarterlyEps,
    QuarterlyGrossMargin,
    QuarterlyOperatingMargin,
    RevenueBeatPercent,
    EpsBeatPercent,
    GuidanceRevenue,
    GuidanceEps,
    GuidanceRevenueVsEstimate,
    GuidanceEpsVsEstimate,
    RevenueCagr5y,
    RevenueCagr2y,
    EpsCagr5y,
    WallStreetRevenueEstimate,
    WallStreetEpsEstimate,
    GrossMargin,
    OperatingMargin,
    Roic,
    Cash,
    Debt,
    NetDebtToEbitda,
    QualityScore,
    ValueScore,
}

impl Metric {
    pub const ALL: [Metric; 23] = [
        Metric::QuarterlyRevenue,
        Metric::QuarterlyEps,
        Metric::QuarterlyGrossMargin,
        Metric::QuarterlyOperatingMargin,
        Metric::RevenueBeatPercent,
        Metric::EpsBeatPercent,
        Metric::GuidanceRevenue,
        Metric::GuidanceEps,
        Metric::GuidanceRevenueVsEstimate,
        Metric::GuidanceEpsVsEstimate,
        Metric::RevenueCagr5y,
        Metric::RevenueCagr2y,
        Metric::EpsCagr5y,
        Metric::WallStreetRevenueEstimate,
        Metric::WallStreetEpsEstimate,
        Metric::GrossMargin,
        Metric::OperatingMargin,
        Metric::Roic,
        Metric::Cash,
        Metric::Debt,
        Metric::NetDebtToEbitda,
        Metric::QualityScore,
        Metric::ValueScore,
    ];

    /// Serialized field name, used in logs.
    pub fn name(self) -> &'static str {
        match self {
            Metric::QuarterlyRevenue => "quarterly_revenue",
            Metric::QuarterlyEps => "quarterly_eps",
            Metric::QuarterlyGrossMargin => "quarterly_gross_margin",
            Metric::QuarterlyOperatingMargin => "quarterly_operating_margin",
            Metric::RevenueBeatPercent => "revenue_beat_percent",
            Metric::EpsBeatPercent => "eps_beat_percent",
            Metric::GuidanceRevenue => "guidance_revenue",
            Metric::GuidanceEps => "guidance_eps",
            Metric::GuidanceRevenueVsEstimate => "guidance_revenue_vs_estimate",
            Metric::GuidanceEpsVsEstimate => "guidance_eps_vs_estimate",
            Metric::RevenueCagr5y => "revenue_cagr_5y",
            Metric::RevenueCagr2y => "revenue_cagr_2y",
            Metric::EpsCagr5y => "eps_cagr_5y",
            Metric::WallStreetRevenueEstimate => "wall_street_revenue_estimate",
            Metric::WallStreetEpsEstimate => "wall_street_eps_estimate",
            Metric::GrossMargin => "gross_margin",
            Metric::OperatingMargin => "operating_margin",
            Metric::Roic => "roic",
            Metric::Cash => "cash",
            Metric::Debt => "debt",
            Metric::NetDebtToEbitda => "net_debt_to_ebitda",
            Metric::QualityScore => "quality_score",
            Metric::ValueScore => "value_score",
        }
    }
}

/// Short text fields filled by pattern rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    LatestQuarter,
    GrossMarginTrend,
    OperatingMarginTrend,
}

impl Label {
    pub const ALL: [Label; 3] = [
        Label::LatestQuarter,
        Label::GrossMarginTrend,
        Label::OperatingMarginTrend,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Label::LatestQuarter => "latest_quarter_label",
            Label::GrossMarginTrend => "gross_margin_trend",
            Label::OperatingMarginTrend => "operating_margin_trend",
        }
    }
}

/// Normalized analysis facts for one company page.
///
/// Every scalar is optional: `None` means the page did not yield the value,
/// which is distinct from a genuine zero. Monetary values are raw currency
/// units, percentages are percentage points. Beat fields are signed, a miss
/// is stored as the negated magnitude.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FactSheet {
    pub investment_rating: Option<String>,
    pub analysis_summary: Option<String>,
    pub latest_quarter_label: Option<String>,
    pub quarterly_revenue: Option<f64>,
    pub quarterly_eps: Option<f64>,
    pub quarterly_gross_margin: Option<f64>,
    pub quarterly_operating_margin: Option<f64>,
    pub revenue_beat_percent: Option<f64>,
    pub eps_beat_percent: Option<f64>,
    pub guidance_revenue: Option<f64>,
    pub guidance_eps: Option<f64>,
    pub guidance_revenue_vs_estimate: Option<f64>,
    pub guidance_eps_vs_estimate: Option<f64>,
    pub revenue_cagr_5y: Option<f64>,
    pub revenue_cagr_2y: Option<f64>,
    pub eps_cagr_5y: Option<f64>,
    pub wall_street_revenue_estimate: Option<f64>,
    pub wall_street_eps_estimate: Option<f64>,
    pub gross_margin: Option<f64>,
    pub operating_margin: Option<f64>,
    pub gross_margin_trend: Option<String>,
    pub operating_margin_trend: Option<String>,
    pub roic: Option<f64>,
    pub cash: Option<f64>,
    pub debt: Option<f64>,
    pub net_debt_to_ebitda: Option<f64>,
    pub quality_score: Option<f64>,
    pub value_score: Option<f64>,
    pub key_highlights: Vec<String>,
    pub chart_urls: Vec<String>,
}

impl FactSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::QuarterlyRevenue => self.quarterly_revenue,
            Metric::QuarterlyEps => self.quarterly_eps,
            Metric::QuarterlyGrossMargin => self.quarterly_gross_margin,
            Metric::QuarterlyOperatingMargin => self.quarterly_operating_margin,
            Metric::RevenueBeatPercent => self.revenue_beat_percent,
            Metric::EpsBeatPercent => self.eps_beat_percent,
            Metric::GuidanceRevenue => self.guidance_revenue,
            Metric::GuidanceEps => self.guidance_eps,
            Metric::GuidanceRevenueVsEstimate => self.guidance_revenue_vs_estimate,
            Metric::GuidanceEpsVsEstimate => self.guidance_eps_vs_estimate,
            Metric::RevenueCagr5y => self.revenue_cagr_5y,
            Metric::RevenueCagr2y => self.revenue_cagr_2y,
            Metric::EpsCagr5y => self.eps_cagr_5y,
            Metric::WallStreetRevenueEstimate => self.wall_street_revenue_estimate,
            Metric::WallStreetEpsEstimate => self.wall_street_eps_estimate,
            Metric::GrossMargin => self.gross_margin,
            Metric::OperatingMargin => self.operating_margin,
            Metric::Roic => self.roic,
            Metric::Cash => self.cash,
            Metric::Debt => self.debt,
            Metric::NetDebtToEbitda => self.net_debt_to_ebitda,
            Metric::QualityScore => self.quality_score,
            Metric::ValueScore => self.value_score,
        }
    }

    pub fn metric_mut(&mut self, metric: Metric) -> &mut Option<f64> {
        match metric {
            Metric::QuarterlyRevenue => &mut self.quarterly_revenue,
            Metric::QuarterlyEps => &mut self.quarterly_eps,
            Metric::QuarterlyGrossMargin => &mut self.quarterly_gross_margin,
            Metric::QuarterlyOperatingMargin => &mut self.quarterly_operating_margin,
            Metric::RevenueBeatPercent => &mut self.revenue_beat_percent,
            Metric::EpsBeatPercent => &mut self.eps_beat_percent,
            Metric::GuidanceRevenue => &mut self.guidance_revenue,
            Metric::GuidanceEps => &mut self.guidance_eps,
            Metric::GuidanceRevenueVsEstimate => &mut self.guidance_revenue_vs_estimate,
            Metric::GuidanceEpsVsEstimate => &mut self.guidance_eps_vs_estimate,
            Metric::RevenueCagr5y => &mut self.revenue_cagr_5y,
            Metric::RevenueCagr2y => &mut self.revenue_cagr_2y,
            Metric::EpsCagr5y => &mut self.eps_cagr_5y,
            Metric::WallStreetRevenueEstimate => &mut self.wall_street_revenue_estimate,
            Metric::WallStreetEpsEstimate => &mut self.wall_street_eps_estimate,
            Metric::GrossMargin => &mut self.gross_margin,
            Metric::OperatingMargin => &mut self.operating_margin,
            Metric::Roic => &mut self.roic,
            Metric::Cash => &mut self.cash,
            Metric::Debt => &mut self.debt,
            Metric::NetDebtToEbitda => &mut self.net_debt_to_ebitda,
            Metric::QualityScore => &mut self.quality_score,
            Metric::ValueScore => &mut self.value_score,
        }
    }

    pub fn label(&self, label: Label) -> Option<&str> {
        match label {
            Label::LatestQuarter => self.latest_quarter_label.as_deref(),
            Label::GrossMarginTrend => self.gross_margin_trend.as_deref(),
            Label::OperatingMarginTrend => self.operating_margin_trend.as_deref(),
        }
    }

    pub fn label_mut(&mut self, label: Label) -> &mut Option<String> {
        match label {
            Label::LatestQuarter => &mut self.latest_quarter_label,
            Label::GrossMarginTrend => &mut self.gross_margin_trend,
            Label::OperatingMarginTrend => &mut self.operating_margin_trend,
        }
    }

    /// Appends a highlight unless an identical one is already recorded.
    pub fn push_highlight(&mut self, highlight: impl Into<String>) -> bool {
        push_unique(&mut self.key_highlights, highlight.into())
    }

    /// Appends a chart URL unless it is already recorded.
    pub fn push_chart_url(&mut self, url: impl Into<String>) -> bool {
        push_unique(&mut self.chart_urls, url.into())
    }

    /// Replaces the summary when `candidate` is longer than the current one.
    pub fn offer_summary(&mut self, candidate: String) -> bool {
        let current = self.analysis_summary.as_deref().map_or(0, |s| s.chars().count());
        if !candidate.is_empty() && candidate.chars().count() > current {
            self.analysis_summary = Some(candidate);
            true
        } else {
            false
        }
    }

    /// Layers `other` on top of `self`.
    ///
    /// Scalars from `other` win when present. The summary keeps whichever text
    /// is longer. Lists keep `self`'s entries first, then `other`'s new ones.
    pub fn merge(mut self, other: FactSheet) -> FactSheet {
        for metric in Metric::ALL {
            if let Some(value) = other.metric(metric) {
                *self.metric_mut(metric) = Some(value);
            }
        }
        for label in Label::ALL {
            if let Some(value) = other.label(label) {
                *self.label_mut(label) = Some(value.to_string());
            }
        }
        if other.investment_rating.is_some() {
            self.investment_rating = other.investment_rating;
        }
        if let Some(summary) = other.analysis_summary {
            self.offer_summary(summary);
        }
        for highlight in other.key_highlights {
            self.push_highlight(highlight);
        }
        for url in other.chart_urls {
            self.push_chart_url(url);
        }
        self
    }
}

fn push_unique(list: &mut Vec<String>, item: String) -> bool {
    if list.contains(&item) {
        return false;
    }
    list.push(item);
    true
}

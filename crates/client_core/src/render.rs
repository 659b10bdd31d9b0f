//! Pure projection of [`ViewState`] into what the view shows. Front ends (egui,
//! terminal) draw a [`Screen`] and map its [`ViewAction`] back to the controller.

use shared::protocol::{PlotImage, Statistics};

use crate::controller::ViewState;

/// Upper bound on rendered top-majors rows. Longer payloads are cut here.
pub const TOP_MAJORS_LIMIT: usize = 10;

pub const LOADING_LABEL: &str = "Loading data...";
pub const ERROR_TITLE: &str = "Error loading data";
pub const HEADING: &str = "College Major Income Analysis";
pub const SUBTITLE: &str = "Visualize median income by college major";
pub const TOP_MAJORS_HEADING: &str = "Top 10 Highest Earning Majors";
pub const PLOT_HEADING: &str = "Income Distribution by Major";
pub const PLOT_ALT: &str = "College Majors by Income";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewAction {
    Retry,
    Refresh,
}

impl ViewAction {
    pub fn label(self) -> &'static str {
        match self {
            ViewAction::Retry => "Retry",
            ViewAction::Refresh => "Refresh Data",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatCard {
    pub title: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedMajor {
    pub rank: usize,
    pub major: String,
    pub income: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlotSection {
    pub heading: &'static str,
    pub alt: &'static str,
    pub image: PlotImage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyScreen {
    pub heading: &'static str,
    pub subtitle: &'static str,
    pub cards: [StatCard; 4],
    pub top_majors_heading: &'static str,
    pub top_majors: Vec<RankedMajor>,
    pub plot: Option<PlotSection>,
    pub action: ViewAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Loading {
        label: &'static str,
    },
    Error {
        title: &'static str,
        message: String,
        action: ViewAction,
    },
    Ready(ReadyScreen),
}

impl Screen {
    pub fn action(&self) -> Option<ViewAction> {
        match self {
            Screen::Loading { .. } => None,
            Screen::Error { action, .. } => Some(*action),
            Screen::Ready(ready) => Some(ready.action),
        }
    }
}

pub fn render(state: &ViewState) -> Screen {
    match state {
        ViewState::Loading => Screen::Loading {
            label: LOADING_LABEL,
        },
        ViewState::Error { message } => Screen::Error {
            title: ERROR_TITLE,
            message: message.clone(),
            action: ViewAction::Retry,
        },
        ViewState::Ready { statistics, plot } => Screen::Ready(render_ready(statistics, plot.as_ref())),
    }
}

fn render_ready(statistics: &Statistics, plot: Option<&PlotImage>) -> ReadyScreen {
    let top_majors = statistics
        .top_majors
        .iter()
        .take(TOP_MAJORS_LIMIT)
        .enumerate()
        .map(|(index, entry)| RankedMajor {
            rank: index + 1,
            major: entry.major.clone(),
            income: format_currency(entry.income),
        })
        .collect();

    ReadyScreen {
        heading: HEADING,
        subtitle: SUBTITLE,
        cards: [
            StatCard {
                title: "Total Majors",
                value: statistics.total_majors.to_string(),
            },
            StatCard {
                title: "Average Income",
                value: format_currency(statistics.avg_income),
            },
            StatCard {
                title: "Highest Income",
                value: format_currency(statistics.max_income),
            },
            StatCard {
                title: "Lowest Income",
                value: format_currency(statistics.min_income),
            },
        ],
        top_majors_heading: TOP_MAJORS_HEADING,
        top_majors,
        plot: plot.map(|image| PlotSection {
            heading: PLOT_HEADING,
            alt: PLOT_ALT,
            image: image.clone(),
        }),
        action: ViewAction::Refresh,
    }
}

/// Fraction digits kept by en-US `toLocaleString` number formatting.
const MAX_FRACTION_DIGITS: usize = 3;

/// US-style dollar amount: thousands separators, at most three decimals,
/// trailing zeros dropped (`51234.5` -> `$51,234.5`).
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return format!("${amount}");
    }

    let fixed = format!("{:.*}", MAX_FRACTION_DIGITS, amount.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');
    let is_zero = fraction.is_empty() && whole.bytes().all(|digit| digit == b'0');
    let sign = if amount < 0.0 && !is_zero { "-" } else { "" };
    let whole = group_thousands(whole);

    if fraction.is_empty() {
        format!("{sign}${whole}")
    } else {
        format!("{sign}${whole}.{fraction}")
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;

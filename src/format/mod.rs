//! Output formatting for game cards (table, JSON, markdown, HTML).

mod html;

use crate::config::OutputFormat;
use crate::display::{GameCard, ReviewBadge, ReviewColor, NO_DEALS};
use crate::itad::Shop;
use serde_json::json;

const NO_IMAGE: &str = "No image available";
const UNKNOWN: &str = "unknown";
const NO_TAGS: &str = "no tags";
const NO_REVIEWS: &str = "no reviews";

/// Formats cards and shop listings for output.
pub struct Formatter {
    format: OutputFormat,
    color: bool,
}

impl Formatter {
    /// Creates a new formatter without terminal colors.
    pub fn new(format: OutputFormat) -> Self {
        Self { format, color: false }
    }

    /// Enables ANSI colors in table output.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Formats the displayed cards followed by the summary message.
    pub fn format_cards(&self, cards: &[GameCard], summary: &str) -> String {
        match self.format {
            OutputFormat::Json => self.json_cards(cards, summary),
            OutputFormat::Table => self.table_cards(cards, summary),
            OutputFormat::Markdown => self.markdown_cards(cards, summary),
            OutputFormat::Html => html::render_page(cards, summary),
        }
    }

    /// Formats the shop directory.
    pub fn format_shops(&self, shops: &[Shop]) -> String {
        if shops.is_empty() {
            return match self.format {
                OutputFormat::Json => "[]".to_string(),
                _ => "No shops found.".to_string(),
            };
        }

        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(shops).unwrap_or_else(|_| "[]".to_string())
            }
            OutputFormat::Markdown => {
                let mut lines = vec!["| ID | Shop |".to_string(), "|----|------|".to_string()];
                lines.extend(shops.iter().map(|s| format!("| {} | {} |", s.id, s.title)));
                lines.join("\n")
            }
            OutputFormat::Html => html::render_shops(shops),
            OutputFormat::Table => {
                let mut lines = Vec::new();
                lines.push(format!("{:<6}  {}", "ID", "Shop"));
                lines.push(format!("{:-<6}  {:-<30}", "", ""));
                lines.extend(shops.iter().map(|s| format!("{:<6}  {}", s.id, s.title)));
                lines.push(String::new());
                lines.push(format!("Total: {} shops", shops.len()));
                lines.join("\n")
            }
        }
    }

    // JSON formatting

    fn json_cards(&self, cards: &[GameCard], summary: &str) -> String {
        let value = json!({
            "count": cards.len(),
            "summary": summary,
            "games": cards,
        });
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
    }

    // Table formatting

    fn paint(&self, text: &str, color: ReviewColor) -> String {
        if !self.color {
            return text.to_string();
        }

        let code = match color {
            ReviewColor::Red => "31",
            ReviewColor::Orange => "33",
            ReviewColor::Green => "32",
            ReviewColor::Gray => "90",
        };
        format!("\x1b[{}m{}\x1b[0m", code, text)
    }

    fn table_review(&self, badge: &ReviewBadge) -> String {
        format!("{} {}", badge.source, self.paint(&format!("[{}]", badge.label), badge.color))
    }

    fn table_card(&self, card: &GameCard) -> String {
        let mut lines = Vec::new();

        lines.push(card.title.clone());
        lines.push("=".repeat(card.title.chars().count().clamp(10, 80)));

        lines.push(format!("Image:      {}", card.image.as_deref().unwrap_or(NO_IMAGE)));

        lines.push("Best prices:".to_string());
        for deal in &card.deals {
            let Some(url) = deal.url.as_deref() else {
                lines.push(format!("  {}", self.paint(&format!("[{}]", NO_DEALS), ReviewColor::Gray)));
                continue;
            };
            let cut = deal.cut.map(|c| format!("-{}%", c)).unwrap_or_default();
            lines.push(format!(
                "  {:<20} {:>10}  {:>5}  {}",
                deal.shop,
                deal.price_label(),
                cut,
                url
            ));
        }

        lines.push(format!("Release:    {}", card.release_date.as_deref().unwrap_or(UNKNOWN)));
        lines.push(format!("Publisher:  {}", card.publisher.as_deref().unwrap_or(UNKNOWN)));

        let tags = if card.tags.is_empty() {
            self.paint(&format!("[{}]", NO_TAGS), ReviewColor::Gray)
        } else {
            card.tags.iter().map(|t| format!("[{}]", t)).collect::<Vec<_>>().join(" ")
        };
        lines.push(format!("Tags:       {}", tags));

        if let Some(reviews) = &card.reviews {
            let reviews = if reviews.is_empty() {
                self.paint(&format!("[{}]", NO_REVIEWS), ReviewColor::Gray)
            } else {
                reviews.iter().map(|r| self.table_review(r)).collect::<Vec<_>>().join("  ")
            };
            lines.push(format!("Reviews:    {}", reviews));
        }

        lines.join("\n")
    }

    fn table_cards(&self, cards: &[GameCard], summary: &str) -> String {
        let mut blocks: Vec<String> = cards.iter().map(|c| self.table_card(c)).collect();
        blocks.push(summary.to_string());
        blocks.join("\n\n")
    }

    // Markdown formatting

    fn markdown_card(&self, card: &GameCard) -> String {
        let mut lines = Vec::new();

        lines.push(format!("## {}", card.title));
        lines.push(String::new());

        match &card.image {
            Some(image) => lines.push(format!("![{}]({})", card.title, image)),
            None => lines.push(format!("> ⚠️ {}", NO_IMAGE)),
        }
        lines.push(String::new());

        lines.push("**Best prices**".to_string());
        lines.push(String::new());
        for deal in &card.deals {
            let Some(url) = &deal.url else {
                lines.push(format!("- ⚠️ _{}_", NO_DEALS));
                continue;
            };
            let mut line = format!("- {}: {}", deal.shop, deal.price_label());
            if let Some(cut) = deal.cut {
                line.push_str(&format!(" (-{}%)", cut));
            }
            line.push_str(&format!(" [Go to deal]({})", url));
            lines.push(line);
        }
        lines.push(String::new());

        lines.push(format!(
            "- **Release:** {}",
            card.release_date.as_deref().unwrap_or(UNKNOWN)
        ));
        lines.push(format!("- **Publisher:** {}", card.publisher.as_deref().unwrap_or(UNKNOWN)));

        if card.tags.is_empty() {
            lines.push(format!("- **Tags:** _{}_", NO_TAGS));
        } else {
            let tags: Vec<String> = card.tags.iter().map(|t| format!("`{}`", t)).collect();
            lines.push(format!("- **Tags:** {}", tags.join(" ")));
        }

        if let Some(reviews) = &card.reviews {
            if reviews.is_empty() {
                lines.push(format!("- **Reviews:** _{}_", NO_REVIEWS));
            } else {
                let badges: Vec<String> = reviews
                    .iter()
                    .map(|r| format!("{} {} {}", r.source, color_dot(r.color), r.label))
                    .collect();
                lines.push(format!("- **Reviews:** {}", badges.join(" · ")));
            }
        }

        lines.join("\n")
    }

    fn markdown_cards(&self, cards: &[GameCard], summary: &str) -> String {
        let mut blocks: Vec<String> = cards.iter().map(|c| self.markdown_card(c)).collect();
        blocks.push(format!("*{}*", summary));
        blocks.join("\n\n")
    }
}

fn color_dot(color: ReviewColor) -> &'static str {
    match color {
        ReviewColor::Red => "🔴",
        ReviewColor::Orange => "🟠",
        ReviewColor::Green => "🟢",
        ReviewColor::Gray => "⚪",
    }
}

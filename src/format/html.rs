//! Standalone HTML page with one card per game.

use crate::display::{GameCard, ReviewColor, NO_DEALS};
use crate::itad::Shop;

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; max-width: 960px; margin: 2rem auto; color: #222; }
.card { background: #eec06b; padding: 20px; border-radius: 12px; margin: 10px 0;
        box-shadow: 0 2px 8px rgba(0, 0, 0, 0.1); border: 1px solid #e0e0e0;
        transition: all 0.3s ease; display: grid; grid-template-columns: 1fr 1fr; gap: 16px; }
.card:hover { transform: translateY(-5px); box-shadow: 0 12px 24px rgba(0, 104, 201, 0.15); }
.card h2 { grid-column: 1 / -1; margin: 0; border-bottom: 2px solid #f5d000; }
.card img { max-width: 100%; border-radius: 6px; }
.warning { background: #fff3cd; padding: 8px 12px; border-radius: 6px; }
.deal { margin: 8px 0; }
.deal .price { font-size: 1.4rem; font-weight: 600; }
.deal .cut { color: #0a8a0a; margin-left: 6px; }
.deal a { display: inline-block; margin-top: 4px; padding: 4px 10px; background: #ff4b4b;
          color: #fff; border-radius: 6px; text-decoration: none; }
.badge { display: inline-block; padding: 2px 8px; margin: 2px; border-radius: 8px; font-size: 0.85rem; }
.badge.orange { background: #ffe0b2; color: #a65c00; }
.badge.red { background: #ffcdd2; color: #b71c1c; }
.badge.green { background: #c8e6c9; color: #1b5e20; }
.badge.gray { background: #e0e0e0; color: #555; }
.review { display: flex; gap: 8px; align-items: center; }
.review .source { min-width: 120px; font-size: 0.85rem; }
caption, .label { font-size: 0.8rem; color: #555; }
"#;

/// Escapes text for HTML element and attribute content.
pub(super) fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn badge(text: &str, color: ReviewColor) -> String {
    format!(r#"<span class="badge {}">{}</span>"#, color.name(), escape(text))
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>{}</style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        escape(title),
        STYLE,
        body
    )
}

fn render_card(card: &GameCard) -> String {
    let mut left = String::new();
    match &card.image {
        Some(image) => left.push_str(&format!(
            r#"<img src="{}" alt="{}">"#,
            escape(image),
            escape(&card.title)
        )),
        None => left.push_str(r#"<div class="warning">No image available</div>"#),
    }

    left.push_str(r#"<details open><summary>Best prices</summary>"#);
    for deal in &card.deals {
        let Some(url) = &deal.url else {
            left.push_str(&format!(r#"<div class="warning">{}</div>"#, NO_DEALS));
            continue;
        };
        left.push_str(r#"<div class="deal">"#);
        left.push_str(&format!(r#"<div class="label">Price at {}</div>"#, escape(&deal.shop)));
        left.push_str(&format!(r#"<span class="price">{}</span>"#, escape(&deal.price_label())));
        if let Some(cut) = deal.cut {
            left.push_str(&format!(r#"<span class="cut">-{}%</span>"#, cut));
        }
        left.push_str(&format!(
            r#"<br><a href="{}" target="_blank" rel="noopener">Go to deal</a>"#,
            escape(url)
        ));
        left.push_str("</div>");
    }
    left.push_str("</details>");

    let mut right = String::new();
    match &card.release_date {
        Some(date) => right.push_str(&format!(
            r#"<div class="label">Release</div><div class="price">{}</div>"#,
            escape(date)
        )),
        None => right.push_str(r#"<div class="label">Release: unknown</div>"#),
    }
    match &card.publisher {
        Some(publisher) => right.push_str(&format!(
            r#"<div class="label">Publisher</div><div class="price">{}</div>"#,
            escape(publisher)
        )),
        None => right.push_str(r#"<div class="label">Publisher: unknown</div>"#),
    }

    right.push_str(r#"<div class="label">Tags</div><div>"#);
    if card.tags.is_empty() {
        right.push_str(&badge("no tags", ReviewColor::Gray));
    } else {
        for tag in &card.tags {
            right.push_str(&badge(tag, ReviewColor::Orange));
        }
    }
    right.push_str("</div>");

    if let Some(reviews) = &card.reviews {
        right.push_str(r#"<div class="label">Reviews</div>"#);
        if reviews.is_empty() {
            right.push_str(&badge("no reviews", ReviewColor::Gray));
        }
        for review in reviews {
            right.push_str(&format!(
                r#"<div class="review"><span class="source">{}</span>{}</div>"#,
                escape(&review.source),
                badge(&review.label, review.color)
            ));
        }
    }

    format!(
        "<section class=\"card\">\n<h2>{}</h2>\n<div>{}</div>\n<div>{}</div>\n</section>",
        escape(&card.title),
        left,
        right
    )
}

/// Renders all cards and the summary as a complete page.
pub(super) fn render_page(cards: &[GameCard], summary: &str) -> String {
    let mut body = String::from("<h1>Game price comparison</h1>\n");
    for card in cards {
        body.push_str(&render_card(card));
        body.push('\n');
    }
    body.push_str(&format!(r#"<p class="summary">{}</p>"#, escape(summary)));

    page("Game price comparison", &body)
}

/// Renders the shop directory as a page.
pub(super) fn render_shops(shops: &[Shop]) -> String {
    let mut body = String::from("<h1>Shops</h1>\n<table>\n<tr><th>ID</th><th>Shop</th></tr>\n");
    for shop in shops {
        body.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>\n",
            escape(&shop.id),
            escape(&shop.title)
        ));
    }
    body.push_str("</table>");

    page("Shops", &body)
}

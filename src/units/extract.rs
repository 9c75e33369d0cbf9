// src/units/extract.rs
// =============================================================================
// This module turns the HTML of a listings page into a Snapshot.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// Page layout we expect:
//   <div id="bedroom-type-2">          <- one "section" per bedroom type
//     <div class="unit">               <- one per listed unit
//       <span class="pricing">$2,000</span>
//       <span>900 sq.ft.</span>
//       <p>Available Now</p>
//     </div>
//   </div>
//
// A missing section is not an error: the property may simply have nothing of
// that type listed right now. We log it and move on.
// =============================================================================

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::info;

use super::model::{Snapshot, UnitRecord};

// Placeholder used when a unit is missing one of its fields
const MISSING: &str = "N/A";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid CSS selector '{selector}': {reason}")]
    Selector { selector: String, reason: String },
}

// Anything that can turn raw page content into a Snapshot
//
// The monitor only depends on this trait, so tests can swap in a fake.
pub trait Extractor: Send + Sync {
    fn parse(&self, content: &str) -> Result<Snapshot, ExtractError>;
}

// One anchored section of the page and the label its units get
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// The `id` attribute of the section's <div>
    pub anchor_id: String,
    /// Bedroom label stamped on every unit found in this section
    pub label: String,
}

impl Section {
    // Builds a section from its anchor id, deriving the label
    //
    // "bedroom-type-2" -> "2BR"; anything else keeps the id as its label.
    pub fn from_anchor(anchor_id: &str) -> Self {
        let label = match anchor_id.strip_prefix("bedroom-type-") {
            Some(n) if !n.is_empty() => format!("{}BR", n),
            _ => anchor_id.to_string(),
        };

        Section {
            anchor_id: anchor_id.to_string(),
            label,
        }
    }
}

// The scraper-backed extractor used in production
pub struct HtmlExtractor {
    sections: Vec<Section>,
    div: Selector,
    unit: Selector,
    pricing: Selector,
    span: Selector,
    paragraph: Selector,
}

impl HtmlExtractor {
    pub fn new(sections: Vec<Section>) -> Result<Self, ExtractError> {
        Ok(Self {
            sections,
            div: selector("div")?,
            unit: selector("div.unit")?,
            pricing: selector("span.pricing")?,
            span: selector("span")?,
            paragraph: selector("p")?,
        })
    }

    // Pulls price / area / availability out of one unit element
    //
    // Returns None when the element has none of the three fields at all.
    fn unit_record(&self, label: &str, unit: ElementRef<'_>) -> Option<UnitRecord> {
        let price = unit
            .select(&self.pricing)
            .next()
            .map(stripped_text);

        let sqft = unit
            .select(&self.span)
            .map(stripped_text)
            .find(|text| text.contains("sq.ft."));

        let availability = unit
            .select(&self.paragraph)
            .map(stripped_text)
            .find(|text| text.starts_with("Available"));

        if price.is_none() && sqft.is_none() && availability.is_none() {
            return None;
        }

        Some(UnitRecord::new(
            label,
            price.unwrap_or_else(|| MISSING.to_string()),
            sqft.unwrap_or_else(|| MISSING.to_string()),
            availability.unwrap_or_else(|| MISSING.to_string()),
        ))
    }
}

impl Extractor for HtmlExtractor {
    fn parse(&self, content: &str) -> Result<Snapshot, ExtractError> {
        let document = Html::parse_document(content);
        let mut snapshot = Snapshot::new();

        for section in &self.sections {
            // First <div> whose id matches; ids come from the CLI so we match
            // on the attribute instead of building a selector out of them
            let anchor = document
                .select(&self.div)
                .find(|el| el.value().id() == Some(section.anchor_id.as_str()));

            let Some(anchor) = anchor else {
                info!("Div with id '{}' not found", section.anchor_id);
                continue;
            };

            let units: Vec<ElementRef<'_>> = anchor.select(&self.unit).collect();
            info!("Found {} units in {}", units.len(), section.anchor_id);

            snapshot.extend(
                units
                    .into_iter()
                    .filter_map(|unit| self.unit_record(&section.label, unit)),
            );
        }

        Ok(snapshot)
    }
}

fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Selector {
        selector: css.to_string(),
        reason: e.to_string(),
    })
}

// Text of an element with every text node trimmed and glued together
//
// "<p>\n  Available\n  <b>Now</b></p>" -> "AvailableNow"
fn stripped_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> HtmlExtractor {
        HtmlExtractor::new(vec![Section::from_anchor("bedroom-type-2")]).unwrap()
    }

    #[test]
    fn test_section_labels() {
        assert_eq!(Section::from_anchor("bedroom-type-1").label, "1BR");
        assert_eq!(Section::from_anchor("bedroom-type-2").label, "2BR");
        assert_eq!(Section::from_anchor("studios").label, "studios");
        assert_eq!(Section::from_anchor("bedroom-type-").label, "bedroom-type-");
    }

    #[test]
    fn test_extract_units() {
        let html = r#"
            <div id="bedroom-type-2">
              <div class="unit">
                <span class="pricing"> $2,500 </span>
                <span>1,000 sq.ft.</span>
                <p>Available Dec 1</p>
              </div>
              <div class="unit">
                <span class="pricing">$2,000</span>
                <span>Floor 3</span>
                <span>900 sq.ft.</span>
                <p>Floor plan B</p>
                <p>Available Now</p>
              </div>
            </div>
        "#;

        let snapshot = extractor().parse(html).unwrap();
        let units: Vec<&UnitRecord> = snapshot.iter().collect();
        assert_eq!(units.len(), 2);
        assert_eq!(
            units[0],
            &UnitRecord::new("2BR", "$2,000", "900 sq.ft.", "Available Now")
        );
        assert_eq!(
            units[1],
            &UnitRecord::new("2BR", "$2,500", "1,000 sq.ft.", "Available Dec 1")
        );
    }

    #[test]
    fn test_missing_section_is_empty_snapshot() {
        let html = r#"<div id="bedroom-type-1"><div class="unit"><span class="pricing">$1</span></div></div>"#;
        let snapshot = extractor().parse(html).unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_missing_fields_fall_back() {
        let html = r#"
            <div id="bedroom-type-2">
              <div class="unit"><span class="pricing">$3,100</span></div>
              <div class="unit"><em>nothing useful</em></div>
            </div>
        "#;

        let snapshot = extractor().parse(html).unwrap();
        let units: Vec<&UnitRecord> = snapshot.iter().collect();
        assert_eq!(units, vec![&UnitRecord::new("2BR", "$3,100", "N/A", "N/A")]);
    }

    #[test]
    fn test_text_nodes_are_trimmed_and_joined() {
        let html = r#"
            <div id="bedroom-type-2">
              <div class="unit">
                <span class="pricing">
                  <sup>$</sup>
                  2,000
                </span>
              </div>
            </div>
        "#;

        let snapshot = extractor().parse(html).unwrap();
        assert_eq!(snapshot.iter().next().unwrap().price(), "$2,000");
    }

    #[test]
    fn test_multiple_sections() {
        let html = r#"
            <div id="bedroom-type-1"><div class="unit"><span class="pricing">$1,500</span></div></div>
            <div id="bedroom-type-2"><div class="unit"><span class="pricing">$2,000</span></div></div>
        "#;
        let extractor = HtmlExtractor::new(vec![
            Section::from_anchor("bedroom-type-1"),
            Section::from_anchor("bedroom-type-2"),
        ])
        .unwrap();

        let snapshot = extractor.parse(html).unwrap();
        let labels: Vec<&str> = snapshot.iter().map(|u| u.bedroom()).collect();
        assert_eq!(labels, vec!["1BR", "2BR"]);
    }
}

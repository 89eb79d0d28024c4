use std::collections::HashSet;

use scraper::Html;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{Result, ScrapeError};
use crate::models::Listing;
use crate::progress::Progress;
use crate::scrapers::card::{compile, resolve, CardParser, ItemOutcome};
use crate::scrapers::page::{Page, Waiter};
use crate::scrapers::traits::{ExtractionStrategy, PassContext};
use crate::scrapers::types::MarkupRules;

/// Dashboard with one link per favorite list: visit every list and read
/// its cards.
pub struct GroupedLists;

/// The current page already shows favorite cards.
pub struct DirectCards;

/// Last resort: rebuild records around every link to a space page.
pub struct GenericLinks;

/// Run the strategies in priority order and keep the first non-empty result.
pub fn extract_favorites(
    page: &mut dyn Page,
    rules: &MarkupRules,
    waiter: Waiter,
    progress: &mut dyn Progress,
) -> Result<Vec<Listing>> {
    let strategies: [&dyn ExtractionStrategy; 3] = [&GroupedLists, &DirectCards, &GenericLinks];
    let mut ctx = PassContext {
        rules,
        waiter,
        progress,
    };

    for strategy in strategies {
        let listings = strategy.extract(page, &mut ctx)?;
        if !listings.is_empty() {
            info!("{} strategy collected {} listings", strategy.name(), listings.len());
            return Ok(listings);
        }
        warn!("{} strategy found nothing on {}", strategy.name(), page.current_url());
    }

    Ok(Vec::new())
}

impl ExtractionStrategy for GroupedLists {
    fn extract(&self, page: &mut dyn Page, ctx: &mut PassContext<'_>) -> Result<Vec<Listing>> {
        let list_urls = {
            let (doc, base) = load_document(page)?;
            let container_sel = compile(&ctx.rules.container_selector())?;
            let Some(container) = doc.select(&container_sel).next() else {
                debug!("no favorites container on {base}");
                return Ok(Vec::new());
            };

            let link_sel = compile(&ctx.rules.sublist_link_selector())?;
            container
                .select(&link_sel)
                .filter_map(|a| a.value().attr("href"))
                .filter_map(|href| resolve(&base, href).ok())
                .filter(|url| !url.is_empty())
                .collect::<Vec<_>>()
        };

        if list_urls.is_empty() {
            return Ok(Vec::new());
        }

        let parser = CardParser::new(ctx.rules)?;
        let card_selector = ctx.rules.card_selector();
        let total = list_urls.len();
        ctx.progress.begin(total);

        let mut listings = Vec::new();
        for (i, url) in list_urls.iter().enumerate() {
            ctx.progress
                .log(&format!("Processing favorite list {}/{}...", i + 1, total));

            page.navigate(url)
                .map_err(|e| ScrapeError::Navigation(format!("{url}: {e:#}")))?;
            let appeared = ctx
                .waiter
                .for_element(page, &card_selector)
                .map_err(|e| ScrapeError::Extraction(format!("{e:#}")))?;
            if !appeared {
                debug!(
                    "no cards appeared on {url} within {:?}, reading it anyway",
                    ctx.waiter.timeout
                );
            }

            let (doc, base) = load_document(page)?;
            let cards = parser.cards(&doc);
            ctx.progress
                .log(&format!("Found {} spaces in list {}/{}", cards.len(), i + 1, total));

            listings.extend(keep_records(
                self.name(),
                cards.into_iter().map(|card| parser.parse_card(card, &base)),
            ));
            ctx.progress.item_done(i + 1);
        }

        Ok(listings)
    }

    fn name(&self) -> &'static str {
        "grouped-list"
    }
}

impl ExtractionStrategy for DirectCards {
    fn extract(&self, page: &mut dyn Page, ctx: &mut PassContext<'_>) -> Result<Vec<Listing>> {
        let parser = CardParser::new(ctx.rules)?;
        let (doc, base) = load_document(page)?;

        let cards = parser.cards(&doc);
        if cards.is_empty() {
            return Ok(Vec::new());
        }
        ctx.progress.log(&format!("Found {} spaces", cards.len()));

        Ok(keep_records(
            self.name(),
            cards.into_iter().map(|card| parser.parse_card(card, &base)),
        ))
    }

    fn name(&self) -> &'static str {
        "direct-card"
    }
}

impl ExtractionStrategy for GenericLinks {
    fn extract(&self, page: &mut dyn Page, ctx: &mut PassContext<'_>) -> Result<Vec<Listing>> {
        ctx.progress.log("Collecting in generic mode...");

        let parser = CardParser::new(ctx.rules)?;
        let (doc, base) = load_document(page)?;

        let links = parser.listing_links(&doc);
        let total = links.len();
        ctx.progress.begin(total);

        let mut seen = HashSet::new();
        let mut outcomes = Vec::with_capacity(total);
        for (i, link) in links.into_iter().enumerate() {
            ctx.progress.item_done(i + 1);

            let url = match resolve(&base, link.value().attr("href").unwrap_or("")) {
                Ok(url) => url,
                Err(skip) => {
                    outcomes.push(Err(skip));
                    continue;
                }
            };
            if !seen.insert(url.clone()) {
                continue;
            }

            outcomes.push(parser.parse_link(link, url, &base));
        }

        Ok(keep_records(self.name(), outcomes))
    }

    fn name(&self) -> &'static str {
        "generic-link"
    }
}

/// Parse the tab's current document along with its URL for resolving links
fn load_document(page: &dyn Page) -> Result<(Html, Url)> {
    let html = page
        .content()
        .map_err(|e| ScrapeError::Extraction(format!("could not read page: {e:#}")))?;
    let current = page.current_url();
    let base = Url::parse(&current)
        .map_err(|e| ScrapeError::Extraction(format!("unusable page URL {current}: {e}")))?;

    Ok((Html::parse_document(&html), base))
}

fn keep_records(strategy: &str, outcomes: impl IntoIterator<Item = ItemOutcome>) -> Vec<Listing> {
    let mut skipped = 0;
    let listings: Vec<Listing> = outcomes
        .into_iter()
        .filter_map(|outcome| match outcome {
            Ok(listing) => Some(listing),
            Err(skip) => {
                debug!("{strategy}: skipped item ({skip:?})");
                skipped += 1;
                None
            }
        })
        .collect();

    if skipped > 0 {
        debug!("{strategy}: kept {}, skipped {skipped}", listings.len());
    }
    listings
}

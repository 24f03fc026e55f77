//! Rendering of alerts, status listings, and command replies.
//!
//! Everything here is a pure function from domain state to [`Message`]
//! values; the only non-determinism is the embed timestamp. Output limits
//! track the channel constraints: 2000 characters per plain message, and
//! bounded field/entry counts per embed.

use restockd_core::{
    AvailabilityRecord, Priority, ProductSpec, StatusStore, StoreAvailability, UNCAPPED_QUANTITY,
};
use restockd_lookup::{lookup_page_url, LookupError};

use crate::message::{Embed, Message};

const COLOR_AVAILABLE: u32 = 0x00_ff00;
const COLOR_UNAVAILABLE: u32 = 0xff_0000;
const COLOR_DEBUG: u32 = 0xff_9900;
const COLOR_HELP: u32 = 0x00_99ff;

/// Store lines shown in a restock alert before truncating.
const ALERT_STORE_LIMIT: usize = 10;
/// Store sub-lines shown per product in a status entry.
const STORES_PER_STATUS_ENTRY: usize = 8;
/// Detailed product entries per status page.
const PRODUCTS_PER_STATUS_PAGE: usize = 10;
/// Product entries per detailed-list page.
const PRODUCTS_PER_DETAILED_PAGE: usize = 25;
/// Checked locations shown in a debug report before truncating.
const DEBUG_LOCATION_LIMIT: usize = 5;
/// Hard channel limit on plain message length, in characters.
const MAX_PLAIN_MESSAGE_CHARS: usize = 2000;
/// Chunk target for split plain messages, leaving headroom for headers.
const MAX_CHUNK_CHARS: usize = 1950;

/// Visual styling for one priority tier, shared by every formatting
/// entry point.
#[derive(Debug, Clone, Copy)]
pub struct PriorityTheme {
    pub alert_title: &'static str,
    pub emoji: &'static str,
    pub color: u32,
}

#[must_use]
pub const fn priority_theme(priority: Priority) -> PriorityTheme {
    match priority {
        Priority::Top => PriorityTheme {
            alert_title: "🚨🔥 TOP PRIORITY RESTOCK! 🔥🚨",
            emoji: "🔥",
            color: 0xff_0000,
        },
        Priority::High => PriorityTheme {
            alert_title: "🎉 HIGH PRIORITY RESTOCK! 🎉",
            emoji: "🚨",
            color: 0xff_8800,
        },
        Priority::Medium => PriorityTheme {
            alert_title: "📦 RESTOCK ALERT! 📦",
            emoji: "⚠️",
            color: 0x00_ff00,
        },
        Priority::Low => PriorityTheme {
            alert_title: "📝 Restock Alert",
            emoji: "📝",
            color: 0x80_8080,
        },
    }
}

fn quantity_label(quantity: u32) -> String {
    if quantity == UNCAPPED_QUANTITY {
        "3+".to_string()
    } else {
        quantity.to_string()
    }
}

/// One bullet line for a stocked store, e.g. `• Best Buy Torrance - Torrance (2, 5 in-store)`.
/// The in-store quantity is omitted when it duplicates the pickup quantity.
fn store_line(store: &StoreAvailability) -> String {
    let mut quantities: Vec<String> = Vec::new();
    if let Some(pickup) = store.pickup_quantity {
        quantities.push(quantity_label(pickup));
    }
    if let Some(in_store) = store.in_store_quantity {
        if store.pickup_quantity != Some(in_store) {
            quantities.push(format!("{} in-store", quantity_label(in_store)));
        }
    }
    if quantities.is_empty() {
        format!("• {}", store.location_name)
    } else {
        format!("• {} ({})", store.location_name, quantities.join(", "))
    }
}

fn store_lines(stores: &[StoreAvailability], limit: usize) -> Vec<String> {
    let mut lines: Vec<String> = stores.iter().take(limit).map(store_line).collect();
    if stores.len() > limit {
        lines.push(format!("• ... and {} more stores", stores.len() - limit));
    }
    lines
}

fn snormax_link(label: &str, product: &ProductSpec) -> String {
    format!(
        "[{label}]({})",
        lookup_page_url(&product.sku, &product.zip_code)
    )
}

/// Channel alert for a product that just came back in stock.
#[must_use]
pub fn restock_alert(product: &ProductSpec, record: &AvailabilityRecord) -> Message {
    let theme = priority_theme(product.priority);
    let mut embed = Embed::new(theme.alert_title, theme.color)
        .description(format!("**{}** is back in stock!", product.name))
        .field("SKU", product.sku.clone(), true)
        .field("Zip Code", product.zip_code.clone(), true)
        .field("Priority", product.priority.as_str().to_uppercase(), true)
        .field("Category", product.category.clone(), true)
        .field("Set", product.set_name.clone(), true);

    if !record.stores.is_empty() {
        embed = embed
            .field(
                "Stores with Stock",
                format!("{} stores", record.stores.len()),
                true,
            )
            .field(
                "Available Locations",
                store_lines(&record.stores, ALERT_STORE_LIMIT).join("\n"),
                false,
            );
    }

    embed = embed.field("Link", snormax_link("Snormax", product), false);
    Message::from_embed(embed).with_operator_mention()
}

/// Availability overview for the `status` command.
///
/// Products are partitioned into available and out-of-stock sections,
/// each paginated at [`PRODUCTS_PER_STATUS_PAGE`] entries per message so
/// no product is ever silently dropped.
#[must_use]
pub fn status_overview(
    products: &[ProductSpec],
    store: &StatusStore,
    filter: Option<Priority>,
) -> Vec<Message> {
    if store.is_empty() {
        return vec![Message::text(
            "No products have been checked yet. Please wait for the first check cycle.",
        )];
    }

    let mut available: Vec<&ProductSpec> = Vec::new();
    let mut unavailable: Vec<&ProductSpec> = Vec::new();
    for product in products {
        if filter.is_some_and(|wanted| product.priority != wanted) {
            continue;
        }
        let record = store.get(&product.sku, &product.zip_code);
        if record.is_some_and(|r| r.available) {
            available.push(product);
        } else {
            unavailable.push(product);
        }
    }

    let mut messages = Vec::new();
    messages.extend(status_section(
        &available,
        store,
        "✅ Available Products",
        COLOR_AVAILABLE,
    ));
    messages.extend(status_section(
        &unavailable,
        store,
        "❌ Out of Stock Products",
        COLOR_UNAVAILABLE,
    ));

    if messages.is_empty() {
        return vec![match filter {
            Some(priority) => Message::text(format!(
                "No {priority} priority products found or checked yet."
            )),
            None => Message::text("No products found."),
        }];
    }
    messages
}

fn status_section(
    products: &[&ProductSpec],
    store: &StatusStore,
    base_title: &str,
    color: u32,
) -> Vec<Message> {
    if products.is_empty() {
        return Vec::new();
    }
    let total_pages = products.len().div_ceil(PRODUCTS_PER_STATUS_PAGE);
    products
        .chunks(PRODUCTS_PER_STATUS_PAGE)
        .enumerate()
        .map(|(page, chunk)| {
            let title = if page == 0 {
                format!("{base_title} ({})", products.len())
            } else {
                format!("{base_title} (Page {}/{total_pages})", page + 1)
            };
            let mut embed = Embed::new(title, color);
            for product in chunk {
                let record = store.get(&product.sku, &product.zip_code);
                embed = embed.field(product.name.clone(), status_entry(product, record), false);
            }
            Message::from_embed(embed)
        })
        .collect()
}

fn status_entry(product: &ProductSpec, record: Option<&AvailabilityRecord>) -> String {
    let mut value = format!(
        "**Priority:** {}\n**SKU:** {}\n",
        product.priority.as_str().to_uppercase(),
        product.sku
    );
    match record {
        Some(record) if record.available => {
            value.push_str(&format!(
                "**Stores with Stock:** {} stores\n",
                record.stores.len()
            ));
            if !record.stores.is_empty() {
                value.push_str("**Available Locations:**\n");
                value.push_str(&store_lines(&record.stores, STORES_PER_STATUS_ENTRY).join("\n"));
                value.push('\n');
            }
        }
        Some(record) => {
            value.push_str("**Status:** Out of Stock\n");
            value.push_str(&format!(
                "**Total Stores Checked:** {}\n",
                record.total_locations_checked
            ));
        }
        None => {
            value.push_str("**Status:** Out of Stock\n");
        }
    }
    value.push_str(&format!("**Link:** {}", snormax_link("snormax", product)));
    value
}

/// Plain-text product listing for the `list` command, split into chunks
/// that never break a product line across messages.
#[must_use]
pub fn product_list(products: &[ProductSpec], filter: Option<Priority>) -> Vec<Message> {
    if products.is_empty() {
        return vec![Message::text("No products are currently being monitored.")];
    }

    let mut parts: Vec<String> = Vec::new();
    for tier in tiers_to_show(filter) {
        let group: Vec<&ProductSpec> = products.iter().filter(|p| p.priority == tier).collect();
        if group.is_empty() {
            if filter.is_some() {
                return vec![Message::text(format!("No {tier} priority products found."))];
            }
            continue;
        }
        parts.push(format!(
            "\n**{} {} Priority ({}):**",
            priority_theme(tier).emoji,
            tier.as_str().to_uppercase(),
            group.len()
        ));
        for product in group {
            parts.push(format!("• {} - {}", product.name, product.sku));
        }
    }

    if parts.is_empty() {
        return vec![Message::text("No products found.")];
    }

    let header = match filter {
        Some(priority) => format!(
            "**📦 {} Priority Products:**",
            priority.as_str().to_uppercase()
        ),
        None => format!("**📦 Monitoring {} Products:**", products.len()),
    };

    let full = format!("{header}{}", parts.join("\n"));
    if full.chars().count() <= MAX_PLAIN_MESSAGE_CHARS {
        return vec![Message::text(full)];
    }

    let chunks = chunk_lines(&parts, MAX_CHUNK_CHARS);
    let total = chunks.len();
    chunks
        .into_iter()
        .enumerate()
        .map(|(index, chunk)| {
            if index == 0 {
                Message::text(format!("{header}\n{chunk}"))
            } else {
                Message::text(format!("**📦 Continued ({}/{total}):**\n{chunk}", index + 1))
            }
        })
        .collect()
}

/// Greedily packs whole lines into chunks of at most `limit` characters.
/// A line is never split; a single oversize line becomes its own chunk.
fn chunk_lines(lines: &[String], limit: usize) -> Vec<String> {
    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();
    for line in lines {
        if current.chars().count() + line.chars().count() + 1 > limit && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }
        current.push_str(line);
        current.push('\n');
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Embed product listing for the `listd` command, grouped by priority and
/// paginated at [`PRODUCTS_PER_DETAILED_PAGE`] entries per page.
#[must_use]
pub fn product_list_detailed(products: &[ProductSpec], filter: Option<Priority>) -> Vec<Message> {
    if products.is_empty() {
        return vec![Message::text("No products are currently being monitored.")];
    }

    let mut messages = Vec::new();
    for tier in tiers_to_show(filter) {
        let group: Vec<&ProductSpec> = products.iter().filter(|p| p.priority == tier).collect();
        if group.is_empty() {
            if filter.is_some() {
                return vec![Message::text(format!("No {tier} priority products found."))];
            }
            continue;
        }
        let theme = priority_theme(tier);
        let label = tier.as_str().to_uppercase();
        let total_pages = group.len().div_ceil(PRODUCTS_PER_DETAILED_PAGE);
        for (page, chunk) in group.chunks(PRODUCTS_PER_DETAILED_PAGE).enumerate() {
            let title = if page == 0 {
                format!("{} {label} Priority Products ({})", theme.emoji, group.len())
            } else {
                format!(
                    "{} {label} Priority Products (Page {}/{total_pages})",
                    theme.emoji,
                    page + 1
                )
            };
            let mut embed = Embed::new(title, theme.color);
            for product in chunk {
                embed = embed.field(
                    product.name.clone(),
                    format!(
                        "SKU: {}\nSet: {}\nCategory: {}\nLink: {}",
                        product.sku,
                        product.set_name,
                        product.category,
                        snormax_link("snormax", product)
                    ),
                    true,
                );
            }
            messages.push(Message::from_embed(embed));
        }
    }

    if messages.is_empty() {
        return vec![Message::text("No products found.")];
    }
    messages
}

fn tiers_to_show(filter: Option<Priority>) -> Vec<Priority> {
    match filter {
        Some(priority) => vec![priority],
        None => Priority::ALL.to_vec(),
    }
}

/// Raw normalized fields for one product, for the `debug` command.
#[must_use]
pub fn debug_report(sku: &str, zip_code: &str, record: &AvailabilityRecord) -> Message {
    let mut embed = Embed::new("Debug Information", COLOR_DEBUG)
        .field("SKU", sku, true)
        .field("Zip Code", zip_code, true)
        .field("Available", record.available.to_string(), true)
        .field(
            "Total Stores",
            record.total_locations_checked.to_string(),
            true,
        )
        .field("Stores with Stock", record.stores.len().to_string(), true);

    if !record.locations_checked.is_empty() {
        let mut text = record
            .locations_checked
            .iter()
            .take(DEBUG_LOCATION_LIMIT)
            .cloned()
            .collect::<Vec<_>>()
            .join("\n");
        if record.locations_checked.len() > DEBUG_LOCATION_LIMIT {
            text.push_str(&format!(
                "\n... and {} more",
                record.locations_checked.len() - DEBUG_LOCATION_LIMIT
            ));
        }
        embed = embed.field("Locations Checked", text, false);
    }

    Message::from_embed(embed)
}

/// Reply when a `debug` lookup fails.
#[must_use]
pub fn debug_failure(sku: &str, zip_code: &str, error: &LookupError) -> Message {
    Message::text(format!(
        "Could not retrieve data for SKU {sku} at {zip_code}: {error}"
    ))
}

/// Help embed listing the command surface.
#[must_use]
pub fn help_message() -> Message {
    let embed = Embed::new("Bot Commands", COLOR_HELP)
        .field(
            "!status [priority]",
            "Check stock status (optional: top, high, medium, low)",
            false,
        )
        .field("!add [sku] [zipcode] [name]", "Add a product to monitor", false)
        .field("!remove [sku] [zipcode]", "Remove a product from monitoring", false)
        .field("!list [priority]", "Simple list: Product Name - SKU format", false)
        .field(
            "!listd [priority]",
            "Detailed list with Set/Category info (also: !listdetailed)",
            false,
        )
        .field("!debug [sku] [zipcode]", "Debug API response for a specific product", false)
        .field("!commands", "Show this help message", false);
    Message::from_embed(embed)
}

#[cfg(test)]
#[path = "format_test.rs"]
mod tests;

use anyhow::Result;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use crossterm::style::Stylize;
use stacksift::config::config::DisplayConfig;
use stacksift::models::{Collection, Listing};
use stacksift::search::SearchResults;

const DESCRIPTION_WIDTH: usize = 60;

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}

/// Print listings as a numbered table. Row numbers are what row commands take.
pub fn display_listings(listings: &[Listing], user_id: Option<&str>, display: &DisplayConfig) {
    if listings.is_empty() {
        println!("{}", "No tools found.".yellow());
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let mut headers = vec!["#", "Title", "URL", "Category", "Likes", "Views"];
    if display.show_descriptions {
        headers.push("Description");
    }
    table.set_header(
        headers
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );

    for (i, listing) in listings.iter().enumerate() {
        let mut title = listing.title.clone();
        if listing.is_ai() {
            title = format!("{} {}", title, display.icons.ai);
        } else if !listing.approved {
            title = format!("{} {}", title, display.icons.pending);
        }

        let liked = user_id.map_or(false, |id| listing.is_liked_by(id));
        let likes = if liked {
            format!("{} {}", listing.like_count(), display.icons.liked)
        } else {
            listing.like_count().to_string()
        };

        let mut title_cell = Cell::new(title);
        if listing.is_ai() {
            title_cell = title_cell.fg(Color::Magenta);
        }

        let mut row = vec![
            Cell::new(i + 1),
            title_cell,
            Cell::new(&listing.url),
            Cell::new(&listing.category),
            Cell::new(likes),
            Cell::new(listing.views),
        ];
        if display.show_descriptions {
            row.push(Cell::new(truncate(&listing.description, DESCRIPTION_WIDTH)));
        }
        table.add_row(row);
    }

    println!("{table}");
}

pub fn display_search_results(results: &SearchResults, user_id: Option<&str>, display: &DisplayConfig) {
    display_listings(&results.listings, user_id, display);

    if results.listings.is_empty() {
        return;
    }

    let mut summary = format!("{} tools", results.local_count());
    if results.ai_count() > 0 {
        summary.push_str(&format!(" + {} AI suggestions", results.ai_count()));
    }
    println!("\n{}", summary.green());

    if results.show_pagination() {
        println!(
            "{}",
            format!(
                "Page {} of {} ({} total)  \\next  \\prev  \\page <n>",
                results.page, results.total_pages, results.total_listings
            )
            .dark_grey()
        );
    }
}

pub fn display_collections(collections: &[Collection]) {
    if collections.is_empty() {
        println!(
            "{}",
            "No folders yet. Create one with \\collection new <name>".yellow()
        );
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        ["#", "Folder", "Tools"]
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );

    for (i, collection) in collections.iter().enumerate() {
        let tools = collection
            .listings
            .iter()
            .map(|l| format!("{} ({})", l.title, l.id))
            .collect::<Vec<_>>()
            .join("\n");
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&collection.name),
            Cell::new(tools),
        ]);
    }

    println!("{table}");
}

pub fn export_to_csv(listings: &[Listing], filename: &str) -> Result<()> {
    let mut wtr = csv::Writer::from_path(filename)?;

    wtr.write_record([
        "id",
        "title",
        "url",
        "description",
        "category",
        "tags",
        "likes",
        "views",
        "source",
    ])?;

    for listing in listings {
        wtr.write_record([
            listing.id.as_str(),
            listing.title.as_str(),
            listing.url.as_str(),
            listing.description.as_str(),
            listing.category.as_str(),
            listing.tags.join(", ").as_str(),
            listing.like_count().to_string().as_str(),
            listing.views.to_string().as_str(),
            if listing.is_ai() { "ai" } else { "community" },
        ])?;
    }

    wtr.flush()?;
    println!("{}", format!("Results exported to {}", filename).green());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
    }

    #[test]
    fn test_export_writes_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let listings = vec![stacksift::testing::listing("1", "Figma", "https://figma.com")];

        export_to_csv(&listings, path.to_str().unwrap()).unwrap();

        let contents = std::fs::read_to_string(path).unwrap();
        assert!(contents.starts_with("id,title,url"));
        assert!(contents.contains("1,Figma,https://figma.com"));
    }
}

//! Terminal rendering for lists, records and failures.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use libris_client::TokenClaims;
use libris_model::{Book, Entity, EntityId, FieldErrors, ListResult, PageLink, Pagination};

use crate::settings::Settings;

/// Titles longer than this are cut in list views.
pub const TITLE_WIDTH: usize = 55;

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn id_text(id: Option<EntityId>) -> String {
    id.map_or_else(|| "-".to_string(), |id| id.to_string())
}

fn optional_cell(value: Option<&str>) -> Cell {
    match value {
        Some(text) if !text.trim().is_empty() => Cell::new(text),
        _ => dim_cell("-"),
    }
}

pub fn books_table(books: &[Book]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("ID"),
        header_cell("Title"),
        header_cell("Authors"),
        header_cell("Publisher"),
        header_cell("Location"),
        header_cell("Collection"),
        header_cell("Year"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 6, CellAlignment::Right);
    for book in books {
        table.add_row(vec![
            Cell::new(id_text(book.id)),
            Cell::new(book.short_title(TITLE_WIDTH)),
            Cell::new(book.authors_display()),
            Cell::new(&book.publisher),
            Cell::new(&book.location.name),
            optional_cell(book.collection.as_ref().map(|c| c.name.as_str())),
            optional_cell(book.year.as_deref()),
        ]);
    }
    table
}

/// Two-column table for collections and locations.
pub fn named_table<R: Entity>(items: &[R]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("ID"), header_cell("Name")]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for item in items {
        table.add_row(vec![
            Cell::new(id_text(item.id())),
            Cell::new(item.display_name()),
        ]);
    }
    table
}

/// Every field of one book, one row per field.
pub fn book_detail(book: &Book) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Field"), header_cell("Value")]);
    apply_table_style(&mut table);
    let join = |names: Vec<&str>| names.join(", ");
    let rows: Vec<(&str, Cell)> = vec![
        ("ID", Cell::new(id_text(book.id))),
        ("Title", Cell::new(&book.title)),
        ("Authors", optional_cell(Some(&book.authors_display()))),
        ("Publisher", optional_cell(Some(&book.publisher))),
        (
            "Languages",
            optional_cell(Some(&join(
                book.languages.iter().map(|l| l.name.as_str()).collect(),
            ))),
        ),
        (
            "Genres",
            optional_cell(Some(&join(
                book.genres.iter().map(|g| g.name.as_str()).collect(),
            ))),
        ),
        ("Edition", optional_cell(book.edition.as_deref())),
        ("ISBN", optional_cell(book.isbn.as_deref())),
        ("Year", optional_cell(book.year.as_deref())),
        ("Location", Cell::new(&book.location.name)),
        (
            "Collection",
            optional_cell(book.collection.as_ref().map(|c| c.name.as_str())),
        ),
        ("Cover", dim_cell(book.cover_or_default())),
    ];
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label).add_attribute(Attribute::Bold), value]);
    }
    table
}

/// One line of paging controls followed by a position summary.
///
/// Disabled controls are left out, the current page is bracketed and gaps
/// in the window show as `…`.
pub fn pagination_footer(pagination: &Pagination, window: usize) -> String {
    let mut parts: Vec<String> = Vec::new();
    if pagination.can_go_first() {
        parts.push("«".to_string());
    }
    if pagination.can_go_prev() {
        parts.push("‹".to_string());
    }
    for link in pagination.window(window) {
        parts.push(match link {
            PageLink::Page(page) if page == pagination.current_page() => format!("[{page}]"),
            PageLink::Page(page) => page.to_string(),
            PageLink::Ellipsis => "…".to_string(),
        });
    }
    if pagination.can_go_next() {
        parts.push("›".to_string());
    }
    if pagination.can_go_last() {
        parts.push("»".to_string());
    }
    format!(
        "{}  page {} of {} ({} items)",
        parts.join(" "),
        pagination.current_page(),
        pagination.total_pages(),
        pagination.total_items()
    )
}

/// How many records matched, across every page.
pub fn count_line<T>(result: &ListResult<T>, noun: &str) -> String {
    match result.total_items {
        1 => format!("1 {noun}"),
        n => format!("{n} {noun}s"),
    }
}

/// `field: message` lines, sorted by field name.
pub fn field_errors(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("  {field}: {message}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn claims_table(claims: &TokenClaims) -> Table {
    let mut table = Table::new();
    apply_table_style(&mut table);
    table.add_row(vec![header_cell("User"), Cell::new(&claims.username)]);
    table.add_row(vec![header_cell("ID"), Cell::new(claims.id)]);
    table.add_row(vec![
        header_cell("Expires"),
        Cell::new(claims.expiry.format("%Y-%m-%d %H:%M UTC")),
    ]);
    table
}

pub fn settings_table(settings: &Settings) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Setting"), header_cell("Value")]);
    apply_table_style(&mut table);
    table.add_row(vec![Cell::new("api_host"), Cell::new(&settings.api_host)]);
    table.add_row(vec![
        Cell::new("timeout_secs"),
        Cell::new(settings.timeout_secs),
    ]);
    table.add_row(vec![Cell::new("page_size"), Cell::new(settings.page_size)]);
    table.add_row(vec![Cell::new("debounce_ms"), Cell::new(settings.debounce_ms)]);
    table
}

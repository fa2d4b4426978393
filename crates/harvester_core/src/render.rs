use std::fmt::Write;

use crate::DiscoveryBook;

/// Renders the harvest output: one `--- {version} ---` header per version in book
/// order, followed by that version's entries sorted ascending, one per line.
pub fn render_discoveries(book: &DiscoveryBook) -> String {
    let mut out = String::new();
    for (api_version, set) in book.iter() {
        let _ = writeln!(out, "--- {api_version} ---");
        for entry in set.sorted_entries() {
            out.push_str(&entry);
            out.push('\n');
        }
    }
    out
}

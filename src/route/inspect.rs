//! Route previews.
//!
//! The inspector evaluates a bounded number of matches and prints them in
//! columns followed by a total. Routes that are hidden, have no source, or
//! turn out to have more matches than the limit only report their chain
//! description.

use super::Route;
use crate::config::InspectSettings;
use crate::error::Result;
use std::io::Write;

/// Renders route previews with a fixed set of settings.
pub struct Inspector<'a> {
    settings: &'a InspectSettings,
}

impl<'a> Inspector<'a> {
    pub fn new(settings: &'a InspectSettings) -> Self {
        Self { settings }
    }

    /// Print a preview of `route` to `out` and return its description.
    ///
    /// At most `limit` rendered matches are held at once (the settings'
    /// limit when `None`). When the route yields more than that, nothing is
    /// printed, the route is hidden from later inspections and only the
    /// description is returned.
    pub fn inspect<W: Write>(&self, route: &Route, limit: Option<usize>, out: &mut W) -> Result<String> {
        let description = route.describe();
        if self.settings.hide_elements || route.is_hidden() || !route.has_source() {
            return Ok(description);
        }

        let limit = limit.unwrap_or(self.settings.limit);
        let mut rendered = Vec::new();
        let mut total = 0usize;
        for element in route.elements()? {
            let element = element?;
            total += 1;
            if total > limit {
                tracing::debug!("{} has more than {} matches, hiding elements", description, limit);
                route.hide();
                return Ok(description);
            }
            rendered.push(element.to_string());
        }

        write_columns(&rendered, self.settings.columns, out)?;
        writeln!(out, "Total: {}", total)?;
        Ok(description)
    }
}

/// Lay `cells` out left to right in as many columns as fit in `width`.
/// Cells are padded to the widest one and separated by a single space.
/// Always at least one column.
pub fn write_columns<W: Write>(cells: &[String], width: usize, out: &mut W) -> std::io::Result<()> {
    let Some(widest) = cells.iter().map(|c| c.chars().count()).max() else {
        return Ok(());
    };
    let cell_width = widest + 1;
    let per_row = (width / cell_width).max(1);
    for row in cells.chunks(per_row) {
        let line: String = row
            .iter()
            .map(|cell| format!("{:<cell_width$}", cell))
            .collect();
        writeln!(out, "{}", line.trim_end())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Item;
    use crate::graph::{MemoryGraph, Properties};
    use crate::route::{GraphRoutes, Source};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn preview(route: &Route, settings: &InspectSettings, limit: Option<usize>) -> (String, String) {
        let mut out = Vec::new();
        let description = Inspector::new(settings).inspect(route, limit, &mut out).unwrap();
        (description, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_preview_lists_matches_and_total() {
        let route = Route::from_items([1, 2, 3]);
        let (description, out) = preview(&route, &InspectSettings::default(), None);
        assert_eq!(description, "#<Obj>");
        assert_eq!(out, "1 2 3\nTotal: 3\n");
    }

    #[test]
    fn test_overflow_falls_back_without_buffering() {
        let pulled = Arc::new(AtomicUsize::new(0));
        let counter = pulled.clone();
        let route = Route::from_items([1, 2, 3, 4, 5]).filter(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        });

        let (description, out) = preview(&route, &InspectSettings::default(), Some(2));
        assert_eq!(description, route.describe());
        assert!(out.is_empty());
        assert_eq!(pulled.load(Ordering::SeqCst), 3);
        assert!(route.is_hidden());

        // hidden now, so a second preview does not evaluate at all
        preview(&route, &InspectSettings::default(), Some(10));
        assert_eq!(pulled.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_description_only_cases() {
        let settings = InspectSettings::default();
        let hidden_globally = InspectSettings::hidden();

        let (_, out) = preview(&Route::from_items([1]), &hidden_globally, None);
        assert!(out.is_empty());

        let route = Route::from_items([1]);
        route.hide();
        let (_, out) = preview(&route, &settings, None);
        assert!(out.is_empty());

        let (description, out) = preview(&Route::builder().build().uniq(), &settings, None);
        assert_eq!(description, "#<Obj -> Obj(Duplicate)>");
        assert!(out.is_empty());

        let null = Route::builder().source(Source::Null).build();
        let (_, out) = preview(&null, &settings, None);
        assert!(out.is_empty());
    }

    #[test]
    fn test_exact_limit_still_previews() {
        let route = Route::from_items([1, 2]);
        let (_, out) = preview(&route, &InspectSettings::default(), Some(2));
        assert!(out.ends_with("Total: 2\n"));
        assert!(!route.is_hidden());
    }

    #[test]
    fn test_graph_elements_render() {
        let graph = MemoryGraph::new("g");
        graph.add_vertex(Properties::new());
        graph.add_vertex(Properties::new());
        let (description, out) = preview(&graph.v(), &InspectSettings::default(), None);
        assert_eq!(description, "#<V>");
        assert_eq!(out, "#<V[0]> #<V[1]>\nTotal: 2\n");
    }

    #[test]
    fn test_columns_wrap_to_width() {
        let cells: Vec<String> = (0..5).map(|n| Item::from(n * 100).to_string()).collect();
        let mut out = Vec::new();
        // widest cell is 3 chars, so each column takes 4
        write_columns(&cells, 12, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "0   100 200\n300 400\n");
    }

    #[test]
    fn test_columns_never_drop_below_one() {
        let cells = vec!["a long cell".to_string(), "b".to_string()];
        let mut out = Vec::new();
        write_columns(&cells, 4, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a long cell\nb\n");
    }
}

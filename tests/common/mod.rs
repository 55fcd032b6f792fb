//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;

use graphroute::{Element, Item, Route};

/// Names of the vertices a route yields, in order
pub fn names(route: &Route) -> Vec<String> {
    route
        .to_vec()
        .expect("route should evaluate")
        .iter()
        .map(name_of)
        .collect()
}

/// The `name` property of an element, or an empty string
pub fn name_of(element: &Element) -> String {
    element
        .property("name")
        .and_then(|value| value.as_str().map(str::to_string))
        .unwrap_or_default()
}

/// Plain integer values a route yields
pub fn ints(route: &Route) -> Vec<i64> {
    route
        .items()
        .expect("route should evaluate")
        .iter()
        .filter_map(Item::as_i64)
        .collect()
}

//! Grouping of sorted routes by domain.

use indexmap::IndexMap;

use crate::routing::route::Route;

/// Domain → routes, in first-seen order.
pub type DomainGroups<'a> = IndexMap<&'a str, Vec<&'a Route>>;

/// Group routes by domain, keeping the order of the input: a domain sits
/// where its first route appeared, and routes keep their relative order.
pub fn group_by_domain(routes: &[Route]) -> DomainGroups<'_> {
    let mut groups: DomainGroups<'_> = IndexMap::new();
    for route in routes {
        groups.entry(route.domain.as_str()).or_default().push(route);
    }
    groups
}

//! Route grouping.
//!
//! Routes are sorted by name in natural order (`9` before `12`, `12` before
//! `12к`), then partitioned by transport type. Groups appear in the order
//! their type is first met in the sorted sequence.

use crate::types::{Route, TransportType};
use std::cmp::Ordering;

/// Routes of one transport type, in natural name order.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteGroup<'a> {
    /// Transport type shared by every route of the group.
    pub kind: TransportType,
    /// Member routes.
    pub routes: Vec<&'a Route>,
}

/// Sorts and partitions routes. Routes without a type are left out.
#[must_use]
pub fn group(routes: &[Route]) -> Vec<RouteGroup<'_>> {
    let mut sorted: Vec<&Route> = routes.iter().collect();
    // Stable: equal names keep document order.
    sorted.sort_by(|a, b| natural_cmp(&a.name, &b.name));

    let mut groups: Vec<RouteGroup<'_>> = Vec::new();
    for route in sorted {
        let Some(kind) = route.kind else { continue };
        match groups.iter_mut().find(|g| g.kind == kind) {
            Some(group) => group.routes.push(route),
            None => groups.push(RouteGroup { kind, routes: vec![route] }),
        }
    }
    groups
}

/// A run of either digits or non-digits.
#[derive(Debug, PartialEq, Eq)]
enum Chunk<'a> {
    Number(&'a str),
    Text(&'a str),
}

fn chunks(s: &str) -> impl Iterator<Item = Chunk<'_>> {
    let mut rest = s;
    std::iter::from_fn(move || {
        let first = rest.chars().next()?;
        let is_digit = first.is_ascii_digit();
        let end = rest.find(|c: char| c.is_ascii_digit() != is_digit).unwrap_or(rest.len());
        let (head, tail) = rest.split_at(end);
        rest = tail;
        Some(if is_digit { Chunk::Number(head) } else { Chunk::Text(head) })
    })
}

/// Compares digit runs by value without overflowing on long runs.
fn cmp_digits(a: &str, b: &str) -> Ordering {
    let a_trim = a.trim_start_matches('0');
    let b_trim = b.trim_start_matches('0');
    a_trim
        .len()
        .cmp(&b_trim.len())
        .then_with(|| a_trim.cmp(b_trim))
        // "07" after "7" so the order stays total.
        .then_with(|| a.len().cmp(&b.len()))
}

/// Natural ordering: embedded numbers compare by value, text by code point.
/// Numbers sort before text at the same position.
#[must_use]
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = chunks(a);
    let mut right = chunks(b);
    loop {
        let ord = match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(Chunk::Number(x)), Some(Chunk::Number(y))) => cmp_digits(x, y),
            (Some(Chunk::Text(x)), Some(Chunk::Text(y))) => x.cmp(y),
            (Some(Chunk::Number(_)), Some(Chunk::Text(_))) => Ordering::Less,
            (Some(Chunk::Text(_)), Some(Chunk::Number(_))) => Ordering::Greater,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
}

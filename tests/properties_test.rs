//! Property tests for ordering, marquee, layout and arrivals.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use std::cmp::Ordering;
use stopboard::arrivals::{self, Arrivals};
use stopboard::grouping::{group, natural_cmp};
use stopboard::layout::{self, WIDTH_MINIMAL, WIDTH_NO_FREQ_AND_HOURS, WIDTH_NO_HOURS};
use stopboard::marquee::{self, Marquee};
use stopboard::types::{BriefSchedule, Event, Route, TransportType};

fn kind() -> impl Strategy<Value = Option<TransportType>> {
    prop_oneof![
        Just(None),
        Just(Some(TransportType::Bus)),
        Just(Some(TransportType::Tramway)),
        Just(Some(TransportType::Trolleybus)),
        Just(Some(TransportType::Minibus)),
    ]
}

fn route_name() -> impl Strategy<Value = String> {
    "[0-9]{0,3}[а-яa-z]{0,2}[0-9]{0,2}"
}

fn event() -> impl Strategy<Value = Event> {
    prop_oneof![
        proptest::option::of(-1.0e6f64..1.0e6).prop_map(|value| Event::Estimated { value }),
        proptest::option::of("[0-9]{1,2}:[0-9]{2}").prop_map(|text| Event::Scheduled { text }),
    ]
}

proptest! {
    #[test]
    fn prop_numeric_names_sort_by_value(numbers in proptest::collection::vec(0u32..100_000, 0..30)) {
        let routes: Vec<Route> = numbers
            .iter()
            .map(|n| Route::new(n.to_string(), Some(TransportType::Bus)))
            .collect();
        let groups = group(&routes);

        let mut expected = numbers.clone();
        expected.sort_unstable();
        let got: Vec<u32> = groups
            .iter()
            .flat_map(|g| g.routes.iter().map(|r| r.name.parse::<u32>().unwrap()))
            .collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_groups_are_sorted_and_typed(
        routes in proptest::collection::vec((route_name(), kind()), 0..40)
    ) {
        let routes: Vec<Route> = routes.into_iter().map(|(name, kind)| Route::new(name, kind)).collect();
        let groups = group(&routes);

        let typed = routes.iter().filter(|r| r.kind.is_some()).count();
        prop_assert_eq!(groups.iter().map(|g| g.routes.len()).sum::<usize>(), typed);

        for g in &groups {
            prop_assert!(!g.routes.is_empty());
            for pair in g.routes.windows(2) {
                prop_assert_ne!(natural_cmp(&pair[0].name, &pair[1].name), Ordering::Greater);
            }
            prop_assert!(g.routes.iter().all(|r| r.kind == Some(g.kind)));
        }
        for (i, a) in groups.iter().enumerate() {
            prop_assert!(groups[i + 1..].iter().all(|b| b.kind != a.kind));
        }
    }

    #[test]
    fn prop_natural_cmp_is_antisymmetric(a in route_name(), b in route_name()) {
        prop_assert_eq!(natural_cmp(&a, &b), natural_cmp(&b, &a).reverse());
        prop_assert_eq!(natural_cmp(&a, &b) == Ordering::Equal, a == b);
    }

    #[test]
    fn prop_marquee_width_and_determinism(
        text in "[A-Za-zА-Яа-я0-9 ]{0,40}",
        width in 0usize..30,
        counter in any::<u64>(),
    ) {
        let first = marquee::slice(&text, width, counter);
        prop_assert_eq!(first.chars().count(), width);
        prop_assert_eq!(&first, &marquee::slice(&text, width, counter));
    }

    #[test]
    fn prop_marquee_is_periodic(
        text in "[a-z]{1,30}",
        width in 1usize..10,
        counter in 0u64..10_000,
    ) {
        let len = text.chars().count();
        prop_assume!(len > width);
        let cycle = (len + Marquee::ROUTE_NAME.gap) as u64;
        prop_assert_eq!(marquee::slice(&text, width, counter), marquee::slice(&text, width, counter + cycle));
    }

    #[test]
    fn prop_terminals_marquee_never_exceeds_width(
        text in "[a-z -]{0,60}",
        width in 0usize..40,
        counter in any::<u64>(),
    ) {
        let slice = Marquee::TERMINALS.slice(&text, width, counter);
        prop_assert!(slice.chars().count() <= width);
    }

    #[test]
    fn prop_layout_is_monotonic(a in 0u16..500, b in 0u16..500) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let (small, large) = (layout::columns(lo), layout::columns(hi));
        prop_assert!(small.route_name_width <= large.route_name_width);
        prop_assert!(small.terminals_width <= large.terminals_width);
        prop_assert!(!small.show_terminals || large.show_terminals);
        prop_assert!(!small.show_frequency || large.show_frequency);
        prop_assert!(!small.show_hours || large.show_hours);
    }

    #[test]
    fn prop_layout_visibility_thresholds(w in 0u16..500) {
        let c = layout::columns(w);
        prop_assert_eq!(c.show_terminals, w >= WIDTH_MINIMAL);
        prop_assert_eq!(c.show_frequency, w >= WIDTH_NO_FREQ_AND_HOURS);
        prop_assert_eq!(c.show_hours, w >= WIDTH_NO_HOURS);
        prop_assert!(c.route_name_width <= 15);
    }

    #[test]
    fn prop_no_reference_no_claims(events in proptest::collection::vec(event(), 0..10)) {
        let route = Route::new("1", Some(TransportType::Bus))
            .with_schedule(BriefSchedule { frequency: None, events: Some(events) });
        prop_assert_eq!(arrivals::compute(&route, None), Arrivals::default());
    }

    #[test]
    fn prop_minutes_never_negative(offsets in proptest::collection::vec(-10_000.0f64..10_000.0, 1..8)) {
        let reference = 1_792_148_591.0;
        let events = offsets.iter().map(|o| Event::Estimated { value: Some(reference + o) }).collect();
        let route = Route::new("1", Some(TransportType::Bus))
            .with_schedule(BriefSchedule { frequency: None, events: Some(events) });

        let result = arrivals::compute(&route, Some(reference));
        prop_assert_eq!(result.imminent, offsets.iter().any(|o| (reference + o) - reference < 90.0));
        for part in result.text.split(' ') {
            prop_assert!(part.parse::<u64>().is_ok(), "bad minute {part:?}");
        }
    }

    #[test]
    fn prop_truncated_arrivals_fit(text in "[0-9]{1,3}( [0-9]{1,2}(:[0-9]{2})?){0,8}") {
        let cut = arrivals::truncate_arrivals(&text);
        prop_assert!(cut.chars().count() <= arrivals::ARRIVALS_MAX_CHARS);
        prop_assert!(text.starts_with(&cut));
    }
}

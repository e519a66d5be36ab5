// tests/template_properties.rs

use std::collections::{BTreeMap, BTreeSet};

use proptest::prelude::*;
use samlocal::errors::SamLocalError;
use samlocal::template::{FunctionArgs, RouteEvent, SamTemplate};

// Logical IDs: a letter followed by letters/digits.
fn names_strategy(max: usize) -> impl Strategy<Value = BTreeSet<String>> {
    proptest::collection::btree_set("[A-Za-z][A-Za-z0-9]{0,11}", 1..=max)
}

fn routes_strategy() -> impl Strategy<Value = BTreeMap<String, String>> {
    proptest::collection::btree_map("[a-z][a-z0-9]{0,7}", "/[a-z]{1,8}", 1..5)
}

proptest! {
    #[test]
    fn every_function_gets_exactly_one_resource_with_defaults(
        names in names_strategy(12),
        memory in proptest::option::of(128u32..=10_240),
    ) {
        let mut template = SamTemplate::new();
        for name in &names {
            let args = FunctionArgs {
                memory_size: memory,
                ..FunctionArgs::new(format!("{name}/handler.handler"))
            };
            template.add_function(name, args);
        }

        prop_assert_eq!(template.len(), names.len());
        for name in &names {
            let props = &template.resource(name).unwrap().properties;
            prop_assert_eq!(props.memory_size, memory.unwrap_or(128));
            prop_assert_eq!(props.runtime.as_str(), "nodejs16.x");
            prop_assert_eq!(props.timeout, 30);
        }
        prop_assert!(template.document().outputs.is_none());
    }

    #[test]
    fn named_routes_land_on_one_resource_with_one_output(routes in routes_strategy()) {
        let mut template = SamTemplate::new();
        template.add_function("first", FunctionArgs::new("first/handler.handler"));

        for (key, path) in &routes {
            template
                .add_route("first", key, RouteEvent::http_api(path.clone(), "get"))
                .unwrap();
        }

        prop_assert_eq!(template.len(), 1);
        let events = template
            .resource("first")
            .unwrap()
            .properties
            .events
            .as_ref()
            .unwrap();
        prop_assert_eq!(events.len(), routes.len());

        let yaml = template.to_yaml().unwrap();
        prop_assert_eq!(yaml.matches("WebEndpoint").count(), 1);
    }

    #[test]
    fn route_on_unknown_function_never_creates_a_resource(
        existing in names_strategy(4),
        missing in "[A-Za-z][A-Za-z0-9]{0,11}",
    ) {
        prop_assume!(!existing.contains(&missing));

        let mut template = SamTemplate::new();
        for name in &existing {
            template.add_function(name, FunctionArgs::new("handler.handler"));
        }

        let err = template
            .add_route(&missing, "api", RouteEvent::http_api("/test", "any"))
            .unwrap_err();

        prop_assert!(matches!(err, SamLocalError::UnknownFunction(ref name) if *name == missing));
        prop_assert_eq!(template.len(), existing.len());
        prop_assert!(template.resource(&missing).is_none());
        prop_assert!(template.document().outputs.is_none());
    }

    #[test]
    fn rendering_is_deterministic(names in names_strategy(8)) {
        let build = |order: Vec<&String>| {
            let mut template = SamTemplate::new();
            for name in order {
                template.add_function(name, FunctionArgs::new("handler.handler"));
            }
            template.to_yaml().unwrap()
        };

        let forward = build(names.iter().collect());
        let backward = build(names.iter().rev().collect());
        prop_assert_eq!(forward, backward);
    }
}

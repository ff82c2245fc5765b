// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;

#[yare::parameterized(
    regular  = { WorkspaceType::Regular,  "ws" },
    prebuild = { WorkspaceType::Prebuild, "prebuild" },
    probe    = { WorkspaceType::Probe,    "probe" },
    ghost    = { WorkspaceType::Ghost,    "ghost" },
)]
fn unit_prefix(ty: WorkspaceType, expected: &str) {
    assert_eq!(ty.unit_prefix(), expected);
}

#[test]
fn workspace_type_parses_from_label() {
    for ty in WorkspaceType::ALL {
        assert_eq!(ty.as_label().parse::<WorkspaceType>(), Ok(ty));
    }
    assert!("imagebuild".parse::<WorkspaceType>().is_err());
}

#[test]
fn workspace_type_serializes_screaming() {
    let json = serde_json::to_string(&WorkspaceType::Prebuild).unwrap();
    assert_eq!(json, "\"PREBUILD\"");
    let err = serde_json::from_str::<WorkspaceType>("\"IMAGEBUILD\"");
    assert!(err.is_err());
}

#[test]
fn port_visibility_round_trips_through_str() {
    assert_eq!("public".parse(), Ok(PortVisibility::Public));
    assert_eq!("private".parse(), Ok(PortVisibility::Private));
    assert!("internal".parse::<PortVisibility>().is_err());
}

#[test]
fn equivalence_ignores_url() {
    let mut a = PortSpec::new(8080, 3000, PortVisibility::Public);
    let b = PortSpec::new(8080, 3000, PortVisibility::Public);
    a.url = Some("http://example.com:10000".to_string());
    assert!(a.is_equivalent(&b));
    assert_ne!(a, b);

    let c = PortSpec::new(8080, 3000, PortVisibility::Private);
    assert!(!a.is_equivalent(&c));
}

proptest! {
    #[test]
    fn sort_ports_is_ordered_and_stable(ports in prop::collection::vec((1u32..65535, 1u32..65535), 0..16)) {
        let mut specs: Vec<_> = ports
            .iter()
            .map(|(p, t)| PortSpec::new(*p, *t, PortVisibility::Private))
            .collect();
        sort_ports(&mut specs);
        prop_assert!(specs.windows(2).all(|w| w[0].port <= w[1].port));

        let mut again = specs.clone();
        again.reverse();
        sort_ports(&mut again);
        prop_assert_eq!(again, specs);
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

fn vars(id: &WorkspaceId) -> UrlVars<'_> {
    UrlVars {
        host: "ws.example.com",
        ingress_port: 10001,
        id,
        prefix: "abc",
        workspace_port: 8080,
    }
}

#[parameterized(
    host_and_port = { "{{ .Host }}:{{ .IngressPort }}", "ws.example.com:10001" },
    no_spaces = { "https://{{.Host}}:{{.IngressPort}}/", "https://ws.example.com:10001/" },
    subdomain = { "https://{{ .WorkspacePort }}-{{ .Prefix }}.{{ .Host }}", "https://8080-abc.ws.example.com" },
    identity = { "http://{{ .Host }}/{{ .ID }}", "http://ws.example.com/foobar" },
    literal = { "https://static.example.com", "https://static.example.com" },
)]
fn renders(source: &str, expected: &str) {
    let id = WorkspaceId::new("foobar");
    let template = UrlTemplate::parse(source).unwrap();
    assert_eq!(template.render(&vars(&id)), expected);
}

#[test]
fn unknown_variable_is_rejected() {
    let err = UrlTemplate::parse("{{ .Host }}:{{ .Port }}").unwrap_err();
    assert_eq!(err, TemplateError::UnknownVariable("Port".to_string()));
}

#[test]
fn empty_template_is_rejected() {
    assert_eq!(UrlTemplate::parse("  ").unwrap_err(), TemplateError::Empty);
}

#[test]
fn as_str_returns_source() {
    let template = UrlTemplate::parse("{{ .Host }}").unwrap();
    assert_eq!(template.as_str(), "{{ .Host }}");
}

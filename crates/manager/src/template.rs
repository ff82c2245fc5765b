// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! URL templates for publicly exposed workspace ports.
//!
//! Templates use `{{ .Name }}` placeholders, e.g. `https://{{ .Host }}:{{ .IngressPort }}`.

use regex::{Captures, Regex};
use std::sync::LazyLock;
use thiserror::Error;
use wsman_core::WorkspaceId;

// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*\.(\w+)\s*\}\}").expect("constant regex pattern is valid")
});

/// Variables a URL template may reference
pub const TEMPLATE_VARS: &[&str] = &["Host", "IngressPort", "ID", "Prefix", "WorkspacePort"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unknown template variable '{0}' (known: Host, IngressPort, ID, Prefix, WorkspacePort)")]
    UnknownVariable(String),
    #[error("url template is empty")]
    Empty,
}

/// Values substituted into a [`UrlTemplate`]
#[derive(Debug, Clone)]
pub struct UrlVars<'a> {
    pub host: &'a str,
    pub ingress_port: u32,
    pub id: &'a WorkspaceId,
    pub prefix: &'a str,
    pub workspace_port: u32,
}

/// A URL template whose variables were checked when it was parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    source: String,
}

impl UrlTemplate {
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        if source.trim().is_empty() {
            return Err(TemplateError::Empty);
        }
        for caps in VAR_PATTERN.captures_iter(source) {
            let name = &caps[1];
            if !TEMPLATE_VARS.contains(&name) {
                return Err(TemplateError::UnknownVariable(name.to_string()));
            }
        }
        Ok(Self {
            source: source.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn render(&self, vars: &UrlVars<'_>) -> String {
        VAR_PATTERN
            .replace_all(&self.source, |caps: &Captures| match &caps[1] {
                "Host" => vars.host.to_string(),
                "IngressPort" => vars.ingress_port.to_string(),
                "ID" => vars.id.to_string(),
                "Prefix" => vars.prefix.to_string(),
                "WorkspacePort" => vars.workspace_port.to_string(),
                // parse() rejects anything else
                _ => caps[0].to_string(),
            })
            .into_owned()
    }
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;

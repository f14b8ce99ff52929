use super::vapi_types::VmDetail;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

// Error Handling
use log::warn;
use miette::{IntoDiagnostic, Result};
use vesper_error::{LibError, VesperError, WrapError};

/*
* Content library items are named by structured urns like:
* `urn:vapi:com.vmware.content.library.Item:44dbce63-...`
* Anything else is taken for an inventory vm identifier.
*/
static CATALOG_ITEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^urn:vapi:.+[.:]Item:(?P<id>[A-Za-z0-9._-]+)$").unwrap()
});

/*
* What a provisioning request clones or deploys from.
* The kind decides the vendor call path (clone-vm vs deploy-template),
* and is settled once, here, at the boundary.
*/
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
pub enum TemplateReference {
    /// An inventory vm carrying the template flag ("vm-2001").
    VmTemplate(String),
    /// A content library catalog item (value is the item id
    /// extracted from the urn).
    CatalogItem(String),
}

impl TemplateReference {
    pub fn parse(raw: &str) -> Result<Self, VesperError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(LibError::builder()
                .msg("Empty template reference.")
                .help("Provide a vm id (vm-…) or a content library item urn.")
                .build()
                .into());
        }
        if let Some(caps) = CATALOG_ITEM.captures(raw) {
            let id = caps["id"].to_owned();
            return Ok(TemplateReference::CatalogItem(id));
        }
        Ok(TemplateReference::VmTemplate(raw.to_owned()))
    }
}

impl fmt::Display for TemplateReference {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TemplateReference::VmTemplate(id) => write!(f, "vm-template {}", id),
            TemplateReference::CatalogItem(id) => write!(f, "catalog item {}", id),
        }
    }
}

/*
* Best-effort template check on a clone source.
*
* The authoritative flag is missing from some vCenter responses; fall
* back to naming conventions and say out loud that the answer is a guess.
* The fallback never reroutes between the clone and deploy paths.
*/
pub fn is_template(detail: &VmDetail, vm_ref: &str) -> bool {
    if let Some(flag) = detail.template {
        return flag;
    }
    let name = detail.name.to_lowercase();
    let guess = name.contains("template") || name.contains("tmpl");
    warn!(
        "No authoritative template flag on {}; name heuristic says template={}",
        vm_ref, guess
    );
    guess
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn catalog_urn_classifies_as_catalog_item() -> Result<()> {
        let cases = [
            "urn:vapi:com.vmware.content.library.Item:44dbce63-aa05-4b2c-a807-8a2e1f4ed2e2",
            "urn:vapi:content.library:Item:abc",
        ];
        for raw in cases {
            let parsed = TemplateReference::parse(raw)?;
            assert!(
                matches!(parsed, TemplateReference::CatalogItem(_)),
                "{} should classify as a catalog item",
                raw
            );
        }
        Ok(())
    }

    #[test]
    fn catalog_urn_extracts_item_id() -> Result<()> {
        let parsed =
            TemplateReference::parse("urn:vapi:com.vmware.content.library.Item:abc-123")?;
        assert_eq!(parsed, TemplateReference::CatalogItem("abc-123".to_owned()));
        Ok(())
    }

    #[test]
    fn bare_id_classifies_as_vm_template() -> Result<()> {
        for raw in ["vm-2001", "template-web", "50123abc-dead-beef"] {
            let parsed = TemplateReference::parse(raw)?;
            assert!(
                matches!(parsed, TemplateReference::VmTemplate(_)),
                "{} should classify as a vm reference",
                raw
            );
        }
        Ok(())
    }

    #[test]
    fn empty_reference_is_rejected() {
        assert!(TemplateReference::parse("  ").is_err());
    }

    #[test]
    fn template_flag_wins_over_heuristics() {
        let detail = VmDetail {
            name: "obviously-a-template".to_owned(),
            template: Some(false),
            ..Default::default()
        };
        assert!(!is_template(&detail, "vm-1"));
    }

    #[test]
    fn name_heuristic_applies_without_flag() {
        let detail = VmDetail {
            name: "debian-12-template".to_owned(),
            template: None,
            ..Default::default()
        };
        assert!(is_template(&detail, "vm-1"));

        let detail = VmDetail {
            name: "web-01".to_owned(),
            template: None,
            ..Default::default()
        };
        assert!(!is_template(&detail, "vm-2"));
    }
}

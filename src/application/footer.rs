//! Footer injector: queues the script references a listing page needs.

use std::sync::Arc;

use tracing::debug;

use crate::application::registry::ScriptRegistry;
use crate::domain::hash::script_file_name;
use crate::domain::options::PagelessConfig;
use crate::domain::routing::ViewContext;

pub const JQUERY_ID: &str = "jquery";
pub const SPINNER_ID: &str = "jquery.spinner";
pub const PAGELESS_ID: &str = "jquery.pageless";
pub const SPINNER_SCRIPT: &str = "jquery.spinner.js";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackKind {
    Header,
    Footer,
}

/// A queued script reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRef {
    pub id: String,
    pub url: String,
}

/// Per-render script queues, deduplicated by asset id.
#[derive(Debug, Clone, Default)]
pub struct AssetStack {
    header: Vec<AssetRef>,
    footer: Vec<AssetRef>,
}

impl AssetStack {
    pub fn has(&self, stack: StackKind, id: &str) -> bool {
        self.entries(stack).iter().any(|asset| asset.id == id)
    }

    /// Queue an asset unless one with the same id is already on that stack.
    ///
    /// Returns whether the asset was added.
    pub fn add(&mut self, stack: StackKind, asset: AssetRef) -> bool {
        if self.has(stack, &asset.id) {
            return false;
        }
        match stack {
            StackKind::Header => self.header.push(asset),
            StackKind::Footer => self.footer.push(asset),
        }
        true
    }

    pub fn entries(&self, stack: StackKind) -> &[AssetRef] {
        match stack {
            StackKind::Header => &self.header,
            StackKind::Footer => &self.footer,
        }
    }
}

/// Where the injected scripts live.
#[derive(Debug, Clone)]
pub struct AssetUrls {
    /// URL of the DOM/animation library, used when the page has not loaded one.
    pub jquery_url: String,
    /// Base URL of the embedded static assets (spinner plugin and image).
    pub asset_base_url: String,
    /// Base URL under which `scripts/jquery.pageless_<hash>.js` is served.
    pub script_base_url: String,
}

#[derive(Clone)]
pub struct FooterInjector {
    registry: Arc<ScriptRegistry>,
    urls: AssetUrls,
}

impl FooterInjector {
    pub fn new(registry: Arc<ScriptRegistry>, urls: AssetUrls) -> Self {
        Self { registry, urls }
    }

    pub fn urls(&self) -> &AssetUrls {
        &self.urls
    }

    /// Queue jQuery, the spinner plugin and the generated script on the footer stack.
    ///
    /// Single item views are left alone. Returns the references added by this
    /// call, so a repeated call on the same stack returns nothing.
    pub fn inject_assets(
        &self,
        stack: &mut AssetStack,
        view: &ViewContext,
        config: &PagelessConfig,
    ) -> Vec<AssetRef> {
        let Some(context) = view.listing() else {
            return Vec::new();
        };

        let mut added = Vec::new();
        let mut queue = |stack: &mut AssetStack, asset: AssetRef| {
            if stack.add(StackKind::Footer, asset.clone()) {
                added.push(asset);
            }
        };

        if !stack.has(StackKind::Header, JQUERY_ID) {
            queue(
                stack,
                AssetRef {
                    id: JQUERY_ID.to_string(),
                    url: self.urls.jquery_url.clone(),
                },
            );
        }

        queue(
            stack,
            AssetRef {
                id: SPINNER_ID.to_string(),
                url: format!(
                    "{}/{SPINNER_SCRIPT}",
                    self.urls.asset_base_url.trim_end_matches('/')
                ),
            },
        );

        let hash = self.registry.register(config, context);
        queue(
            stack,
            AssetRef {
                id: PAGELESS_ID.to_string(),
                url: format!(
                    "{}/scripts/{}",
                    self.urls.script_base_url.trim_end_matches('/'),
                    script_file_name(&hash)
                ),
            },
        );

        debug!(
            target = "pageless::footer",
            hash = %hash,
            added = added.len(),
            "queued pageless assets"
        );
        added
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use super::*;
    use crate::domain::hash::ConfigHash;
    use crate::domain::routing::RoutingContext;

    fn injector() -> (Arc<ScriptRegistry>, FooterInjector) {
        let registry = Arc::new(ScriptRegistry::new(
            NonZeroUsize::new(8).expect("non-zero"),
        ));
        let injector = FooterInjector::new(
            registry.clone(),
            AssetUrls {
                jquery_url: "https://cdn.example/jquery.min.js".into(),
                asset_base_url: "/static/pageless/".into(),
                script_base_url: "".into(),
            },
        );
        (registry, injector)
    }

    #[test]
    fn listing_pages_get_three_scripts() {
        let (registry, injector) = injector();
        let mut stack = AssetStack::default();
        let config = PagelessConfig::default();
        let context = RoutingContext::Tag { tag: "news".into() };

        let added =
            injector.inject_assets(&mut stack, &ViewContext::Listing(context.clone()), &config);

        let ids: Vec<_> = added.iter().map(|asset| asset.id.as_str()).collect();
        assert_eq!(ids, [JQUERY_ID, SPINNER_ID, PAGELESS_ID]);
        assert_eq!(added[1].url, "/static/pageless/jquery.spinner.js");

        let hash = ConfigHash::compute(&config, &context);
        assert_eq!(
            added[2].url,
            format!("/scripts/jquery.pageless_{hash}.js")
        );
        assert!(registry.lookup(&hash).is_some());
    }

    #[test]
    fn repeated_injection_adds_nothing() {
        let (_, injector) = injector();
        let mut stack = AssetStack::default();
        let view = ViewContext::Listing(RoutingContext::None);
        let config = PagelessConfig::default();

        assert_eq!(injector.inject_assets(&mut stack, &view, &config).len(), 3);
        assert!(injector.inject_assets(&mut stack, &view, &config).is_empty());
        assert_eq!(stack.entries(StackKind::Footer).len(), 3);
    }

    #[test]
    fn header_jquery_is_not_loaded_twice() {
        let (_, injector) = injector();
        let mut stack = AssetStack::default();
        stack.add(
            StackKind::Header,
            AssetRef {
                id: JQUERY_ID.into(),
                url: "/theme/jquery.js".into(),
            },
        );

        let added = injector.inject_assets(
            &mut stack,
            &ViewContext::Listing(RoutingContext::None),
            &PagelessConfig::default(),
        );
        assert!(added.iter().all(|asset| asset.id != JQUERY_ID));
    }

    #[test]
    fn single_views_are_skipped() {
        let (registry, injector) = injector();
        let mut stack = AssetStack::default();
        let added = injector.inject_assets(
            &mut stack,
            &ViewContext::Single {
                slug: "hello".into(),
            },
            &PagelessConfig::default(),
        );
        assert!(added.is_empty());
        assert!(stack.entries(StackKind::Footer).is_empty());
        assert!(registry.is_empty());
    }
}

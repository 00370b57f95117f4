//! Endpoint resolution.
//!
//! Maps a resource (and optionally an entity ID) to the path appended to the
//! base URL. Paths are relative and always start with `/`.

use crate::{config::EndpointConfig, resource::Resource};

/// Resolves API paths for a resource.
pub trait EndpointResolver: Send + Sync + std::fmt::Debug {
    /// Collection path used by `create` and `getAll`.
    fn collection_endpoint(&self, resource: Resource) -> String;

    /// Entity path used by `get`, `update` and `delete`.
    ///
    /// `id` is inserted verbatim; callers validate it beforehand.
    fn entity_endpoint(&self, resource: Resource, id: &str) -> String;
}

/// Resolver using the public API layout (`/contacts`, `/contacts/{id}`, ...).
#[derive(Debug, Clone, Default)]
pub struct DefaultEndpointResolver;

impl DefaultEndpointResolver {
    /// Creates a new default endpoint resolver.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl EndpointResolver for DefaultEndpointResolver {
    fn collection_endpoint(&self, resource: Resource) -> String {
        format!("/{}", resource.collection())
    }

    fn entity_endpoint(&self, resource: Resource, id: &str) -> String {
        format!("/{}/{id}", resource.collection())
    }
}

/// Resolver honoring `[endpoints]` overrides, falling back to the defaults.
#[derive(Debug, Clone)]
pub struct ConfigurableEndpointResolver {
    config: EndpointConfig,
}

impl ConfigurableEndpointResolver {
    /// Creates a new configurable endpoint resolver.
    #[must_use]
    pub fn new(config: &EndpointConfig) -> Self {
        Self { config: config.clone() }
    }

    fn templates(&self, resource: Resource) -> (Option<&String>, Option<&String>) {
        match resource {
            Resource::Contact => (self.config.contacts.as_ref(), self.config.contact.as_ref()),
            Resource::Transaction => {
                (self.config.transactions.as_ref(), self.config.transaction.as_ref())
            }
            Resource::Subscription => {
                (self.config.subscriptions.as_ref(), self.config.subscription.as_ref())
            }
        }
    }
}

impl EndpointResolver for ConfigurableEndpointResolver {
    fn collection_endpoint(&self, resource: Resource) -> String {
        self.templates(resource)
            .0
            .map_or_else(|| DefaultEndpointResolver.collection_endpoint(resource), Clone::clone)
    }

    fn entity_endpoint(&self, resource: Resource, id: &str) -> String {
        self.templates(resource).1.map_or_else(
            || DefaultEndpointResolver.entity_endpoint(resource, id),
            |template| template.replace("{id}", id),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoint_resolver() {
        let resolver = DefaultEndpointResolver::new();

        assert_eq!(resolver.collection_endpoint(Resource::Contact), "/contacts");
        assert_eq!(resolver.collection_endpoint(Resource::Transaction), "/transactions");
        assert_eq!(resolver.collection_endpoint(Resource::Subscription), "/subscriptions");
        assert_eq!(resolver.entity_endpoint(Resource::Contact, "c-1"), "/contacts/c-1");
        assert_eq!(resolver.entity_endpoint(Resource::Transaction, "t-9"), "/transactions/t-9");
        assert_eq!(
            resolver.entity_endpoint(Resource::Subscription, "sub_42"),
            "/subscriptions/sub_42"
        );
    }

    #[test]
    fn test_configurable_endpoint_resolver_overrides() {
        let config = EndpointConfig {
            contacts: Some("/v2/contacts".to_owned()),
            contact: Some("/v2/contacts/{id}/details".to_owned()),
            ..Default::default()
        };
        let resolver = ConfigurableEndpointResolver::new(&config);

        assert_eq!(resolver.collection_endpoint(Resource::Contact), "/v2/contacts");
        assert_eq!(resolver.entity_endpoint(Resource::Contact, "c-1"), "/v2/contacts/c-1/details");
    }

    #[test]
    fn test_configurable_endpoint_resolver_defaults() {
        let resolver = ConfigurableEndpointResolver::new(&EndpointConfig::default());

        assert_eq!(resolver.collection_endpoint(Resource::Transaction), "/transactions");
        assert_eq!(resolver.entity_endpoint(Resource::Subscription, "s-1"), "/subscriptions/s-1");
    }
}

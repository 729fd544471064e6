use crate::client::ResourceClient;
use crate::errors::ResolutionError;
use crate::models::Customer;

#[derive(Debug, Clone)]
pub struct LinkResolver {
    client: ResourceClient,
}

impl LinkResolver {
    pub fn new(client: ResourceClient) -> Self {
        Self { client }
    }

    pub async fn resolve(&self, link: &str) -> Result<Customer, ResolutionError> {
        self.client
            .get::<Customer>(link)
            .await
            .map_err(|source| ResolutionError {
                link: link.to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use serde_json::json;

    #[tokio::test]
    async fn resolves_and_tags_failures() {
        let mut server = Server::new_async().await;
        let _found = server
            .mock("GET", "/api/customers/1")
            .with_status(200)
            .with_body(json!({ "firstname": "Aino", "lastname": "Aalto" }).to_string())
            .create_async()
            .await;
        let _gone = server
            .mock("GET", "/api/customers/2")
            .with_status(404)
            .create_async()
            .await;

        let resolver = LinkResolver::new(ResourceClient::new(format!("{}/api", server.url())));
        let customer = resolver
            .resolve(&format!("{}/api/customers/1", server.url()))
            .await
            .unwrap();
        assert_eq!(customer.display_name().as_deref(), Some("Aino Aalto"));

        let missing_link = format!("{}/api/customers/2", server.url());
        let err = resolver.resolve(&missing_link).await.unwrap_err();
        assert_eq!(err.link, missing_link);
        assert!(err.source.is_not_found());
    }
}

use crate::envelope::decode_collection;
use crate::errors::NetworkError;
use reqwest::{Client, Response};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Customers,
    Trainings,
}

impl Collection {
    pub fn path(self) -> &'static str {
        match self {
            Self::Customers => "customers",
            Self::Trainings => "trainings",
        }
    }

    pub fn rel(self) -> &'static str {
        self.path()
    }
}

#[derive(Debug, Clone)]
pub struct ResourceClient {
    http: Client,
    base_url: String,
}

impl ResourceClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn collection_url(&self, collection: Collection) -> String {
        format!("{}/{}", self.base_url, collection.path())
    }

    pub async fn list<T: DeserializeOwned>(&self, collection: Collection) -> Result<Vec<T>, NetworkError> {
        let url = self.collection_url(collection);
        debug!(%url, "listing collection");
        let response = self.http.get(&url).send().await?;
        let body = read_json(response).await?;
        decode_collection(body, collection.rel()).map_err(|err| NetworkError::decode(err.to_string()))
    }

    pub async fn get<T: DeserializeOwned>(&self, link: &str) -> Result<T, NetworkError> {
        debug!(%link, "fetching resource");
        let response = self.http.get(link).send().await?;
        decode(read_json(response).await?)
    }

    pub async fn create<T, P>(&self, collection: Collection, payload: &P) -> Result<T, NetworkError>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let url = self.collection_url(collection);
        debug!(%url, "creating resource");
        let response = self.http.post(&url).json(payload).send().await?;
        decode(read_json(response).await?)
    }

    pub async fn update<T, P>(&self, link: &str, payload: &P) -> Result<T, NetworkError>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        debug!(%link, "updating resource");
        let response = self.http.put(link).json(payload).send().await?;
        decode(read_json(response).await?)
    }

    pub async fn delete(&self, link: &str) -> Result<(), NetworkError> {
        debug!(%link, "deleting resource");
        let response = self.http.delete(link).send().await?;
        read_json(response).await.map(|_| ())
    }
}

async fn read_json(response: Response) -> Result<Value, NetworkError> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if !status.is_success() {
        let text = String::from_utf8_lossy(&bytes);
        let message = match text.trim() {
            "" => status.canonical_reason().unwrap_or("request failed").to_string(),
            trimmed => trimmed.to_string(),
        };
        return Err(NetworkError::status(status.as_u16(), message));
    }

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&bytes).map_err(|err| NetworkError::decode(format!("invalid JSON body: {err}")))
}

fn decode<T: DeserializeOwned>(body: Value) -> Result<T, NetworkError> {
    serde_json::from_value(body).map_err(|err| NetworkError::decode(err.to_string()))
}

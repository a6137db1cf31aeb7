use async_trait::async_trait;
use shared::{
    domain::{CatalogEntry, Document, QueryResult, SystemInfo, WorldBankInfo},
    error::ClientError,
    protocol::{
        parse_catalog, CountryCatalogResponse, IndicatorCatalogResponse, QueryRequest,
        UpdateKnowledgeRequest, UpdateKnowledgeResponse, UploadResponse,
    },
};
use url::Url;

pub mod transport;

pub use transport::{RequestBody, RequestOptions, Transport, UploadFile};

const SYSTEM_INFO_PATH: &str = "/system/";
const WORLDBANK_INFO_PATH: &str = "/worldbank/system-info/";
const WORLDBANK_UPDATE_PATH: &str = "/worldbank/update-knowledge/";
const WORLDBANK_QUERY_PATH: &str = "/worldbank/query/";
const DOCUMENTS_PATH: &str = "/documents/";
const QUERY_PATH: &str = "/query/";
const COUNTRY_CATALOG_PATH: &str = "/world-bank/countries";
const INDICATOR_CATALOG_PATH: &str = "/world-bank/indicators";

/// Every call the console makes against the RAG API.
#[async_trait]
pub trait RagBackend: Send + Sync {
    async fn system_info(&self) -> Result<SystemInfo, ClientError>;
    async fn worldbank_info(&self) -> Result<WorldBankInfo, ClientError>;
    async fn update_worldbank_knowledge(
        &self,
        request: &UpdateKnowledgeRequest,
    ) -> Result<UpdateKnowledgeResponse, ClientError>;
    async fn query_worldbank(&self, request: &QueryRequest) -> Result<QueryResult, ClientError>;
    async fn list_documents(&self) -> Result<Vec<Document>, ClientError>;
    async fn upload_document(&self, file: UploadFile) -> Result<UploadResponse, ClientError>;
    async fn query(&self, request: &QueryRequest) -> Result<QueryResult, ClientError>;
    async fn worldbank_countries(&self) -> Result<Vec<CatalogEntry>, ClientError>;
    async fn worldbank_indicators(&self) -> Result<Vec<CatalogEntry>, ClientError>;
}

#[derive(Clone)]
pub struct RagClient {
    transport: Transport,
}

impl RagClient {
    pub fn new(origin: &Url) -> Self {
        Self {
            transport: Transport::new(origin),
        }
    }

    pub fn with_transport(transport: Transport) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }
}

#[async_trait]
impl RagBackend for RagClient {
    async fn system_info(&self) -> Result<SystemInfo, ClientError> {
        self.transport.get(SYSTEM_INFO_PATH).await
    }

    async fn worldbank_info(&self) -> Result<WorldBankInfo, ClientError> {
        self.transport.get(WORLDBANK_INFO_PATH).await
    }

    async fn update_worldbank_knowledge(
        &self,
        request: &UpdateKnowledgeRequest,
    ) -> Result<UpdateKnowledgeResponse, ClientError> {
        self.transport
            .post_json(WORLDBANK_UPDATE_PATH, request)
            .await
    }

    async fn query_worldbank(&self, request: &QueryRequest) -> Result<QueryResult, ClientError> {
        self.transport.post_json(WORLDBANK_QUERY_PATH, request).await
    }

    async fn list_documents(&self) -> Result<Vec<Document>, ClientError> {
        self.transport.get(DOCUMENTS_PATH).await
    }

    async fn upload_document(&self, file: UploadFile) -> Result<UploadResponse, ClientError> {
        self.transport
            .request(DOCUMENTS_PATH, RequestOptions::post_file(file))
            .await
    }

    async fn query(&self, request: &QueryRequest) -> Result<QueryResult, ClientError> {
        self.transport.post_json(QUERY_PATH, request).await
    }

    async fn worldbank_countries(&self) -> Result<Vec<CatalogEntry>, ClientError> {
        let response: CountryCatalogResponse = self.transport.get(COUNTRY_CATALOG_PATH).await?;
        Ok(parse_catalog(&response.countries))
    }

    async fn worldbank_indicators(&self) -> Result<Vec<CatalogEntry>, ClientError> {
        let response: IndicatorCatalogResponse =
            self.transport.get(INDICATOR_CATALOG_PATH).await?;
        Ok(parse_catalog(&response.indicators))
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

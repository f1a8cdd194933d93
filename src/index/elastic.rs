//! reqwest adapter for an Elasticsearch-compatible document index, covering
//! both collaborators: the index itself and the trained-model APIs behind
//! the sparse embedding service.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::config::{IndexConfig, ModelConfig};
use crate::error::SearchError;
use crate::index::{
    BulkItemError, BulkReceipt, DocumentIndex, FacetCounts, IndexResults, ScoredDoc,
};
use crate::model::{SparseModel, SparseVector};
use crate::models::{Document, DocumentUpsert, FacetBucket};
use crate::query::{FacetSpec, FilterSet, LexicalSubQuery, PlanSpec, SemanticSubQuery};

/// Field the ingest pipeline reads as inference input.
const INFER_INPUT_FIELD: &str = "text_field";

pub struct ElasticBackend {
    client: reqwest::Client,
    base_url: String,
    index: String,
    username: Option<String>,
    password: Option<String>,
    sparse_model_id: String,
    dense_model_id: String,
    ingest_pipeline: String,
}

impl ElasticBackend {
    pub fn new(client: reqwest::Client, index: &IndexConfig, model: &ModelConfig) -> Self {
        Self {
            client,
            base_url: index.base_url.trim_end_matches('/').to_string(),
            index: index.index_name.clone(),
            username: index.username.clone(),
            password: index.password.clone(),
            sparse_model_id: model.sparse_model_id.clone(),
            dense_model_id: model.dense_model_id.clone(),
            ingest_pipeline: model.ingest_pipeline.clone(),
        }
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{path}", self.base_url);
        let rb = self.client.request(method, url);
        match &self.username {
            Some(user) => rb.basic_auth(user, self.password.as_deref()),
            None => rb,
        }
    }

    async fn search_one(&self, body: Value) -> Result<EsSearchResponse, SearchError> {
        let resp = self
            .request(Method::POST, &format!("/{}/_search", self.index))
            .json(&body)
            .send()
            .await
            .map_err(SearchError::backend)?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(SearchError::BackendUnavailable(format!(
                "search returned {status}: {body}"
            )));
        }

        resp.json().await.map_err(SearchError::backend)
    }

    async fn infer(&self, model_id: &str, text: &str) -> Result<Value, SearchError> {
        let resp = self
            .request(
                Method::POST,
                &format!("/_ml/trained_models/{model_id}/_infer"),
            )
            .json(&json!({ "docs": [{ INFER_INPUT_FIELD: text }] }))
            .send()
            .await
            .map_err(SearchError::backend)?;

        match resp.status() {
            StatusCode::NOT_FOUND => Err(SearchError::ModelUnavailable(format!(
                "trained model {model_id} is not deployed"
            ))),
            status if !status.is_success() => {
                let body = resp.text().await.unwrap_or_default();
                Err(SearchError::BackendUnavailable(format!(
                    "inference returned {status}: {body}"
                )))
            }
            _ => resp.json().await.map_err(SearchError::backend),
        }
    }

    /// True when a GET on the path returns 2xx, false on 404.
    async fn exists(&self, path: &str) -> Result<bool, SearchError> {
        let resp = self
            .request(Method::GET, path)
            .send()
            .await
            .map_err(SearchError::backend)?;

        match resp.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            status => {
                let body = resp.text().await.unwrap_or_default();
                Err(SearchError::BackendUnavailable(format!(
                    "status check on {path} returned {status}: {body}"
                )))
            }
        }
    }

    /// Issue an idempotent setup call, tolerating "already exists" replies.
    async fn setup_call(&self, method: Method, path: &str, body: Value) -> Result<(), SearchError> {
        let resp = self
            .request(method, path)
            .json(&body)
            .send()
            .await
            .map_err(SearchError::backend)?;

        let status = resp.status();
        if status.is_success()
            || status == StatusCode::CONFLICT
            || status == StatusCode::BAD_REQUEST
        {
            // 409/400 mean the resource or deployment already exists.
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        Err(SearchError::BackendUnavailable(format!(
            "setup call {path} returned {status}: {body}"
        )))
    }
}

// ─── Query body builders ─────────────────────────────────

fn filter_clauses(filters: &FilterSet) -> Vec<Value> {
    let mut clauses = Vec::new();
    if let Some(category) = &filters.category {
        clauses.push(json!({ "term": { "category.keyword": { "value": category } } }));
    }
    if !filters.file_types.is_empty() {
        clauses.push(json!({ "terms": { "file_type.keyword": filters.file_types } }));
    }
    clauses
}

fn lexical_clause(lexical: Option<&LexicalSubQuery>) -> Value {
    match lexical {
        Some(q) => json!({
            "multi_match": { "query": q.text, "fields": q.fields }
        }),
        None => json!({ "match_all": {} }),
    }
}

fn semantic_clause(semantic: &SemanticSubQuery, model_id: &str) -> Value {
    json!({
        "text_expansion": {
            semantic.vector_field: {
                "model_id": model_id,
                "model_text": semantic.text,
            }
        }
    })
}

fn facet_aggs(facets: &FacetSpec) -> Value {
    json!({
        "category-agg": { "terms": { "field": facets.category_field } },
        "year-agg": {
            "date_histogram": {
                "field": facets.year_field,
                "calendar_interval": "year",
                "format": "yyyy",
            }
        },
        "file_type-agg": { "terms": { "field": facets.file_type_field } },
    })
}

fn search_body(must: Value, filters: &FilterSet, size: usize, aggs: Option<&FacetSpec>) -> Value {
    let mut body = json!({
        "query": {
            "bool": {
                "must": must,
                "filter": filter_clauses(filters),
            }
        },
        "size": size,
    });
    if let Some(facets) = aggs {
        body["aggs"] = facet_aggs(facets);
    }
    body
}

// ─── Response payloads ───────────────────────────────────

#[derive(Deserialize)]
struct EsSearchResponse {
    hits: EsHits,
    #[serde(default)]
    aggregations: Option<EsAggs>,
}

#[derive(Deserialize)]
struct EsHits {
    total: EsTotal,
    hits: Vec<EsHit>,
}

#[derive(Deserialize)]
struct EsTotal {
    value: u64,
}

#[derive(Deserialize)]
struct EsHit {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_score")]
    score: Option<f32>,
    #[serde(rename = "_source")]
    source: Document,
}

#[derive(Deserialize)]
struct EsAggs {
    #[serde(rename = "category-agg")]
    category: EsAggBuckets,
    #[serde(rename = "year-agg")]
    year: EsAggBuckets,
    #[serde(rename = "file_type-agg")]
    file_type: EsAggBuckets,
}

#[derive(Deserialize)]
struct EsAggBuckets {
    buckets: Vec<EsBucket>,
}

#[derive(Deserialize)]
struct EsBucket {
    key: Value,
    #[serde(default)]
    key_as_string: Option<String>,
    doc_count: u64,
}

impl EsBucket {
    /// Display key: the formatted string when present (year histograms key
    /// on epoch millis otherwise), else the raw key.
    fn display_key(&self) -> String {
        if let Some(s) = &self.key_as_string {
            return s.clone();
        }
        match &self.key {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    fn into_facet(self) -> FacetBucket {
        FacetBucket {
            key: self.display_key(),
            count: self.doc_count,
        }
    }
}

fn into_scored(hits: EsHits) -> Vec<ScoredDoc> {
    hits.hits
        .into_iter()
        .map(|h| ScoredDoc {
            id: h.id,
            score: h.score.unwrap_or_default(),
            fields: h.source,
        })
        .collect()
}

fn into_facet_counts(aggs: Option<EsAggs>) -> FacetCounts {
    match aggs {
        Some(aggs) => FacetCounts {
            category: aggs.category.buckets.into_iter().map(EsBucket::into_facet).collect(),
            year: aggs.year.buckets.into_iter().map(EsBucket::into_facet).collect(),
            file_types: aggs.file_type.buckets.into_iter().map(EsBucket::into_facet).collect(),
        },
        None => FacetCounts::default(),
    }
}

#[derive(Deserialize)]
struct EsBulkResponse {
    #[serde(default)]
    items: Vec<EsBulkItem>,
}

#[derive(Deserialize)]
struct EsBulkItem {
    index: EsBulkItemResult,
}

#[derive(Deserialize)]
struct EsBulkItemResult {
    #[serde(rename = "_id")]
    id: Option<String>,
    error: Option<EsBulkError>,
}

#[derive(Deserialize)]
struct EsBulkError {
    reason: Option<String>,
}

#[derive(Deserialize)]
struct EsGetResponse {
    #[serde(rename = "_source")]
    source: Document,
}

// ─── DocumentIndex ───────────────────────────────────────

#[async_trait]
impl DocumentIndex for ElasticBackend {
    async fn execute(
        &self,
        plan: &PlanSpec,
        offset: usize,
        limit: usize,
    ) -> Result<IndexResults, SearchError> {
        // Fetch generously per sub-query so paging the fused list never
        // truncates a candidate either side would have surfaced.
        let fetch = offset + limit * 3;

        let lexical_body = search_body(
            lexical_clause(plan.lexical.as_ref()),
            &plan.filters,
            fetch,
            Some(&plan.facets),
        );

        let (lexical_resp, semantic_resp) = match &plan.semantic {
            Some(semantic) => {
                let semantic_body = search_body(
                    semantic_clause(semantic, &self.sparse_model_id),
                    &plan.filters,
                    fetch,
                    None,
                );
                let (lex, sem) =
                    tokio::join!(self.search_one(lexical_body), self.search_one(semantic_body));
                (lex?, Some(sem?))
            }
            None => (self.search_one(lexical_body).await?, None),
        };

        let total = lexical_resp.hits.total.value;
        let facets = into_facet_counts(lexical_resp.aggregations);

        Ok(IndexResults {
            lexical_hits: into_scored(lexical_resp.hits),
            semantic_hits: semantic_resp.map(|r| into_scored(r.hits)).unwrap_or_default(),
            facets,
            total,
        })
    }

    async fn bulk_upsert(&self, documents: &[DocumentUpsert]) -> Result<BulkReceipt, SearchError> {
        if documents.is_empty() {
            return Ok(BulkReceipt::default());
        }

        let mut body = String::new();
        for doc in documents {
            let id = doc
                .id
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string());
            let action = json!({ "index": { "_index": self.index, "_id": id } });
            body.push_str(&action.to_string());
            body.push('\n');
            body.push_str(&serde_json::to_string(&doc.fields).map_err(SearchError::backend)?);
            body.push('\n');
        }

        let resp = self
            .request(Method::POST, &format!("/_bulk?pipeline={}", self.ingest_pipeline))
            .header("content-type", "application/x-ndjson")
            .body(body)
            .send()
            .await
            .map_err(SearchError::backend)?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(SearchError::BackendUnavailable(format!(
                "bulk returned {status}: {body}"
            )));
        }

        let parsed: EsBulkResponse = resp.json().await.map_err(SearchError::backend)?;

        let mut receipt = BulkReceipt::default();
        for (i, item) in parsed.items.into_iter().enumerate() {
            match item.index.error {
                Some(err) => receipt.errors.push(BulkItemError {
                    index: i,
                    id: item.index.id,
                    reason: err.reason.unwrap_or_else(|| "unknown indexing error".to_string()),
                }),
                None => receipt.indexed += 1,
            }
        }

        if !receipt.errors.is_empty() {
            tracing::warn!(
                "bulk upsert: {} of {} documents failed",
                receipt.errors.len(),
                documents.len()
            );
        }

        Ok(receipt)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Document>, SearchError> {
        let resp = self
            .request(Method::GET, &format!("/{}/_doc/{id}", self.index))
            .send()
            .await
            .map_err(SearchError::backend)?;

        match resp.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let parsed: EsGetResponse = resp.json().await.map_err(SearchError::backend)?;
                Ok(Some(parsed.source))
            }
            status => {
                let body = resp.text().await.unwrap_or_default();
                Err(SearchError::BackendUnavailable(format!(
                    "get returned {status}: {body}"
                )))
            }
        }
    }
}

// ─── SparseModel ─────────────────────────────────────────

#[async_trait]
impl SparseModel for ElasticBackend {
    async fn is_deployed(&self) -> Result<bool, SearchError> {
        let model_path = format!("/_ml/trained_models/{}", self.sparse_model_id);
        if !self.exists(&model_path).await? {
            return Ok(false);
        }
        let pipeline_path = format!("/_ingest/pipeline/{}", self.ingest_pipeline);
        self.exists(&pipeline_path).await
    }

    async fn deploy(&self) -> Result<(), SearchError> {
        // Register the trained model, start serving it, and install the
        // ingest pipeline that embeds summaries at index time. Each step
        // tolerates already-exists replies so the trigger is idempotent.
        self.setup_call(
            Method::PUT,
            &format!("/_ml/trained_models/{}", self.sparse_model_id),
            json!({ "input": { "field_names": [INFER_INPUT_FIELD] } }),
        )
        .await?;

        self.setup_call(
            Method::POST,
            &format!(
                "/_ml/trained_models/{}/deployment/_start",
                self.sparse_model_id
            ),
            json!({}),
        )
        .await?;

        self.setup_call(
            Method::PUT,
            &format!("/_ingest/pipeline/{}", self.ingest_pipeline),
            json!({
                "processors": [{
                    "inference": {
                        "model_id": self.sparse_model_id,
                        "input_output": [{
                            "input_field": "summary",
                            "output_field": "sparse_embedding",
                        }],
                    }
                }]
            }),
        )
        .await
    }

    async fn embed_sparse(&self, text: &str) -> Result<SparseVector, SearchError> {
        let value = self.infer(&self.sparse_model_id, text).await?;

        #[derive(Deserialize)]
        struct InferResponse {
            inference_results: Vec<InferResult>,
        }
        #[derive(Deserialize)]
        struct InferResult {
            predicted_value: SparseVector,
        }

        let parsed: InferResponse =
            serde_json::from_value(value).map_err(SearchError::backend)?;
        parsed
            .inference_results
            .into_iter()
            .next()
            .map(|r| r.predicted_value)
            .ok_or_else(|| {
                SearchError::BackendUnavailable("inference returned no results".to_string())
            })
    }

    async fn embed_dense(&self, text: &str) -> Result<Vec<f32>, SearchError> {
        let value = self.infer(&self.dense_model_id, text).await?;

        #[derive(Deserialize)]
        struct InferResponse {
            inference_results: Vec<InferResult>,
        }
        #[derive(Deserialize)]
        struct InferResult {
            predicted_value: Vec<f32>,
        }

        let parsed: InferResponse =
            serde_json::from_value(value).map_err(SearchError::backend)?;
        parsed
            .inference_results
            .into_iter()
            .next()
            .map(|r| r.predicted_value)
            .ok_or_else(|| {
                SearchError::BackendUnavailable("inference returned no results".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SearchMode;
    use crate::query;

    #[test]
    fn test_filter_clauses_cover_both_dimensions() {
        let filters = FilterSet {
            category: Some("tutorial".to_string()),
            file_types: vec!["pdf".to_string(), "doc".to_string()],
        };
        let clauses = filter_clauses(&filters);
        assert_eq!(clauses.len(), 2);
        assert_eq!(clauses[0]["term"]["category.keyword"]["value"], "tutorial");
        assert_eq!(clauses[1]["terms"]["file_type.keyword"][1], "doc");
    }

    #[test]
    fn test_browse_plan_builds_match_all_body() {
        let plan = query::plan("", FilterSet::default(), SearchMode::Advanced, true);
        let body = search_body(
            lexical_clause(plan.lexical.as_ref()),
            &plan.filters,
            10,
            Some(&plan.facets),
        );
        assert!(body["query"]["bool"]["must"]["match_all"].is_object());
        assert!(body["aggs"]["year-agg"]["date_histogram"].is_object());
        assert_eq!(body["aggs"]["year-agg"]["date_histogram"]["format"], "yyyy");
    }

    #[test]
    fn test_text_plan_builds_multi_match_and_expansion() {
        let plan = query::plan(
            "machine learning",
            FilterSet {
                category: Some("tutorial".to_string()),
                file_types: vec!["pdf".to_string()],
            },
            SearchMode::Advanced,
            true,
        );

        let lexical = search_body(lexical_clause(plan.lexical.as_ref()), &plan.filters, 10, None);
        assert_eq!(
            lexical["query"]["bool"]["must"]["multi_match"]["query"],
            "machine learning"
        );
        assert_eq!(
            lexical["query"]["bool"]["must"]["multi_match"]["fields"][0],
            "name"
        );
        // Filters ride on every sub-query identically.
        assert_eq!(lexical["query"]["bool"]["filter"].as_array().unwrap().len(), 2);

        let semantic = search_body(
            semantic_clause(plan.semantic.as_ref().unwrap(), ".elser_model_2"),
            &plan.filters,
            10,
            None,
        );
        let expansion = &semantic["query"]["bool"]["must"]["text_expansion"]["sparse_embedding"];
        assert_eq!(expansion["model_text"], "machine learning");
        assert_eq!(expansion["model_id"], ".elser_model_2");
        assert_eq!(
            semantic["query"]["bool"]["filter"],
            lexical["query"]["bool"]["filter"]
        );
    }

    #[test]
    fn test_year_bucket_prefers_formatted_key() {
        let bucket = EsBucket {
            key: json!(1672531200000u64),
            key_as_string: Some("2023".to_string()),
            doc_count: 4,
        };
        assert_eq!(bucket.into_facet(), FacetBucket { key: "2023".to_string(), count: 4 });
    }
}

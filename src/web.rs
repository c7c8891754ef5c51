//! The HTTP surface. Thin by design: handlers unwrap the request, call the
//! router, and marshal its outcome into the response envelope. Every
//! failure below this layer arrives as a value; only a missing `query`
//! field produces a non-200 response.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Map, Value as Json};
use warp::http::StatusCode;
use warp::{reply, Filter, Rejection, Reply};

use crate::document::profiler::DEFAULT_SAMPLE_SIZE;
use crate::document::synthesizer::Complexity;
use crate::router::{Backend, QueryRouter, RenderedQuery, RoutedResponse};

#[derive(Debug, Deserialize)]
struct QueryRequest {
    query: Option<String>,
    database_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    collection: Option<String>,
    sample_size: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct SampleRequest {
    collection: Option<String>,
    complexity: Option<Complexity>,
    seed: Option<u64>,
}

pub async fn serve(router: Arc<QueryRouter>, addr: SocketAddr) {
    warp::serve(routes(router)).run(addr).await;
}

pub fn routes(
    router: Arc<QueryRouter>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let with_router = warp::any().map(move || Arc::clone(&router));

    let query = warp::path!("api" / "query")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_router.clone())
        .and_then(handle_query);

    let table = warp::path!("api" / "query" / "table")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_router.clone())
        .and_then(handle_query_table);

    let sample = warp::path!("api" / "query" / "sample")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_router.clone())
        .and_then(handle_sample);

    let analyze = warp::path!("api" / "analyze")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_router)
        .and_then(handle_analyze);

    let health = warp::path!("api" / "health").and(warp::get()).map(|| {
        reply::json(&json!({
            "status": "healthy",
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }))
    });

    health.or(table).or(sample).or(query).or(analyze)
}

fn bad_request(message: &str) -> reply::WithStatus<reply::Json> {
    reply::with_status(
        reply::json(&json!({ "status": "error", "message": message })),
        StatusCode::BAD_REQUEST,
    )
}

fn ok(body: &Json) -> reply::WithStatus<reply::Json> {
    reply::with_status(reply::json(body), StatusCode::OK)
}

async fn handle_query(
    request: QueryRequest,
    router: Arc<QueryRouter>,
) -> Result<impl Reply, Infallible> {
    let Some(query) = request.query.filter(|q| !q.trim().is_empty()) else {
        return Ok(bad_request("No query provided"));
    };
    let requested = request.database_type.as_deref().and_then(Backend::from_request);
    let routed = router.process(&query, requested).await;
    Ok(ok(&envelope(&routed)))
}

async fn handle_query_table(
    request: QueryRequest,
    router: Arc<QueryRouter>,
) -> Result<impl Reply, Infallible> {
    let Some(query) = request.query.filter(|q| !q.trim().is_empty()) else {
        return Ok(bad_request("No query provided"));
    };
    let requested = request.database_type.as_deref().and_then(Backend::from_request);
    let routed = router.process(&query, requested).await;
    Ok(ok(&table_envelope(&routed)))
}

async fn handle_analyze(
    request: AnalyzeRequest,
    router: Arc<QueryRouter>,
) -> Result<impl Reply, Infallible> {
    let Some(collection) = request.collection.filter(|c| !c.trim().is_empty()) else {
        return Ok(bad_request("No collection provided"));
    };
    let sample_size = request.sample_size.unwrap_or(DEFAULT_SAMPLE_SIZE);
    let body = match router.analyze_collection(&collection, sample_size).await {
        Ok(classification) => json!({
            "status": "success",
            "collection": collection,
            "analysis": classification.summary(),
            "database_used": Backend::Mongodb.as_str(),
        }),
        Err(error) => error_body(Backend::Mongodb, &error.to_string()),
    };
    Ok(ok(&body))
}

async fn handle_sample(
    request: SampleRequest,
    router: Arc<QueryRouter>,
) -> Result<impl Reply, Infallible> {
    let Some(collection) = request.collection.filter(|c| !c.trim().is_empty()) else {
        return Ok(bad_request("No collection provided"));
    };
    let complexity = request.complexity.unwrap_or(Complexity::Simple);
    let body = match router.sample_query(&collection, complexity, request.seed).await {
        Ok(sample) => json!({
            "status": "success",
            "collection": collection,
            "pipeline": sample.pipeline,
            "data": sample.data,
            "database_used": Backend::Mongodb.as_str(),
        }),
        Err(error) => error_body(Backend::Mongodb, &error.to_string()),
    };
    Ok(ok(&body))
}

fn error_body(backend: Backend, message: &str) -> Json {
    json!({
        "status": "error",
        "message": message,
        "database_used": backend.as_str(),
    })
}

fn envelope(routed: &RoutedResponse) -> Json {
    match &routed.result {
        Err(error) => error_body(routed.backend, &error.to_string()),
        Ok(result) => {
            if let Some(message) = result.guidance {
                json!({
                    "status": "success",
                    "message": message,
                    "database_used": routed.backend.as_str(),
                })
            } else {
                json!({
                    "status": "success",
                    "data": result.data,
                    "database_used": routed.backend.as_str(),
                })
            }
        }
    }
}

fn table_envelope(routed: &RoutedResponse) -> Json {
    match &routed.result {
        Err(error) => error_body(routed.backend, &error.to_string()),
        Ok(result) => {
            let mut body = json!({
                "status": "success",
                "data": format_results_as_table(&result.data),
                "database_used": routed.backend.as_str(),
            });
            if let Some(message) = result.guidance {
                body["message"] = json!(message);
            }
            match &result.rendered {
                Some(RenderedQuery::Sql(sql)) => {
                    body["sql_query"] = json!(sql);
                }
                Some(RenderedQuery::Pipeline(pipeline)) => {
                    body["pipeline"] = json!(pipeline);
                }
                None => {}
            }
            body
        }
    }
}

/// Converts result objects into a table whose first row holds the column
/// headers, taken from the first row's keys.
fn format_results_as_table(docs: &[Json]) -> Vec<Vec<String>> {
    let objects: Vec<&Map<String, Json>> = docs.iter().filter_map(Json::as_object).collect();
    let Some(first) = objects.first() else {
        return Vec::new();
    };
    let headers: Vec<String> = first.keys().cloned().collect();

    let mut table = vec![headers.clone()];
    for object in &objects {
        table.push(
            headers
                .iter()
                .map(|header| match object.get(header) {
                    None | Some(Json::Null) => String::new(),
                    Some(Json::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                })
                .collect(),
        );
    }
    table
}

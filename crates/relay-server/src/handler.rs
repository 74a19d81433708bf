use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Json, Response};
use bytes::Bytes;

use relay_graph::Chunker;
use relay_protocol::{
    IdQuery, ProtocolVersion, PullBlocksRequest, PullStoreQuery, PushBlocksResponse,
    PushGraphVersionResponse, PushStoreQuery, PushStoreResponse, OCTET_STREAM,
};

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

fn chunker(chunk_size: usize) -> ServerResult<Chunker> {
    Chunker::new(chunk_size).map_err(|e| ServerError::BadRequest(e.to_string()))
}

fn octet_stream(bytes: Vec<u8>) -> Response {
    ([(header::CONTENT_TYPE, OCTET_STREAM)], bytes).into_response()
}

/// `PUT /store/push`
pub async fn push_store(
    State(state): State<AppState>,
    Query(query): Query<PushStoreQuery>,
    body: Bytes,
) -> ServerResult<Json<PushStoreResponse>> {
    let chunker = chunker(query.chunk_size)?;
    let result = state.relay.push_version_store(&chunker, &body).await?;
    Ok(Json(PushStoreResponse {
        store_root: result.store_root,
        version_root: result.version_root,
    }))
}

/// `GET /store/pull`
pub async fn pull_store(
    State(state): State<AppState>,
    Query(query): Query<PullStoreQuery>,
) -> ServerResult<Response> {
    let chunker = chunker(query.chunk_size)?;
    let bundle = state.relay.pull_version_store(&chunker, &query.id).await?;
    Ok(octet_stream(bundle))
}

/// `GET /store/resolve`
pub async fn resolve_store(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> ServerResult<Json<String>> {
    let root = state.relay.resolve(&query.id).await?;
    Ok(Json(root.to_hex()))
}

/// `PUT /graph/version/push`
pub async fn push_graph_version(
    State(state): State<AppState>,
    body: Bytes,
) -> ServerResult<Json<PushGraphVersionResponse>> {
    let version_root = state.relay.push_graph_version(&body).await?;
    Ok(Json(PushGraphVersionResponse { version_root }))
}

/// `GET /graph/version/pull`
pub async fn pull_graph_version(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> ServerResult<Response> {
    Ok(octet_stream(state.relay.pull_graph_version(&query.id).await?))
}

/// `GET /graph/index/pull`
pub async fn pull_graph_index(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> ServerResult<Response> {
    Ok(octet_stream(state.relay.pull_root_index(&query.id).await?))
}

/// `PUT /blocks/push`
pub async fn push_blocks(
    State(state): State<AppState>,
    body: Bytes,
) -> ServerResult<Json<PushBlocksResponse>> {
    let block_count = state.relay.push_random_blocks(&body).await?;
    Ok(Json(PushBlocksResponse { block_count }))
}

/// `PUT /blocks/pull`
pub async fn pull_blocks(
    State(state): State<AppState>,
    Json(request): Json<PullBlocksRequest>,
) -> ServerResult<Response> {
    Ok(octet_stream(
        state.relay.pull_random_blocks(&request.links).await?,
    ))
}

/// `GET /protocol/version`
pub async fn protocol_version(State(state): State<AppState>) -> Json<ProtocolVersion> {
    Json(state.relay.protocol_version())
}

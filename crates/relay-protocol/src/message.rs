use relay_types::Link;
use serde::{Deserialize, Serialize};

/// Query of `PUT /store/push`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushStoreQuery {
    pub chunk_size: usize,
}

/// Query of `GET /store/pull`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullStoreQuery {
    pub chunk_size: usize,
    pub id: String,
}

/// Query carrying a single history id or root link string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdQuery {
    pub id: String,
}

/// Response of `PUT /store/push`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushStoreResponse {
    pub store_root: Link,
    pub version_root: Link,
}

/// Response of `PUT /graph/version/push`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushGraphVersionResponse {
    pub version_root: Link,
}

/// Response of `PUT /blocks/push`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushBlocksResponse {
    pub block_count: usize,
}

/// Body of `PUT /blocks/pull`.
///
/// Links stay strings here: an unparsable link is reported as a missing
/// block rather than a malformed request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullBlocksRequest {
    pub links: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_store_response_uses_camel_case() {
        let link = Link::for_bytes(b"root");
        let json = serde_json::to_value(PushStoreResponse {
            store_root: link,
            version_root: link,
        })
        .unwrap();
        assert_eq!(json["storeRoot"], serde_json::Value::String(link.to_hex()));
        assert_eq!(json["versionRoot"], serde_json::Value::String(link.to_hex()));
    }

    #[test]
    fn block_count_field_name() {
        let json = serde_json::to_string(&PushBlocksResponse { block_count: 3 }).unwrap();
        assert_eq!(json, r#"{"blockCount":3}"#);
    }

    #[test]
    fn pull_store_query_parses_camel_case() {
        let query: PullStoreQuery =
            serde_json::from_str(r#"{"chunkSize":512,"id":"h"}"#).unwrap();
        assert_eq!(query.chunk_size, 512);
        assert_eq!(query.id, "h");
    }

    #[test]
    fn pull_blocks_request_shape() {
        let req: PullBlocksRequest = serde_json::from_str(r#"{"links":["a","b"]}"#).unwrap();
        assert_eq!(req.links, vec!["a", "b"]);
    }
}

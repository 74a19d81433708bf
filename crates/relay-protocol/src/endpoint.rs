/// HTTP endpoint paths for the relay protocol.
pub mod endpoints {
    pub const STORE_PUSH: &str = "/store/push";
    pub const STORE_PULL: &str = "/store/pull";
    pub const STORE_RESOLVE: &str = "/store/resolve";
    pub const GRAPH_VERSION_PUSH: &str = "/graph/version/push";
    pub const GRAPH_VERSION_PULL: &str = "/graph/version/pull";
    pub const GRAPH_INDEX_PULL: &str = "/graph/index/pull";
    pub const BLOCKS_PUSH: &str = "/blocks/push";
    pub const BLOCKS_PULL: &str = "/blocks/pull";
    pub const PROTOCOL_VERSION: &str = "/protocol/version";
}

/// Content type of bundle request and response bodies.
pub const OCTET_STREAM: &str = "application/octet-stream";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_paths() {
        assert_eq!(endpoints::STORE_PUSH, "/store/push");
        assert_eq!(endpoints::STORE_PULL, "/store/pull");
        assert_eq!(endpoints::GRAPH_INDEX_PULL, "/graph/index/pull");
        assert_eq!(endpoints::BLOCKS_PULL, "/blocks/pull");
        assert_eq!(endpoints::PROTOCOL_VERSION, "/protocol/version");
    }
}

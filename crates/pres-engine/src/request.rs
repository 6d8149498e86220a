//! Request protocol types
//!
//! Every engine request is a JSON envelope `{ "requestId": <kind>, "params": {...} }`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Request kinds understood by the native engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestKind {
    GetRootNodes,
    GetRootNodesCount,
    GetChildren,
    GetChildrenCount,
    GetFilteredNodePaths,
    GetNodePaths,
    LoadHierarchy,
    GetContentDescriptor,
    GetContentSetSize,
    GetContent,
    GetDistinctValues,
    GetPagedDistinctValues,
    GetDisplayLabel,
    CompareHierarchies,
}

impl RequestKind {
    /// Wire name of the request kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GetRootNodes => "GetRootNodes",
            Self::GetRootNodesCount => "GetRootNodesCount",
            Self::GetChildren => "GetChildren",
            Self::GetChildrenCount => "GetChildrenCount",
            Self::GetFilteredNodePaths => "GetFilteredNodePaths",
            Self::GetNodePaths => "GetNodePaths",
            Self::LoadHierarchy => "LoadHierarchy",
            Self::GetContentDescriptor => "GetContentDescriptor",
            Self::GetContentSetSize => "GetContentSetSize",
            Self::GetContent => "GetContent",
            Self::GetDistinctValues => "GetDistinctValues",
            Self::GetPagedDistinctValues => "GetPagedDistinctValues",
            Self::GetDisplayLabel => "GetDisplayLabel",
            Self::CompareHierarchies => "CompareHierarchies",
        }
    }

    /// Count request paired with a paged node request.
    pub fn count_counterpart(&self) -> Option<RequestKind> {
        match self {
            Self::GetRootNodes => Some(Self::GetRootNodesCount),
            Self::GetChildren => Some(Self::GetChildrenCount),
            Self::GetContent => Some(Self::GetContentSetSize),
            _ => None,
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request envelope submitted to the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEnvelope<P> {
    pub request_id: RequestKind,
    pub params: P,
}

impl<P: Serialize> RequestEnvelope<P> {
    /// Create an envelope.
    pub fn new(request_id: RequestKind, params: P) -> Self {
        Self { request_id, params }
    }

    /// Serialize the envelope for the engine.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

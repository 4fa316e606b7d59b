use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// 工作流节点标识（封闭集合）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeId {
    Validation,
    Intake,
    Transcription,
    AbuseDetection,
    Summarization,
    Critic,
    QaScoring,
}

impl NodeId {
    pub const ALL: [NodeId; 7] = [
        NodeId::Validation,
        NodeId::Intake,
        NodeId::Transcription,
        NodeId::AbuseDetection,
        NodeId::Summarization,
        NodeId::Critic,
        NodeId::QaScoring,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeId::Validation => "validation",
            NodeId::Intake => "intake",
            NodeId::Transcription => "transcription",
            NodeId::AbuseDetection => "abuse_detection",
            NodeId::Summarization => "summarization",
            NodeId::Critic => "critic",
            NodeId::QaScoring => "qa_scoring",
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeId {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeId::ALL
            .iter()
            .copied()
            .find(|node| node.as_str() == s)
            .ok_or_else(|| AnalysisError::UnknownNode(s.to_string()))
    }
}

/// 边的目标：某个节点或终点
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Target {
    Node(NodeId),
    End,
}

impl Target {
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Target::Node(node) => Some(*node),
            Target::End => None,
        }
    }
}

impl From<NodeId> for Target {
    fn from(node: NodeId) -> Self {
        Target::Node(node)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Node(node) => node.fmt(f),
            Target::End => f.write_str("END"),
        }
    }
}

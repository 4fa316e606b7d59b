use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::flow::NodeId;

/// 执行路径中的一项；序列化为字符串标签
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct PathEntry {
    pub node: NodeId,
    pub attempt: Option<u32>,
}

impl PathEntry {
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            attempt: None,
        }
    }

    pub fn attempt(node: NodeId, attempt: u32) -> Self {
        Self {
            node,
            attempt: Some(attempt),
        }
    }

    pub fn label(&self) -> String {
        match self.attempt {
            Some(attempt) => format!("{}:v{}", self.node, attempt),
            None => self.node.to_string(),
        }
    }
}

impl fmt::Display for PathEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl From<PathEntry> for String {
    fn from(entry: PathEntry) -> Self {
        entry.label()
    }
}

impl TryFrom<String> for PathEntry {
    type Error = AnalysisError;

    fn try_from(label: String) -> Result<Self, Self::Error> {
        match label.split_once(":v") {
            Some((node, attempt)) => {
                let attempt = attempt
                    .parse::<u32>()
                    .map_err(|_| AnalysisError::Serialization(format!("bad path label `{}`", label)))?;
                Ok(PathEntry::attempt(node.parse()?, attempt))
            }
            None => Ok(PathEntry::new(label.parse()?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_parsing() {
        let entry = PathEntry::try_from("summarization:v3".to_string()).unwrap();
        assert_eq!(entry, PathEntry::attempt(NodeId::Summarization, 3));
        let entry = PathEntry::try_from("qa_scoring".to_string()).unwrap();
        assert_eq!(entry.attempt, None);
        assert!(PathEntry::try_from("summarization:vx".to_string()).is_err());
    }
}

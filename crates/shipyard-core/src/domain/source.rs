use serde::{Deserialize, Serialize};

/// Source は操作の呼び出し元を表す
///
/// すべてのコンストラクタと動的呼び出しに注入される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub app: String,
    pub path: String,
}

impl Source {
    pub fn new(app: impl Into<String>) -> Self {
        Self {
            app: app.into(),
            path: ".".to_string(),
        }
    }
}

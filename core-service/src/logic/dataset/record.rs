use serde::{Deserialize, Serialize};

/// Value of the `type` column that marks a positive sample
pub const PHISHING_TYPE: &str = "phishing";

/// One labeled row from the training CSV
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LabeledUrl {
    pub url: String,

    /// Raw `type` column (`phishing`, `benign`, `defacement`, ...)
    pub kind: String,
}

impl LabeledUrl {
    pub fn new(url: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind: kind.into(),
        }
    }

    /// Only `phishing` is positive; every other type counts as legitimate
    pub fn is_phishing(&self) -> bool {
        self.kind == PHISHING_TYPE
    }
}

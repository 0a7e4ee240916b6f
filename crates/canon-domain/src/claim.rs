//! Claim module - the atomic unit of backstory verification

use crate::span::Span;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

/// Namespace for name-based claim identifiers
const CLAIM_NAMESPACE: Uuid = Uuid::from_u128(0x3f1c_9a2e_77b4_5d08_a6e1_0c4b_92d7_e531);

/// Unique identifier for a claim based on UUIDv5
///
/// Identifiers are derived from the document id and the claim's extraction
/// ordinal, so running extraction twice over the same document yields the
/// same identifiers:
/// - 128-bit uniqueness across documents
/// - No coordination or clock required
/// - Byte-identical dossiers for identical inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ClaimId(u128);

impl ClaimId {
    /// Derive the identifier of the `ordinal`-th claim of `document_id`
    ///
    /// # Examples
    ///
    /// ```
    /// use canon_domain::ClaimId;
    ///
    /// let a = ClaimId::derive("case-17", 0);
    /// assert_eq!(a, ClaimId::derive("case-17", 0));
    /// assert_ne!(a, ClaimId::derive("case-17", 1));
    /// ```
    pub fn derive(document_id: &str, ordinal: usize) -> Self {
        let name = format!("{}#{}", document_id, ordinal);
        Self(Uuid::new_v5(&CLAIM_NAMESPACE, name.as_bytes()).as_u128())
    }

    /// Create a ClaimId from a raw u128 value
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a ClaimId from its hyphenated UUID string
    ///
    /// # Examples
    ///
    /// ```
    /// use canon_domain::ClaimId;
    ///
    /// let id = ClaimId::derive("doc", 3);
    /// let parsed = ClaimId::from_string(&id.to_string()).unwrap();
    /// assert_eq!(id, parsed);
    /// ```
    pub fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid claim id: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl fmt::Display for ClaimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Uuid::from_u128(self.0))
    }
}

impl From<ClaimId> for String {
    fn from(id: ClaimId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for ClaimId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ClaimId::from_string(&value)
    }
}

/// Stated ordering of a temporal claim relative to the claim it references
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalOrder {
    /// "X before Y": X happens strictly earlier than Y
    Before,
    /// "X after Y": X happens strictly later than Y
    After,
}

impl TemporalOrder {
    /// Check a pair of resolved times against the stated order
    ///
    /// `own` is the time of the dependent event X, `referenced` the time of Y.
    pub fn holds<T: Ord>(&self, own: T, referenced: T) -> bool {
        match self {
            TemporalOrder::Before => own < referenced,
            TemporalOrder::After => own > referenced,
        }
    }
}

/// What kind of assertion a claim makes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimKind {
    /// A plain statement about the story world
    Factual,
    /// An ordering statement relative to a referenced claim
    Temporal(TemporalOrder),
    /// A statement that holds because a referenced claim holds
    Causal,
}

impl ClaimKind {
    /// True for causal and temporal claims, which depend on another claim
    pub fn is_dependent(&self) -> bool {
        !matches!(self, ClaimKind::Factual)
    }

    /// Short lowercase label for logs and reports
    pub fn label(&self) -> &'static str {
        match self {
            ClaimKind::Factual => "factual",
            ClaimKind::Temporal(TemporalOrder::Before) => "temporal:before",
            ClaimKind::Temporal(TemporalOrder::After) => "temporal:after",
            ClaimKind::Causal => "causal",
        }
    }
}

/// An atomic assertion extracted from a backstory
///
/// Claims are immutable once extracted; the checker and scorer only read them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    /// Unique identifier
    pub id: ClaimId,

    /// Position in extraction order (0-based)
    pub ordinal: usize,

    /// Byte span in the backstory this claim was taken from
    pub span: Span,

    /// Normalized claim text
    pub text: String,

    /// Subject entities named by the claim
    pub entities: BTreeSet<String>,

    /// Content words other than entity names, used as fact lookup keys
    pub attributes: Vec<String>,

    /// Factual, temporal or causal
    pub kind: ClaimKind,

    /// Claims this one depends on (causal or temporal antecedents)
    pub references: Vec<ClaimId>,
}

impl Claim {
    /// Create a claim with no attributes and no references
    pub fn new(
        id: ClaimId,
        ordinal: usize,
        span: Span,
        text: impl Into<String>,
        entities: impl IntoIterator<Item = String>,
        kind: ClaimKind,
    ) -> Self {
        Self {
            id,
            ordinal,
            span,
            text: text.into(),
            entities: entities.into_iter().collect(),
            attributes: Vec::new(),
            kind,
            references: Vec::new(),
        }
    }

    /// Add a reference to an antecedent claim
    pub fn with_reference(mut self, id: ClaimId) -> Self {
        if !self.references.contains(&id) {
            self.references.push(id);
        }
        self
    }

    /// Set the attribute keys
    pub fn with_attributes(mut self, attributes: Vec<String>) -> Self {
        self.attributes = attributes;
        self
    }

    /// First subject entity in sorted order
    pub fn primary_entity(&self) -> Option<&str> {
        self.entities.iter().next().map(String::as_str)
    }
}

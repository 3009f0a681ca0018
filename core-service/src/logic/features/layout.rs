//! Feature Layout - Centralized Feature Definition
//!
//! **CRITICAL: This file controls the feature schema**
//!
//! ## Rules (NEVER break these):
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION
//!
//! Every persisted model records the version and layout hash it was fit
//! against; a mismatch makes the model unloadable.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
/// MUST be incremented when layout changes
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE SLOTS
// ============================================================================

/// One slot of the feature vector.
///
/// The discriminant is the slot index. Thresholds noted here are the ones
/// that produce an explanation line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(usize)]
pub enum Feature {
    /// Characters in the (scheme-prefixed) URL. Explained when > 75.
    UrlLength = 0,
    /// Characters in the registrable domain label.
    DomainLength = 1,
    /// 1 when the scheme is `https`. Explained when 0.
    HasHttps = 2,
    /// Explained when > 4.
    NumDots = 3,
    /// Explained when > 2.
    NumHyphens = 4,
    NumUnderscores = 5,
    /// Explained when > 0.
    NumAtSymbols = 6,
    NumQuestionMarks = 7,
    NumAmpersands = 8,
    NumEquals = 9,
    /// 1 when the host is an IPv4 literal. Explained when 1.
    HasIpAddress = 10,
    /// Keywords from the fixed list found in the URL. Explained when > 0.
    NumSuspiciousKeywords = 11,
    /// 1 when the host ends in a low-reputation TLD. Explained when 1.
    HasSuspiciousTld = 12,
    /// Characters outside `[A-Za-z0-9]`.
    NumSpecialChars = 13,
    /// Labels in the subdomain part.
    SubdomainCount = 14,
    /// Characters in the path component.
    PathLength = 15,
    /// 1 when an explicit port is present.
    HasPort = 16,
    /// Digits / length of the registrable domain label. Explained when > 0.3.
    DigitRatioInDomain = 17,
}

impl Feature {
    /// All slots, in vector order
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::UrlLength,
        Feature::DomainLength,
        Feature::HasHttps,
        Feature::NumDots,
        Feature::NumHyphens,
        Feature::NumUnderscores,
        Feature::NumAtSymbols,
        Feature::NumQuestionMarks,
        Feature::NumAmpersands,
        Feature::NumEquals,
        Feature::HasIpAddress,
        Feature::NumSuspiciousKeywords,
        Feature::HasSuspiciousTld,
        Feature::NumSpecialChars,
        Feature::SubdomainCount,
        Feature::PathLength,
        Feature::HasPort,
        Feature::DigitRatioInDomain,
    ];

    /// Slot index in the vector
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Stable snake_case name
    pub const fn name(self) -> &'static str {
        FEATURE_LAYOUT[self as usize]
    }

}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Feature names in exact order they appear in the vector
/// This is the SINGLE SOURCE OF TRUTH for feature layout
pub const FEATURE_LAYOUT: &[&str] = &[
    // === Length (0-1) ===
    "url_length",              // 0
    "domain_length",           // 1

    // === Transport (2) ===
    "has_https",               // 2

    // === Character counts (3-9) ===
    "num_dots",                // 3
    "num_hyphens",             // 4
    "num_underscores",         // 5
    "num_at_symbols",          // 6
    "num_question_marks",      // 7
    "num_ampersands",          // 8
    "num_equals",              // 9

    // === Host indicators (10-12) ===
    "has_ip_address",          // 10
    "num_suspicious_keywords", // 11
    "has_suspicious_tld",      // 12

    // === Structure (13-16) ===
    "num_special_chars",       // 13
    "subdomain_count",         // 14
    "path_length",             // 15
    "has_port",                // 16

    // === Ratios (17) ===
    "digit_ratio_in_domain",   // 17
];

/// Total number of features
/// IMPORTANT: Must match FEATURE_LAYOUT.len()!
pub const FEATURE_COUNT: usize = 18;

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 hash of the feature layout
/// Used to detect layout mismatches at runtime
pub fn layout_hash() -> u32 {
    let mut hasher = Hasher::new();

    hasher.update(&[FEATURE_VERSION]);

    for name in FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information for serialization/logging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for LayoutInfo {
    fn default() -> Self {
        Self::current()
    }
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Error when feature layout doesn't match expected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "feature layout mismatch: expected v{expected_version} (hash: {expected_hash:08x}), \
     got v{actual_version} (hash: {actual_hash:08x})"
)]
pub struct LayoutMismatchError {
    pub expected_version: u8,
    pub expected_hash: u32,
    pub actual_version: u8,
    pub actual_hash: u32,
}

/// Validate that incoming data matches current layout
pub fn validate_layout(incoming_version: u8, incoming_hash: u32) -> Result<(), LayoutMismatchError> {
    let current_hash = layout_hash();

    if incoming_version != FEATURE_VERSION || incoming_hash != current_hash {
        return Err(LayoutMismatchError {
            expected_version: FEATURE_VERSION,
            expected_hash: current_hash,
            actual_version: incoming_version,
            actual_hash: incoming_hash,
        });
    }

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

//! Integration Tests for URL Feature Extraction
//!
//! Properties that must hold for any input, not just the fixtures.

#[cfg(test)]
mod integration_tests {
    use proptest::prelude::*;

    use crate::logic::features::{
        Feature, UrlFeatureExtractor, FEATURE_COUNT, FEATURE_VERSION, layout_hash,
    };

    /// Same input, same vector and explanations
    #[test]
    fn test_extraction_is_deterministic_for_fixtures() {
        let extractor = UrlFeatureExtractor::new();
        for url in [
            "http://login-paypal-secure.tk/verify?x=1&y=2",
            "https://www.google.com",
            "http://192.168.1.1/account",
            "example.com",
            "",
        ] {
            assert_eq!(extractor.extract(url), extractor.extract(url));
        }
    }

    /// Every vector carries the current layout
    #[test]
    fn test_vector_layout_is_stable() {
        let extractor = UrlFeatureExtractor::new();
        let a = extractor.extract("https://a.example.org/x");
        let b = extractor.extract("ftp://10.0.0.1:21/pub");
        for out in [&a, &b] {
            assert_eq!(out.vector.version, FEATURE_VERSION);
            assert_eq!(out.vector.layout_hash, layout_hash());
            assert_eq!(out.vector.as_slice().len(), FEATURE_COUNT);
        }
    }

    proptest! {
        #[test]
        fn prop_extract_is_deterministic(url in "\\PC{0,120}") {
            let extractor = UrlFeatureExtractor::new();
            prop_assert_eq!(extractor.extract(&url), extractor.extract(&url));
        }

        #[test]
        fn prop_values_respect_ranges(url in "[a-zA-Z0-9:/?&=@._~%-]{0,100}") {
            let out = UrlFeatureExtractor::new().extract(&url);
            for (feature, value) in out.vector.named_values() {
                prop_assert!(value.is_finite());
                prop_assert!(value >= 0.0, "{} was negative", feature);
            }
            let ratio = out.vector.get(Feature::DigitRatioInDomain);
            prop_assert!((0.0..=1.0).contains(&ratio));
            for flag in [Feature::HasHttps, Feature::HasIpAddress, Feature::HasSuspiciousTld, Feature::HasPort] {
                let v = out.vector.get(flag);
                prop_assert!(v == 0.0 || v == 1.0);
            }
        }
    }
}

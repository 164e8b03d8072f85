//! Resolves the extractor variant once at startup.

use tracing::{info, warn};

use healix_contracts::{
    error::{HealixError, HealixResult},
    vocabulary::SymptomVocabulary,
};
use healix_core::{
    config::{ExtractorMode, ExtractorSettings},
    traits::SymptomExtractor,
};

use crate::{keyword::KeywordExtractor, rich::LemmaOverlapExtractor};

/// Build the extractor selected by `settings.mode`.
///
/// `Auto` falls back to keyword matching when the vocabulary has no
/// matchable label. `Rich` turns that same condition into a startup error.
pub fn build_extractor(
    settings: &ExtractorSettings,
    vocabulary: &SymptomVocabulary,
) -> HealixResult<Box<dyn SymptomExtractor>> {
    if settings.mode == ExtractorMode::Keyword {
        info!(extractor = "keyword", "symptom extractor selected by configuration");
        return Ok(Box::new(KeywordExtractor::new()));
    }

    let rich = LemmaOverlapExtractor::new(vocabulary, settings.threshold, settings.min_overlap);
    if rich.is_capable() {
        info!(
            extractor = "lemma-overlap",
            labels = rich.matchable_labels(),
            threshold = settings.threshold,
            "symptom extractor selected"
        );
        return Ok(Box::new(rich));
    }

    match settings.mode {
        ExtractorMode::Rich => Err(HealixError::ConfigError {
            reason: "extractor.mode is 'rich' but the vocabulary has no matchable labels"
                .to_string(),
        }),
        _ => {
            warn!("rich extractor unavailable; falling back to keyword extraction");
            Ok(Box::new(KeywordExtractor::new()))
        }
    }
}

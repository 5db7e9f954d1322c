use crate::analyzer::ResumeAnalyzer;
use crate::config::Config;

/// Process-wide pipeline context, constructed once in `main` and passed by
/// reference to every call site. Nothing in this crate reaches for a global:
/// the completion client, extractor, and analyzer config all travel through
/// the analyzer held here.
pub struct AppContext {
    pub analyzer: ResumeAnalyzer,
    pub config: Config,
}

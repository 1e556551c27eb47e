use crate::slot::affordance::{Affordance, ManualReason};
use crate::types::types::Resolution;

/// Maps a per-subject resolution to slot content.
///
/// | Resolution   | Affordance                                  |
/// |--------------|---------------------------------------------|
/// | `Found`      | `Download`                                  |
/// | `NotFound`   | `ManualSearch` (given URL, else `fallback`) |
/// | `Unresolved` | `Fetch` (user may retry)                    |
pub fn affordance_for(resolution: Resolution, fallback: &str) -> Affordance {
    match resolution {
        Resolution::Found { download_url } => Affordance::Download { url: download_url },
        Resolution::NotFound { manual_url } => Affordance::ManualSearch {
            url: manual_url.unwrap_or_else(|| fallback.to_string()),
            reason: ManualReason::NotFound,
        },
        Resolution::Unresolved => Affordance::Fetch,
    }
}

/// Content every collected slot receives when the batch as a whole fails.
pub fn batch_failure(fallback: &str) -> Affordance {
    Affordance::ManualSearch {
        url: fallback.to_string(),
        reason: ManualReason::LookupFailed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_prefers_server_url() {
        let a = affordance_for(
            Resolution::NotFound { manual_url: Some("https://m/x".into()) },
            "https://default/",
        );
        assert_eq!(a.url(), Some("https://m/x"));

        let b = affordance_for(Resolution::NotFound { manual_url: None }, "https://default/");
        assert_eq!(b.url(), Some("https://default/"));
    }

    #[test]
    fn unresolved_restores_fetch() {
        assert_eq!(affordance_for(Resolution::Unresolved, "https://default/"), Affordance::Fetch);
    }
}

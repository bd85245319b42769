//! Context assembly: scrape the top-ranked results into one labeled blob.

use ragpipe_core::{RankedResult, TextExtractor};

/// Build the context blob from the top `max_results` ranked results.
///
/// Extraction failures become an inline placeholder rather than an
/// error, so one bad URL never costs the others their content. Each
/// section is already bounded by the extractor; the blob total is not.
pub async fn build_context(
    extractor: &dyn TextExtractor,
    ranked: &[RankedResult],
    max_results: usize,
) -> String {
    let mut sections = Vec::new();
    for (i, r) in ranked.iter().take(max_results).enumerate() {
        let url = &r.result.url;
        let content = match extractor.extract(url).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "scrape failed; using placeholder");
                format!("Failed to scrape content from {url}: {e}")
            }
        };
        if content.is_empty() {
            continue;
        }
        sections.push(format!(
            "Source {}: {} ({})\n\n{}\n\n",
            i + 1,
            r.result.title,
            url,
            content
        ));
    }
    sections.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testutil::MapExtractor;
    use ragpipe_core::{RankedResult, SearchResult};

    fn ranked(urls: &[&str]) -> Vec<RankedResult> {
        urls.iter()
            .enumerate()
            .map(|(i, url)| RankedResult {
                result: SearchResult {
                    title: format!("Title {i}"),
                    url: (*url).to_string(),
                    snippet: String::new(),
                },
                relevance_score: 10.0 - i as f64,
                explanation: String::new(),
            })
            .collect()
    }

    #[tokio::test]
    async fn never_extracts_more_than_max_results() {
        let extractor = MapExtractor::new(&[
            ("https://1.example", Ok("one")),
            ("https://2.example", Ok("two")),
            ("https://3.example", Ok("three")),
            ("https://4.example", Ok("four")),
        ]);
        let blob = build_context(
            &extractor,
            &ranked(&[
                "https://1.example",
                "https://2.example",
                "https://3.example",
                "https://4.example",
            ]),
            3,
        )
        .await;
        assert_eq!(extractor.calls(), 3);
        assert!(blob.contains("three"));
        assert!(!blob.contains("four"));
    }

    #[tokio::test]
    async fn one_failing_url_does_not_lose_the_others() {
        let extractor = MapExtractor::new(&[
            ("https://ok.example", Ok("good content")),
            ("https://bad.example", Err("connection refused")),
            ("https://also.example", Ok("more content")),
        ]);
        let blob = build_context(
            &extractor,
            &ranked(&[
                "https://ok.example",
                "https://bad.example",
                "https://also.example",
            ]),
            3,
        )
        .await;
        assert!(blob.contains("good content"));
        assert!(blob.contains("more content"));
        assert!(blob.contains("Failed to scrape content from https://bad.example:"));
    }

    #[tokio::test]
    async fn sections_are_labeled_in_rank_order() {
        let extractor = MapExtractor::new(&[
            ("https://first.example", Ok("aaa")),
            ("https://second.example", Ok("bbb")),
        ]);
        let blob = build_context(
            &extractor,
            &ranked(&["https://first.example", "https://second.example"]),
            3,
        )
        .await;
        let s1 = blob.find("Source 1: Title 0 (https://first.example)").unwrap();
        let s2 = blob
            .find("Source 2: Title 1 (https://second.example)")
            .unwrap();
        assert!(s1 < s2);
    }

    #[tokio::test]
    async fn empty_extractions_are_skipped() {
        let extractor = MapExtractor::new(&[
            ("https://empty.example", Ok("")),
            ("https://full.example", Ok("body")),
        ]);
        let blob = build_context(
            &extractor,
            &ranked(&["https://empty.example", "https://full.example"]),
            3,
        )
        .await;
        assert!(!blob.contains("Source 1"));
        assert!(blob.contains("Source 2: Title 1 (https://full.example)"));
    }
}

//! Splits model replies into prose and chart segments

use regex::Regex;
use std::sync::OnceLock;

use super::templates::CHART_FENCE_TAG;
use crate::error::{Error, Result};
use crate::types::{ChartSpec, Segment};

fn chart_block_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern = format!(r"(?s)```{}(.*?)```", regex::escape(CHART_FENCE_TAG));
        Regex::new(&pattern).expect("chart block pattern is valid")
    })
}

/// Split reply text into ordered segments.
///
/// A reply with `n` chart blocks always yields `n + 1` prose segments
/// interleaved with them, empty prose included.
pub fn split_reply(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    for captures in chart_block_regex().captures_iter(text) {
        let (Some(whole), Some(body)) = (captures.get(0), captures.get(1)) else {
            continue;
        };

        segments.push(Segment::Prose(text[cursor..whole.start()].to_string()));
        segments.push(match parse_chart(body.as_str()) {
            Ok(spec) => Segment::Chart(spec),
            Err(e) => {
                tracing::warn!("Chart block failed to parse: {}", e);
                Segment::ChartError {
                    raw: body.as_str().trim().to_string(),
                    message: e.to_string(),
                }
            }
        });
        cursor = whole.end();
    }

    segments.push(Segment::Prose(text[cursor..].to_string()));
    segments
}

/// Parse one chart block body
pub fn parse_chart(body: &str) -> Result<ChartSpec> {
    let spec: ChartSpec =
        serde_json::from_str(body.trim()).map_err(|e| Error::ChartParse(e.to_string()))?;

    if spec.series.is_empty() {
        return Err(Error::ChartParse("chart has no data series".to_string()));
    }
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChartKind;

    const BAR: &str = r##"{"type":"bar","title":"Traffic","xKey":"month","data":[{"month":"Jan","traffic":1000}],"dataKeys":[{"key":"traffic","color":"#3b82f6","name":"Traffic"}]}"##;
    const LINE: &str = r##"{"type":"line","title":"CVR","xKey":"week","data":[{"week":"W1","cvr":2.5}],"dataKeys":[{"key":"cvr","color":"#10b981"}]}"##;

    #[test]
    fn test_two_charts_three_prose_spans() {
        let reply = format!(
            "Intro\n```json-chart\n{}\n```\nMiddle\n```json-chart\n{}\n```\nOutro",
            BAR, LINE
        );
        let segments = split_reply(&reply);

        assert_eq!(segments.len(), 5);
        assert_eq!(segments[0].as_prose(), Some("Intro\n"));
        assert!(segments[1].is_chart());
        assert_eq!(segments[2].as_prose(), Some("\nMiddle\n"));
        assert!(segments[3].is_chart());
        assert_eq!(segments[4].as_prose(), Some("\nOutro"));

        match &segments[3] {
            Segment::Chart(spec) => {
                assert_eq!(spec.chart_kind, ChartKind::Line);
                assert_eq!(spec.series[0].display_label(), "cvr");
            }
            other => panic!("expected chart, got {:?}", other),
        }
    }

    #[test]
    fn test_adjacent_charts_keep_empty_prose() {
        let reply = format!("```json-chart\n{}\n``````json-chart\n{}\n```", BAR, LINE);
        let segments = split_reply(&reply);

        assert_eq!(segments.len(), 5);
        assert_eq!(segments[0].as_prose(), Some(""));
        assert_eq!(segments[2].as_prose(), Some(""));
        assert_eq!(segments[4].as_prose(), Some(""));
    }

    #[test]
    fn test_invalid_chart_becomes_inline_error() {
        let reply = format!(
            "Before\n```json-chart\n{{\"type\": \"bar\", oops}}\n```\nBetween\n```json-chart\n{}\n```\nAfter",
            BAR
        );
        let segments = split_reply(&reply);

        assert_eq!(segments.len(), 5);
        assert!(matches!(&segments[1], Segment::ChartError { raw, .. } if raw.contains("oops")));
        assert_eq!(segments[2].as_prose(), Some("\nBetween\n"));
        assert!(segments[3].is_chart());
        assert_eq!(segments[4].as_prose(), Some("\nAfter"));
    }

    #[test]
    fn test_plain_reply_and_other_fences() {
        let reply = "Use this:\n```sql\nSELECT 1;\n```\n";
        let segments = split_reply(reply);
        assert_eq!(segments, vec![Segment::Prose(reply.to_string())]);
    }

    #[test]
    fn test_parse_chart_rejects_missing_series() {
        let err = parse_chart(r#"{"type":"area","title":"t","xKey":"x","data":[],"dataKeys":[]}"#)
            .unwrap_err();
        assert!(matches!(err, Error::ChartParse(_)));
    }
}

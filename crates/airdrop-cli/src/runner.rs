//! Line-oriented claim runner.

use airdrop_settlement::{ClaimSubmitter, SettlementContract};
use airdrop_types::{AirdropError, ClaimRequest, Result};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Read events from `input` until EOF, writing one outcome line per event.
///
/// Blank lines are skipped. A line that is not UTF-8 is reported like any
/// other malformed event.
///
/// # Errors
/// Only I/O and serialization failures on the streams stop the loop.
pub async fn run_lines<S, R, W>(
    submitter: &ClaimSubmitter<S>,
    input: R,
    mut output: W,
) -> Result<usize>
where
    S: SettlementContract,
    S::Receipt: Serialize,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.split(b'\n');
    let mut handled = 0;

    while let Some(raw) = lines.next_segment().await? {
        let outcome = match std::str::from_utf8(&raw) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                handle_line(submitter, line).await
            }
            Err(err) => {
                let err = AirdropError::InvalidClaimRequest {
                    reason: format!("event is not UTF-8: {err}"),
                };
                tracing::warn!(error = %err, "Event discarded");
                failure(&err)
            }
        };

        let mut bytes = serde_json::to_vec(&outcome)?;
        bytes.push(b'\n');
        output.write_all(&bytes).await?;
        output.flush().await?;
        handled += 1;
    }

    tracing::info!(events = handled, "Input exhausted");
    Ok(handled)
}

/// Handle one JSON event and describe the outcome as a JSON value.
pub async fn handle_line<S>(submitter: &ClaimSubmitter<S>, line: &str) -> Value
where
    S: SettlementContract,
    S::Receipt: Serialize,
{
    let request = match ClaimRequest::from_json(line) {
        Ok(request) => request,
        Err(err) => {
            tracing::warn!(error = %err, "Event discarded");
            return failure(&err);
        }
    };

    match submitter.submit(&request).await {
        Ok(receipt) => match serde_json::to_value(&receipt) {
            Ok(receipt) => json!({ "ok": receipt }),
            Err(err) => failure(&AirdropError::from(err)),
        },
        Err(err) => failure(&err),
    }
}

fn failure(err: &dyn std::error::Error) -> Value {
    json!({ "error": err.to_string() })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use airdrop_settlement::{MockError, MockReceipt, MockSettlement, ReplayGuard};

    use super::*;

    const EVENT: &str = r#"{"receiver":"0x7Ad941fAf1227105624D3170e851Bb54FE88D558","id":"id001","username":"id001","verified":true,"amount":"3001000000000000000000","inviterId":"","inviteAward":"2000000000000000000000","sig":"0x965c"}"#;

    fn receipt() -> MockReceipt {
        MockReceipt {
            tx_hash: "0xfeed".into(),
            block_number: 9,
        }
    }

    fn outcomes(output: &[u8]) -> Vec<Value> {
        String::from_utf8_lossy(output)
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn success_line_carries_receipt() {
        let mock = Arc::new(MockSettlement::new());
        mock.push_success(receipt());
        let submitter = ClaimSubmitter::new(mock);

        let outcome = handle_line(&submitter, EVENT).await;
        assert_eq!(
            outcome,
            json!({ "ok": { "tx_hash": "0xfeed", "block_number": 9 } })
        );
    }

    #[tokio::test]
    async fn malformed_event_reported_without_call() {
        let mock = Arc::new(MockSettlement::new());
        let submitter = ClaimSubmitter::new(Arc::clone(&mock));

        let outcome = handle_line(&submitter, r#"{"receiver":"0x01"}"#).await;
        let msg = outcome["error"].as_str().unwrap();
        assert!(msg.starts_with("AD_ERR_200"), "Got: {msg}");
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn settlement_error_message_passed_through() {
        let mock = Arc::new(MockSettlement::new());
        mock.push_failure(MockError::Reverted("already claimed".into()));
        let submitter = ClaimSubmitter::new(mock);

        let outcome = handle_line(&submitter, EVENT).await;
        assert_eq!(outcome, json!({ "error": "execution reverted: already claimed" }));
    }

    #[tokio::test]
    async fn one_outcome_per_event_and_blank_lines_skipped() {
        let mock = Arc::new(MockSettlement::new());
        mock.push_success(receipt());
        mock.push_failure(MockError::Network("reset".into()));
        let submitter = ClaimSubmitter::new(Arc::clone(&mock));

        let input = format!("{EVENT}\n\n   \nnot json\n{EVENT}\n");
        let mut output = Vec::new();
        let handled = run_lines(&submitter, input.as_bytes(), &mut output)
            .await
            .unwrap();

        assert_eq!(handled, 3);
        let lines = outcomes(&output);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].get("ok").is_some());
        assert!(lines[1]["error"].as_str().unwrap().starts_with("AD_ERR_200"));
        assert_eq!(lines[2], json!({ "error": "network error: reset" }));
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn non_utf8_line_reported_and_stream_continues() {
        let mock = Arc::new(MockSettlement::new());
        mock.push_success(receipt());
        let submitter = ClaimSubmitter::new(Arc::clone(&mock));

        let mut input = b"{\"id\":\"\xff\"}\n".to_vec();
        input.extend_from_slice(EVENT.as_bytes());
        input.push(b'\n');
        let mut output = Vec::new();
        let handled = run_lines(&submitter, input.as_slice(), &mut output)
            .await
            .unwrap();

        assert_eq!(handled, 2);
        let lines = outcomes(&output);
        assert_eq!(lines.len(), 2);
        let msg = lines[0]["error"].as_str().unwrap();
        assert!(msg.starts_with("AD_ERR_200"), "Got: {msg}");
        assert!(lines[1].get("ok").is_some());
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn crlf_and_missing_final_newline_handled() {
        let mock = Arc::new(MockSettlement::new());
        mock.push_success(receipt());
        mock.push_success(receipt());
        let submitter = ClaimSubmitter::new(Arc::clone(&mock));

        let input = format!("{EVENT}\r\n{EVENT}");
        let mut output = Vec::new();
        let handled = run_lines(&submitter, input.as_bytes(), &mut output)
            .await
            .unwrap();

        assert_eq!(handled, 2);
        assert!(outcomes(&output).iter().all(|o| o.get("ok").is_some()));
    }

    #[tokio::test]
    async fn guarded_runner_reports_replay() {
        let mock = MockSettlement::new();
        mock.push_success(receipt());
        let submitter = ClaimSubmitter::new(Arc::new(ReplayGuard::new(mock, 16)));

        let input = format!("{EVENT}\n{EVENT}\n");
        let mut output = Vec::new();
        run_lines(&submitter, input.as_bytes(), &mut output)
            .await
            .unwrap();

        let lines = outcomes(&output);
        assert!(lines[0].get("ok").is_some());
        assert!(lines[1]["error"].as_str().unwrap().starts_with("AD_ERR_400"));
        assert_eq!(submitter.settlement().inner().call_count(), 1);
    }
}

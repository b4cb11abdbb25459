//! Verification backend client.
//!
//! One HTTP round trip: POST the user id and wallet address, get back a
//! structured pass/fail result. The NFT ownership logic itself lives in
//! the backend; this module only preserves the wire contract and maps
//! every possible response shape onto a [`VerifyOutcome`].

use std::time::Duration;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use solgate_types::{Result, SolgateError, TelegramUserId, VerifyFailure, WalletAddress};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Request timeout for the verification POST. The UI shows an
/// in-progress state for the whole duration, so an unresolved request
/// can never silently block the session.
pub const VERIFY_TIMEOUT: Duration = Duration::from_secs(30);

/// Backend reason code for "not enough NFTs in the wallet".
pub const REASON_INSUFFICIENT_NFTS: &str = "insufficient_nfts";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Verification request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub telegram_user_id: TelegramUserId,
    pub wallet_address: String,
}

/// Verification response body. Every field except `success` is
/// optional; unknown shapes degrade to a generic rejection rather than
/// a parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub required: Option<u32>,
    #[serde(default)]
    pub purchase_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// VerifyOutcome
// ---------------------------------------------------------------------------

/// Final result of one verification attempt.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum VerifyOutcome {
    /// The backend confirmed the holdings.
    Passed,
    /// The backend rejected the holdings, or the attempt never produced
    /// a structured response.
    Failed(VerifyFailure),
}

/// Maps an HTTP status plus parsed body onto an outcome.
///
/// A non-2xx status with `success != true` is treated identically to a
/// structured failure response.
pub fn outcome_from_response(http_status: u16, resp: &VerifyResponse) -> VerifyOutcome {
    let status_ok = (200..300).contains(&http_status);
    if status_ok && resp.success {
        return VerifyOutcome::Passed;
    }

    if resp.reason.as_deref() == Some(REASON_INSUFFICIENT_NFTS) {
        return VerifyOutcome::Failed(VerifyFailure::InsufficientNfts {
            required: resp.required,
            purchase_url: resp.purchase_url.clone(),
        });
    }

    if let Some(error) = &resp.error {
        return VerifyOutcome::Failed(VerifyFailure::Rejected {
            message: error.clone(),
        });
    }

    VerifyOutcome::Failed(VerifyFailure::Rejected {
        message: format!("backend returned status {http_status}"),
    })
}

// ---------------------------------------------------------------------------
// VerifyBackend trait
// ---------------------------------------------------------------------------

/// The verification collaborator as the controller sees it.
///
/// `submit` never fails at the call site; every failure mode is folded
/// into the returned outcome so the controller has a single code path.
pub trait VerifyBackend: Send + Sync {
    /// Starts one verification round trip.
    fn submit(
        &self,
        user_id: TelegramUserId,
        address: WalletAddress,
    ) -> BoxFuture<'static, VerifyOutcome>;
}

// ---------------------------------------------------------------------------
// HttpVerifier
// ---------------------------------------------------------------------------

/// Production backend client.
#[derive(Clone)]
pub struct HttpVerifier {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpVerifier {
    /// Client against the configured endpoint.
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(VERIFY_TIMEOUT)
            .build()
            .map_err(|e| SolgateError::TransportError {
                reason: format!("failed to build verification HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// The configured endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Performs one verification round trip.
    pub async fn verify(&self, user_id: TelegramUserId, address: &WalletAddress) -> VerifyOutcome {
        match self.post(user_id, address).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(error = %e, "verification transport failure");
                VerifyOutcome::Failed(VerifyFailure::Transport {
                    message: e.to_string(),
                })
            }
        }
    }

    async fn post(&self, user_id: TelegramUserId, address: &WalletAddress) -> Result<VerifyOutcome> {
        let body = VerifyRequest {
            telegram_user_id: user_id,
            wallet_address: address.to_string(),
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| SolgateError::TransportError {
                reason: format!("backend unreachable: {e}"),
            })?;

        let status = resp.status().as_u16();
        let parsed: VerifyResponse =
            resp.json().await.map_err(|e| SolgateError::TransportError {
                reason: format!("backend returned a non-JSON response: {e}"),
            })?;

        Ok(outcome_from_response(status, &parsed))
    }
}

impl VerifyBackend for HttpVerifier {
    fn submit(
        &self,
        user_id: TelegramUserId,
        address: WalletAddress,
    ) -> BoxFuture<'static, VerifyOutcome> {
        let this = self.clone();
        Box::pin(async move { this.verify(user_id, &address).await })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_to_wire_names() -> std::result::Result<(), serde_json::Error> {
        let req = VerifyRequest {
            telegram_user_id: TelegramUserId::new(123),
            wallet_address: "4vJ9JU1bJJE96FWSJKvHsmmFADCg4gpZQff4P3bkLKi".into(),
        };
        let json = serde_json::to_value(&req)?;
        assert_eq!(json["telegramUserId"], 123);
        assert_eq!(
            json["walletAddress"],
            "4vJ9JU1bJJE96FWSJKvHsmmFADCg4gpZQff4P3bkLKi"
        );
        Ok(())
    }

    #[test]
    fn success_response_passes() -> std::result::Result<(), serde_json::Error> {
        let resp: VerifyResponse = serde_json::from_str(r#"{"success": true}"#)?;
        assert_eq!(outcome_from_response(200, &resp), VerifyOutcome::Passed);
        Ok(())
    }

    #[test]
    fn success_flag_with_error_status_is_failure() -> std::result::Result<(), serde_json::Error> {
        // A 5xx with a stray success flag must not unlock anything.
        let resp: VerifyResponse = serde_json::from_str(r#"{"success": true}"#)?;
        assert!(matches!(
            outcome_from_response(502, &resp),
            VerifyOutcome::Failed(_)
        ));
        Ok(())
    }

    #[test]
    fn insufficient_nfts_maps_with_details() -> std::result::Result<(), serde_json::Error> {
        let resp: VerifyResponse = serde_json::from_str(
            r#"{"success": false, "reason": "insufficient_nfts", "required": 3, "purchaseUrl": "https://x"}"#,
        )?;
        match outcome_from_response(200, &resp) {
            VerifyOutcome::Failed(VerifyFailure::InsufficientNfts {
                required,
                purchase_url,
            }) => {
                assert_eq!(required, Some(3));
                assert_eq!(purchase_url.as_deref(), Some("https://x"));
            }
            other => panic!("expected InsufficientNfts, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn backend_error_message_maps_to_rejection() -> std::result::Result<(), serde_json::Error> {
        let resp: VerifyResponse =
            serde_json::from_str(r#"{"success": false, "error": "collection unknown"}"#)?;
        match outcome_from_response(200, &resp) {
            VerifyOutcome::Failed(VerifyFailure::Rejected { message }) => {
                assert_eq!(message, "collection unknown");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn bare_failure_reports_status() -> std::result::Result<(), serde_json::Error> {
        let resp: VerifyResponse = serde_json::from_str(r#"{"success": false}"#)?;
        match outcome_from_response(403, &resp) {
            VerifyOutcome::Failed(VerifyFailure::Rejected { message }) => {
                assert!(message.contains("403"));
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn empty_body_defaults_to_failure() -> std::result::Result<(), serde_json::Error> {
        let resp: VerifyResponse = serde_json::from_str("{}")?;
        assert!(matches!(
            outcome_from_response(200, &resp),
            VerifyOutcome::Failed(_)
        ));
        Ok(())
    }

    #[test]
    fn unknown_reason_with_required_ignores_count() -> std::result::Result<(), serde_json::Error> {
        // `required` only matters under the insufficient_nfts reason.
        let resp: VerifyResponse =
            serde_json::from_str(r#"{"success": false, "reason": "banned", "required": 9}"#)?;
        assert!(matches!(
            outcome_from_response(200, &resp),
            VerifyOutcome::Failed(VerifyFailure::Rejected { .. })
        ));
        Ok(())
    }

    #[test]
    fn http_verifier_reports_endpoint() -> Result<()> {
        let verifier = HttpVerifier::new("https://gate.example.org/verify")?;
        assert_eq!(verifier.endpoint(), "https://gate.example.org/verify");
        Ok(())
    }
}

use async_trait::async_trait;

/// Failures a checkout has to tell apart: a push the gateway refused
/// rolls the order back with the gateway's own message, everything else
/// is an upstream fault.
#[derive(thiserror::Error, Debug)]
pub enum MpesaError {
    #[error("m-pesa is not configured")]
    NotConfigured,
    #[error("daraja rejected the request: {0}")]
    Rejected(String),
    #[error("daraja request failed")]
    Upstream(#[source] anyhow::Error),
}

/// Accepted response to an STK push initiation.
#[derive(Debug, Clone)]
pub struct StkPushAck {
    pub merchant_request_id: String,
    pub checkout_request_id: String,
    pub customer_message: String,
}

/// Result of querying an in-flight STK push.
#[derive(Debug, Clone)]
pub struct StkQueryOutcome {
    pub result_code: i64,
    pub result_desc: String,
}

impl StkQueryOutcome {
    /// Daraja result codes: 0 completed, 1032 cancelled by user,
    /// 1037 timed out waiting for the PIN; anything else stays pending.
    pub fn status(&self) -> &'static str {
        match self.result_code {
            0 => "completed",
            1032 => "cancelled",
            1037 => "timeout",
            _ => "pending",
        }
    }
}

/// Fields mined out of the asynchronous STK callback envelope.
#[derive(Debug, Clone)]
pub struct StkCallback {
    pub merchant_request_id: String,
    pub checkout_request_id: String,
    pub result_code: i64,
    pub result_desc: String,
    pub receipt_number: Option<String>,
    pub phone_number: Option<String>,
    pub amount: Option<f64>,
}

impl StkCallback {
    /// Pulls the useful fields out of Daraja's asynchronous callback
    /// envelope (`Body.stkCallback`). Returns None when the shape does
    /// not match, so the webhook can acknowledge and drop junk.
    pub fn parse(body: &serde_json::Value) -> Option<Self> {
        let callback = body.get("Body")?.get("stkCallback")?;
        let result_code = match callback.get("ResultCode")? {
            serde_json::Value::String(s) => s.parse().ok()?,
            serde_json::Value::Number(n) => n.as_i64()?,
            _ => return None,
        };
        let checkout_request_id = callback
            .get("CheckoutRequestID")
            .and_then(|v| v.as_str())?
            .to_string();
        let field = |key: &str| {
            callback
                .get(key)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };
        let mut parsed = StkCallback {
            merchant_request_id: field("MerchantRequestID"),
            checkout_request_id,
            result_code,
            result_desc: field("ResultDesc"),
            receipt_number: None,
            phone_number: None,
            amount: None,
        };
        let items = callback
            .get("CallbackMetadata")
            .and_then(|m| m.get("Item"))
            .and_then(|i| i.as_array());
        if let Some(items) = items {
            for item in items {
                let value = item.get("Value");
                match item.get("Name").and_then(|n| n.as_str()) {
                    Some("MpesaReceiptNumber") => {
                        parsed.receipt_number =
                            value.and_then(|v| v.as_str()).map(|s| s.to_string());
                    }
                    Some("PhoneNumber") => {
                        parsed.phone_number = value.map(|v| match v {
                            serde_json::Value::String(s) => s.clone(),
                            other => other.to_string(),
                        });
                    }
                    Some("Amount") => {
                        parsed.amount = value.and_then(|v| v.as_f64());
                    }
                    _ => {}
                }
            }
        }
        Some(parsed)
    }

    pub fn succeeded(&self) -> bool {
        self.result_code == 0
    }

    /// 1032 is "request cancelled by user" in Daraja's result codes.
    pub fn cancelled(&self) -> bool {
        self.result_code == 1032
    }
}

#[async_trait]
pub trait MpesaGateway: Send + Sync {
    /// Pushes a payment prompt to the customer's phone. The amount is in
    /// whole shillings; the phone must already be in 2547XXXXXXXX form.
    async fn stk_push(
        &self,
        phone: &str,
        amount: i64,
        account_reference: &str,
        description: &str,
    ) -> Result<StkPushAck, MpesaError>;
    async fn query(&self, checkout_request_id: &str) -> Result<StkQueryOutcome, MpesaError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_outcome_maps_daraja_result_codes() {
        let outcome = |code| StkQueryOutcome {
            result_code: code,
            result_desc: String::new(),
        };
        assert_eq!(outcome(0).status(), "completed");
        assert_eq!(outcome(1032).status(), "cancelled");
        assert_eq!(outcome(1037).status(), "timeout");
        assert_eq!(outcome(1).status(), "pending");
        assert_eq!(outcome(4999).status(), "pending");
    }

    #[test]
    fn callback_with_metadata_parses_receipt_and_phone() {
        let body = json!({
            "Body": {
                "stkCallback": {
                    "MerchantRequestID": "29115-34620561-1",
                    "CheckoutRequestID": "ws_CO_191220191020363925",
                    "ResultCode": 0,
                    "ResultDesc": "The service request is processed successfully.",
                    "CallbackMetadata": {
                        "Item": [
                            {"Name": "Amount", "Value": 1.00},
                            {"Name": "MpesaReceiptNumber", "Value": "NLJ7RT61SV"},
                            {"Name": "TransactionDate", "Value": 20191219102115u64},
                            {"Name": "PhoneNumber", "Value": 254708374149u64}
                        ]
                    }
                }
            }
        });
        let parsed = StkCallback::parse(&body).unwrap();
        assert!(parsed.succeeded());
        assert_eq!(parsed.receipt_number.as_deref(), Some("NLJ7RT61SV"));
        assert_eq!(parsed.phone_number.as_deref(), Some("254708374149"));
        assert_eq!(parsed.amount, Some(1.0));
    }

    #[test]
    fn failed_callback_parses_without_metadata() {
        let body = json!({
            "Body": {
                "stkCallback": {
                    "MerchantRequestID": "29115-34620561-1",
                    "CheckoutRequestID": "ws_CO_191220191020363925",
                    "ResultCode": 1032,
                    "ResultDesc": "Request cancelled by user"
                }
            }
        });
        let parsed = StkCallback::parse(&body).unwrap();
        assert!(!parsed.succeeded());
        assert!(parsed.cancelled());
        assert!(parsed.receipt_number.is_none());
    }

    #[test]
    fn junk_callback_is_rejected() {
        assert!(StkCallback::parse(&json!({"foo": "bar"})).is_none());
        assert!(
            StkCallback::parse(&json!({"Body": {"stkCallback": {"ResultCode": "nope"}}}))
                .is_none()
        );
    }
}

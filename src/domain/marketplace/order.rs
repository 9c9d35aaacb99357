#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    Mpesa,
    Stripe,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Mpesa => "mpesa",
            PaymentMethod::Stripe => "stripe",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mpesa" => Some(PaymentMethod::Mpesa),
            "stripe" => Some(PaymentMethod::Stripe),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PaymentStatus::Pending),
            "completed" => Some(PaymentStatus::Completed),
            "failed" => Some(PaymentStatus::Failed),
            _ => None,
        }
    }
}

/// Fulfilment state of an order. Payment state lives on the payment row;
/// an order sits at `Pending` until its payment settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "pending",
            DeliveryStatus::Processing => "processing",
            DeliveryStatus::Shipped => "shipped",
            DeliveryStatus::Delivered => "delivered",
            DeliveryStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(DeliveryStatus::Pending),
            "processing" => Some(DeliveryStatus::Processing),
            "shipped" => Some(DeliveryStatus::Shipped),
            "delivered" => Some(DeliveryStatus::Delivered),
            "cancelled" => Some(DeliveryStatus::Cancelled),
            _ => None,
        }
    }
}

/// Whole-shilling amount sent to M-Pesa for a price held in cents.
/// Daraja only accepts integer amounts, so partial shillings round up.
pub fn mpesa_amount(amount_cents: i64) -> i64 {
    (amount_cents + 99) / 100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mpesa_amount_rounds_partial_shillings_up() {
        assert_eq!(mpesa_amount(100), 1);
        assert_eq!(mpesa_amount(101), 2);
        assert_eq!(mpesa_amount(12_000), 120);
        assert_eq!(mpesa_amount(99), 1);
    }

    #[test]
    fn status_strings_round_trip() {
        for s in [
            DeliveryStatus::Pending,
            DeliveryStatus::Processing,
            DeliveryStatus::Shipped,
            DeliveryStatus::Delivered,
            DeliveryStatus::Cancelled,
        ] {
            assert_eq!(DeliveryStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(DeliveryStatus::parse("refunded"), None);
        assert_eq!(PaymentMethod::parse("MPESA"), Some(PaymentMethod::Mpesa));
        assert_eq!(
            PaymentStatus::parse("completed"),
            Some(PaymentStatus::Completed)
        );
    }
}

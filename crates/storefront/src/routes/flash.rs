//! Flash-style messages carried in `?error=` / `?success=` query codes.
//!
//! Only known codes are displayed, so a crafted link cannot put arbitrary
//! text on the page.

use serde::Deserialize;

/// Query parameters for error/success display.
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

impl MessageQuery {
    /// The error message for the `error` code, if it is a known one.
    #[must_use]
    pub fn error_message(&self) -> Option<&'static str> {
        self.error.as_deref().and_then(error_message)
    }

    /// The success message for the `success` code, if it is a known one.
    #[must_use]
    pub fn success_message(&self) -> Option<&'static str> {
        self.success.as_deref().and_then(success_message)
    }
}

pub const INVALID_EMAIL: &str = "invalid_email";
pub const OTP_SEND_FAILED: &str = "otp_send_failed";
pub const OTP_EXPIRED: &str = "otp_expired";
pub const INVALID_OTP: &str = "invalid_otp";
pub const PAYMENT_METHOD: &str = "payment_method";
pub const ORDER_FAILED: &str = "order_failed";

pub const OTP_SENT: &str = "otp_sent";
pub const LOGGED_IN: &str = "login";
pub const LOGGED_OUT: &str = "logged_out";

/// The error message for a known code.
#[must_use]
pub fn error_message(code: &str) -> Option<&'static str> {
    match code {
        INVALID_EMAIL => Some("Please enter a valid email address."),
        OTP_SEND_FAILED => Some("Failed to send OTP. Please try again."),
        OTP_EXPIRED => Some("OTP has expired. Please request a new one."),
        INVALID_OTP => Some("Invalid OTP. Please try again."),
        PAYMENT_METHOD => Some("Please choose a payment method."),
        ORDER_FAILED => Some("Error creating order. Please contact support."),
        _ => None,
    }
}

/// The success message for a known code.
#[must_use]
pub fn success_message(code: &str) -> Option<&'static str> {
    match code {
        OTP_SENT => Some("OTP sent to your email!"),
        LOGGED_IN => Some("Login successful!"),
        LOGGED_OUT => Some("Logged out successfully!"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        let query = MessageQuery {
            error: Some(OTP_EXPIRED.to_owned()),
            success: Some(LOGGED_OUT.to_owned()),
        };
        assert_eq!(
            query.error_message(),
            Some("OTP has expired. Please request a new one.")
        );
        assert_eq!(query.success_message(), Some("Logged out successfully!"));
    }

    #[test]
    fn test_unknown_codes_are_dropped() {
        let query = MessageQuery {
            error: Some("<script>alert(1)</script>".to_owned()),
            success: None,
        };
        assert_eq!(query.error_message(), None);
        assert_eq!(query.success_message(), None);
    }
}

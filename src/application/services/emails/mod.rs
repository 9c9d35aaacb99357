/// Rendered message ready for a mailer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailContent {
    pub subject: String,
    pub html_body: String,
}

pub fn verification_email(link_base: &str, token: &str) -> EmailContent {
    let verify_url = format!("{link_base}/api/auth/verify/{token}");
    EmailContent {
        subject: "Verify Your Email - Momento".to_string(),
        html_body: format!(
            "<h1>Welcome to Momento!</h1>\
             <p>Thank you for registering. To verify your email address, please click the link below:</p>\
             <p><a href=\"{verify_url}\" style=\"background-color: #007bff; color: white; padding: 10px 20px; text-decoration: none; border-radius: 5px;\">Verify Email</a></p>\
             <p>Or copy and paste this link into your browser:</p>\
             <p>{verify_url}</p>\
             <p>This link will expire in 24 hours.</p>\
             <p>If you did not register for Momento, please ignore this email.</p>"
        ),
    }
}

pub fn password_reset_email(link_base: &str, token: &str) -> EmailContent {
    let reset_url = format!("{link_base}/api/auth/reset-password/{token}");
    EmailContent {
        subject: "Password Reset - Momento".to_string(),
        html_body: format!(
            "<h1>Password Reset Request</h1>\
             <p>We received a request to reset your password. Click the link below to choose a new one:</p>\
             <p><a href=\"{reset_url}\" style=\"background-color: #007bff; color: white; padding: 10px 20px; text-decoration: none; border-radius: 5px;\">Reset Password</a></p>\
             <p>Or copy and paste this link into your browser:</p>\
             <p>{reset_url}</p>\
             <p>This link will expire in 1 hour.</p>\
             <p>If you did not request a password reset, please ignore this email.</p>"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_email_embeds_the_link() {
        let mail = verification_email("https://momento.example.com", "tok123");
        assert_eq!(mail.subject, "Verify Your Email - Momento");
        assert!(
            mail.html_body
                .contains("https://momento.example.com/api/auth/verify/tok123")
        );
        assert!(mail.html_body.contains("24 hours"));
    }

    #[test]
    fn reset_email_embeds_the_link() {
        let mail = password_reset_email("http://localhost:8000", "tok456");
        assert_eq!(mail.subject, "Password Reset - Momento");
        assert!(
            mail.html_body
                .contains("http://localhost:8000/api/auth/reset-password/tok456")
        );
        assert!(mail.html_body.contains("1 hour"));
    }
}

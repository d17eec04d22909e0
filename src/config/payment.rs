//! Payment configuration

use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;
use crate::adapters::stripe::StripeConfig;

/// Stripe credentials and webhook policy.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    pub stripe_api_key: String,

    pub stripe_webhook_secret: String,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Reject webhook events that are not live-mode
    #[serde(default)]
    pub require_livemode: bool,
}

impl PaymentConfig {
    pub fn is_test_mode(&self) -> bool {
        self.stripe_api_key.starts_with("sk_test_")
    }

    /// Adapter configuration; secrets move into `SecretString` here.
    pub fn stripe_config(&self) -> StripeConfig {
        StripeConfig::new(&self.stripe_api_key, &self.stripe_webhook_secret)
            .with_base_url(&self.api_base_url)
            .with_require_livemode(self.require_livemode)
    }

    pub fn validate(&self, environment: Environment) -> Result<(), ValidationError> {
        if self.stripe_api_key.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__STRIPE_API_KEY"));
        }
        if self.stripe_webhook_secret.is_empty() {
            return Err(ValidationError::MissingRequired(
                "PAYMENT__STRIPE_WEBHOOK_SECRET",
            ));
        }
        if !(self.stripe_api_key.starts_with("sk_test_")
            || self.stripe_api_key.starts_with("sk_live_"))
        {
            return Err(ValidationError::InvalidStripeKey);
        }
        if !self.stripe_webhook_secret.starts_with("whsec_") {
            return Err(ValidationError::InvalidStripeWebhookSecret);
        }
        if environment == Environment::Production && !self.api_base_url.starts_with("https://") {
            return Err(ValidationError::PaymentUrlMustBeHttps);
        }
        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            stripe_api_key: String::new(),
            stripe_webhook_secret: String::new(),
            api_base_url: default_api_base_url(),
            require_livemode: false,
        }
    }
}

fn default_api_base_url() -> String {
    "https://api.stripe.com".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> PaymentConfig {
        PaymentConfig {
            stripe_api_key: "sk_test_xxx".to_string(),
            stripe_webhook_secret: "whsec_xxx".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_keys_are_detected() {
        assert!(valid().is_test_mode());

        let live = PaymentConfig {
            stripe_api_key: "sk_live_xxx".to_string(),
            ..valid()
        };
        assert!(!live.is_test_mode());
    }

    #[test]
    fn valid_config_passes() {
        assert_eq!(valid().validate(Environment::Production), Ok(()));
    }

    #[test]
    fn missing_keys_are_rejected() {
        let config = PaymentConfig::default();
        assert_eq!(
            config.validate(Environment::Development),
            Err(ValidationError::MissingRequired("PAYMENT__STRIPE_API_KEY"))
        );

        let config = PaymentConfig {
            stripe_webhook_secret: String::new(),
            ..valid()
        };
        assert_eq!(
            config.validate(Environment::Development),
            Err(ValidationError::MissingRequired(
                "PAYMENT__STRIPE_WEBHOOK_SECRET"
            ))
        );
    }

    #[test]
    fn key_prefixes_are_checked() {
        let config = PaymentConfig {
            stripe_api_key: "pk_test_xxx".to_string(),
            ..valid()
        };
        assert_eq!(
            config.validate(Environment::Development),
            Err(ValidationError::InvalidStripeKey)
        );

        let config = PaymentConfig {
            stripe_webhook_secret: "secret".to_string(),
            ..valid()
        };
        assert_eq!(
            config.validate(Environment::Development),
            Err(ValidationError::InvalidStripeWebhookSecret)
        );
    }

    #[test]
    fn plain_http_base_url_only_allowed_outside_production() {
        let config = PaymentConfig {
            api_base_url: "http://localhost:12111".to_string(),
            ..valid()
        };
        assert_eq!(config.validate(Environment::Development), Ok(()));
        assert_eq!(
            config.validate(Environment::Production),
            Err(ValidationError::PaymentUrlMustBeHttps)
        );
    }

    #[test]
    fn debug_output_of_adapter_config_hides_secrets() {
        let rendered = format!("{:?}", valid().stripe_config());
        assert!(!rendered.contains("sk_test_xxx"));
        assert!(!rendered.contains("whsec_xxx"));
    }
}

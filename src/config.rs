use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};
use crate::models::Currency;
use crate::reference;

#[derive(Clone, Default, PartialEq, Eq)]
pub struct MerchantCredentials {
    pub merchant_id: Option<String>,
    pub merchant_key: Option<String>,
}

impl fmt::Debug for MerchantCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MerchantCredentials")
            .field("merchant_id", &self.merchant_id)
            .field("merchant_key", &self.merchant_key.as_ref().map(|_| "***"))
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub base: String,
    pub payment: String,
    pub recurring: String,
    pub card_cancel: String,
}

impl Endpoints {
    pub fn from_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            base: base.to_string(),
            payment: format!("{base}{}", reference::PAYMENT_PATH),
            recurring: format!("{base}{}", reference::RECURRING_PATH),
            card_cancel: format!("{base}{}", reference::CARD_CANCEL_PATH),
        }
    }
}

/// Everything needed to talk to the gateway on behalf of one currency.
/// Credentials may be absent; [`MerchantConfig::require_credentials`] enforces them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerchantConfig {
    pub currency: Currency,
    pub credentials: MerchantCredentials,
    pub endpoints: Endpoints,
    pub sdk_version: &'static str,
}

impl MerchantConfig {
    /// Returns `(merchant_key, merchant_id)` or `MissingConfiguration`.
    pub fn require_credentials(&self) -> Result<(&str, &str)> {
        match (
            self.credentials.merchant_key.as_deref(),
            self.credentials.merchant_id.as_deref(),
        ) {
            (Some(key), Some(id)) => Ok((key, id)),
            _ => Err(Error::MissingConfiguration {
                currency: self.currency,
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatewayConfig {
    pub production: bool,
    pub redirect_url: Option<String>,
    pub verbose: bool,
    pub api_url: Option<String>,
    merchants: BTreeMap<Currency, MerchantCredentials>,
}

impl GatewayConfig {
    pub fn sandbox() -> Self {
        Self::default()
    }

    pub fn production() -> Self {
        Self {
            production: true,
            ..Self::default()
        }
    }

    /// Variables whose name or value is not valid UTF-8 are skipped.
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars_os().filter_map(|(key, value)| {
            Some((key.into_string().ok()?, value.into_string().ok()?))
        }))
    }

    /// Reads `SIMPLEPAY_*` variables from any key/value source. Unknown keys
    /// and empty values are ignored.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut config = Self::default();
        for (key, value) in vars {
            let key = key.as_ref();
            let value: String = value.into();
            if value.trim().is_empty() {
                continue;
            }

            if let Some(tag) = key.strip_prefix(reference::ENV_MERCHANT_KEY_PREFIX) {
                if let Ok(currency) = tag.parse::<Currency>() {
                    config.merchants.entry(currency).or_default().merchant_key = Some(value);
                }
            } else if let Some(tag) = key.strip_prefix(reference::ENV_MERCHANT_ID_PREFIX) {
                if let Ok(currency) = tag.parse::<Currency>() {
                    config.merchants.entry(currency).or_default().merchant_id = Some(value);
                }
            } else {
                match key {
                    reference::ENV_PRODUCTION => config.production = value == "true",
                    reference::ENV_LOGGER => config.verbose = value == "true",
                    reference::ENV_REDIRECT_URL => config.redirect_url = Some(value),
                    reference::ENV_API_URL => config.api_url = Some(value),
                    _ => {}
                }
            }
        }
        config
    }

    pub fn with_merchant(
        mut self,
        currency: Currency,
        merchant_id: impl Into<String>,
        merchant_key: impl Into<String>,
    ) -> Self {
        self.merchants.insert(
            currency,
            MerchantCredentials {
                merchant_id: Some(merchant_id.into()),
                merchant_key: Some(merchant_key.into()),
            },
        );
        self
    }

    pub fn with_redirect_url(mut self, url: impl Into<String>) -> Self {
        self.redirect_url = Some(url.into());
        self
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn endpoints(&self) -> Endpoints {
        let base = self
            .api_url
            .as_deref()
            .unwrap_or_else(|| reference::base_url(self.production));
        Endpoints::from_base(base)
    }

    /// Resolves the merchant configuration for `currency`. Missing
    /// credentials are returned as `None` rather than failing here.
    pub fn config_for(&self, currency: Currency) -> MerchantConfig {
        MerchantConfig {
            currency,
            credentials: self.merchants.get(&currency).cloned().unwrap_or_default(),
            endpoints: self.endpoints(),
            sdk_version: reference::SDK_VERSION,
        }
    }

    /// Like [`GatewayConfig::config_for`] but starting from a currency tag.
    pub fn config_for_tag(&self, tag: &str) -> Result<MerchantConfig> {
        let currency: Currency = tag.parse()?;
        Ok(self.config_for(currency))
    }

    /// Finds the currency whose configured merchant id is exactly `account_id`.
    pub fn currency_for_account_id(&self, account_id: &str) -> Result<Currency> {
        // the merchant table is a handful of entries, a scan is enough
        Currency::ALL
            .into_iter()
            .find(|currency| {
                self.merchants
                    .get(currency)
                    .and_then(|creds| creds.merchant_id.as_deref())
                    == Some(account_id)
            })
            .ok_or_else(|| Error::AccountNotFound {
                account_id: account_id.to_string(),
            })
    }
}

//! Rates client: ordered provider fail-over for rates and conversions.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use bsvrates_common::{
    rate_and_amount_to_satoshis, validate_fiat_amount, Currency, Provider, ProviderSet,
};
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::coinpaprika::{CoinPaprikaApi, CoinPaprikaProvider};
use crate::config::RatesConfig;
use crate::conversion::{ConversionSource, RateQuote, SatoshiQuote};
use crate::error::{ProviderFailure, RatesError, RatesResult};
use crate::preev::{PreevApi, PreevProvider};
use crate::provider::PriceProvider;
use crate::whatsonchain::{WhatsOnChainApi, WhatsOnChainProvider};

/// A provider answer that may still be unusable, e.g. a zero rate.
trait Usable {
    fn is_usable(&self) -> bool;
}

impl Usable for f64 {
    fn is_usable(&self) -> bool {
        self.is_finite() && *self > 0.0
    }
}

impl Usable for (u64, ConversionSource) {
    fn is_usable(&self) -> bool {
        self.0 > 0
    }
}

/// Queries price providers in order and returns the first usable answer.
///
/// The client keeps no state between calls: every call walks the provider
/// list from the start.
pub struct RatesClient {
    config: RatesConfig,
    adapters: HashMap<Provider, Arc<dyn PriceProvider>>,
}

impl RatesClient {
    /// Create a client with no adapters registered.
    pub fn new(config: RatesConfig) -> Self {
        Self {
            config,
            adapters: HashMap::new(),
        }
    }

    /// Create a client wired to the three provider APIs, using the coin and
    /// pair ids from `config`.
    pub fn with_api_clients<P, W, V>(config: RatesConfig, paprika: P, whatsonchain: W, preev: V) -> Self
    where
        P: CoinPaprikaApi + 'static,
        W: WhatsOnChainApi + 'static,
        V: PreevApi + 'static,
    {
        let paprika = CoinPaprikaProvider::new(paprika).with_coin_id(config.coin_paprika_coin_id.clone());
        let preev = PreevProvider::new(preev).with_pair_id(config.preev_pair_id.clone());

        Self::new(config)
            .with_provider(Arc::new(paprika))
            .with_provider(Arc::new(WhatsOnChainProvider::new(whatsonchain)))
            .with_provider(Arc::new(preev))
    }

    /// Register an adapter, replacing any adapter for the same provider.
    pub fn with_provider(mut self, adapter: Arc<dyn PriceProvider>) -> Self {
        self.set_provider(adapter);
        self
    }

    pub fn set_provider(&mut self, adapter: Arc<dyn PriceProvider>) {
        self.adapters.insert(adapter.provider(), adapter);
    }

    pub fn adapter(&self, provider: Provider) -> Option<&Arc<dyn PriceProvider>> {
        self.adapters.get(&provider)
    }

    /// Providers used when a call does not name its own.
    pub fn providers(&self) -> &ProviderSet {
        &self.config.providers
    }

    pub fn config(&self) -> &RatesConfig {
        &self.config
    }

    /// Get the price of one BSV in `currency` from the first provider that
    /// answers with a positive rate.
    pub async fn get_rate(
        &self,
        currency: Currency,
        providers: Option<&ProviderSet>,
    ) -> RatesResult<RateQuote> {
        self.rate(currency, providers, None).await
    }

    /// Like [`RatesClient::get_rate`], giving up once `deadline` passes.
    pub async fn get_rate_until(
        &self,
        currency: Currency,
        providers: Option<&ProviderSet>,
        deadline: Instant,
    ) -> RatesResult<RateQuote> {
        self.rate(currency, providers, Some(deadline)).await
    }

    /// Convert `amount` of `currency` into satoshis.
    ///
    /// Providers with a native conversion endpoint convert the amount
    /// themselves; otherwise the provider's rate is run through
    /// [`rate_and_amount_to_satoshis`].
    pub async fn get_conversion(
        &self,
        currency: Currency,
        amount: f64,
        providers: Option<&ProviderSet>,
    ) -> RatesResult<SatoshiQuote> {
        self.conversion(currency, amount, providers, None).await
    }

    /// Like [`RatesClient::get_conversion`], giving up once `deadline` passes.
    pub async fn get_conversion_until(
        &self,
        currency: Currency,
        amount: f64,
        providers: Option<&ProviderSet>,
        deadline: Instant,
    ) -> RatesResult<SatoshiQuote> {
        self.conversion(currency, amount, providers, Some(deadline)).await
    }

    #[instrument(skip(self, providers, deadline), fields(currency = %currency))]
    async fn rate(
        &self,
        currency: Currency,
        providers: Option<&ProviderSet>,
        deadline: Option<Instant>,
    ) -> RatesResult<RateQuote> {
        check_accepted(currency)?;
        let providers = providers.unwrap_or(&self.config.providers);

        let (rate, provider) = self
            .fail_over(providers, deadline, |adapter| async move {
                adapter.get_rate(currency).await
            })
            .await?;

        Ok(RateQuote::new(currency, rate, provider))
    }

    #[instrument(skip(self, providers, deadline), fields(currency = %currency))]
    async fn conversion(
        &self,
        currency: Currency,
        amount: f64,
        providers: Option<&ProviderSet>,
        deadline: Option<Instant>,
    ) -> RatesResult<SatoshiQuote> {
        check_accepted(currency)?;
        validate_fiat_amount(amount)?;
        let providers = providers.unwrap_or(&self.config.providers);

        let ((satoshis, source), provider) = self
            .fail_over(providers, deadline, |adapter| async move {
                convert_with(adapter.as_ref(), currency, amount).await
            })
            .await?;

        let quote = SatoshiQuote::new(currency, amount, satoshis, provider, source);
        info!(
            provider = %provider,
            satoshis,
            source = ?source,
            "Conversion completed"
        );

        Ok(quote)
    }

    /// Try each provider in order and return the first usable value.
    async fn fail_over<T, F, Fut>(
        &self,
        providers: &ProviderSet,
        deadline: Option<Instant>,
        mut attempt: F,
    ) -> RatesResult<(T, Provider)>
    where
        T: Usable,
        F: FnMut(Arc<dyn PriceProvider>) -> Fut,
        Fut: Future<Output = RatesResult<T>>,
    {
        let mut failures = Vec::new();

        for provider in providers {
            let outcome = match self.adapters.get(&provider) {
                None => Err(RatesError::AdapterMissing(provider)),
                Some(adapter) => {
                    let call = attempt(Arc::clone(adapter));
                    match deadline {
                        None => call.await,
                        Some(deadline) => {
                            if Instant::now() >= deadline {
                                return Err(RatesError::DeadlineExceeded { provider });
                            }
                            tokio::time::timeout_at(deadline, call)
                                .await
                                .map_err(|_| RatesError::DeadlineExceeded { provider })?
                        }
                    }
                }
            };

            let error = match outcome {
                Ok(value) if value.is_usable() => {
                    debug!(provider = %provider, "Got value from provider");
                    return Ok((value, provider));
                }
                Ok(_) => RatesError::NonPositiveValue { provider },
                Err(error) => error,
            };

            warn!(
                provider = %provider,
                code = error.error_code(),
                error = %error,
                "Provider failed, trying next"
            );
            failures.push(ProviderFailure::new(provider, &error));
        }

        Err(RatesError::AllProvidersFailed {
            attempted: providers.clone(),
            failures,
        })
    }
}

fn check_accepted(currency: Currency) -> RatesResult<()> {
    if currency.is_accepted() {
        Ok(())
    } else {
        Err(RatesError::CurrencyNotAccepted(currency))
    }
}

async fn convert_with(
    adapter: &dyn PriceProvider,
    currency: Currency,
    amount: f64,
) -> RatesResult<(u64, ConversionSource)> {
    if let Some(conversion) = adapter.get_conversion(currency, amount).await? {
        return Ok((conversion.satoshis()?, ConversionSource::Native));
    }

    let rate = adapter.get_rate(currency).await?;
    if !rate.is_usable() {
        return Err(RatesError::NonPositiveValue {
            provider: adapter.provider(),
        });
    }
    let satoshis = rate_and_amount_to_satoshis(rate, amount)?;
    Ok((satoshis, ConversionSource::Rate(rate)))
}

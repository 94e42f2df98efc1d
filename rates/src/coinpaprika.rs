//! CoinPaprika adapter.
//!
//! CoinPaprika is the only provider with a native price conversion endpoint,
//! so conversions through it skip the rate round trip.

use async_trait::async_trait;
use bsvrates_common::{bsv_float_to_satoshis, Currency, Provider};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{RatesError, RatesResult, RequestError};
use crate::provider::{LastRequest, PriceConversion, PriceProvider};

/// CoinPaprika coin id for BSV.
pub const COIN_PAPRIKA_QUOTE_ID: &str = "bsv-bitcoin-sv";

/// CoinPaprika currency id for US dollars.
pub const USD_CURRENCY_ID: &str = "usd-us-dollars";

/// Fiat currencies CoinPaprika can price against, by short name.
const FIAT_CURRENCY_IDS: [(&str, &str); 18] = [
    ("aud", "aud-australian-dollar"),
    ("brl", "brl-brazil-real"),
    ("cad", "cad-canadian-dollar"),
    ("chf", "chf-swiss-franc"),
    ("cny", "cny-yuan-renminbi"),
    ("eur", "eur-euro"),
    ("gbp", "gbp-pound-sterling"),
    ("jpy", "jpy-japanese-yen"),
    ("krw", "krw-south-korea-won"),
    ("mxn", "mxn-mexican-peso"),
    ("nok", "nok-norwegian-krone"),
    ("pln", "pln-polish-zloty"),
    ("rub", "rub-russian-ruble"),
    ("sek", "sek-swedish-krona"),
    ("try", "try-turkish-lira"),
    ("twd", "twd-taiwan-new-dollar"),
    ("usd", USD_CURRENCY_ID),
    ("zar", "zar-south-african-rand"),
];

/// CoinPaprika currency id for a fiat short name such as `usd`.
pub fn currency_id(currency: &str) -> Option<&'static str> {
    let currency = currency.trim().to_lowercase();
    FIAT_CURRENCY_IDS
        .iter()
        .find(|(name, _)| *name == currency)
        .map(|(_, id)| *id)
}

/// Whether CoinPaprika can price against the fiat currency.
pub fn is_accepted_currency(currency: &str) -> bool {
    currency_id(currency).is_some()
}

/// Currency id and the amount raised to the smallest quotable amount.
///
/// Yen and won have no minor unit, so their minimum is 1 instead of 0.01.
pub fn base_amount_and_currency_id(currency: &str, amount: f64) -> Option<(&'static str, f64)> {
    let id = currency_id(currency)?;
    let minimum = if id.starts_with("jpy") || id.starts_with("krw") {
        1.0
    } else {
        0.01
    };
    Some((id, amount.max(minimum)))
}

/// Ticker for a single coin.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TickerResponse {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub rank: u32,
    pub circulating_supply: f64,
    pub total_supply: f64,
    pub max_supply: f64,
    pub beta_value: f64,
    pub last_updated: String,
    pub quotes: Option<TickerQuotes>,
    #[serde(skip)]
    pub last_request: Option<LastRequest>,
}

impl TickerResponse {
    /// USD price of the coin, if quoted.
    pub fn usd_price(&self) -> Option<f64> {
        self.quotes.as_ref()?.usd.as_ref().map(|q| q.price)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TickerQuotes {
    #[serde(rename = "USD", default)]
    pub usd: Option<TickerQuote>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TickerQuote {
    pub price: f64,
    pub volume_24h: f64,
    pub volume_24h_change_24h: f64,
    pub market_cap: f64,
}

/// Result of converting an amount of one currency into another.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceConversionResponse {
    pub amount: f64,
    pub base_currency_id: String,
    pub base_currency_name: String,
    pub base_price_last_updated: String,
    pub price: f64,
    pub quote_currency_id: String,
    pub quote_currency_name: String,
    pub quote_price_last_updated: String,
    #[serde(skip)]
    pub last_request: Option<LastRequest>,
}

impl PriceConversionResponse {
    /// Satoshi value of `price` when the quote currency is BSV.
    pub fn satoshis(&self) -> bsvrates_common::Result<u64> {
        bsv_float_to_satoshis(self.price)
    }
}

/// Largest number of ticks the historical endpoint returns per request.
pub const MAX_HISTORICAL_LIMIT: u32 = 5000;

/// Currency historical ticks are priced in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoricalQuote {
    Usd,
    Btc,
}

impl HistoricalQuote {
    pub fn as_str(self) -> &'static str {
        match self {
            HistoricalQuote::Usd => "usd",
            HistoricalQuote::Btc => "btc",
        }
    }
}

/// Spacing between historical ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickerInterval {
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "6h")]
    SixHours,
    #[serde(rename = "12h")]
    TwelveHours,
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "7d")]
    SevenDays,
    #[serde(rename = "30d")]
    ThirtyDays,
}

impl TickerInterval {
    /// Query parameter value, e.g. `1h`.
    pub fn as_str(self) -> &'static str {
        match self {
            TickerInterval::FiveMinutes => "5m",
            TickerInterval::FifteenMinutes => "15m",
            TickerInterval::ThirtyMinutes => "30m",
            TickerInterval::OneHour => "1h",
            TickerInterval::SixHours => "6h",
            TickerInterval::TwelveHours => "12h",
            TickerInterval::OneDay => "1d",
            TickerInterval::SevenDays => "7d",
            TickerInterval::ThirtyDays => "30d",
        }
    }
}

/// One point of a coin's price history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalTick {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    #[serde(default)]
    pub volume_24h: f64,
    #[serde(default)]
    pub market_cap: f64,
}

/// Price history returned by the historical tickers endpoint.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistoricalResponse {
    pub ticks: Vec<HistoricalTick>,
    pub last_request: Option<LastRequest>,
}

/// The CoinPaprika endpoints used for rates.
#[async_trait]
pub trait CoinPaprikaApi: Send + Sync {
    async fn get_market_price(&self, coin_id: &str) -> Result<TickerResponse, RequestError>;

    async fn get_price_conversion(
        &self,
        base_currency_id: &str,
        quote_currency_id: &str,
        amount: f64,
    ) -> Result<PriceConversionResponse, RequestError>;

    async fn get_historical_tickers(
        &self,
        coin_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: u32,
        quote: HistoricalQuote,
        interval: TickerInterval,
    ) -> Result<HistoricalResponse, RequestError>;
}

/// [`PriceProvider`] backed by a CoinPaprika client.
pub struct CoinPaprikaProvider<C> {
    client: C,
    coin_id: String,
}

impl<C: CoinPaprikaApi> CoinPaprikaProvider<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            coin_id: COIN_PAPRIKA_QUOTE_ID.to_string(),
        }
    }

    /// Quote a different coin id.
    pub fn with_coin_id(mut self, coin_id: impl Into<String>) -> Self {
        self.coin_id = coin_id.into();
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// USD price history of the coin between `start` and `end`.
    ///
    /// `limit` is clamped to `1..=MAX_HISTORICAL_LIMIT`.
    pub async fn historical_rates(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: u32,
        interval: TickerInterval,
    ) -> RatesResult<Vec<HistoricalTick>> {
        let response = self
            .client
            .get_historical_tickers(
                &self.coin_id,
                start,
                end,
                limit.clamp(1, MAX_HISTORICAL_LIMIT),
                HistoricalQuote::Usd,
                interval,
            )
            .await
            .map_err(Self::request_failed)?;

        Ok(response.ticks)
    }

    fn request_failed(source: RequestError) -> RatesError {
        RatesError::Request {
            provider: Provider::CoinPaprika,
            source,
        }
    }
}

#[async_trait]
impl<C: CoinPaprikaApi> PriceProvider for CoinPaprikaProvider<C> {
    fn provider(&self) -> Provider {
        Provider::CoinPaprika
    }

    async fn get_rate(&self, currency: Currency) -> RatesResult<f64> {
        if currency != Currency::Dollars {
            return Err(RatesError::CurrencyNotAccepted(currency));
        }

        let ticker = self
            .client
            .get_market_price(&self.coin_id)
            .await
            .map_err(Self::request_failed)?;

        ticker.usd_price().ok_or_else(|| RatesError::InvalidResponse {
            provider: Provider::CoinPaprika,
            reason: format!("ticker {} has no USD quote", self.coin_id),
        })
    }

    async fn get_conversion(
        &self,
        currency: Currency,
        amount: f64,
    ) -> RatesResult<Option<PriceConversion>> {
        let base_id =
            currency_id(currency.name()).ok_or(RatesError::CurrencyNotAccepted(currency))?;

        let response = self
            .client
            .get_price_conversion(base_id, &self.coin_id, amount)
            .await
            .map_err(Self::request_failed)?;

        Ok(Some(PriceConversion {
            price: response.price,
            last_request: response.last_request,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use parking_lot::Mutex;

    #[derive(Default)]
    struct StubPaprika {
        price: Option<f64>,
        history_requests: Mutex<Vec<(String, u32, HistoricalQuote, TickerInterval)>>,
    }

    impl StubPaprika {
        fn priced(price: Option<f64>) -> Self {
            Self {
                price,
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl CoinPaprikaApi for StubPaprika {
        async fn get_market_price(&self, coin_id: &str) -> Result<TickerResponse, RequestError> {
            let last_request = LastRequest::new(
                "GET",
                format!("https://api.coinpaprika.com/v1/tickers/{coin_id}"),
                502,
            );
            let price = self
                .price
                .ok_or_else(|| RequestError::new(last_request.clone(), "request to paprika fails... 502"))?;

            Ok(TickerResponse {
                id: coin_id.to_string(),
                name: "Bitcoin SV".to_string(),
                symbol: "BSV".to_string(),
                quotes: Some(TickerQuotes {
                    usd: Some(TickerQuote {
                        price,
                        ..Default::default()
                    }),
                }),
                last_request: Some(LastRequest {
                    status_code: 200,
                    ..last_request
                }),
                ..Default::default()
            })
        }

        async fn get_price_conversion(
            &self,
            base_currency_id: &str,
            quote_currency_id: &str,
            amount: f64,
        ) -> Result<PriceConversionResponse, RequestError> {
            let last_request = LastRequest::new("GET", "https://api.coinpaprika.com/v1/price-converter", 200);
            match self.price {
                Some(price) => Ok(PriceConversionResponse {
                    amount,
                    base_currency_id: base_currency_id.to_string(),
                    quote_currency_id: quote_currency_id.to_string(),
                    price: amount / price,
                    last_request: Some(last_request),
                    ..Default::default()
                }),
                None => Err(RequestError::new(
                    LastRequest {
                        status_code: 400,
                        ..last_request
                    },
                    "some error occurred",
                )),
            }
        }

        async fn get_historical_tickers(
            &self,
            coin_id: &str,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
            limit: u32,
            quote: HistoricalQuote,
            interval: TickerInterval,
        ) -> Result<HistoricalResponse, RequestError> {
            self.history_requests
                .lock()
                .push((coin_id.to_string(), limit, quote, interval));

            let last_request = LastRequest::new(
                "GET",
                format!("https://api.coinpaprika.com/v1/tickers/{coin_id}/historical"),
                200,
            );
            let price = self.price.ok_or_else(|| {
                RequestError::new(
                    LastRequest {
                        status_code: 400,
                        ..last_request.clone()
                    },
                    "some error occurred",
                )
            })?;

            let ticks = [start, end]
                .into_iter()
                .map(|timestamp| HistoricalTick {
                    timestamp,
                    price,
                    volume_24h: 0.0,
                    market_cap: 0.0,
                })
                .collect();
            Ok(HistoricalResponse {
                ticks,
                last_request: Some(last_request),
            })
        }
    }

    #[test]
    fn test_currency_ids() {
        assert_eq!(currency_id("usd"), Some(USD_CURRENCY_ID));
        assert_eq!(currency_id("USD"), Some(USD_CURRENCY_ID));
        assert_eq!(currency_id("eur"), Some("eur-euro"));
        assert_eq!(currency_id("bsv"), None);
        assert!(is_accepted_currency("zar"));
        assert!(!is_accepted_currency("usa"));
        assert!(!is_accepted_currency(""));
    }

    #[test]
    fn test_base_amount_and_currency_id() {
        assert_eq!(
            base_amount_and_currency_id("usd", 0.0),
            Some((USD_CURRENCY_ID, 0.01))
        );
        assert_eq!(
            base_amount_and_currency_id("usd", 0.01),
            Some((USD_CURRENCY_ID, 0.01))
        );
        assert_eq!(
            base_amount_and_currency_id("usd", 25.0),
            Some((USD_CURRENCY_ID, 25.0))
        );
        assert_eq!(
            base_amount_and_currency_id("jpy", 0.01),
            Some(("jpy-japanese-yen", 1.0))
        );
        assert_eq!(
            base_amount_and_currency_id("krw", 0.01),
            Some(("krw-south-korea-won", 1.0))
        );
        assert_eq!(base_amount_and_currency_id("bogus", 0.01), None);
    }

    #[test]
    fn test_response_json() {
        let ticker: TickerResponse = serde_json::from_str(
            r#"{
                "id": "bsv-bitcoin-sv",
                "name": "Bitcoin SV",
                "symbol": "BSV",
                "rank": 6,
                "circulating_supply": 18448838,
                "total_supply": 18448838,
                "max_supply": 21000000,
                "beta_value": 1.39789,
                "last_updated": "2020-07-01T18:36:56Z",
                "quotes": {"USD": {"price": 158.49415248, "volume_24h": 719426754.25105, "market_cap": 2924031833}}
            }"#,
        )
        .unwrap();
        assert_eq!(ticker.usd_price(), Some(158.49415248));
        assert_eq!(ticker.rank, 6);

        let conversion: PriceConversionResponse = serde_json::from_str(
            r#"{
                "base_currency_id": "usd-us-dollars",
                "base_currency_name": "US Dollars",
                "quote_currency_id": "bsv-bitcoin-sv",
                "quote_currency_name": "Bitcoin SV",
                "amount": 1,
                "price": 0.006331560350007446
            }"#,
        )
        .unwrap();
        assert_eq!(conversion.satoshis().unwrap(), 633_157);
        assert!(conversion.last_request.is_none());
    }

    #[test]
    fn test_response_satoshis() {
        let cases = [
            (0.0, 0),
            (1.0, 100_000_000),
            (0.0001, 10_000),
            (0.00000001, 1),
            (0.000000001, 1),
            (45627467.0, 4_562_746_700_000_000),
        ];
        for (price, expected) in cases {
            let response = PriceConversionResponse {
                price,
                ..Default::default()
            };
            assert_eq!(response.satoshis().unwrap(), expected);
        }

        for price in [f64::NAN, f64::INFINITY] {
            let response = PriceConversionResponse {
                price,
                ..Default::default()
            };
            assert!(response.satoshis().is_err());
        }
    }

    #[tokio::test]
    async fn test_provider_rate() {
        let provider = CoinPaprikaProvider::new(StubPaprika::priced(Some(158.49415248)));

        assert_eq!(provider.provider(), Provider::CoinPaprika);
        assert_eq!(provider.get_rate(Currency::Dollars).await.unwrap(), 158.49415248);
        assert!(matches!(
            provider.get_rate(Currency::Bitcoin).await,
            Err(RatesError::CurrencyNotAccepted(Currency::Bitcoin))
        ));
    }

    #[tokio::test]
    async fn test_provider_conversion() {
        let provider = CoinPaprikaProvider::new(StubPaprika::priced(Some(100.0)));

        let conversion = provider
            .get_conversion(Currency::Dollars, 150.0)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(conversion.price, 1.5);
        assert_eq!(conversion.satoshis().unwrap(), 150_000_000);
        assert_eq!(conversion.last_request.unwrap().status_code, 200);
    }

    #[tokio::test]
    async fn test_provider_failures_keep_request() {
        let provider = CoinPaprikaProvider::new(StubPaprika::priced(None)).with_coin_id("bsv-test");

        match provider.get_rate(Currency::Dollars).await {
            Err(RatesError::Request { provider, source }) => {
                assert_eq!(provider, Provider::CoinPaprika);
                assert_eq!(source.last_request.status_code, 502);
                assert!(source.last_request.url.ends_with("bsv-test"));
            }
            other => panic!("expected request error, got {other:?}"),
        }

        match provider.get_conversion(Currency::Dollars, 1.0).await {
            Err(RatesError::Request { source, .. }) => {
                assert_eq!(source.last_request.status_code, 400);
            }
            other => panic!("expected request error, got {other:?}"),
        }
    }

    #[test]
    fn test_historical_json() {
        let ticks: Vec<HistoricalTick> = serde_json::from_str(
            r#"[
                {"timestamp": "2020-07-01T00:00:00Z", "price": 158.12, "volume_24h": 719426754, "market_cap": 2917283710},
                {"timestamp": "2020-07-01T01:00:00Z", "price": 158.49}
            ]"#,
        )
        .unwrap();
        assert_eq!(ticks.len(), 2);
        assert_eq!(ticks[0].timestamp, Utc.with_ymd_and_hms(2020, 7, 1, 0, 0, 0).unwrap());
        assert_eq!(ticks[1].price, 158.49);
        assert_eq!(ticks[1].market_cap, 0.0);

        assert_eq!(serde_json::to_string(&TickerInterval::OneHour).unwrap(), "\"1h\"");
        assert_eq!(TickerInterval::SevenDays.as_str(), "7d");
        assert_eq!(HistoricalQuote::Usd.as_str(), "usd");
    }

    #[tokio::test]
    async fn test_provider_historical_rates() {
        let provider = CoinPaprikaProvider::new(StubPaprika::priced(Some(158.0)));
        let start = Utc.with_ymd_and_hms(2020, 7, 1, 0, 0, 0).unwrap();
        let end = start + Duration::days(1);

        let ticks = provider
            .historical_rates(start, end, 24, TickerInterval::OneHour)
            .await
            .unwrap();
        assert_eq!(ticks.len(), 2);
        assert_eq!(ticks[0].timestamp, start);
        assert_eq!(ticks[1].price, 158.0);

        provider
            .historical_rates(start, end, 0, TickerInterval::OneDay)
            .await
            .unwrap();
        provider
            .historical_rates(start, end, 100_000, TickerInterval::OneDay)
            .await
            .unwrap();

        let requests = provider.client().history_requests.lock().clone();
        assert_eq!(
            requests,
            vec![
                (COIN_PAPRIKA_QUOTE_ID.to_string(), 24, HistoricalQuote::Usd, TickerInterval::OneHour),
                (COIN_PAPRIKA_QUOTE_ID.to_string(), 1, HistoricalQuote::Usd, TickerInterval::OneDay),
                (
                    COIN_PAPRIKA_QUOTE_ID.to_string(),
                    MAX_HISTORICAL_LIMIT,
                    HistoricalQuote::Usd,
                    TickerInterval::OneDay
                ),
            ]
        );
    }

    #[tokio::test]
    async fn test_provider_historical_failure() {
        let provider = CoinPaprikaProvider::new(StubPaprika::priced(None));
        let start = Utc.with_ymd_and_hms(2020, 7, 1, 0, 0, 0).unwrap();

        match provider
            .historical_rates(start, start, 10, TickerInterval::FiveMinutes)
            .await
        {
            Err(RatesError::Request { provider, source }) => {
                assert_eq!(provider, Provider::CoinPaprika);
                assert_eq!(source.last_request.status_code, 400);
            }
            other => panic!("expected request error, got {other:?}"),
        }
    }
}

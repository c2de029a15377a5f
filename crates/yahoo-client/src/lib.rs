use async_trait::async_trait;
use radar_core::{
    normalize_debt_to_equity, FundamentalsProvider, FundamentalsRecord, RadarError,
};
use reqwest::{Client, Request, Response, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

pub mod cache;

pub use cache::CachedProvider;

pub const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";
pub const DEFAULT_COOKIE_URL: &str = "https://fc.yahoo.com";
const QUOTE_SUMMARY_PATH: &str = "/v10/finance/quoteSummary";
const CRUMB_PATH: &str = "/v1/test/getcrumb";
const MODULES: &str = "price,summaryDetail,defaultKeyStatistics,financialData,assetProfile";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Clone)]
pub struct YahooConfig {
    pub base_url: String,
    /// Visited once per session to pick up the cookies the crumb is tied to.
    pub cookie_url: String,
    /// Upper bound for a single HTTP round trip.
    pub timeout: Duration,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            cookie_url: DEFAULT_COOKIE_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Fundamentals from Yahoo's quoteSummary endpoint.
///
/// quoteSummary only answers requests carrying a session cookie and the
/// matching crumb. The session is established lazily on the first fetch,
/// shared by clones, and refreshed once when Yahoo answers 401.
#[derive(Clone)]
pub struct YahooFundamentalsClient {
    client: Client,
    base_url: String,
    cookie_url: String,
    crumb: Arc<Mutex<Option<String>>>,
}

impl YahooFundamentalsClient {
    pub fn new(config: YahooConfig) -> Result<Self, RadarError> {
        let client = Client::builder()
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| RadarError::InvalidConfig(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cookie_url: config.cookie_url,
            crumb: Arc::new(Mutex::new(None)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Current crumb, establishing the cookie session first if needed
    async fn crumb(&self, symbol: &str) -> Result<String, RadarError> {
        let mut cached = self.crumb.lock().await;
        if let Some(crumb) = cached.as_ref() {
            return Ok(crumb.clone());
        }

        // The cookie host usually answers 404 but still sets the session cookies
        if let Err(e) = self.client.get(&self.cookie_url).send().await {
            tracing::debug!("Yahoo cookie request failed: {}", e);
        }

        let body = self
            .client
            .get(format!("{}{}", self.base_url, CRUMB_PATH))
            .send()
            .await
            .map_err(|e| RadarError::fetch(symbol, e))?
            .text()
            .await
            .map_err(|e| RadarError::fetch(symbol, e))?;

        let crumb = parse_crumb(&body).map_err(|reason| RadarError::fetch(symbol, reason))?;
        tracing::debug!("Yahoo session established");
        *cached = Some(crumb.clone());
        Ok(crumb)
    }

    async fn invalidate_crumb(&self) {
        *self.crumb.lock().await = None;
    }

    /// Build the quoteSummary request for `symbol` signed with `crumb`.
    pub fn quote_summary_request(&self, symbol: &str, crumb: &str) -> Result<Request, RadarError> {
        self.client
            .get(format!("{}{}/{}", self.base_url, QUOTE_SUMMARY_PATH, symbol))
            .query(&[("modules", MODULES), ("crumb", crumb)])
            .build()
            .map_err(|e| RadarError::fetch(symbol, e))
    }

    async fn send_quote_summary(&self, symbol: &str) -> Result<Response, RadarError> {
        let crumb = self.crumb(symbol).await?;
        let request = self.quote_summary_request(symbol, &crumb)?;
        self.client
            .execute(request)
            .await
            .map_err(|e| RadarError::fetch(symbol, e))
    }

    /// Get the raw quoteSummary payload for a symbol
    pub async fn get_quote_summary(&self, symbol: &str) -> Result<Value, RadarError> {
        let mut response = self.send_quote_summary(symbol).await?;

        // Expired or rejected crumb: start a fresh session and retry once
        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::debug!("{}: Yahoo rejected the crumb, refreshing session", symbol);
            self.invalidate_crumb().await;
            response = self.send_quote_summary(symbol).await?;
        }

        // Yahoo answers 404 with a JSON error body for unknown symbols
        let status = response.status();
        if !status.is_success() && status != StatusCode::NOT_FOUND {
            return Err(RadarError::fetch(symbol, format!("HTTP {status}")));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| RadarError::fetch(symbol, e))
    }
}

#[async_trait]
impl FundamentalsProvider for YahooFundamentalsClient {
    async fn fetch(&self, ticker: &str) -> Result<FundamentalsRecord, RadarError> {
        let json = self.get_quote_summary(ticker).await?;
        parse_quote_summary(ticker, &json)
    }
}

/// Validate the body of the getcrumb endpoint. Rejections come back as
/// plain text or HTML rather than an error status.
pub fn parse_crumb(body: &str) -> Result<String, String> {
    let crumb = body.trim();
    if crumb.is_empty() {
        return Err("empty crumb".to_string());
    }
    if crumb.contains("Unauthorized")
        || crumb.contains("Too Many")
        || crumb.contains('<')
        || crumb.chars().any(char::is_whitespace)
    {
        return Err(format!("crumb request rejected: {crumb}"));
    }
    Ok(crumb.to_string())
}

/// Yahoo wraps most numbers as `{"raw": 12.3, "fmt": "12.30"}`; some modules
/// return them bare. Empty objects and non-finite values count as missing.
fn number(v: Option<&Value>) -> Option<f64> {
    let v = v?;
    let x = match v {
        Value::Object(map) => map.get("raw")?.as_f64()?,
        other => other.as_f64()?,
    };
    x.is_finite().then_some(x)
}

fn text(v: Option<&Value>) -> Option<String> {
    v?.as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Build a [`FundamentalsRecord`] from a quoteSummary payload.
pub fn parse_quote_summary(ticker: &str, json: &Value) -> Result<FundamentalsRecord, RadarError> {
    let summary = json
        .get("quoteSummary")
        .ok_or_else(|| RadarError::fetch(ticker, "payload has no quoteSummary"))?;

    let result = summary
        .get("result")
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first());

    let data = match result {
        Some(data) => data,
        None => {
            let reason = summary
                .get("error")
                .and_then(|e| e.get("description"))
                .and_then(|d| d.as_str())
                .unwrap_or("empty result");
            return Err(RadarError::MissingData(format!("{ticker}: {reason}")));
        }
    };

    let module = |name: &str| data.get(name);
    let field = |m: &str, f: &str| module(m).and_then(|m| m.get(f));

    let company_name = text(field("price", "longName"))
        .or_else(|| text(field("price", "shortName")))
        .unwrap_or_default();

    let pe = number(field("summaryDetail", "trailingPE"))
        .or_else(|| number(field("defaultKeyStatistics", "trailingPE")));
    let pb = number(field("defaultKeyStatistics", "priceToBook"));
    let ev_ebitda = number(field("defaultKeyStatistics", "enterpriseToEbitda"));

    Ok(FundamentalsRecord {
        ticker: ticker.trim().to_uppercase(),
        company_name,
        sector: text(field("assetProfile", "sector")).unwrap_or_default(),
        industry: text(field("assetProfile", "industry")).unwrap_or_default(),
        price: number(field("price", "regularMarketPrice"))
            .or_else(|| number(field("financialData", "currentPrice"))),
        pe,
        pb,
        ev_ebitda,
        debt_to_equity: number(field("financialData", "debtToEquity")).map(normalize_debt_to_equity),
        roe: number(field("financialData", "returnOnEquity")),
    })
}

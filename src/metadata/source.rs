use std::error::Error as StdError;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use reqwest::redirect::Policy;
use reqwest::Client as ReqwestClient;
use thiserror::Error;
use url::{Host, Url};

pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
pub const MAX_REDIRECTS: usize = 10;
pub const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; QuickCards/",
    env!("CARGO_PKG_VERSION"),
    "; link preview cards)"
);

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("could not resolve host {0}")]
    Resolve(String),

    #[error("host {0} resolves to a private or reserved address")]
    PrivateHost(String),
}

/// Where page bodies come from. The HTTP implementation is the only one
/// used in production; tests substitute counting fakes.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch the body at `url` with a single attempt.
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

/// Returns `true` if `ip` is a private, loopback, or link-local address.
pub fn is_private_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            let o = v4.octets();
            matches!(
                o,
                [127, ..]
                    | [10, ..]
                    | [169, 254, ..]
                    | [192, 168, ..]
                    | [0, ..]
                    | [255, 255, 255, 255]
            ) || (o[0] == 172 && (16..=31).contains(&o[1]))
        }
        IpAddr::V6(v6) => {
            v6.is_loopback()
                || v6.is_unspecified()
                || (v6.segments()[0] & 0xfe00 == 0xfc00)
                || (v6.segments()[0] & 0xffc0 == 0xfe80)
        }
    }
}

type BoxError = Box<dyn StdError + Send + Sync>;

/// Addresses a fetch must never connect to.
pub type AddressFilter = fn(IpAddr) -> bool;

/// The blocked host of a literal-IP URL, if it is blocked.
fn blocked_literal(url: &Url, blocked: AddressFilter) -> Option<String> {
    let ip = match url.host()? {
        Host::Ipv4(ip) => IpAddr::V4(ip),
        Host::Ipv6(ip) => IpAddr::V6(ip),
        Host::Domain(_) => return None,
    };
    blocked(ip).then(|| ip.to_string())
}

/// DNS resolver that refuses names resolving to a blocked address. The
/// connection then uses exactly the addresses checked here, so a second
/// lookup cannot swap in a private one.
struct FilteringResolver {
    blocked: AddressFilter,
}

impl Resolve for FilteringResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let blocked = self.blocked;
        Box::pin(async move {
            let host = name.as_str().to_string();
            let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host.as_str(), 0))
                .await?
                .collect();
            if addrs.iter().any(|addr| blocked(addr.ip())) {
                return Err(Box::new(FetchError::PrivateHost(host)) as BoxError);
            }
            Ok::<Addrs, BoxError>(Box::new(addrs.into_iter()))
        })
    }
}

/// Follow up to [`MAX_REDIRECTS`] hops, refusing literal blocked addresses.
/// Named hosts are checked by [`FilteringResolver`] on connect.
fn redirect_policy(blocked: AddressFilter) -> Policy {
    Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            return attempt.error("too many redirects");
        }
        match blocked_literal(attempt.url(), blocked) {
            Some(host) => attempt.error(FetchError::PrivateHost(host)),
            None => attempt.follow(),
        }
    })
}

/// Surface a blocked address buried in a reqwest error chain.
fn classify(err: reqwest::Error) -> FetchError {
    let mut source = err.source();
    while let Some(inner) = source {
        if let Some(FetchError::PrivateHost(host)) = inner.downcast_ref::<FetchError>() {
            return FetchError::PrivateHost(host.clone());
        }
        source = inner.source();
    }
    FetchError::Request(err)
}

/// Fetches pages over HTTP(S) with a hard timeout.
///
/// Response status is not inspected: an error page's body is parsed like
/// any other. With an address filter installed every hop is checked,
/// including redirects and the addresses DNS hands back.
#[derive(Clone)]
pub struct HttpPageSource {
    client: ReqwestClient,
    blocked: Option<AddressFilter>,
}

impl HttpPageSource {
    pub fn new(allow_private_hosts: bool) -> Result<Self, FetchError> {
        Self::with_address_filter((!allow_private_hosts).then_some(is_private_ip as AddressFilter))
    }

    /// Build a source refusing every address for which `blocked` is true.
    pub fn with_address_filter(blocked: Option<AddressFilter>) -> Result<Self, FetchError> {
        let mut builder = ReqwestClient::builder()
            .timeout(FETCH_TIMEOUT)
            .connect_timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT);

        builder = match blocked {
            Some(blocked) => builder
                .redirect(redirect_policy(blocked))
                .dns_resolver(Arc::new(FilteringResolver { blocked })),
            None => builder.redirect(Policy::limited(MAX_REDIRECTS)),
        };

        Ok(Self {
            client: builder.build()?,
            blocked,
        })
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        if url.host().is_none() {
            return Err(FetchError::Resolve(url.to_string()));
        }
        if let Some(host) = self.blocked.and_then(|blocked| blocked_literal(url, blocked)) {
            return Err(FetchError::PrivateHost(host));
        }

        let response = self.client.get(url.clone()).send().await.map_err(classify)?;
        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), url = %url, "Parsing non-success response body");
        }

        response.text().await.map_err(classify)
    }
}

// ── Unit tests ─────────────────────────────────────────────────────────────

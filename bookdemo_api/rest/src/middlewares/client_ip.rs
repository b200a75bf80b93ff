use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use axum::{
    extract::{ConnectInfo, Request},
    middleware::{from_fn, Next},
    Router,
};
use tracing::{debug, error, warn};

use crate::RestServerRealIpConfig;

pub fn add<S: Clone + Send + Sync + 'static>(
    real_ip_config: Option<Arc<RestServerRealIpConfig>>,
) -> impl FnOnce(Router<S>) -> Router<S> {
    |router| {
        router.layer(from_fn(move |mut request: Request, next: Next| {
            let client_ip = ClientIp::from_request(&request, real_ip_config.as_deref());
            if let Some(client_ip) = client_ip {
                request.extensions_mut().insert(client_ip);
            }
            next.run(request)
        }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientIp(pub IpAddr);

impl ClientIp {
    /// Returns `None` if the server has not been started with connect info,
    /// which is only the case in tests.
    fn from_request(
        request: &Request,
        real_ip_config: Option<&RestServerRealIpConfig>,
    ) -> Option<Self> {
        let peer_ip = request.extensions().get::<ConnectInfo<SocketAddr>>()?.ip();

        let Some(RestServerRealIpConfig { header, set_from }) = real_ip_config else {
            return Some(Self(peer_ip));
        };

        let header_value = request.headers().get(header);

        if *set_from != peer_ip {
            if header_value.is_some() {
                debug!(%peer_ip, ?header_value, "real ip header sent by untrusted peer");
            }
            return Some(Self(peer_ip));
        }

        let Some(header_value) = header_value else {
            warn!(%peer_ip, %header, "trusted proxy did not send real ip header");
            return Some(Self(peer_ip));
        };

        match header_value.to_str().ok().and_then(|x| x.trim().parse().ok()) {
            Some(real_ip) => Some(Self(real_ip)),
            None => {
                error!(%peer_ip, ?header_value, "invalid real ip header value");
                Some(Self(peer_ip))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;

    use super::*;

    fn request(peer: [u8; 4], real_ip: Option<&str>) -> Request {
        let mut request = Request::new(Body::empty());
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from((peer, 4242))));
        if let Some(real_ip) = real_ip {
            request
                .headers_mut()
                .insert("X-Real-Ip", real_ip.parse().unwrap());
        }
        request
    }

    fn config() -> RestServerRealIpConfig {
        RestServerRealIpConfig {
            header: "X-Real-Ip".into(),
            set_from: [10, 0, 0, 1].into(),
        }
    }

    #[test]
    fn without_connect_info() {
        let request = Request::new(Body::empty());
        assert_eq!(ClientIp::from_request(&request, None), None);
    }

    #[test]
    fn peer_ip() {
        let request = request([192, 0, 2, 7], Some("198.51.100.1"));
        assert_eq!(
            ClientIp::from_request(&request, None),
            Some(ClientIp([192, 0, 2, 7].into()))
        );
    }

    #[test]
    fn real_ip_from_trusted_proxy() {
        let request = request([10, 0, 0, 1], Some("198.51.100.1"));
        assert_eq!(
            ClientIp::from_request(&request, Some(&config())),
            Some(ClientIp([198, 51, 100, 1].into()))
        );
    }

    #[test]
    fn real_ip_from_untrusted_peer() {
        let request = request([192, 0, 2, 7], Some("198.51.100.1"));
        assert_eq!(
            ClientIp::from_request(&request, Some(&config())),
            Some(ClientIp([192, 0, 2, 7].into()))
        );
    }

    #[test]
    fn invalid_real_ip() {
        let request = request([10, 0, 0, 1], Some("localhost"));
        assert_eq!(
            ClientIp::from_request(&request, Some(&config())),
            Some(ClientIp([10, 0, 0, 1].into()))
        );
    }
}

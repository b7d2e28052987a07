/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 *
 * Unless you explicitly state otherwise, any contribution intentionally
 * submitted for inclusion in the work by you, as defined in the Apache-2.0
 * license, shall be dual licensed as above, without any additional terms or
 * conditions.
 */

//! Socket URL to Socket.IO endpoint derivation.
//!
//! A widget is given a single socket URL such as
//! `https://ccm.example.com/chat`. The channel connects to the URL's origin
//! and serves the handshake from `{path}/socket.io/`; a bare origin uses the
//! Socket.IO default `/socket.io/`.

use url::Url;

use crate::error::ChannelError;

/// Engine path used when the socket URL has no path of its own.
pub const DEFAULT_SOCKET_IO_PATH: &str = "/socket.io/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelEndpoint {
    /// `scheme://host[:port]`, always `http` or `https`.
    pub origin: String,
    /// Engine path, always starting and ending with `/`.
    pub path: String,
}

impl ChannelEndpoint {
    /// Parse a socket URL. `ws`/`wss` are accepted and mapped to
    /// `http`/`https`, which is what the Socket.IO handshake expects.
    pub fn parse(socket_url: &str) -> Result<Self, ChannelError> {
        let url = Url::parse(socket_url)
            .map_err(|e| ChannelError::InvalidUrl(format!("'{socket_url}': {e}")))?;

        let scheme = match url.scheme() {
            "http" | "ws" => "http",
            "https" | "wss" => "https",
            other => {
                return Err(ChannelError::InvalidUrl(format!(
                    "'{socket_url}': unsupported scheme '{other}'"
                )))
            }
        };
        let host = url
            .host_str()
            .ok_or_else(|| ChannelError::InvalidUrl(format!("'{socket_url}': missing host")))?;
        let origin = match url.port() {
            Some(port) => format!("{scheme}://{host}:{port}"),
            None => format!("{scheme}://{host}"),
        };

        Ok(Self {
            origin,
            path: engine_path(url.path()),
        })
    }

    /// The URL handed to the Socket.IO client.
    pub fn url(&self) -> String {
        format!("{}{}", self.origin, self.path)
    }
}

fn engine_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        DEFAULT_SOCKET_IO_PATH.to_string()
    } else {
        format!("{trimmed}{DEFAULT_SOCKET_IO_PATH}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_path_uses_default_engine_path() {
        let endpoint = ChannelEndpoint::parse("https://ccm.example.com/").unwrap();
        assert_eq!(endpoint.origin, "https://ccm.example.com");
        assert_eq!(endpoint.path, "/socket.io/");
        assert_eq!(endpoint.url(), "https://ccm.example.com/socket.io/");
    }

    #[test]
    fn test_sub_path_gets_socket_io_suffix() {
        let endpoint = ChannelEndpoint::parse("https://ccm.example.com/chat").unwrap();
        assert_eq!(endpoint.origin, "https://ccm.example.com");
        assert_eq!(endpoint.path, "/chat/socket.io/");
    }

    #[test]
    fn test_trailing_slash_on_sub_path() {
        let endpoint = ChannelEndpoint::parse("https://ccm.example.com/tenant/chat/").unwrap();
        assert_eq!(endpoint.path, "/tenant/chat/socket.io/");
    }

    #[test]
    fn test_port_is_kept_and_query_dropped() {
        let endpoint = ChannelEndpoint::parse("http://10.0.0.5:3000/chat?x=1#frag").unwrap();
        assert_eq!(endpoint.url(), "http://10.0.0.5:3000/chat/socket.io/");
    }

    #[test]
    fn test_websocket_schemes_are_mapped() {
        let endpoint = ChannelEndpoint::parse("wss://ccm.example.com").unwrap();
        assert_eq!(endpoint.origin, "https://ccm.example.com");
        let endpoint = ChannelEndpoint::parse("ws://localhost:8080/rt").unwrap();
        assert_eq!(endpoint.url(), "http://localhost:8080/rt/socket.io/");
    }

    #[test]
    fn test_invalid_urls_are_rejected() {
        assert!(matches!(
            ChannelEndpoint::parse("not a url"),
            Err(ChannelError::InvalidUrl(_))
        ));
        assert!(matches!(
            ChannelEndpoint::parse("ftp://ccm.example.com/chat"),
            Err(ChannelError::InvalidUrl(_))
        ));
    }
}

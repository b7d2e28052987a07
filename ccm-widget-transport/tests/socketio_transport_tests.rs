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

//! Tests for the Socket.IO channel.
//!
//! These tests verify endpoint handling and failure paths. Tests that require
//! a running Socket.IO server are marked with `#[ignore]`.

#[cfg(feature = "socketio")]
mod socketio_tests {
    use ccm_widget_transport::socketio::{SocketIoChannel, SocketIoConnector};
    use ccm_widget_transport::{
        ChannelConnector, ChannelEndpoint, ChannelError, ChannelOptions, RealtimeChannel,
        TransportEvent,
    };
    use serde_json::json;
    use std::time::Duration;

    fn options(url: &str) -> ChannelOptions {
        ChannelOptions::new(
            ChannelEndpoint::parse(url).expect("valid test URL"),
            json!({ "serviceIdentifier": "s1", "channelCustomerIdentifier": "c1" }),
        )
        .subscribe(["MESSAGE_RECEIVED", "CHAT_ENDED"])
    }

    #[tokio::test]
    async fn test_connect_fails_with_unreachable_server() {
        let result = SocketIoChannel::connect(options("http://127.0.0.1:1/chat")).await;
        assert!(
            matches!(result, Err(ChannelError::Connect(_))),
            "Should fail when server is unreachable"
        );
    }

    #[tokio::test]
    async fn test_connector_reports_connect_error() {
        let result = SocketIoConnector
            .connect(options("http://127.0.0.1:1/"))
            .await;
        let err = result.err().expect("connect should fail");
        assert!(!err.is_local());
        assert!(format!("{err}").contains("127.0.0.1:1"));
    }

    /// Integration test, requires a Socket.IO server on localhost:3000.
    /// Run manually with: `cargo test -- --ignored`
    #[tokio::test]
    #[ignore]
    async fn test_connect_emit_disconnect_roundtrip() {
        let (channel, mut inbound_rx) = SocketIoChannel::connect(options("http://localhost:3000/"))
            .await
            .expect("Failed to connect");

        let first = tokio::time::timeout(Duration::from_secs(5), inbound_rx.recv())
            .await
            .expect("no connect event");
        assert_eq!(first, Some(TransportEvent::Connected));
        assert!(channel.is_connected());

        channel
            .emit("CHAT_ENDED", json!({ "reason": "test" }))
            .await
            .expect("Failed to emit");

        channel.disconnect().await.expect("Failed to close");
        assert!(!channel.is_connected());
        assert_eq!(
            channel.emit("CHAT_ENDED", json!({})).await,
            Err(ChannelError::Closed)
        );
    }
}

#[cfg(feature = "testing")]
mod mock_tests {
    use ccm_widget_transport::mock::MockConnector;
    use ccm_widget_transport::{
        ChannelConnector, ChannelEndpoint, ChannelError, ChannelOptions, RealtimeChannel,
        TransportEvent,
    };
    use serde_json::json;
    use std::time::Duration;

    fn options() -> ChannelOptions {
        ChannelOptions::new(
            ChannelEndpoint::parse("https://ccm.example.com/chat").unwrap(),
            json!({}),
        )
    }

    #[tokio::test]
    async fn test_mock_announces_connect_and_records_emits() {
        let connector = MockConnector::new();
        connector.ack("CHAT_RESUMED", json!({ "code": 200 }));
        let (channel, mut inbound_rx) = connector.connect(options()).await.unwrap();

        assert_eq!(inbound_rx.recv().await, Some(TransportEvent::Connected));
        channel.emit("CHAT_ENDED", json!({ "a": 1 })).await.unwrap();
        let ack = channel
            .emit_with_ack("CHAT_RESUMED", json!({}), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(ack, json!({ "code": 200 }));

        let mock = connector.last_channel().unwrap();
        assert_eq!(
            mock.emitted(),
            vec![
                ("CHAT_ENDED".to_string(), json!({ "a": 1 })),
                ("CHAT_RESUMED".to_string(), json!({})),
            ]
        );
    }

    #[tokio::test]
    async fn test_mock_without_ack_times_out() {
        let connector = MockConnector::silent();
        let (channel, _rx) = connector.connect(options()).await.unwrap();
        let err = channel
            .emit_with_ack("MESSAGE_RECEIVED", json!({}), Duration::from_millis(10))
            .await
            .unwrap_err();
        assert_eq!(err, ChannelError::AckTimeout("MESSAGE_RECEIVED".into()));
    }

    #[tokio::test]
    async fn test_held_connect_waits_for_release() {
        let connector = MockConnector::new();
        let gate = connector.hold_connects();

        let held = tokio::time::timeout(Duration::from_millis(20), connector.connect(options())).await;
        assert!(held.is_err(), "connect should wait for the gate");
        assert!(connector.channels().is_empty());

        gate.release();
        assert!(connector.connect(options()).await.is_ok());
        assert_eq!(connector.channels().len(), 1);
    }

    #[tokio::test]
    async fn test_mock_counts_disconnects() {
        let connector = MockConnector::new();
        let (channel, _rx) = connector.connect(options()).await.unwrap();
        channel.disconnect().await.unwrap();
        assert!(!channel.is_connected());
        assert_eq!(connector.last_channel().unwrap().disconnects(), 1);
    }

    #[tokio::test]
    async fn test_mock_failure_is_recorded_as_attempt() {
        let connector = MockConnector::new();
        connector.fail_with(ChannelError::Connect("refused".into()));
        assert!(connector.connect(options()).await.is_err());
        assert_eq!(connector.attempts(), 1);
        assert!(connector.channels().is_empty());
    }
}

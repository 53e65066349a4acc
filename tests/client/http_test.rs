#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use schemascope::client::{
        ClientError, MetadataClient, AUTH_ERROR, NETWORK_ERROR, NOT_FOUND, SERVER_ERROR, TIMEOUT,
    };
    use schemascope::metadata::{ColumnType, HttpMetadataProvider, MetadataProvider};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    const CAST: &str = "PicklistAttributeMetadata";

    type RequestLog = Arc<Mutex<Vec<String>>>;

    /// Answer one connection per scripted reply, in order, recording each
    /// request line.
    async fn serve(replies: Vec<(u16, &'static str)>) -> (SocketAddr, RequestLog) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let log: RequestLog = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&log);

        tokio::spawn(async move {
            for (status, body) in replies {
                let (mut stream, _) = listener.accept().await.unwrap();
                let request_line = read_request_line(&mut stream).await;
                seen.lock().unwrap().push(request_line);

                let response = format!(
                    "HTTP/1.1 {status} Scripted\r\n\
                     Content-Type: application/json\r\n\
                     Content-Length: {}\r\n\
                     Connection: close\r\n\r\n{body}",
                    body.len()
                );
                stream.write_all(response.as_bytes()).await.unwrap();
                let _ = stream.shutdown().await;
            }
        });

        (addr, log)
    }

    async fn read_request_line(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }
        String::from_utf8_lossy(&buf)
            .lines()
            .next()
            .unwrap_or_default()
            .to_string()
    }

    fn provider(addr: SocketAddr) -> HttpMetadataProvider {
        let client = MetadataClient::builder(format!("http://{addr}"))
            .timeout(Duration::from_millis(300))
            .build()
            .unwrap();
        HttpMetadataProvider::with_client(client)
    }

    #[tokio::test]
    async fn test_list_tables_decodes_collection() {
        let (addr, log) = serve(vec![(
            200,
            r#"{"value":[{"LogicalName":"account","DisplayName":{"UserLocalizedLabel":{"Label":"Account"}},"ObjectTypeCode":1,"IsCustomEntity":false}]}"#,
        )])
        .await;

        let tables = provider(addr).list_tables().await.unwrap();

        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].display_name, "Account");
        let requests = log.lock().unwrap();
        assert!(requests[0].starts_with("GET /api/data/v9.2/EntityDefinitions"));
    }

    #[tokio::test]
    async fn test_choice_options_fall_back_to_generic_fetch() {
        let (addr, log) = serve(vec![
            (404, "{}"),
            (
                200,
                r#"{"OptionSet":{"Options":[{"Value":1,"Label":{"UserLocalizedLabel":{"Label":"Accounting"}}}]}}"#,
            ),
        ])
        .await;

        let options = provider(addr)
            .choice_options("account", "industrycode", Some(&ColumnType::Picklist))
            .await
            .unwrap();

        assert_eq!(options.len(), 1);
        assert_eq!(options[0].label, "Accounting");
        let requests = log.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].contains(CAST));
        assert!(!requests[1].contains(CAST));
    }

    #[tokio::test]
    async fn test_choice_options_last_error_wins() {
        let (addr, log) = serve(vec![(404, "{}"), (503, "{}")]).await;

        let err = provider(addr)
            .choice_options("account", "industrycode", Some(&ColumnType::Picklist))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), SERVER_ERROR);
        assert_eq!(log.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_choice_options_without_type_use_generic_fetch() {
        let (addr, log) = serve(vec![(
            200,
            r#"{"OptionSet":null,"GlobalOptionSet":{"Options":[{"Value":5,"Label":null}]}}"#,
        )])
        .await;

        let options = provider(addr)
            .choice_options("account", "customertypecode", None)
            .await
            .unwrap();

        assert_eq!(options.len(), 1);
        assert_eq!(options[0].label, "5");
        let requests = log.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert!(!requests[0].contains(CAST));
    }

    #[tokio::test]
    async fn test_status_classification() {
        let cases = [
            (401, AUTH_ERROR.to_string()),
            (403, AUTH_ERROR.to_string()),
            (404, NOT_FOUND.to_string()),
            (500, SERVER_ERROR.to_string()),
            (429, "HTTP Error: 429".to_string()),
        ];

        for (status, expected) in cases {
            let (addr, _) = serve(vec![(status, "{}")]).await;
            let err = provider(addr).list_columns("account").await.unwrap_err();
            assert_eq!(err.to_string(), expected, "status {status}");
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let (addr, _) = serve(vec![(200, "not json")]).await;

        let err = provider(addr).list_tables().await.unwrap_err();

        assert!(matches!(err, ClientError::Decode(_)));
        assert!(!err.to_string().is_empty());
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = provider(addr).list_tables().await.unwrap_err();

        assert!(matches!(err, ClientError::Network(_)));
        assert_eq!(err.to_string(), NETWORK_ERROR);
    }

    #[tokio::test]
    async fn test_stalled_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let err = provider(addr).list_tables().await.unwrap_err();

        assert!(matches!(err, ClientError::Timeout));
        assert_eq!(err.to_string(), TIMEOUT);
    }

    #[tokio::test]
    async fn test_environment_id_from_current_organization() {
        let (addr, log) = serve(vec![(200, r#"{"Detail":{"EnvironmentId":"env-42"}}"#)]).await;

        let id = provider(addr).environment_id().await.unwrap();

        assert_eq!(id, "env-42");
        assert!(log.lock().unwrap()[0].contains("RetrieveCurrentOrganization"));
    }
}

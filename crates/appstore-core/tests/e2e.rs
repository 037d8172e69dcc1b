//! End-to-end tests against a local HTTP server, over the real transport.

use std::sync::Arc;

use appstore_core::{
    ClientConfig, Endpoints, LoginOptions, NullObserver, ReqwestTransport, SearchOptions,
    StoreClient, StoreError,
};
use mockito::{Matcher, Server};

const AUTH_PATH: &str = "/WebObjects/MZFinance.woa/wa/authenticate";
const DOWNLOAD_PATH: &str = "/WebObjects/MZFinance.woa/wa/volumeStoreDownloadProduct";

fn client_for(server: &Server) -> StoreClient<ReqwestTransport, NullObserver> {
    let config = ClientConfig {
        endpoints: Endpoints::with_base(&server.url()),
        ..Default::default()
    };
    let transport = ReqwestTransport::with_timeout(config.timeout()).unwrap();
    StoreClient::with_transport(transport, config, Arc::new(NullObserver))
}

fn plist_body(root: plist::Dictionary) -> Vec<u8> {
    let mut body = Vec::new();
    plist::Value::Dictionary(root)
        .to_writer_binary(&mut body)
        .unwrap();
    body
}

fn login_body() -> Vec<u8> {
    let mut info = plist::Dictionary::new();
    info.insert("appleId".into(), "user@example.com".into());
    let mut root = plist::Dictionary::new();
    root.insert("accountInfo".into(), plist::Value::Dictionary(info));
    root.insert("passwordToken".into(), "tok123".into());
    root.insert("dsPersonId".into(), "12345".into());
    plist_body(root)
}

fn login_options() -> LoginOptions {
    LoginOptions::new("user@example.com", "hunter2")
        .mac_address("AA:BB:CC:DD:EE:FF")
        .region("JP")
}

#[test]
fn test_login_builds_credential() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", AUTH_PATH)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("guid".into(), "aabbccddeeff".into()),
            Matcher::UrlEncoded("Pod".into(), "22".into()),
            Matcher::UrlEncoded("PRH".into(), "22".into()),
        ]))
        .match_header("content-type", "application/x-apple-plist")
        .match_header(
            "user-agent",
            "Configurator/2.15 (Macintosh; OS X 11.0.0; 16G29) AppleWebKit/2603.3.8",
        )
        .with_status(200)
        .with_header("set-cookie", "session=abc; Path=/")
        .with_body(login_body())
        .create();

    let mut client = client_for(&server);
    client.login(login_options()).unwrap();
    mock.assert();

    let cred = client.credential().unwrap();
    assert_eq!(cred.account_id(), "user@example.com");
    assert_eq!(cred.password(), "hunter2");
    assert_eq!(cred.session_token(), "tok123");
    assert_eq!(cred.account_numeric_id(), "12345");
    assert_eq!(cred.region(), "JP");
    assert_eq!(cred.device_id(), "aabbccddeeff");
    assert_eq!(cred.cookies().len(), 1);
    assert_eq!(cred.cookies()[0].name, "session");
    assert_eq!(cred.cookies()[0].value, "abc");
    assert_eq!(cred.cookies()[0].path, "/");
}

#[test]
fn test_login_server_error_leaves_client_unauthenticated() {
    let mut server = Server::new();
    server
        .mock("POST", AUTH_PATH)
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("not a plist")
        .create();

    let mut client = client_for(&server);
    let err = client.login(login_options()).unwrap_err();

    match err {
        StoreError::Upstream { status } => assert_eq!(status, "500 Internal Server Error"),
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(client.credential().is_none());
}

#[test]
fn test_download_sends_session_materials() {
    let mut server = Server::new();
    server
        .mock("POST", AUTH_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("set-cookie", "session=abc; Path=/")
        .with_body(login_body())
        .create();

    let mut song = plist::Dictionary::new();
    song.insert("URL".into(), "https://cdn.example.com/app.ipa".into());
    let mut root = plist::Dictionary::new();
    root.insert(
        "songList".into(),
        plist::Value::Array(vec![plist::Value::Dictionary(song)]),
    );
    let download = server
        .mock("POST", DOWNLOAD_PATH)
        .match_query(Matcher::UrlEncoded("guid".into(), "aabbccddeeff".into()))
        .match_header("x-dsid", "12345")
        .match_header("icloud-dsid", "12345")
        .match_header("cookie", Matcher::Regex("session=abc".into()))
        .with_status(200)
        .with_body(plist_body(root))
        .create();

    let mut client = client_for(&server);
    client.login(login_options()).unwrap();
    let result = client.negotiate_download("284882215").unwrap();
    download.assert();

    assert_eq!(
        result.to_json(),
        serde_json::json!({ "songList": [{ "URL": "https://cdn.example.com/app.ipa" }] })
    );
}

#[test]
fn test_download_without_login_makes_no_request() {
    let mut server = Server::new();
    let download = server
        .mock("POST", DOWNLOAD_PATH)
        .match_query(Matcher::Any)
        .expect(0)
        .create();

    let client = client_for(&server);
    let err = client.negotiate_download("1").unwrap_err();
    assert!(matches!(err, StoreError::NotAuthenticated));
    download.assert();
}

#[test]
fn test_search_over_http() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("term".into(), "notes".into()),
            Matcher::UrlEncoded("country".into(), "DE".into()),
            Matcher::UrlEncoded("entity".into(), "software".into()),
            Matcher::UrlEncoded("limit".into(), "5".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"resultCount":1,"results":[{"trackId":1,"trackName":"Notes","bundleId":"com.example.notes"}]}"#,
        )
        .create();

    let client = client_for(&server);
    let items = client
        .search(&SearchOptions {
            query: "notes".into(),
            region: Some("DE".into()),
            limit: 5,
        })
        .unwrap();
    mock.assert();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].track_name, "Notes");
    assert_eq!(items[0].bundle_id, "com.example.notes");
}

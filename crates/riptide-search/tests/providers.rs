use anyhow::Result;
use riptide_search::providers::{NyaaProvider, PirateBayProvider, YtsProvider};
use riptide_search::{Provider, ProviderError};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn yts_flattens_quality_variants_into_results() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/yts/dune%20part%20two"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "Name": "Dune Part Two",
                "ReleasedDate": "2024",
                "Genre": "Sci-Fi",
                "Url": "https://yts.example/movie/1",
                "Files": [
                    {
                        "Quality": "1080p",
                        "Size": "2.4 GB",
                        "Torrent": "https://yts.example/t/1.torrent",
                        "Magnet": "magnet:?xt=urn:btih:1111111111111111111111111111111111111111"
                    },
                    {
                        "Quality": "2160p",
                        "Size": "5.8 GB",
                        "Torrent": "",
                        "Magnet": "magnet:?xt=urn:btih:2222222222222222222222222222222222222222"
                    }
                ]
            }
        ])))
        .mount(&server)
        .await;

    let provider =
        YtsProvider::with_base_url(reqwest::Client::new(), format!("{}/api/yts", server.uri()));
    let results = provider.search("dune part two").await?;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].name, "Dune Part Two (2024) [1080p]");
    assert_eq!(results[0].size, "2.4 GB");
    assert_eq!(results[0].url, "https://yts.example/t/1.torrent");
    assert_eq!(results[1].name, "Dune Part Two (2024) [2160p]");
    assert_eq!(results[1].url, "https://yts.example/movie/1");
    assert!(results[1].magnet.contains("2222"));
    Ok(())
}

#[tokio::test]
async fn piratebay_maps_the_wire_fields() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/piratebay/arrival"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "Name": "Arrival 2016 1080p",
                "Size": "1.9 GB",
                "DateUploaded": "2016-11-30",
                "Category": "Video",
                "Seeders": "431",
                "Leechers": "12",
                "UploadedBy": "anon",
                "Url": "https://tpb.example/torrent/9",
                "Magnet": "magnet:?xt=urn:btih:3333333333333333333333333333333333333333"
            }
        ])))
        .mount(&server)
        .await;

    let provider = PirateBayProvider::with_base_url(
        reqwest::Client::new(),
        format!("{}/api/piratebay", server.uri()),
    );
    let results = provider.search("arrival").await?;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].provider, "PirateBay");
    assert_eq!(results[0].seeders, "431");
    assert_eq!(results[0].leechers, "12");
    assert_eq!(results[0].date_uploaded, "2016-11-30");
    Ok(())
}

#[tokio::test]
async fn nyaa_maps_the_wire_fields() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/nyaasi/frieren"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "Name": "[SubGroup] Frieren - 28",
                "Category": "Anime",
                "Url": "https://nyaa.example/view/5",
                "Size": "700 MB",
                "DateUploaded": "2024-03-22",
                "Seeders": "998",
                "Leechers": "31",
                "Downloads": "15030",
                "Torrent": "https://nyaa.example/download/5.torrent",
                "Magnet": "magnet:?xt=urn:btih:4444444444444444444444444444444444444444"
            }
        ])))
        .mount(&server)
        .await;

    let provider = NyaaProvider::with_base_url(
        reqwest::Client::new(),
        format!("{}/api/nyaasi", server.uri()),
    );
    let results = provider.search("frieren").await?;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].provider, "NyaaSi");
    assert_eq!(results[0].name, "[SubGroup] Frieren - 28");
    assert_eq!(results[0].seeders, "998");
    Ok(())
}

#[tokio::test]
async fn non_success_statuses_surface_as_errors() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let provider = PirateBayProvider::with_base_url(
        reqwest::Client::new(),
        format!("{}/api/piratebay", server.uri()),
    );
    let err = provider.search("anything").await.unwrap_err();
    assert!(matches!(
        err,
        ProviderError::Status { status } if status.as_u16() == 502
    ));
    Ok(())
}

#[tokio::test]
async fn malformed_payloads_surface_as_http_errors() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let provider = NyaaProvider::with_base_url(
        reqwest::Client::new(),
        format!("{}/api/nyaasi", server.uri()),
    );
    let err = provider.search("anything").await.unwrap_err();
    assert!(matches!(err, ProviderError::Http(_)));
    Ok(())
}

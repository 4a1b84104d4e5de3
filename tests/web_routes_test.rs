#![cfg(feature = "web")]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use std::sync::Arc;
use tower::ServiceExt;
use zonescout::core::{BoundingBox, Geocoder, LeadAuditor, MapReader, Place, PlaceSearch, Verdict};
use zonescout::web::{create_router, AppState};
use zonescout::{Result, ScoutConfig, ScoutError, ScoutServices};

struct FixedGeocoder;

#[async_trait]
impl Geocoder for FixedGeocoder {
    async fn bbox_from_pincode(&self, pincode: &str) -> Result<BoundingBox> {
        match pincode {
            "90210" => Ok(BoundingBox::new(34.13, 34.07, -118.38, -118.44)),
            other => Err(ScoutError::ZoneNotFound {
                pincode: other.to_string(),
            }),
        }
    }
}

struct FixedMapReader;

#[async_trait]
impl MapReader for FixedMapReader {
    async fn bbox_from_image(&self, _image: &[u8], _mime_type: &str) -> Result<BoundingBox> {
        Ok(BoundingBox::new(40.76, 40.75, -73.98, -73.99))
    }
}

struct FixedPlaces;

#[async_trait]
impl PlaceSearch for FixedPlaces {
    async fn search_in_zone(&self, query: &str, _bbox: &BoundingBox) -> Result<Vec<Place>> {
        match query {
            "Coffee Shop" => Ok(["Bean There", "Starbucks"]
                .iter()
                .map(|name| {
                    serde_json::from_value(serde_json::json!({
                        "displayName": {"text": name},
                        "types": ["cafe"],
                        "websiteUri": "https://example.com"
                    }))
                    .unwrap()
                })
                .collect()),
            "Broken" => Err(ScoutError::PlacesApiError {
                status: 403,
                body: "PERMISSION_DENIED".to_string(),
            }),
            _ => Ok(Vec::new()),
        }
    }
}

struct ChainAuditor;

#[async_trait]
impl LeadAuditor for ChainAuditor {
    async fn audit(&self, place: &Place, _criteria: &str) -> Result<Verdict> {
        if place.name() == "Starbucks" {
            Ok(Verdict::rejected("Big chain"))
        } else {
            Ok(Verdict::approved("Independent cafe"))
        }
    }
}

fn app(with_vision: bool) -> Router {
    app_with_config(with_vision, ScoutConfig::default())
}

fn app_with_config(with_vision: bool, config: ScoutConfig) -> Router {
    let map_reader: Option<Arc<dyn MapReader>> = if with_vision {
        Some(Arc::new(FixedMapReader))
    } else {
        None
    };
    let services = ScoutServices {
        geocoder: Arc::new(FixedGeocoder),
        map_reader,
        places: Arc::new(FixedPlaces),
        auditor: Arc::new(ChainAuditor),
    };
    create_router(Arc::new(AppState::new(services, config)))
}

fn form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_index_shows_default_search_parameters() {
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, body) = send(app(false), request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"<input type="text" id="query" name="query" value="Coffee Shop">"#));
    assert!(body.contains("Must be a small business"));
    assert!(body.contains("Map screenshot input is disabled"));
}

#[tokio::test]
async fn test_pincode_locks_zone_into_scout_form() {
    let (status, body) = send(
        app(false),
        form("/zone/pincode", "pincode=90210&query=Coffee+Shop&criteria="),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Zone locked"));
    assert!(body.contains(r#"name="north" value="34.13""#));
    assert!(body.contains(r#"name="west" value="-118.44""#));
    assert!(body.contains("Must be a small business"));
}

#[tokio::test]
async fn test_unknown_pincode_is_bad_request() {
    let (status, body) = send(app(false), form("/zone/pincode", "pincode=00000")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Invalid pincode"));
    assert!(body.contains("00000"));
}

#[tokio::test]
async fn test_map_upload_locks_zone() {
    let boundary = "zonescout-boundary";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"map\"; filename=\"zone.png\"\r\nContent-Type: image/png\r\n\r\nPNGDATA\r\n--{b}\r\nContent-Disposition: form-data; name=\"query\"\r\n\r\nBakery\r\n--{b}--\r\n",
        b = boundary
    );
    let request = Request::builder()
        .method("POST")
        .uri("/zone/image")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();

    let (status, body) = send(app(true), request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"name="north" value="40.76""#));
    assert!(body.contains("Bakery"));
}

#[tokio::test]
async fn test_scout_renders_approved_and_rejected_leads() {
    let (status, body) = send(
        app(false),
        form(
            "/scout",
            "north=34.13&south=34.07&east=-118.38&west=-118.44&query=Coffee+Shop&criteria=No+chains",
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Found 1 qualified leads!"));
    assert!(body.contains("Bean There"));
    assert!(body.contains("Independent cafe"));
    assert!(body.contains("instagram.com"));
    assert!(body.contains("Rejected (Noise)"));
    assert!(body.contains("Rejected (1)"));
    assert!(body.contains("Big chain"));
}

#[tokio::test]
async fn test_scout_with_no_results_shows_message() {
    let (status, body) = send(
        app(false),
        form("/scout", "north=34.13&south=34.07&east=-118.38&west=-118.44&query=Vinyl"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("No leads found in this zone."));
}

#[tokio::test]
async fn test_upstream_failure_is_bad_gateway() {
    let (status, body) = send(
        app(false),
        form("/scout", "north=34.13&south=34.07&east=-118.38&west=-118.44&query=Broken"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body.contains("Google API error: 403"));
    assert!(body.contains("<pre>PERMISSION_DENIED</pre>"));
}

#[tokio::test]
async fn test_scout_api_failure_includes_upstream_body() {
    let (status, body) = send(
        app(false),
        json(
            "/api/v1/scout",
            serde_json::json!({
                "zone": {"north": 34.13, "south": 34.07, "east": -118.38, "west": -118.44},
                "query": "Broken"
            }),
        ),
    )
    .await;

    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(value["error"]["code"], "UPSTREAM_ERROR");
    assert_eq!(value["error"]["message"], "Google API error: 403");
    assert_eq!(value["error"]["details"], "PERMISSION_DENIED");
}

#[tokio::test]
async fn test_scout_api_rejects_blank_query() {
    let (status, body) = send(
        app(false),
        json(
            "/api/v1/scout",
            serde_json::json!({
                "zone": {"north": 34.13, "south": 34.07, "east": -118.38, "west": -118.44},
                "query": "   "
            }),
        ),
    )
    .await;

    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value["error"]["message"], "Please enter a search term.");
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let mut config = ScoutConfig::default();
    config.server.max_upload_mb = 1;

    let boundary = "zonescout-boundary";
    let mut body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"map\"; filename=\"zone.png\"\r\nContent-Type: image/png\r\n\r\n",
        b = boundary
    )
    .into_bytes();
    body.extend(std::iter::repeat(b'x').take(2 * 1024 * 1024));
    body.extend(format!("\r\n--{}--\r\n", boundary).into_bytes());

    let request = Request::builder()
        .method("POST")
        .uri("/zone/image")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap();

    let (status, _) = send(app_with_config(true, config), request).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_inverted_bounds_are_bad_request() {
    let (status, _) = send(
        app(false),
        form("/scout", "north=1&south=2&east=1&west=0&query=Coffee+Shop"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_reports_vision_state() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(app(true), request).await;

    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["success"], true);
    assert_eq!(value["data"]["status"], "healthy");
    assert_eq!(value["data"]["vision_enabled"], true);
}

#[tokio::test]
async fn test_zone_api_returns_bounds_and_center() {
    let (status, body) = send(
        app(false),
        json("/api/v1/zone", serde_json::json!({"pincode": "90210"})),
    )
    .await;

    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["data"]["zone"]["north"], 34.13);
    let center_lat = value["data"]["center"]["lat"].as_f64().unwrap();
    assert!((center_lat - 34.1).abs() < 1e-9);
}

#[tokio::test]
async fn test_zone_api_requires_one_source() {
    let (status, body) = send(app(false), json("/api/v1/zone", serde_json::json!({}))).await;

    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value["success"], false);
    assert_eq!(value["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_scout_api_returns_report() {
    let (status, body) = send(
        app(false),
        json(
            "/api/v1/scout",
            serde_json::json!({
                "zone": {"north": 34.13, "south": 34.07, "east": -118.38, "west": -118.44}
            }),
        ),
    )
    .await;

    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["data"]["qualified"], 1);
    assert_eq!(value["data"]["rejected"], 1);
    assert_eq!(value["data"]["report"]["query"], "Coffee Shop");
    assert_eq!(
        value["data"]["report"]["approved"][0]["verdict"]["status"],
        "APPROVED"
    );
}

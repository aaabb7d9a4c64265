use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{body_json, body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wifimap::api::{app, middleware::session::AppState};
use wifimap::config::Config;

fn test_app(server: &MockServer) -> Router {
    let source = ::config::Config::builder()
        .set_override("api_base_url", server.uri())
        .unwrap()
        .build()
        .unwrap();
    let config = Config::from_source(&source).unwrap();
    app(AppState::new(config).unwrap())
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn session_cookie(response: &axum::response::Response) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie set")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

fn location(response: &axum::response::Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
}

fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn multipart_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            "multipart/form-data; boundary=wifimap-boundary",
        )
        .body(Body::from(body.replace('\n', "\r\n")))
        .unwrap()
}

fn upload_body(floor_name: &str, file_name: &str, content: &str) -> String {
    format!(
        "--wifimap-boundary
Content-Disposition: form-data; name=\"floor_name\"

{floor_name}
--wifimap-boundary
Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"
Content-Type: image/png

{content}
--wifimap-boundary--
"
    )
}

async fn mount_building_with_rooms(server: &MockServer, rooms: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/buildings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "buildings": [{"id": 1, "name": "Main"}]
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rooms"))
        .and(query_param("building_id", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "rooms": rooms })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sessions": []})))
        .mount(server)
        .await;
}

async fn mount_room_scans(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/rooms/3/wifi"))
        .and(query_param("limit", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "room": {"id": 3, "name": "Lab", "building_id": 1, "building_name": "Main"},
            "rows": [
                {"id": 1, "received_at": "2024-05-01T12:00:00Z", "ssid": "eduroam", "rssi": -45, "room_id": 3}
            ]
        })))
        .mount(server)
        .await;
}

fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn create_building_redirects_and_shows_flash() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/buildings"))
        .and(body_json(json!({"name": "Library"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "building": {"id": 7, "name": "Library", "description": null}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/buildings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "buildings": [{"id": 7, "name": "Library", "description": null}]
        })))
        .mount(&server)
        .await;

    let app = test_app(&server);

    let response = app
        .clone()
        .oneshot(form_post("/admin/buildings", "name=++Library++&description="))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/buildings");
    let cookie = session_cookie(&response);

    let page = app
        .clone()
        .oneshot(get_with_cookie("/admin/buildings", &cookie))
        .await
        .unwrap();
    assert_eq!(page.status(), StatusCode::OK);
    let html = body_text(page).await;
    assert!(html.contains("alert alert-success"));
    assert!(html.contains("/admin/buildings/7/rooms"));

    // The flash is consumed by the first render
    let again = app
        .oneshot(get_with_cookie("/admin/buildings", &cookie))
        .await
        .unwrap();
    assert!(!body_text(again).await.contains("alert-success"));
}

#[tokio::test]
async fn blank_building_name_is_rejected_without_calling_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/buildings"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let response = test_app(&server)
        .oneshot(form_post("/admin/buildings", "name=+++"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn backend_failure_on_write_becomes_error_flash() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rooms/3/start-scan"))
        .respond_with(ResponseTemplate::new(409).set_body_string("Room already has an active session"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/buildings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "buildings": [{"id": 1, "name": "Main"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rooms"))
        .and(query_param("building_id", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "rooms": [{"id": 3, "name": "Lab", "building_id": 1}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sessions": []})))
        .mount(&server)
        .await;

    let app = test_app(&server);

    let response = app
        .clone()
        .oneshot(form_post("/admin/rooms/3/start-scan", "building_id=1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/buildings/1/rooms");
    let cookie = session_cookie(&response);

    let html = body_text(
        app.oneshot(get_with_cookie("/admin/buildings/1/rooms", &cookie))
            .await
            .unwrap(),
    )
    .await;
    assert!(html.contains("alert alert-error"));
    assert!(html.contains("Room already has an active session"));
    assert!(html.contains("Inactive"));
}

#[tokio::test]
async fn place_room_sends_normalized_coordinates() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/rooms/3"))
        .and(body_json(json!({"floorplan_id": 7, "x": 0.25, "y": 0.5})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "room": {"id": 3, "name": "Lab", "building_id": 1, "floorplan_id": 7, "x": 0.25, "y": 0.5}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = test_app(&server)
        .oneshot(form_post(
            "/admin/floorplans/7/place",
            "building_id=1&room_id=3&click_x=200&click_y=150&display_width=800&display_height=300",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/buildings/1/floorplans?floorplan=7");
}

#[tokio::test]
async fn raw_scans_rejects_out_of_range_limit() {
    let server = MockServer::start().await;

    let response = test_app(&server)
        .oneshot(
            Request::builder()
                .uri("/admin/scans?limit=0")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn backend_outage_renders_error_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sessions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database unavailable"))
        .mount(&server)
        .await;

    let response = test_app(&server)
        .oneshot(Request::builder().uri("/admin/sessions").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(body_text(response).await.contains("database unavailable"));
}

#[tokio::test]
async fn root_redirects_to_user_dashboard() {
    let server = MockServer::start().await;

    let response = test_app(&server)
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/user");
}

#[tokio::test]
async fn health_reports_backend_reachability() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let response = test_app(&server)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["dependencies"]["backend"]["status"], "healthy");

    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let response = test_app(&server)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn user_building_view_colours_rooms_by_signal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/buildings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "buildings": [{"id": 1, "name": "Main", "description": "HQ"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rooms"))
        .and(query_param("building_id", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "rooms": [
                {"id": 3, "name": "Lab", "building_id": 1},
                {"id": 4, "name": "Storage", "building_id": 1}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/buildings/1/wifi"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "building": {"id": 1, "name": "Main"},
            "rows": [
                {"id": 1, "received_at": "2024-05-01T12:00:00Z", "ssid": "eduroam", "rssi": -40, "room_id": 3},
                {"id": 2, "received_at": "2024-05-01T12:00:01Z", "ssid": "guest", "rssi": -45, "room_id": 3}
            ]
        })))
        .mount(&server)
        .await;
    // Floor plans failing must not break the page
    Mock::given(method("GET"))
        .and(path("/buildings/1/floorplans"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let response = test_app(&server)
        .oneshot(Request::builder().uri("/user/buildings/1").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("url(#strongSignal)"));
    assert!(html.contains("url(#noSignal)"));
    assert!(html.contains("/user/buildings/1/rooms/3"));
    assert!(html.contains(r#"http-equiv="refresh" content="5""#));
}

#[tokio::test]
async fn user_building_view_unknown_building_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/buildings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"buildings": []})))
        .mount(&server)
        .await;

    let response = test_app(&server)
        .oneshot(Request::builder().uri("/user/buildings/9").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("Building not found"));
}

#[tokio::test]
async fn update_building_sends_blank_description_to_clear_it() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/buildings/7"))
        .and(body_json(json!({"name": "Library", "description": ""})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "building": {"id": 7, "name": "Library", "description": null}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = test_app(&server)
        .oneshot(form_post("/admin/buildings/7", "name=Library&description=++"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/buildings");
}

#[tokio::test]
async fn update_room_moves_room_and_clears_optional_fields() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/rooms/3"))
        .and(body_json(json!({"name": "Lab", "building_id": 2, "floor": "", "room_type": ""})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "room": {"id": 3, "name": "Lab", "building_id": 2}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = test_app(&server)
        .oneshot(form_post(
            "/admin/rooms/3",
            "name=Lab&building_id=2&floor=&room_type=+",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/buildings/2/rooms");
}

#[tokio::test]
async fn delete_building_refetches_list_without_it() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/buildings/7"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/buildings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "buildings": [{"id": 8, "name": "Annex"}]
        })))
        .mount(&server)
        .await;

    let app = test_app(&server);

    let response = app
        .clone()
        .oneshot(form_post("/admin/buildings/7/delete", ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/buildings");
    let cookie = session_cookie(&response);

    let html = body_text(
        app.oneshot(get_with_cookie("/admin/buildings", &cookie))
            .await
            .unwrap(),
    )
    .await;
    assert!(html.contains("Building deleted"));
    assert!(html.contains("/admin/buildings/8/rooms"));
    assert!(!html.contains("/admin/buildings/7/rooms"));
}

#[tokio::test]
async fn delete_room_returns_to_building_rooms() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/rooms/3"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    mount_building_with_rooms(&server, json!([{"id": 4, "name": "Kitchen", "building_id": 1}])).await;

    let app = test_app(&server);

    let response = app
        .clone()
        .oneshot(form_post("/admin/rooms/3/delete", "building_id=1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/buildings/1/rooms");
    let cookie = session_cookie(&response);

    let html = body_text(
        app.oneshot(get_with_cookie("/admin/buildings/1/rooms", &cookie))
            .await
            .unwrap(),
    )
    .await;
    assert!(html.contains("Room deleted"));
    assert!(html.contains("Kitchen"));
    assert!(!html.contains("/admin/rooms/3/edit"));
}

#[tokio::test]
async fn delete_floor_plan_returns_to_floor_plans() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/floorplans/7"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/buildings/1/floorplans"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "building": {"id": 1, "name": "Main"},
            "floorplans": []
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rooms"))
        .and(query_param("building_id", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rooms": []})))
        .mount(&server)
        .await;

    let app = test_app(&server);

    let response = app
        .clone()
        .oneshot(form_post("/admin/floorplans/7/delete", "building_id=1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/buildings/1/floorplans");
    let cookie = session_cookie(&response);

    let html = body_text(
        app.oneshot(get_with_cookie("/admin/buildings/1/floorplans", &cookie))
            .await
            .unwrap(),
    )
    .await;
    assert!(html.contains("Floor plan deleted"));
    assert!(html.contains("No floor plans for this building yet."));
}

#[tokio::test]
async fn upload_floor_plan_forwards_file_and_selects_new_plan() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/floorplans"))
        .and(body_string_contains("Ground floor"))
        .and(body_string_contains("ground.png"))
        .and(body_string_contains("PNGDATA"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "floorplan": {"id": 12, "floor_name": "Ground floor", "image_url": "/uploads/ground.png"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = test_app(&server)
        .oneshot(multipart_post(
            "/admin/buildings/1/floorplans",
            &upload_body("Ground floor", "ground.png", "PNGDATA"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/buildings/1/floorplans?floorplan=12");
}

#[tokio::test]
async fn upload_without_file_is_rejected_without_calling_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/floorplans"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/buildings/1/floorplans"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "building": {"id": 1, "name": "Main"},
            "floorplans": []
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rooms"))
        .and(query_param("building_id", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rooms": []})))
        .mount(&server)
        .await;

    let app = test_app(&server);

    let response = app
        .clone()
        .oneshot(multipart_post(
            "/admin/buildings/1/floorplans",
            &upload_body("Ground floor", "", ""),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/buildings/1/floorplans");
    let cookie = session_cookie(&response);

    let html = body_text(
        app.oneshot(get_with_cookie("/admin/buildings/1/floorplans", &cookie))
            .await
            .unwrap(),
    )
    .await;
    assert!(html.contains("Choose an image file to upload"));
}

#[tokio::test]
async fn floor_plan_from_url_selects_new_plan() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/floorplans/url"))
        .and(body_json(json!({
            "building_id": 1,
            "floor_name": "First floor",
            "image_url": "https://example.com/first.png"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "floorplan": {"id": 13, "floor_name": "First floor", "image_url": "https://example.com/first.png"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = test_app(&server)
        .oneshot(form_post(
            "/admin/buildings/1/floorplans/url",
            "floor_name=First+floor&image_url=https%3A%2F%2Fexample.com%2Ffirst.png",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/buildings/1/floorplans?floorplan=13");
}

#[tokio::test]
async fn room_pages_label_readings_with_the_room() {
    let server = MockServer::start().await;
    mount_building_with_rooms(&server, json!([{"id": 3, "name": "Lab", "building_id": 1}])).await;
    mount_room_scans(&server).await;

    let app = test_app(&server);

    let admin = app
        .clone()
        .oneshot(Request::builder().uri("/admin/rooms/3").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(admin.status(), StatusCode::OK);
    let html = body_text(admin).await;
    assert!(html.contains("eduroam"));
    assert!(!html.contains("Unassigned"));

    let user = app
        .oneshot(
            Request::builder()
                .uri("/user/buildings/1/rooms/3")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(user.status(), StatusCode::OK);
    assert!(!body_text(user).await.contains("Unassigned"));
}

#[tokio::test]
async fn rooms_of_unknown_building_is_not_found() {
    let server = MockServer::start().await;
    mount_building_with_rooms(&server, json!([])).await;

    let response = test_app(&server)
        .oneshot(
            Request::builder()
                .uri("/admin/buildings/9/rooms")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

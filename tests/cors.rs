mod common;

use actix_web::http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN,
};
use actix_web::{test, App};
use common::test_state;
use teamforge::routes;

fn origins() -> Vec<String> {
    vec!["https://tracker.example.com".to_string()]
}

#[actix_rt::test]
async fn test_listed_origin_gets_credentialed_access() {
    let (state, _) = test_state();
    let app = test::init_service(
        App::new()
            .wrap(routes::cors(&origins()))
            .app_data(state)
            .configure(routes::config),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/health")
        .insert_header((ORIGIN, "https://tracker.example.com"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(
        resp.headers()
            .get(ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("https://tracker.example.com")
    );
    assert_eq!(
        resp.headers()
            .get(ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .and_then(|v| v.to_str().ok()),
        Some("true")
    );
}

#[actix_rt::test]
async fn test_foreign_origin_is_not_echoed() {
    let (state, _) = test_state();
    let app = test::init_service(
        App::new()
            .wrap(routes::cors(&origins()))
            .app_data(state)
            .configure(routes::config),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/health")
        .insert_header((ORIGIN, "https://evil.example"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    assert!(resp.headers().get(ACCESS_CONTROL_ALLOW_CREDENTIALS).is_none());
}

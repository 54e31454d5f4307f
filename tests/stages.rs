//! Funil de stages por empresa.

mod common;

use axum::http::StatusCode;
use common::{ADMIN_ID, LINKED_USER_ID, LONELY_USER_ID, TestApp, assert_error_envelope};
use serde_json::json;

#[tokio::test]
async fn default_then_custom_then_reset() {
    let app = TestApp::new();
    let token = app.token(LINKED_USER_ID);

    let (status, body) = app.get("/api/empresas/1/stages", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["padrao"], true);
    let ids: Vec<&str> = body["data"]["stages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["entrou", "qualificado", "conversao", "ganho"]);
    // O padrão não é persistido
    assert!(app.db.stages.lock().unwrap().is_empty());

    let (status, body) = app
        .put(
            "/api/empresas/1/stages",
            Some(&token),
            json!({ "stages": [
                { "id": "entrou", "nome": "Novo contato", "cor": "#000000" },
                { "id": "avaliacao", "nome": "Avaliação", "cor": "#123456", "ordem": 5 }
            ]}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["padrao"], false);
    assert_eq!(body["data"]["stages"][0]["ordem"], 1);
    assert_eq!(body["data"]["stages"][1]["ordem"], 5);

    let (_, body) = app.get("/api/empresas/1/stages", Some(&token)).await;
    assert_eq!(body["data"]["padrao"], false);
    assert_eq!(body["data"]["stages"][1]["id"], "avaliacao");

    let (status, body) = app.delete("/api/empresas/1/stages", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["padrao"], true);
    assert_eq!(body["data"]["stages"].as_array().unwrap().len(), 4);

    let (_, body) = app.get("/api/empresas/1/stages", Some(&token)).await;
    assert_eq!(body["data"]["padrao"], true);
}

#[tokio::test]
async fn stage_list_is_validated() {
    let app = TestApp::new();
    let token = app.token(ADMIN_ID);

    for payload in [
        json!({ "stages": [] }),
        json!({}),
        json!({ "stages": [{ "id": "a", "nome": "A" }] }),
        json!({ "stages": [
            { "id": "a", "nome": "A", "cor": "#1" },
            { "id": "a", "nome": "Outra A", "cor": "#2" }
        ]}),
    ] {
        let (status, body) = app.put("/api/empresas/1/stages", Some(&token), payload.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {payload}");
        assert_error_envelope(&body);
    }
    assert!(app.db.stages.lock().unwrap().is_empty());
}

#[tokio::test]
async fn stages_respect_company_access() {
    let app = TestApp::new();

    let (status, _) = app
        .get("/api/empresas/1/stages", Some(&app.token(LONELY_USER_ID)))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .delete("/api/empresas/2/stages", Some(&app.token(LINKED_USER_ID)))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .get("/api/empresas/999/stages", Some(&app.token(ADMIN_ID)))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.get("/api/empresas/1/stages", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

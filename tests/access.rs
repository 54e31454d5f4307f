//! Resolução de empresas acessíveis e as telas de administração.

mod common;

use axum::http::StatusCode;
use common::{ADMIN_ID, GESTOR_ID, LINKED_USER_ID, LONELY_USER_ID, TestApp, assert_error_envelope};
use serde_json::{Value, json};

use painel_backend::services::{access::AccessResolver, lead_normalizer};

fn resolver(app: &TestApp) -> AccessResolver {
    AccessResolver::new(app.db.clone(), app.db.clone())
}

#[tokio::test]
async fn resolver_scopes_by_role() {
    let app = TestApp::new();
    let resolver = resolver(&app);

    for user_id in [ADMIN_ID, GESTOR_ID] {
        let scope = resolver.resolve(&app.session(user_id)).await.unwrap();
        assert!(scope.full_access);
        assert_eq!(scope.ids.iter().copied().collect::<Vec<_>>(), [1, 2, 3]);
    }

    let scope = resolver.resolve(&app.session(LINKED_USER_ID)).await.unwrap();
    assert!(!scope.full_access);
    assert_eq!(scope.ids.iter().copied().collect::<Vec<_>>(), [1]);

    let scope = resolver.resolve(&app.session(LONELY_USER_ID)).await.unwrap();
    assert!(scope.is_empty());
}

#[test]
fn synonyms_normalize_to_the_same_fields() {
    let canonical = json!({ "nome": "Ana", "email": "ana@x.com", "telefone": "1199" });
    let english = json!({ "Name": "Ana", "EMAIL": "ana@x.com", "phone": "1199" });
    let camel = json!({ "fullName": "Ana", "emailAddress": "ana@x.com", "phoneNumber": "1199" });

    let as_map = |v: Value| v.as_object().cloned().unwrap();
    let expected = lead_normalizer::normalize(&as_map(canonical));
    assert_eq!(lead_normalizer::normalize(&as_map(english)), expected);
    assert_eq!(lead_normalizer::normalize(&as_map(camel)), expected);
}

#[tokio::test]
async fn company_list_is_scoped() {
    let app = TestApp::new();

    let (_, body) = app.get("/api/empresas", Some(&app.token(ADMIN_ID))).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    let (_, body) = app.get("/api/empresas", Some(&app.token(LINKED_USER_ID))).await;
    assert_eq!(body["data"], json!([{ "id": 1, "nome": "Clínica Sorriso", "conta_anuncio": "111" }]));

    let (status, body) = app.get("/api/empresas", Some(&app.token(LONELY_USER_ID))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn only_full_access_manages_companies() {
    let app = TestApp::new();

    let (status, body) = app
        .post("/api/empresas", Some(&app.token(LINKED_USER_ID)), json!({ "nome": "Nova" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_error_envelope(&body);

    let (status, body) = app
        .post(
            "/api/empresas",
            Some(&app.token(GESTOR_ID)),
            json!({ "nome": " Ótica Visão ", "conta_anuncio": "" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["nome"], "Ótica Visão");
    assert!(body["data"]["conta_anuncio"].is_null());

    let id = body["data"]["id"].as_i64().unwrap();
    let (status, _) = app
        .put(
            &format!("/api/empresas/{id}"),
            Some(&app.token(ADMIN_ID)),
            json!({ "nome": "Ótica Visão Centro", "conta_anuncio": "333" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.delete(&format!("/api/empresas/{id}"), Some(&app.token(ADMIN_ID))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.delete(&format!("/api/empresas/{id}"), Some(&app.token(ADMIN_ID))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn user_admin_flow() {
    let app = TestApp::new();
    let token = app.token(ADMIN_ID);

    let (status, body) = app
        .post(
            "/api/usuarios",
            Some(&token),
            json!({
                "nome": "Bruno Lima",
                "email": "Bruno@Empresa.com",
                "senha": "segredo1",
                "permissao": "USER",
                "empresas": [1, 2]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["email"], "bruno@empresa.com");
    assert_eq!(body["data"]["empresas"], json!([1, 2]));
    assert!(body["data"].get("senha").is_none());
    let id = body["data"]["id"].as_i64().unwrap();

    // Senha nova vai como hash
    let stored = app.db.users.lock().unwrap().iter().find(|u| u.id == id).unwrap().senha.clone();
    assert!(stored.starts_with("$2"));

    let (status, _) = app
        .post(
            "/api/usuarios",
            Some(&token),
            json!({ "nome": "Outro", "email": "bruno@empresa.com", "senha": "segredo1", "permissao": "USER" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .put(&format!("/api/usuarios/{id}"), Some(&token), json!({ "empresas": [3] }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["empresas"], json!([3]));
    assert_eq!(body["data"]["nome"], "Bruno Lima");

    let (_, body) = app.get("/api/usuarios", Some(&token)).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 5);

    let (status, _) = app.delete(&format!("/api/usuarios/{id}"), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!app.db.links.lock().unwrap().iter().any(|(u, _)| *u == id));

    let (status, _) = app.get("/api/usuarios", Some(&app.token(LINKED_USER_ID))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

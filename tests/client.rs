//! Client library tests against in-process servers on ephemeral ports.

use axum::extract::Path;
use axum::routing::get;
use axum::{Json, Router};
use cadastro::{app, Address, ApiClient, AppConfig, AppState, ClientError, ListQuery, MemoryStore, ViaCepClient};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;

async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server");
    });
    format!("http://{addr}")
}

async fn api() -> ApiClient {
    let state = AppState::new(Arc::new(MemoryStore::new()), 1);
    let base = serve(app(state, &AppConfig::default())).await;
    ApiClient::new(base).expect("client")
}

#[tokio::test]
async fn crud_round_trip_through_the_client() {
    let client = api().await;

    let created = client
        .create(&json!({ "Nome": "Ana", "Cidade": "Rio de Janeiro", "CEP": "20040-020" }))
        .await
        .expect("create");
    assert_eq!(created.postal_code.as_deref(), Some("20040020"));

    let fetched = client.get(created.id).await.expect("get");
    assert_eq!(fetched, created);

    let updated = client.update(created.id, &json!({ "Fone": "21 5555-0000" })).await.expect("update");
    assert_eq!(updated.phone.as_deref(), Some("21 5555-0000"));
    assert_eq!(updated.city, created.city);

    let query = ListQuery {
        cidade: Some("Rio".into()),
        ..ListQuery::default()
    };
    let listed = client.list(&query).await.expect("list");
    assert_eq!(listed.len(), 1);

    client.delete(created.id).await.expect("delete");
    let err = client.get(created.id).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn validation_errors_are_decoded() {
    let client = api().await;
    let err = client.create(&json!({ "CEP": "12" })).await.unwrap_err();
    match err {
        ClientError::Api { status, errors, .. } => {
            assert_eq!(status, 400);
            let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
            assert_eq!(fields, vec!["Nome", "CEP"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

async fn viacep_stub(Path(cep): Path<String>) -> Json<Value> {
    if cep == "01001000" {
        Json(json!({
            "cep": "01001-000",
            "logradouro": "Praça da Sé",
            "complemento": "lado ímpar",
            "bairro": "Sé",
            "localidade": "São Paulo",
            "uf": "SP"
        }))
    } else {
        Json(json!({ "erro": true }))
    }
}

#[tokio::test]
async fn viacep_lookup_maps_found_and_missing_codes() {
    let base = serve(Router::new().route("/ws/:cep/json/", get(viacep_stub))).await;
    let client = ViaCepClient::with_base_url(base).expect("client");

    let address = client.lookup("01001-000").await.expect("lookup");
    assert_eq!(
        address,
        Some(Address {
            street: "Praça da Sé".into(),
            district: "Sé".into(),
            city: "São Paulo".into(),
            state: "SP".into(),
            complement: "lado ímpar".into(),
        })
    );

    assert_eq!(client.lookup("99999999").await.expect("lookup"), None);
    assert_eq!(client.lookup("abc").await.expect("lookup"), None);
}

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::{extract::Path, routing::post, Json, Router};
use serde_json::{json, Value};
use tokio::task::JoinHandle;

pub const UNISWAP: &str = "0x3fc91a3afd70395cd496c647d5a6cc9d4b2b7fad";
pub const ONE_INCH: &str = "0x1111111254fb6c44bac0bed2854e76f90643097d";
pub const UNKNOWN: &str = "0xabcdef0000000000000000000000000000000001";

/// A fake JSON-RPC node. The first path segment picks the behaviour:
///
/// - `/block/<to>/<gas>/<gasPrice>`: one paying tx plus a contract creation
/// - `/empty`: a block whose only tx is a contract creation
/// - `/null`: `result: null`
/// - `/no-txs`: a block without a `transactions` field
/// - `/html`: a non-JSON body
/// - `/rpc-error`: a JSON-RPC error object
/// - `/slow`: answers after two seconds
pub async fn spawn_mock_node() -> (String, JoinHandle<()>) {
    let app = Router::new()
        .route("/block/:to/:gas/:price", post(paying_block))
        .route("/:mode", post(fixed_response));
    serve(app).await
}

async fn paying_block(
    Path((to, gas, price)): Path<(String, String, String)>,
    Json(req): Json<Value>,
) -> Json<Value> {
    Json(json!({
        "jsonrpc": "2.0",
        "id": req["id"],
        "result": {
            "number": "0x10",
            "hash": "0x01",
            "transactions": [
                {"hash": "0xa1", "to": to, "gas": gas, "gasPrice": price},
                {"hash": "0xa2", "to": null, "gas": "0xffffff", "gasPrice": "0xffffff"}
            ]
        }
    }))
}

async fn fixed_response(Path(mode): Path<String>, Json(req): Json<Value>) -> axum::response::Response {
    use axum::response::IntoResponse;

    let id = req["id"].clone();
    match mode.as_str() {
        "empty" => Json(json!({
            "jsonrpc": "2.0",
            "id": id,
            "result": {
                "number": "0x11",
                "transactions": [{"hash": "0xb1", "to": null, "gas": "0x5208", "gasPrice": "0x1"}]
            }
        }))
        .into_response(),
        "null" => Json(json!({"jsonrpc": "2.0", "id": id, "result": null})).into_response(),
        "no-txs" => Json(json!({"jsonrpc": "2.0", "id": id, "result": {"number": "0x12"}}))
            .into_response(),
        "rpc-error" => Json(json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": {"code": -32005, "message": "rate limited"}
        }))
        .into_response(),
        "slow" => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(json!({"jsonrpc": "2.0", "id": id, "result": null})).into_response()
        }
        _ => "<html>bad gateway</html>".into_response(),
    }
}

pub fn block_url(base: &str, to: &str, gas: &str, price: &str) -> String {
    format!("{}/block/{}/{}/{}", base, to, gas, price)
}

/// An address nothing listens on.
pub async fn dead_endpoint() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

pub async fn serve(app: Router) -> (String, JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    let base_url = format!("http://{}", addr);
    let server = axum::serve(listener, app);
    let handle = tokio::spawn(async move {
        let _ = server.await;
    });
    (base_url, handle)
}

pub fn temp_db_url(tag: &str) -> String {
    let dir = std::env::temp_dir();
    let _ = std::fs::create_dir_all(&dir);
    let file = format!(
        "gas_trends_{}_{}_{}.sqlite",
        tag,
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    );
    let path = dir.join(file);
    let _ = std::fs::File::create(&path);
    format!("sqlite://{}", path.to_string_lossy())
}

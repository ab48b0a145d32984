use async_trait::async_trait;
use bytes::Bytes;
use http::{Method, StatusCode};
use luno_core::{
    decode, Context, Credential, Endpoint, HttpSend, LogicalRequest, OsEnv, Query, RequestBuilder,
    Result, Signer,
};
use serde_json::Value;

// A transport that answers every request locally instead of calling the service.
#[derive(Debug)]
struct PrintingHttpSend;

#[async_trait]
impl HttpSend for PrintingHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> anyhow::Result<http::Response<Bytes>> {
        println!("{} {}", req.method(), req.uri());
        if !req.body().is_empty() {
            println!("{}", String::from_utf8_lossy(req.body()));
        }

        Ok(http::Response::builder()
            .status(StatusCode::OK)
            .body(Bytes::from_static(br#"{"type":"account","id":"acc_demo"}"#))?)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let ctx = Context::new()
        .with_http_send(PrintingHttpSend)
        .with_env(OsEnv);

    // For demo purposes, use dummy credentials if none are provided
    let key = ctx.env_var("LUNO_API_KEY").unwrap_or_else(|| "demo-key".to_string());
    let secret = ctx
        .env_var("LUNO_SECRET_KEY")
        .unwrap_or_else(|| "demo-secret".to_string());

    let builder = RequestBuilder::new(
        Signer::new(Credential::new(key, secret)),
        Endpoint::new("api.luno.io", "v1"),
    );

    let req = LogicalRequest::new(Method::PATCH, "/account")
        .with_query(Query::new().with("auto_name", "true"))
        .with_json(&serde_json::json!({"name": "Demo Account"}))?;
    let signed = builder.build(req)?;
    println!("signed bytes: {}", signed.signed_path);

    let resp = ctx.http_send(signed.into_http()?).await?;
    let account: Value = decode(resp, StatusCode::OK)?;
    println!("decoded: {account}");

    Ok(())
}

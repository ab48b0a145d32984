use luno_core::{Context, OsEnv};
use luno_http_send_reqwest::ReqwestHttpSend;

/// Create a context sending requests with reqwest and reading the OS env.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> luno::Result<()> {
/// let ctx = luno::default_context();
/// let config = luno::Config::new().from_env(&ctx);
/// let client = luno::Client::new(ctx, config)?;
///
/// let account = client.account().get().await?;
/// println!("{}", account.email);
/// # Ok(())
/// # }
/// ```
pub fn default_context() -> Context {
    Context::new()
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv)
}

/// Create a client from the `LUNO_*` env with [`default_context`].
pub fn default_client() -> luno_core::Result<crate::Client> {
    let ctx = default_context();
    let config = crate::Config::new().from_env(&ctx);
    crate::Client::new(ctx, config)
}

//! Request command - raw authenticated requests.

use anyhow::{Result, bail};
use clap::Args;
use reqwest::Method;
use serde_json::Value;

use campus_client::ApiRequest;

use super::{Context, parse_json, print_value};

/// Arguments for the request command.
#[derive(Args, Debug)]
pub struct RequestArgs {
    /// HTTP method (GET, POST, PUT, DELETE, PATCH)
    #[arg(value_parser = parse_method)]
    pub method: Method,

    /// Path relative to the API base URL (e.g. Course/3)
    pub path: String,

    /// JSON request body
    #[arg(short, long)]
    pub data: Option<String>,

    /// Query parameter as key=value; repeat a key to send an array
    #[arg(short, long = "query", value_parser = parse_key_value)]
    pub query: Vec<(String, String)>,

    /// Do not show the server's success message
    #[arg(long)]
    pub quiet: bool,
}

/// Run the request command.
pub async fn run(args: RequestArgs, ctx: &Context) -> Result<()> {
    let mut request = ApiRequest::new(args.method, args.path).query_pairs(args.query);
    if let Some(raw) = &args.data {
        request = request.json(parse_json(raw)?);
    }
    if args.quiet {
        request = request.suppress_success_message();
    }

    let client = ctx.client()?;
    let response = client.send(request).await?;

    if ctx.verbose {
        eprintln!("{}", console::style(response.status).dim());
    }

    if response.body.is_empty() {
        return Ok(());
    }
    match response.json::<Value>() {
        Ok(value) => print_value(&value)?,
        Err(_) => println!("{}", response.text()),
    }

    Ok(())
}

fn parse_method(raw: &str) -> Result<Method> {
    let method = Method::from_bytes(raw.to_ascii_uppercase().as_bytes())?;
    Ok(method)
}

/// Parse `key=value`; the value may itself contain `=`.
fn parse_key_value(raw: &str) -> Result<(String, String)> {
    let Some((key, value)) = raw.split_once('=') else {
        bail!("expected key=value, got '{}'", raw);
    };
    if key.is_empty() {
        bail!("query key must not be empty");
    }
    Ok((key.to_string(), value.to_string()))
}

use pagerduty_http::{ClientConfig, PagerDutyClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subdomain = std::env::var("PAGERDUTY_SUBDOMAIN")?;
    let token = std::env::var("PAGERDUTY_TOKEN")?;

    let client = PagerDutyClient::new(ClientConfig::for_token_auth(subdomain, token))?;

    let request = client.get("/api/v1/incidents?status=triggered")?;
    let response = client.send(request).await?;

    println!("{}", response.text().await?);

    Ok(())
}

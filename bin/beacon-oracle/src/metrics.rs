use eyre::Context;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use poem::{EndpointExt, Response, Route, Server, get, handler, listener::TcpListener};
use tokio::task::JoinHandle;

/// Installs the Prometheus recorder and serves it on `0.0.0.0:<port>/metrics`.
pub fn serve(port: u16, deployment: &str) -> eyre::Result<JoinHandle<()>> {
    let metrics_handle = PrometheusBuilder::new()
        .add_global_label("deployment", deployment)
        .install_recorder()
        .context("failed to install recorder")?;
    beacon_oracle_operator::metrics::describe();

    let app = Route::new().at(
        "/metrics",
        get(prometheus_metrics).data(metrics_handle.clone()),
    );

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(%addr, "Serving metrics");

    let server = Server::new(TcpListener::bind(addr));
    Ok(tokio::spawn(async move {
        if let Err(err) = server.run(app).await {
            tracing::error!(error = %err, "Metrics server stopped");
        }
    }))
}

#[handler]
async fn prometheus_metrics(handle: poem::web::Data<&PrometheusHandle>) -> Response {
    let metrics = handle.render();
    Response::builder()
        .header("content-type", "text/plain")
        .body(metrics)
}

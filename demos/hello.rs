use http::header::ACCEPT_ENCODING;
use http::Request;
use micro_gzip::{handler_fn, AppBuilder, Gzip, ResponseRecorder};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::TRACE).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let app = AppBuilder::new()
        .using(Gzip::default())
        .action(handler_fn(|_req, rw| rw.write_all(b"hello from micro-gzip\n")));

    let request = Request::builder().uri("/").header(ACCEPT_ENCODING, "gzip").body(())?;
    let mut recorder = ResponseRecorder::new();
    app.handle(request, &mut recorder).await?;

    info!(
        status = %recorder.status(),
        headers = ?recorder.headers(),
        wire_bytes = recorder.body().len(),
        "served"
    );
    Ok(())
}

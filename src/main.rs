#[actix_web::main]
async fn main() -> std::io::Result<()> {
    rental_docs_server::run().await
}

//! Print the OpenAPI document as pretty JSON.
//!
//! ```sh
//! cargo run -p catalog_api --bin openapi-spec > openapi.json
//! ```

use catalog_api::openapi::ApiDoc;
use utoipa::OpenApi;

fn main() -> eyre::Result<()> {
    let spec = ApiDoc::openapi().to_pretty_json()?;
    println!("{}", spec);
    Ok(())
}

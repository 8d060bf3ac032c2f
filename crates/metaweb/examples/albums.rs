//! Batched and streaming reads against the sandbox, plus an image download.

use metaweb::{Config, Options};
use serde_json::json;

fn main() -> metaweb::Result<()> {
    metaweb::init_logging();

    let session = Config::default().session()?;

    let bob = json!([{ "type": "/music/album", "artist": "Bob Dylan", "name": null }]);
    let bruce = json!([{ "type": "/music/album", "artist": "Bruce Springsteen", "name": null }]);

    // Two queries, one round trip
    let results = session.read_many(&[bob, bruce.clone()], &Options::new())?;
    for albums in &results {
        for album in albums.as_array().into_iter().flatten() {
            println!("{}", album["name"]);
        }
    }

    // The same query as a lazy stream; pages are fetched on demand
    for album in session.results(&bruce, &Options::new()) {
        println!("{}", album?["name"]);
    }

    // Download an image of U2
    let u2 = json!({ "id": "/en/u2", "/common/topic/image": [{ "id": null }] });
    let result = session.read_one(&u2, &Options::new())?;
    if let Some(image_id) = result["/common/topic/image"][0]["id"].as_str() {
        let (data, content_type) = session.download(image_id)?;
        println!("{content_type} image, {} bytes long", data.len());
    }

    Ok(())
}

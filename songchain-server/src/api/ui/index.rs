//! Index page: song table and registration form

use songchain_common::SongRecord;

use super::{escape, is_linkable, layout, render_flashes};
use crate::api::flash::FlashMessage;

fn optional(value: Option<&str>) -> String {
    match value {
        Some(v) => format!("<span class=\"mono\">{}</span>", escape(v)),
        None => "&mdash;".to_string(),
    }
}

fn render_tx_cell(song: &SongRecord) -> String {
    let Some(tx_id) = song.blockchain_tx_id.as_deref() else {
        return "&mdash;".to_string();
    };

    let mut cell = match song.explorer_url.as_deref().filter(|u| is_linkable(u)) {
        Some(url) => format!(
            "<a class=\"mono\" href=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a>",
            escape(url),
            escape(tx_id)
        ),
        None => format!("<span class=\"mono\">{}</span>", escape(tx_id)),
    };

    cell.push_str(&format!(
        " <a href=\"/verify_transaction?transactionId={}\">verify</a>",
        escape(&urlencoding::encode(tx_id))
    ));
    cell
}

fn render_row(song: &SongRecord) -> String {
    let url_cell = if is_linkable(&song.song.url) {
        format!(
            "<a href=\"{0}\" target=\"_blank\" rel=\"noopener\">{0}</a>",
            escape(&song.song.url)
        )
    } else {
        escape(&song.song.url)
    };

    format!(
        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td class=\"mono\">{}</td>\
         <td class=\"status-{}\">{}</td><td class=\"mono\">{}</td><td>{}</td><td>{}</td></tr>\n",
        song.id,
        escape(&song.song.title),
        url_cell,
        song.song.price,
        escape(&song.song.owner),
        song.status.as_str(),
        song.status.as_str(),
        escape(&song.data_id),
        optional(song.baas_task_id.as_deref()),
        render_tx_cell(song),
    )
}

/// Render the index page
pub fn render_index(songs: &[SongRecord], flashes: &[FlashMessage]) -> String {
    let table = if songs.is_empty() {
        "<p>No songs registered yet.</p>".to_string()
    } else {
        let rows: String = songs.iter().map(render_row).collect();
        format!(
            "<table>\n<tr><th>#</th><th>Title</th><th>URL</th><th>Price</th><th>Owner</th>\
             <th>Status</th><th>Tracking ID</th><th>Task ID</th><th>Transaction</th></tr>\n{}</table>",
            rows
        )
    };

    let content = format!(
        r#"{flashes}
    <h2>Registered Songs</h2>
    {table}

    <h2>Register a Song</h2>
    <form method="post" action="/register_song">
        <label for="title">Title</label>
        <input id="title" name="title" required>
        <label for="url">URL</label>
        <input id="url" name="url" required>
        <label for="price">Price</label>
        <input id="price" name="price" type="number" step="1" required>
        <label for="owner">Owner (Algorand address, 58 characters)</label>
        <input id="owner" name="owner" minlength="58" maxlength="58" required>
        <button type="submit">Register</button>
    </form>"#,
        flashes = render_flashes(flashes),
        table = table,
    );

    layout("Song Registry", &content)
}

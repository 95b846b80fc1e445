use axum::{response::Html, routing::get, Router};

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>settings-sync</title>
</head>
<body>
<h1>settings-sync</h1>
<p>Keeps one opaque settings blob in sync across your devices.</p>
<ol>
<li>Open <a href="/authorize">/authorize</a> and approve access. The callback returns your secret.</li>
<li>Send <code>authorization: base64(&lt;id&gt;:&lt;secret&gt;)</code> with every request to <code>/settings</code>.</li>
<li><code>PUT</code> (<code>application/octet-stream</code>), <code>GET</code>, <code>HEAD</code> and <code>DELETE</code> the blob. The <code>ETag</code> header carries the last write time.</li>
</ol>
</body>
</html>
"#;

/// GET / - informational page
async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub fn create_index_router() -> Router {
    Router::new().route("/", get(index))
}
